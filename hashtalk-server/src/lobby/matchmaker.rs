use crate::config::RequeuePolicy;
use crate::lobby::delivery::Delivery;
use crate::lobby::pairing::Room;
use crate::relay::SignalRelay;
use hashtalk_core::{ParticipantId, ParticipantState, RoomId};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// Server-side record of a connected participant.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    pub state: ParticipantState,
    pub room: Option<RoomId>,
}

/// Waiting pool plus active pairing table.
///
/// Every operation is synchronous and returns the notifications it produced,
/// so the lobby loop stays the only place that touches the network.
pub struct Matchmaker {
    policy: RequeuePolicy,
    waiting: VecDeque<ParticipantId>,
    participants: HashMap<ParticipantId, Participant>,
    rooms: HashMap<RoomId, Room>,
}

impl Matchmaker {
    pub fn new(policy: RequeuePolicy) -> Self {
        Self {
            policy,
            waiting: VecDeque::new(),
            participants: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    pub fn policy(&self) -> RequeuePolicy {
        self.policy
    }

    /// Track a freshly opened transport session. Not waiting, not paired.
    pub fn register(&mut self, participant_id: ParticipantId) {
        self.participants
            .entry(participant_id.clone())
            .or_insert(Participant {
                id: participant_id,
                state: ParticipantState::Disconnected,
                room: None,
            });
    }

    pub fn join(&mut self, participant_id: ParticipantId) -> Vec<Delivery> {
        let mut out = Vec::new();

        let current = self
            .participants
            .get(&participant_id)
            .map(|p| (p.state, p.room.is_some()));

        match current {
            Some((ParticipantState::Waiting, _)) => {
                debug!("{} is already waiting, join ignored", participant_id);
                return out;
            }
            Some((_, true)) => {
                debug!("{} re-joined from inside a room", participant_id);
                out.extend(self.leave(&participant_id));
            }
            _ => {}
        }

        self.enqueue(participant_id, &mut out);
        out
    }

    pub fn leave(&mut self, participant_id: &ParticipantId) -> Vec<Delivery> {
        let mut out = Vec::new();

        self.waiting.retain(|waiting| waiting != participant_id);

        let Some(participant) = self.participants.get_mut(participant_id) else {
            return out;
        };
        participant.state = ParticipantState::Disconnected;
        let Some(room_id) = participant.room.take() else {
            return out;
        };
        let Some(room) = self.rooms.remove(&room_id) else {
            return out;
        };

        info!("Room {} closed: {} left", room.id, participant_id);

        let Some(survivor) = room.other(participant_id).cloned() else {
            return out;
        };
        if let Some(delivery) = SignalRelay::broadcast_peer_left(&room, participant_id) {
            out.push(delivery);
        }
        if let Some(p) = self.participants.get_mut(&survivor) {
            p.state = ParticipantState::Disconnected;
            p.room = None;
        }

        if self.policy == RequeuePolicy::Automatic {
            self.enqueue(survivor, &mut out);
        }

        out
    }

    /// Transport closed: leave and forget the participant entirely.
    pub fn remove(&mut self, participant_id: &ParticipantId) -> Vec<Delivery> {
        let out = self.leave(participant_id);
        self.participants.remove(participant_id);
        out
    }

    pub fn mark_negotiating(&mut self, participant_id: &ParticipantId) {
        if let Some(p) = self.participants.get_mut(participant_id) {
            if p.state == ParticipantState::Pairing {
                p.state = ParticipantState::Negotiating;
            }
        }
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_of(&self, participant_id: &ParticipantId) -> Option<&Room> {
        self.participants
            .get(participant_id)
            .and_then(|p| p.room.as_ref())
            .and_then(|room_id| self.rooms.get(room_id))
    }

    pub fn participant(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(participant_id)
    }

    pub fn waiting(&self) -> impl Iterator<Item = &ParticipantId> {
        self.waiting.iter()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    fn enqueue(&mut self, participant_id: ParticipantId, out: &mut Vec<Delivery>) {
        while let Some(candidate) = self.waiting.pop_front() {
            if candidate == participant_id {
                continue;
            }
            self.pair(candidate, participant_id, out);
            return;
        }

        debug!("{} is waiting for a partner", participant_id);
        let participant = self
            .participants
            .entry(participant_id.clone())
            .or_insert(Participant {
                id: participant_id.clone(),
                state: ParticipantState::Waiting,
                room: None,
            });
        participant.state = ParticipantState::Waiting;
        participant.room = None;
        self.waiting.push_back(participant_id);
    }

    fn pair(&mut self, oldest: ParticipantId, newcomer: ParticipantId, out: &mut Vec<Delivery>) {
        let room = Room::new(oldest, newcomer);
        info!(
            "Room {} formed: {} (initiator) + {}",
            room.id,
            room.initiator(),
            room.other(room.initiator()).map(|p| p.as_str()).unwrap_or("?")
        );

        for member in room.members() {
            let participant = self
                .participants
                .entry(member.clone())
                .or_insert(Participant {
                    id: member.clone(),
                    state: ParticipantState::Pairing,
                    room: None,
                });
            participant.state = ParticipantState::Pairing;
            participant.room = Some(room.id);

            if let (Some(role), Some(peer_id)) = (room.role_of(member), room.other(member)) {
                out.push(Delivery::Matched {
                    to: member.clone(),
                    room_id: room.id,
                    role,
                    peer_id: peer_id.clone(),
                });
            }
        }

        self.rooms.insert(room.id, room);
    }
}
