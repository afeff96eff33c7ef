use crate::lobby::{Delivery, Matchmaker, Room};
use hashtalk_core::{ParticipantId, RoomId, SignalEnvelope, SignalKind};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Why an inbound signal was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayDrop {
    /// The room is gone, usually torn down a moment ago.
    UnknownRoom,
    /// The sender is not a member of the room it named.
    NotMember,
    /// An offer from the responder or an answer from the initiator.
    WrongRole,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub relayed: u64,
    pub dropped_unknown_room: u64,
    pub dropped_not_member: u64,
    pub dropped_wrong_role: u64,
    pub dropped_malformed: u64,
}

/// Forwards signals between the two members of a room.
///
/// Holds no routing state of its own; membership is read from the matchmaker
/// at the moment each signal arrives.
#[derive(Debug, Default)]
pub struct SignalRelay {
    stats: RelayStats,
}

impl SignalRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn send(
        &mut self,
        matchmaker: &mut Matchmaker,
        from: &ParticipantId,
        room_id: RoomId,
        kind: SignalKind,
        payload: Value,
    ) -> Option<Delivery> {
        let to = match Self::route(matchmaker, from, room_id, kind) {
            Ok(to) => to,
            Err(reason) => {
                self.record_drop(reason);
                debug!(
                    "Dropped {} from {} for room {}: {:?}",
                    kind, from, room_id, reason
                );
                return None;
            }
        };

        self.stats.relayed += 1;
        matchmaker.mark_negotiating(from);

        Some(Delivery::Signal(SignalEnvelope {
            room_id,
            from_participant: from.clone(),
            to_participant: to,
            kind,
            payload,
        }))
    }

    /// A frame that could not even be decoded.
    pub fn record_malformed(&mut self) {
        self.stats.dropped_malformed += 1;
    }

    /// `peer-left` for whoever remains in `room` after `departed` is gone.
    pub fn broadcast_peer_left(room: &Room, departed: &ParticipantId) -> Option<Delivery> {
        room.other(departed).map(|survivor| Delivery::PeerLeft {
            to: survivor.clone(),
            room_id: room.id,
        })
    }

    fn route(
        matchmaker: &Matchmaker,
        from: &ParticipantId,
        room_id: RoomId,
        kind: SignalKind,
    ) -> Result<ParticipantId, RelayDrop> {
        let room = matchmaker.room(&room_id).ok_or(RelayDrop::UnknownRoom)?;
        let to = room.other(from).ok_or(RelayDrop::NotMember)?;
        let role = room.role_of(from).ok_or(RelayDrop::NotMember)?;

        if !role.may_send(kind) {
            return Err(RelayDrop::WrongRole);
        }

        Ok(to.clone())
    }

    fn record_drop(&mut self, reason: RelayDrop) {
        match reason {
            RelayDrop::UnknownRoom => self.stats.dropped_unknown_room += 1,
            RelayDrop::NotMember => self.stats.dropped_not_member += 1,
            RelayDrop::WrongRole => self.stats.dropped_wrong_role += 1,
        }
    }
}
