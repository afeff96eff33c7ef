use chrono::{DateTime, Utc};
use hashtalk_core::{ParticipantId, Role, RoomId};

/// Two participants paired by the matchmaker. Never holds a single member.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub created_at: DateTime<Utc>,
    members: [ParticipantId; 2],
}

impl Room {
    pub fn new(first: ParticipantId, second: ParticipantId) -> Self {
        Self {
            id: RoomId::new(),
            created_at: Utc::now(),
            members: [first, second],
        }
    }

    pub fn members(&self) -> &[ParticipantId; 2] {
        &self.members
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.members.contains(participant_id)
    }

    /// The member that is not `participant_id`, if `participant_id` belongs here.
    pub fn other(&self, participant_id: &ParticipantId) -> Option<&ParticipantId> {
        match &self.members {
            [a, b] if a == participant_id => Some(b),
            [a, b] if b == participant_id => Some(a),
            _ => None,
        }
    }

    pub fn role_of(&self, participant_id: &ParticipantId) -> Option<Role> {
        self.other(participant_id)
            .map(|other| Role::assign(participant_id, other))
    }

    pub fn initiator(&self) -> &ParticipantId {
        let [a, b] = &self.members;
        if a < b { a } else { b }
    }
}
