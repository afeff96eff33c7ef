use crate::error::NegotiationError;
use crate::negotiation::NegotiationState;
use crate::primitive::{ConnectionPrimitive, PrimitiveEvent};
use hashtalk_core::{
    IceCandidate, ParticipantId, Role, RoomId, SdpType, SessionDescription, SignalKind,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::mem;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Everything that can move a session forward.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// The room was just formed.
    Start,
    /// A relayed envelope for this room.
    Signal { kind: SignalKind, payload: Value },
    Primitive(PrimitiveEvent),
    PeerLeft,
    /// The negotiation deadline passed.
    Timeout,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// Send through the relay to the other member.
    Signal { kind: SignalKind, payload: Value },
    RemoteTrack { id: String, kind: String },
}

/// Negotiation state for one room membership.
///
/// All inputs go through [`NegotiationSession::handle`], which takes
/// `&mut self`: a transition that suspends on the primitive holds the
/// session exclusively until it resolves. Any error tears the session down
/// before it is returned.
pub struct NegotiationSession<P: ConnectionPrimitive> {
    room_id: RoomId,
    role: Role,
    peer_id: ParticipantId,
    primitive: Option<P>,
    state: NegotiationState,
    remote_applied: bool,
    pending_candidates: Vec<IceCandidate>,
    deadline: Option<Instant>,
}

impl<P: ConnectionPrimitive> NegotiationSession<P> {
    /// `timeout` bounds the whole offer/answer exchange, measured from now.
    pub fn new(
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
        primitive: P,
        timeout: Duration,
    ) -> Self {
        Self {
            room_id,
            role,
            peer_id,
            primitive: Some(primitive),
            state: NegotiationState::Idle,
            remote_applied: false,
            pending_candidates: Vec::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// When the session gives up, `None` once connected or torn down.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Candidates held back until a remote description is applied.
    pub fn buffered_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn is_released(&self) -> bool {
        self.primitive.is_none()
    }

    pub async fn handle(&mut self, input: SessionInput) -> Result<Vec<Outgoing>, NegotiationError> {
        if self.state == NegotiationState::Disconnected {
            debug!("Session for room {} is closed, ignoring {:?}", self.room_id, input);
            return Ok(Vec::new());
        }

        let result = match input {
            SessionInput::Start => self.start().await,
            SessionInput::Signal { kind, payload } => self.on_signal(kind, payload).await,
            SessionInput::Primitive(event) => self.on_primitive_event(event),
            SessionInput::PeerLeft => {
                info!("Peer {} left room {}", self.peer_id, self.room_id);
                self.close().await;
                Ok(Vec::new())
            }
            SessionInput::Timeout => match self.deadline {
                Some(deadline) if Instant::now() >= deadline => {
                    Err(NegotiationError::Timeout(self.state))
                }
                _ => Ok(Vec::new()),
            },
        };

        if let Err(e) = &result {
            warn!("Negotiation in room {} failed: {}", self.room_id, e);
            self.close().await;
        }
        result
    }

    /// Tear down: release the primitive and drop buffered candidates.
    pub async fn close(&mut self) {
        self.set_state(NegotiationState::Disconnected);
        self.pending_candidates.clear();
        self.remote_applied = false;
        self.deadline = None;

        if let Some(mut primitive) = self.primitive.take() {
            if let Err(e) = primitive.close().await {
                warn!("Failed to close primitive for room {}: {}", self.room_id, e);
            }
        }
    }

    async fn start(&mut self) -> Result<Vec<Outgoing>, NegotiationError> {
        if self.role == Role::Responder || self.state != NegotiationState::Idle {
            return Ok(Vec::new());
        }

        self.set_state(NegotiationState::Offering);
        let primitive = self.primitive()?;
        let offer = primitive.create_offer().await?;
        primitive.set_local_description(offer.clone()).await?;
        self.set_state(NegotiationState::AwaitingAnswer);

        Ok(vec![Outgoing::Signal {
            kind: SignalKind::Offer,
            payload: encode(SignalKind::Offer, &offer)?,
        }])
    }

    async fn on_signal(
        &mut self,
        kind: SignalKind,
        payload: Value,
    ) -> Result<Vec<Outgoing>, NegotiationError> {
        match kind {
            SignalKind::Offer => self.on_offer(payload).await,
            SignalKind::Answer => self.on_answer(payload).await,
            SignalKind::Candidate => self.on_candidate(payload).await,
        }
    }

    async fn on_offer(&mut self, payload: Value) -> Result<Vec<Outgoing>, NegotiationError> {
        if self.role == Role::Initiator {
            debug!("Discarding offer in room {}: we are the initiator", self.room_id);
            return Ok(Vec::new());
        }
        if self.state != NegotiationState::Idle {
            debug!("Discarding repeated offer in room {} ({})", self.room_id, self.state);
            return Ok(Vec::new());
        }

        let offer: SessionDescription = decode(SignalKind::Offer, payload)?;
        expect_type(&offer, SdpType::Offer)?;

        self.set_state(NegotiationState::Answering);
        self.primitive()?
            .set_remote_description(offer.clone())
            .await?;
        self.remote_applied = true;
        self.flush_candidates().await?;

        let primitive = self.primitive()?;
        let answer = primitive.create_answer(&offer).await?;
        primitive.set_local_description(answer.clone()).await?;
        self.connected();

        Ok(vec![Outgoing::Signal {
            kind: SignalKind::Answer,
            payload: encode(SignalKind::Answer, &answer)?,
        }])
    }

    async fn on_answer(&mut self, payload: Value) -> Result<Vec<Outgoing>, NegotiationError> {
        if self.state != NegotiationState::AwaitingAnswer {
            debug!("Ignoring answer in room {} ({})", self.room_id, self.state);
            return Ok(Vec::new());
        }

        let answer: SessionDescription = decode(SignalKind::Answer, payload)?;
        expect_type(&answer, SdpType::Answer)?;

        self.primitive()?.set_remote_description(answer).await?;
        self.remote_applied = true;
        self.flush_candidates().await?;
        self.connected();

        Ok(Vec::new())
    }

    async fn on_candidate(&mut self, payload: Value) -> Result<Vec<Outgoing>, NegotiationError> {
        let candidate: IceCandidate = decode(SignalKind::Candidate, payload)?;

        if self.remote_applied {
            self.primitive()?.add_ice_candidate(candidate).await?;
        } else {
            debug!(
                "Buffering candidate for room {} ({} pending)",
                self.room_id,
                self.pending_candidates.len() + 1
            );
            self.pending_candidates.push(candidate);
        }

        Ok(Vec::new())
    }

    fn on_primitive_event(
        &mut self,
        event: PrimitiveEvent,
    ) -> Result<Vec<Outgoing>, NegotiationError> {
        match event {
            PrimitiveEvent::LocalCandidate(candidate) => Ok(vec![Outgoing::Signal {
                kind: SignalKind::Candidate,
                payload: encode(SignalKind::Candidate, &candidate)?,
            }]),
            PrimitiveEvent::Track { id, kind } => Ok(vec![Outgoing::RemoteTrack { id, kind }]),
            PrimitiveEvent::ConnectionState(state) if state.is_lost() => {
                Err(NegotiationError::ConnectionLost(state))
            }
            PrimitiveEvent::ConnectionState(state) => {
                debug!("Room {} peer connection {}", self.room_id, state);
                Ok(Vec::new())
            }
        }
    }

    async fn flush_candidates(&mut self) -> Result<(), NegotiationError> {
        let pending = mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!(
                "Applying {} buffered candidates for room {}",
                pending.len(),
                self.room_id
            );
        }

        let primitive = self.primitive()?;
        for candidate in pending {
            primitive.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    fn connected(&mut self) {
        self.deadline = None;
        self.set_state(NegotiationState::Connected);
    }

    fn set_state(&mut self, state: NegotiationState) {
        if self.state != state {
            debug!("Room {}: {} -> {}", self.room_id, self.state, state);
            self.state = state;
        }
    }

    fn primitive(&mut self) -> Result<&mut P, NegotiationError> {
        self.primitive.as_mut().ok_or(NegotiationError::Released)
    }
}

fn decode<T: DeserializeOwned>(kind: SignalKind, payload: Value) -> Result<T, NegotiationError> {
    serde_json::from_value(payload)
        .map_err(|source| NegotiationError::MalformedPayload { kind, source })
}

fn encode<T: Serialize>(kind: SignalKind, value: &T) -> Result<Value, NegotiationError> {
    serde_json::to_value(value)
        .map_err(|source| NegotiationError::MalformedPayload { kind, source })
}

fn expect_type(desc: &SessionDescription, expected: SdpType) -> Result<(), NegotiationError> {
    if desc.sdp_type == expected {
        Ok(())
    } else {
        Err(NegotiationError::UnexpectedDescription {
            expected,
            actual: desc.sdp_type,
        })
    }
}
