use crate::error::{NegotiationError, TransportError};
use crate::negotiation::Status;
use hashtalk_core::{ParticipantId, Role, RoomId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Requests from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Leave the current partner (or the pool) and look again.
    Next,
    /// Leave and shut the driver down.
    Stop,
}

/// Notifications for the presentation layer, beyond the coarse [`Status`].
#[derive(Debug)]
pub enum ClientEvent {
    Welcome {
        participant_id: ParticipantId,
    },
    Matched {
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    },
    Connected {
        room_id: RoomId,
    },
    RemoteTrack {
        room_id: RoomId,
        id: String,
        kind: String,
    },
    PeerLeft {
        room_id: RoomId,
    },
    NegotiationFailed {
        room_id: RoomId,
        error: NegotiationError,
    },
}

/// Handle to a running [`NegotiationDriver`](crate::NegotiationDriver).
pub struct ClientHandle {
    control: mpsc::UnboundedSender<Control>,
    status: watch::Receiver<Status>,
    events: mpsc::UnboundedReceiver<ClientEvent>,
    task: Option<JoinHandle<Result<(), TransportError>>>,
}

impl ClientHandle {
    pub(crate) fn new(
        control: mpsc::UnboundedSender<Control>,
        status: watch::Receiver<Status>,
        events: mpsc::UnboundedReceiver<ClientEvent>,
    ) -> Self {
        Self {
            control,
            status,
            events,
            task: None,
        }
    }

    pub(crate) fn with_task(mut self, task: JoinHandle<Result<(), TransportError>>) -> Self {
        self.task = Some(task);
        self
    }

    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    /// A receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }

    /// Wait until the status equals `status`. Returns `false` if the driver
    /// exited first.
    pub async fn wait_for(&mut self, status: Status) -> bool {
        self.status.wait_for(|s| *s == status).await.is_ok()
    }

    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    /// The "next" button.
    pub fn next_match(&self) -> bool {
        self.control.send(Control::Next).is_ok()
    }

    pub fn stop(&self) -> bool {
        self.control.send(Control::Stop).is_ok()
    }

    /// Wait for the driver task to finish.
    pub async fn join(mut self) -> Result<(), TransportError> {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(Err(TransportError::Closed)),
            None => Ok(()),
        }
    }
}
