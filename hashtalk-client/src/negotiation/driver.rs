use crate::config::{ClientConfig, RejoinPolicy};
use crate::error::{NegotiationError, TransportError};
use crate::negotiation::client_handle::{ClientEvent, ClientHandle, Control};
use crate::negotiation::{NegotiationSession, NegotiationState, Outgoing, SessionInput, Status};
use crate::primitive::{PrimitiveEvent, PrimitiveFactory};
use crate::transport::SignalingTransport;
use hashtalk_core::{
    ClientMessage, IceServerConfig, ParticipantId, Role, RoomId, ServerMessage,
};
use std::collections::VecDeque;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One unit of work for the driver loop.
#[derive(Debug)]
enum DriverInput {
    Server(ServerMessage),
    Primitive(PrimitiveEvent),
    Control(Control),
    TransportClosed,
    Timeout,
}

impl DriverInput {
    /// Inputs that make an in-flight step for `room_id` pointless.
    fn cancels(&self, room_id: RoomId) -> bool {
        match self {
            Self::Server(ServerMessage::PeerLeft { room_id: r }) => *r == room_id,
            Self::Server(ServerMessage::Matched { .. }) => true,
            Self::Control(_) | Self::TransportClosed => true,
            _ => false,
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

/// Client-side actor: owns the transport, at most one negotiation session,
/// and the status published to the presentation layer.
///
/// Server messages, primitive callbacks, control requests and the
/// negotiation deadline are all funnelled into one loop, so session
/// transitions never interleave.
pub struct NegotiationDriver<T, F: PrimitiveFactory> {
    transport: T,
    factory: F,
    config: ClientConfig,
    ice_servers: Vec<IceServerConfig>,
    server_requeues: bool,
    session: Option<NegotiationSession<F::Primitive>>,
    session_events: Option<mpsc::UnboundedReceiver<PrimitiveEvent>>,
    pending: VecDeque<DriverInput>,
    status_tx: watch::Sender<Status>,
    events_tx: mpsc::UnboundedSender<ClientEvent>,
    control_rx: mpsc::UnboundedReceiver<Control>,
}

impl<T, F> NegotiationDriver<T, F>
where
    T: SignalingTransport + 'static,
    F: PrimitiveFactory + 'static,
{
    pub fn new(transport: T, factory: F, config: ClientConfig) -> (Self, ClientHandle) {
        let (status_tx, status_rx) = watch::channel(Status::Disconnected);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let driver = Self {
            transport,
            factory,
            ice_servers: config.ice_servers.clone(),
            config,
            server_requeues: false,
            session: None,
            session_events: None,
            pending: VecDeque::new(),
            status_tx,
            events_tx,
            control_rx,
        };

        (driver, ClientHandle::new(control_tx, status_rx, events_rx))
    }

    /// Run the driver on its own task.
    pub fn spawn(transport: T, factory: F, config: ClientConfig) -> ClientHandle {
        let (driver, handle) = Self::new(transport, factory, config);
        let task = tokio::spawn(driver.run());
        handle.with_task(task)
    }

    /// Join the waiting pool and process inputs until stopped or the
    /// transport goes away.
    pub async fn run(mut self) -> Result<(), TransportError> {
        self.transport.send(ClientMessage::Join {}).await?;
        self.set_status(Status::Waiting);

        loop {
            let input = match self.pending.pop_front() {
                Some(input) => input,
                None => self.next_input().await,
            };

            match self.dispatch(input).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(e) => {
                    self.end_session().await;
                    self.set_status(Status::Disconnected);
                    return Err(e);
                }
            }
        }

        self.transport.disconnect().await;
        Ok(())
    }

    async fn next_input(&mut self) -> DriverInput {
        let deadline = self.session.as_ref().and_then(|s| s.deadline());

        tokio::select! {
            msg = self.transport.recv() => match msg {
                Some(msg) => DriverInput::Server(msg),
                None => DriverInput::TransportClosed,
            },
            Some(event) = next_event(&mut self.session_events) => DriverInput::Primitive(event),
            control = self.control_rx.recv() => DriverInput::Control(control.unwrap_or(Control::Stop)),
            _ = expire(deadline) => DriverInput::Timeout,
        }
    }

    async fn dispatch(&mut self, input: DriverInput) -> Result<Flow, TransportError> {
        match input {
            DriverInput::Server(msg) => self.on_server_message(msg).await?,
            DriverInput::Primitive(event) => self.step(SessionInput::Primitive(event)).await?,
            DriverInput::Timeout => self.step(SessionInput::Timeout).await?,
            DriverInput::Control(Control::Next) => {
                info!("Looking for another match");
                self.end_session().await;
                self.transport.send(ClientMessage::Leave {}).await?;
                self.transport.send(ClientMessage::Join {}).await?;
                self.set_status(Status::Waiting);
            }
            DriverInput::Control(Control::Stop) => {
                info!("Stopping");
                self.end_session().await;
                let _ = self.transport.send(ClientMessage::Leave {}).await;
                self.set_status(Status::Disconnected);
                return Ok(Flow::Stop);
            }
            DriverInput::TransportClosed => {
                warn!("Signaling transport closed");
                return Err(TransportError::Closed);
            }
        }
        Ok(Flow::Continue)
    }

    async fn on_server_message(&mut self, msg: ServerMessage) -> Result<(), TransportError> {
        match msg {
            ServerMessage::Welcome {
                participant_id,
                ice_servers,
                auto_requeue,
            } => {
                info!("Relay assigned participant id {}", participant_id);
                if !ice_servers.is_empty() {
                    self.ice_servers = ice_servers;
                }
                self.server_requeues = auto_requeue;
                self.emit(ClientEvent::Welcome { participant_id });
            }

            ServerMessage::Matched {
                room_id,
                role,
                peer_id,
            } => {
                self.end_session().await;
                self.begin_session(room_id, role, peer_id).await?;
            }

            ServerMessage::Signal {
                room_id,
                kind,
                payload,
                ..
            } => {
                if self.current_room() == Some(room_id) {
                    self.step(SessionInput::Signal { kind, payload }).await?;
                } else {
                    debug!("Discarding stale {} for room {}", kind, room_id);
                }
            }

            ServerMessage::PeerLeft { room_id } => {
                if self.current_room() != Some(room_id) {
                    debug!("Discarding peer-left for room {}", room_id);
                    return Ok(());
                }

                self.step(SessionInput::PeerLeft).await?;
                self.end_session().await;
                self.emit(ClientEvent::PeerLeft { room_id });
                self.after_peer_left().await?;
            }
        }
        Ok(())
    }

    async fn begin_session(
        &mut self,
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    ) -> Result<(), TransportError> {
        info!("Matched into room {} as {} with {}", room_id, role, peer_id);
        self.emit(ClientEvent::Matched {
            room_id,
            role,
            peer_id: peer_id.clone(),
        });

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let primitive = match self.factory.create(&self.ice_servers, events_tx).await {
            Ok(primitive) => primitive,
            Err(e) => return self.fail(room_id, e).await,
        };

        self.session = Some(NegotiationSession::new(
            room_id,
            role,
            peer_id,
            primitive,
            self.config.negotiation_timeout,
        ));
        self.session_events = Some(events_rx);

        self.step(SessionInput::Start).await
    }

    /// Run one session transition, giving up on it if something arrives that
    /// makes it moot or the deadline passes. The interrupting input is
    /// handled next.
    async fn step(&mut self, input: SessionInput) -> Result<(), TransportError> {
        let Some(session) = self.session.as_mut() else {
            debug!("No session, dropping {:?}", input);
            return Ok(());
        };
        let room_id = session.room_id();
        let deadline = session.deadline();

        let outcome = {
            let transition = session.handle(input);
            tokio::pin!(transition);

            loop {
                tokio::select! {
                    biased;
                    result = &mut transition => break Some(result),
                    msg = self.transport.recv() => {
                        let input = match msg {
                            Some(msg) => DriverInput::Server(msg),
                            None => DriverInput::TransportClosed,
                        };
                        if input.cancels(room_id) {
                            self.pending.push_front(input);
                            break None;
                        }
                        self.pending.push_back(input);
                    }
                    control = self.control_rx.recv() => {
                        self.pending.push_front(DriverInput::Control(control.unwrap_or(Control::Stop)));
                        break None;
                    }
                    _ = expire(deadline) => {
                        self.pending.push_front(DriverInput::Timeout);
                        break None;
                    }
                }
            }
        };

        match outcome {
            None => {
                debug!("Negotiation step for room {} interrupted", room_id);
                Ok(())
            }
            Some(Ok(outgoing)) => {
                for out in outgoing {
                    match out {
                        Outgoing::Signal { kind, payload } => {
                            self.transport
                                .send(ClientMessage::Signal {
                                    room_id,
                                    kind,
                                    payload,
                                })
                                .await?;
                        }
                        Outgoing::RemoteTrack { id, kind } => {
                            info!("Remote {} track {} in room {}", kind, id, room_id);
                            self.emit(ClientEvent::RemoteTrack { room_id, id, kind });
                        }
                    }
                }

                let connected = self
                    .session
                    .as_ref()
                    .is_some_and(|s| s.state() == NegotiationState::Connected);
                if connected && *self.status_tx.borrow() != Status::Connected {
                    self.set_status(Status::Connected);
                    self.emit(ClientEvent::Connected { room_id });
                }
                Ok(())
            }
            Some(Err(e)) => self.fail(room_id, e).await,
        }
    }

    /// A session failed on our side: tell the relay and maybe look again.
    async fn fail(&mut self, room_id: RoomId, error: NegotiationError) -> Result<(), TransportError> {
        warn!("Session for room {} disconnected: {}", room_id, error);
        self.end_session().await;
        self.emit(ClientEvent::NegotiationFailed { room_id, error });

        // Leaving notifies the peer. A `join` from inside a room implies the leave.
        match self.config.rejoin {
            RejoinPolicy::Automatic => {
                self.transport.send(ClientMessage::Join {}).await?;
                self.set_status(Status::Waiting);
            }
            RejoinPolicy::Manual => {
                self.transport.send(ClientMessage::Leave {}).await?;
                self.set_status(Status::Disconnected);
            }
        }
        Ok(())
    }

    /// The relay already re-queued us when it says so in `welcome`.
    async fn after_peer_left(&mut self) -> Result<(), TransportError> {
        if self.server_requeues {
            self.set_status(Status::Waiting);
        } else if self.config.rejoin == RejoinPolicy::Automatic {
            self.transport.send(ClientMessage::Join {}).await?;
            self.set_status(Status::Waiting);
        } else {
            self.set_status(Status::Disconnected);
        }
        Ok(())
    }

    async fn end_session(&mut self) {
        self.session_events = None;
        if let Some(mut session) = self.session.take() {
            session.close().await;
        }
    }

    fn current_room(&self) -> Option<RoomId> {
        self.session
            .as_ref()
            .filter(|s| s.state() != NegotiationState::Disconnected)
            .map(|s| s.room_id())
    }

    fn set_status(&self, status: Status) {
        let previous = self.status_tx.send_replace(status);
        if previous != status {
            info!("Status: {} -> {}", previous, status);
        }
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events_tx.send(event);
    }
}

async fn next_event(
    events: &mut Option<mpsc::UnboundedReceiver<PrimitiveEvent>>,
) -> Option<PrimitiveEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
