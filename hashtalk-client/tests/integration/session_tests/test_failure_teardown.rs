use hashtalk_client::{
    NegotiationError, NegotiationSession, NegotiationState, PeerConnectionState, PrimitiveEvent,
    SessionInput,
};
use hashtalk_core::{Role, RoomId, SdpType, SignalKind};
use serde_json::json;
use std::time::Duration;

use crate::integration::{init_tracing, test_session};
use crate::utils::{CallLog, FailOn, MockPrimitive};

#[tokio::test]
async fn test_malformed_offer_disconnects() {
    init_tracing();

    let (mut session, log) = test_session(Role::Responder);

    let err = session
        .handle(SessionInput::Signal {
            kind: SignalKind::Offer,
            payload: json!({"sdp": 42}),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NegotiationError::MalformedPayload {
            kind: SignalKind::Offer,
            ..
        }
    ));
    assert_eq!(session.state(), NegotiationState::Disconnected);
    assert!(session.is_released());
    assert!(log.closed());

    // everything after teardown is a no-op
    let out = session
        .handle(SessionInput::Signal {
            kind: SignalKind::Offer,
            payload: json!({"type": "offer", "sdp": "late"}),
        })
        .await
        .unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_answer_typed_offer_is_rejected() {
    init_tracing();

    let (mut session, _log) = test_session(Role::Responder);

    let err = session
        .handle(SessionInput::Signal {
            kind: SignalKind::Offer,
            payload: json!({"type": "answer", "sdp": "confused"}),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NegotiationError::UnexpectedDescription {
            expected: SdpType::Offer,
            actual: SdpType::Answer,
        }
    ));
    assert_eq!(session.state(), NegotiationState::Disconnected);
}

#[tokio::test]
async fn test_primitive_failure_disconnects() {
    init_tracing();

    let log = CallLog::default();
    let primitive = MockPrimitive::new("local", log.clone()).failing(FailOn::SetRemote);
    let mut session = NegotiationSession::new(
        RoomId::new(),
        Role::Responder,
        "peer".parse().unwrap(),
        primitive,
        Duration::from_secs(30),
    );

    session
        .handle(SessionInput::Signal {
            kind: SignalKind::Candidate,
            payload: json!({"candidate": "candidate:0"}),
        })
        .await
        .unwrap();

    let err = session
        .handle(SessionInput::Signal {
            kind: SignalKind::Offer,
            payload: json!({"type": "offer", "sdp": "remote"}),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, NegotiationError::Primitive(_)));
    assert_eq!(session.state(), NegotiationState::Disconnected);
    assert_eq!(session.buffered_candidates(), 0);
    assert!(log.candidates().is_empty());
    assert!(log.closed());
}

#[tokio::test]
async fn test_connection_lost_after_connected() {
    init_tracing();

    let (mut session, log) = test_session(Role::Initiator);
    session.handle(SessionInput::Start).await.unwrap();
    session
        .handle(SessionInput::Signal {
            kind: SignalKind::Answer,
            payload: json!({"type": "answer", "sdp": "remote"}),
        })
        .await
        .unwrap();

    session
        .handle(SessionInput::Primitive(PrimitiveEvent::ConnectionState(
            PeerConnectionState::Connected,
        )))
        .await
        .unwrap();
    assert_eq!(session.state(), NegotiationState::Connected);

    let err = session
        .handle(SessionInput::Primitive(PrimitiveEvent::ConnectionState(
            PeerConnectionState::Failed,
        )))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NegotiationError::ConnectionLost(PeerConnectionState::Failed)
    ));
    assert_eq!(session.state(), NegotiationState::Disconnected);
    assert!(log.closed());
}
