use hashtalk_client::{NegotiationError, NegotiationState, SessionInput};
use hashtalk_core::{Role, SignalKind};
use serde_json::json;
use std::time::Duration;

use crate::integration::{init_tracing, test_session};

#[tokio::test(start_paused = true)]
async fn test_timeout_while_awaiting_answer() {
    init_tracing();

    let (mut session, log) = test_session(Role::Initiator);
    session.handle(SessionInput::Start).await.unwrap();

    // early timer fire is ignored
    tokio::time::advance(Duration::from_secs(10)).await;
    session.handle(SessionInput::Timeout).await.unwrap();
    assert_eq!(session.state(), NegotiationState::AwaitingAnswer);

    tokio::time::advance(Duration::from_secs(20)).await;
    let err = session.handle(SessionInput::Timeout).await.unwrap_err();

    assert!(matches!(
        err,
        NegotiationError::Timeout(NegotiationState::AwaitingAnswer)
    ));
    assert_eq!(session.state(), NegotiationState::Disconnected);
    assert!(log.closed());
}

#[tokio::test(start_paused = true)]
async fn test_connected_session_has_no_deadline() {
    init_tracing();

    let (mut session, _log) = test_session(Role::Responder);
    assert!(session.deadline().is_some());

    session
        .handle(SessionInput::Signal {
            kind: SignalKind::Offer,
            payload: json!({"type": "offer", "sdp": "remote"}),
        })
        .await
        .unwrap();
    assert!(session.deadline().is_none());

    tokio::time::advance(Duration::from_secs(60)).await;
    session.handle(SessionInput::Timeout).await.unwrap();
    assert_eq!(session.state(), NegotiationState::Connected);
}
