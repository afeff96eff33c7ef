use hashtalk_client::{NegotiationState, Outgoing, PrimitiveEvent, SessionInput};
use hashtalk_core::{IceCandidate, Role, SdpType, SignalKind};
use serde_json::json;

use crate::integration::{init_tracing, test_session};
use crate::utils::Call;

fn candidate(n: u32) -> SessionInput {
    SessionInput::Signal {
        kind: SignalKind::Candidate,
        payload: json!({"candidate": format!("candidate:{n}"), "sdpMid": "0", "sdpMLineIndex": 0}),
    }
}

#[tokio::test]
async fn test_candidates_before_offer_are_buffered() {
    init_tracing();

    let (mut session, log) = test_session(Role::Responder);
    session.handle(SessionInput::Start).await.unwrap();

    session.handle(candidate(0)).await.unwrap();
    session.handle(candidate(1)).await.unwrap();
    assert_eq!(session.buffered_candidates(), 2);
    assert!(log.candidates().is_empty());

    session
        .handle(SessionInput::Signal {
            kind: SignalKind::Offer,
            payload: json!({"type": "offer", "sdp": "remote"}),
        })
        .await
        .unwrap();

    assert_eq!(session.buffered_candidates(), 0);
    assert_eq!(
        log.calls(),
        vec![
            Call::SetRemote(SdpType::Offer),
            Call::AddCandidate("candidate:0".into()),
            Call::AddCandidate("candidate:1".into()),
            Call::CreateAnswer,
            Call::SetLocal(SdpType::Answer),
        ]
    );

    session.handle(candidate(2)).await.unwrap();
    assert_eq!(
        log.candidates(),
        vec!["candidate:0", "candidate:1", "candidate:2"]
    );
}

#[tokio::test]
async fn test_initiator_buffers_until_answer() {
    init_tracing();

    let (mut session, log) = test_session(Role::Initiator);
    session.handle(SessionInput::Start).await.unwrap();

    // the answer raced behind the responder's first candidates
    session.handle(candidate(7)).await.unwrap();
    assert_eq!(session.state(), NegotiationState::AwaitingAnswer);
    assert_eq!(session.buffered_candidates(), 1);

    session
        .handle(SessionInput::Signal {
            kind: SignalKind::Answer,
            payload: json!({"type": "answer", "sdp": "remote"}),
        })
        .await
        .unwrap();

    assert_eq!(log.candidates(), vec!["candidate:7"]);
    assert_eq!(log.count(&Call::AddCandidate("candidate:7".into())), 1);
}

#[tokio::test]
async fn test_local_candidates_are_signalled() {
    init_tracing();

    let (mut session, _log) = test_session(Role::Initiator);
    session.handle(SessionInput::Start).await.unwrap();

    let local = IceCandidate {
        candidate: "candidate:local".into(),
        sdp_mid: Some("0".into()),
        sdp_m_line_index: Some(0),
    };
    let out = session
        .handle(SessionInput::Primitive(PrimitiveEvent::LocalCandidate(local)))
        .await
        .unwrap();

    assert_eq!(
        out,
        vec![Outgoing::Signal {
            kind: SignalKind::Candidate,
            payload: json!({"candidate": "candidate:local", "sdpMid": "0", "sdpMLineIndex": 0}),
        }]
    );

    let out = session
        .handle(SessionInput::Primitive(PrimitiveEvent::Track {
            id: "video0".into(),
            kind: "video".into(),
        }))
        .await
        .unwrap();
    assert_eq!(
        out,
        vec![Outgoing::RemoteTrack {
            id: "video0".into(),
            kind: "video".into(),
        }]
    );
}
