use hashtalk_client::{ClientConfig, ClientEvent, RejoinPolicy, Status};
use hashtalk_core::{ClientMessage, Role, RoomId, ServerMessage};

use super::{matched, start_driver};
use crate::integration::{init_tracing, test_config, wait_event};
use crate::utils::MockFactory;

async fn pair_then_peer_leaves(
    config: ClientConfig,
    auto_requeue: bool,
) -> (hashtalk_client::ClientHandle, crate::utils::RelaySide, MockFactory) {
    let factory = MockFactory::new("me");
    let (mut handle, mut relay) = start_driver(factory.clone(), config, auto_requeue).await;

    let room_id = RoomId::new();
    relay.send(matched(room_id, Role::Initiator));
    relay.expect().await.unwrap();

    relay.send(ServerMessage::PeerLeft { room_id });
    let event = wait_event(&mut handle, |e| matches!(e, ClientEvent::PeerLeft { .. })).await;
    assert!(matches!(event, ClientEvent::PeerLeft { room_id: r } if r == room_id));
    assert!(factory.log.closed());

    (handle, relay, factory)
}

#[tokio::test]
async fn test_server_requeue_keeps_waiting() {
    init_tracing();

    let (handle, mut relay, _) = pair_then_peer_leaves(test_config(), true).await;

    assert_eq!(handle.status(), Status::Waiting);
    relay.expect_quiet().await.unwrap();
}

#[tokio::test]
async fn test_client_rejoins_when_server_does_not() {
    init_tracing();

    let (handle, mut relay, _) = pair_then_peer_leaves(test_config(), false).await;

    assert_eq!(relay.expect().await.unwrap(), ClientMessage::Join {});
    assert_eq!(handle.status(), Status::Waiting);
}

#[tokio::test]
async fn test_manual_rejoin_disconnects() {
    init_tracing();

    let config = ClientConfig {
        rejoin: RejoinPolicy::Manual,
        ..test_config()
    };
    let (mut handle, mut relay, _) = pair_then_peer_leaves(config, false).await;

    assert!(handle.wait_for(Status::Disconnected).await);
    relay.expect_quiet().await.unwrap();

    // the user presses "next"
    assert!(handle.next_match());
    assert_eq!(relay.expect().await.unwrap(), ClientMessage::Leave {});
    assert_eq!(relay.expect().await.unwrap(), ClientMessage::Join {});
    assert!(handle.wait_for(Status::Waiting).await);
}

#[tokio::test]
async fn test_peer_left_for_old_room_is_ignored() {
    init_tracing();

    let factory = MockFactory::new("me");
    let (mut handle, mut relay) = start_driver(factory.clone(), test_config(), true).await;

    let first = RoomId::new();
    let second = RoomId::new();
    relay.send(matched(first, Role::Initiator));
    relay.expect().await.unwrap();

    // a new match replaces the old session
    relay.send(matched(second, Role::Initiator));
    relay.expect().await.unwrap();
    relay.send(ServerMessage::PeerLeft { room_id: first });

    relay.expect_quiet().await.unwrap();
    assert_eq!(factory.created(), 2);
    assert_eq!(factory.log.count(&crate::utils::Call::Close), 1);
    assert_eq!(handle.status(), Status::Waiting);

    handle.stop();
    assert_eq!(relay.expect().await.unwrap(), ClientMessage::Leave {});
    assert!(handle.wait_for(Status::Disconnected).await);
    handle.join().await.unwrap();
}
