use hashtalk_core::ServerMessage;
use hashtalk_server::{LobbyCommand, RequeuePolicy};

use crate::integration::{create_test_lobby, init_tracing};
use crate::utils::{connect_and_join, participant};

#[tokio::test]
async fn test_join_from_room_restarts_matching() {
    init_tracing();

    let (lobby, mut inbox, signaling) = create_test_lobby(RequeuePolicy::Manual);

    let a = participant("a");
    let b = participant("b");
    let c = participant("c");

    connect_and_join(&lobby, &a).await;
    connect_and_join(&lobby, &b).await;
    let (r1, _, _) = inbox.expect_matched(&a).await.unwrap();
    inbox.expect_matched(&b).await.unwrap();

    // "find another match" from inside the room
    lobby
        .send(LobbyCommand::Join {
            participant_id: a.clone(),
        })
        .await;

    match inbox.next_for(&b).await.unwrap() {
        ServerMessage::PeerLeft { room_id } => assert_eq!(room_id, r1),
        other => panic!("expected peer-left, got {:?}", other),
    }
    inbox.expect_quiet().await.unwrap();

    connect_and_join(&lobby, &c).await;
    let (r2, _, peer) = inbox.expect_matched(&a).await.unwrap();
    assert_ne!(r1, r2);
    assert_eq!(peer, c);

    // a repeated join while waiting or paired twice never duplicates a match
    for message in signaling.sent_to(&a).await {
        if let ServerMessage::Matched { room_id, .. } = message {
            assert!(room_id == r1 || room_id == r2);
        }
    }
}
