use hashtalk_core::Role;
use hashtalk_server::RequeuePolicy;

use crate::integration::{create_test_lobby, init_tracing};
use crate::utils::{connect_and_join, participant};

#[tokio::test]
async fn test_two_participants_pair() {
    init_tracing();

    let (lobby, mut inbox, _signaling) = create_test_lobby(RequeuePolicy::Automatic);

    let alice = participant("alice");
    let bob = participant("bob");

    connect_and_join(&lobby, &alice).await;
    inbox.expect_quiet()
        .await
        .expect("A lone participant must not be notified");

    connect_and_join(&lobby, &bob).await;

    let (room_a, role_a, peer_a) = inbox.expect_matched(&alice)
        .await
        .expect("alice should be matched");
    let (room_b, role_b, peer_b) = inbox.expect_matched(&bob)
        .await
        .expect("bob should be matched");

    assert_eq!(room_a, room_b);
    assert_eq!(role_a, Role::Initiator);
    assert_eq!(role_b, Role::Responder);
    assert_eq!(peer_a, bob);
    assert_eq!(peer_b, alice);

    let stats = lobby.stats().await.expect("lobby alive");
    assert_eq!(stats.rooms, 1);
    assert_eq!(stats.waiting, 0);
}

#[tokio::test]
async fn test_role_follows_identifier_not_arrival_order() {
    init_tracing();

    let (lobby, mut inbox, _signaling) = create_test_lobby(RequeuePolicy::Automatic);

    let zed = participant("zed");
    let amy = participant("amy");

    connect_and_join(&lobby, &zed).await;
    connect_and_join(&lobby, &amy).await;

    let (_, role_zed, _) = inbox.expect_matched(&zed).await.unwrap();
    let (_, role_amy, _) = inbox.expect_matched(&amy).await.unwrap();

    assert_eq!(role_amy, Role::Initiator);
    assert_eq!(role_zed, Role::Responder);
}
