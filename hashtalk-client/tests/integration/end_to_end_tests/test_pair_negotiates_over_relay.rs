use hashtalk_client::{ClientEvent, Status};
use hashtalk_server::RequeuePolicy;

use super::{eventually, join, start_relay};
use crate::integration::{init_tracing, wait_event};

#[tokio::test]
async fn test_pair_negotiates_over_relay() {
    init_tracing();

    let relay = start_relay(RequeuePolicy::Automatic).await;

    let (mut a, a_primitives) = join(&relay, "a").await;
    let (mut b, b_primitives) = join(&relay, "b").await;

    let ClientEvent::Matched {
        room_id: a_room,
        role: a_role,
        ..
    } = wait_event(&mut a, |e| matches!(e, ClientEvent::Matched { .. })).await
    else {
        unreachable!()
    };
    let ClientEvent::Matched {
        room_id: b_room,
        role: b_role,
        ..
    } = wait_event(&mut b, |e| matches!(e, ClientEvent::Matched { .. })).await
    else {
        unreachable!()
    };
    assert_eq!(a_room, b_room);
    assert_eq!(a_role.opposite(), b_role);

    assert!(a.wait_for(Status::Connected).await);
    assert!(b.wait_for(Status::Connected).await);

    // each side applied the candidate the other trickled
    assert!(eventually(|| a_primitives.log.candidates() == vec!["candidate:b"]).await);
    assert!(eventually(|| b_primitives.log.candidates() == vec!["candidate:a"]).await);

    let stats = relay.lobby.stats().await.unwrap();
    assert_eq!(stats.rooms, 1);
    assert_eq!(stats.relay.relayed, 4);
    assert_eq!(stats.relay.dropped_wrong_role, 0);

    // "next" from a: b hears peer-left and both end up waiting again
    assert!(a.next_match());
    wait_event(&mut b, |e| matches!(e, ClientEvent::PeerLeft { .. })).await;
    assert!(a_primitives.log.closed());
    assert!(eventually(|| b_primitives.log.closed()).await);
}
