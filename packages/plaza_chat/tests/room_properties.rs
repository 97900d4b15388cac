//! Behavioral properties of the chat room: presence announcements, typing
//! state, message relay, and disconnect cleanup, asserted over events drained
//! from per-connection outbound queues.

use plaza_chat::protocol::ServerEvent;
use plaza_chat::room::ChatRoom;
use tokio::sync::mpsc;

/// Attach a connection with a fresh outbound queue and hand back the
/// receiving end.
async fn connect(room: &ChatRoom, connection_id: &str) -> mpsc::Receiver<ServerEvent> {
    let (tx, rx) = mpsc::channel(16);
    room.attach(connection_id, tx).await;
    rx
}

fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// --- Presence ---

#[tokio::test]
async fn join_greets_joiner_and_notifies_only_others() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;

    room.join("a", "Ana").await;

    // The joiner gets exactly one direct greeting and no join notice for
    // their own join.
    let events_a = drain(&mut rx_a);
    assert_eq!(events_a.len(), 1);
    match &events_a[0] {
        ServerEvent::Welcome { greeting } => {
            assert!(greeting.contains("Ana"), "greeting was {greeting:?}")
        }
        other => panic!("Expected Welcome, got {:?}", other),
    }

    // Everyone else gets the join notice.
    let events_b = drain(&mut rx_b);
    assert_eq!(events_b.len(), 1);
    match &events_b[0] {
        ServerEvent::ParticipantJoined { display_name } => assert_eq!(display_name, "Ana"),
        other => panic!("Expected ParticipantJoined, got {:?}", other),
    }
}

#[tokio::test]
async fn no_self_notice_across_any_join_sequence() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;
    let mut rx_c = connect(&room, "c").await;

    room.join("a", "Ana").await;
    room.join("b", "Bob").await;
    room.join("c", "Cleo").await;
    room.join("a", "Ana").await; // duplicate join re-announces

    for (rx, own_name) in [(&mut rx_a, "Ana"), (&mut rx_b, "Bob"), (&mut rx_c, "Cleo")] {
        for event in drain(rx) {
            if let ServerEvent::ParticipantJoined { display_name } = event {
                assert_ne!(
                    display_name, own_name,
                    "connection saw a join notice for its own join"
                );
            }
        }
    }
}

#[tokio::test]
async fn duplicate_join_overwrites_display_name() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;

    room.join("a", "Ana").await;
    room.join("a", "Anita").await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    assert_eq!(room.resolve("a").await.as_deref(), Some("Anita"));

    // Subsequent messages carry the new name.
    room.relay("a", "hi").await;
    match &drain(&mut rx_b)[..] {
        [ServerEvent::Chat {
            sender_display_name,
            ..
        }] => assert_eq!(sender_display_name, "Anita"),
        other => panic!("Expected one Chat, got {:?}", other),
    }
}

// --- Message relay ---

#[tokio::test]
async fn chat_round_trip_reaches_everyone_including_sender() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;

    room.join("a", "Ana").await;
    room.join("b", "Bob").await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    assert!(room.relay("a", "hello").await);

    for rx in [&mut rx_a, &mut rx_b] {
        let events = drain(rx);
        assert_eq!(events.len(), 1, "expected exactly one event, got {events:?}");
        match &events[0] {
            ServerEvent::Chat {
                sender_display_name,
                body,
                ..
            } => {
                assert_eq!(sender_display_name, "Ana");
                assert_eq!(body, "hello");
            }
            other => panic!("Expected Chat, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn unjoined_connection_chat_broadcasts_nothing() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;
    room.join("b", "Bob").await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    // Connection a never joined.
    assert!(!room.relay("a", "x").await);

    assert!(drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_b).is_empty());
}

#[tokio::test]
async fn unjoined_connections_still_receive_fanout() {
    // Attached sockets that never joined are still broadcast recipients.
    let room = ChatRoom::new();
    let mut rx_lurker = connect(&room, "lurker").await;
    let mut rx_a = connect(&room, "a").await;

    room.join("a", "Ana").await;
    drain(&mut rx_a);
    drain(&mut rx_lurker);

    room.relay("a", "hello").await;
    let events = drain(&mut rx_lurker);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ServerEvent::Chat { .. }));
}

// --- Typing state ---

#[tokio::test]
async fn typing_update_excludes_the_mutator() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;
    let mut rx_c = connect(&room, "c").await;

    room.join("a", "Ana").await;
    room.join("b", "Bob").await;
    room.join("c", "Cleo").await;
    drain(&mut rx_a);
    drain(&mut rx_b);
    drain(&mut rx_c);

    assert!(room.start_typing("a").await);

    assert!(drain(&mut rx_a).is_empty(), "mutator must not see the update");
    for rx in [&mut rx_b, &mut rx_c] {
        match &drain(rx)[..] {
            [ServerEvent::TypingUpdate { typing }] => assert_eq!(typing, &vec!["Ana".to_string()]),
            other => panic!("Expected one TypingUpdate, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn clear_typing_is_idempotent() {
    let room = ChatRoom::new();
    room.mark_typing("Ana").await;

    room.clear_typing("Ana").await;
    let once = room.typing_snapshot().await;
    room.clear_typing("Ana").await;
    let twice = room.typing_snapshot().await;

    assert_eq!(once, twice);
    assert!(twice.is_empty());
}

#[tokio::test]
async fn typing_collision_across_connections() {
    // Two connections joined under the same display name: a stop from one
    // clears the indicator the other raised.
    let room = ChatRoom::new();
    let _rx_a = connect(&room, "a").await;
    let _rx_b = connect(&room, "b").await;
    room.join("a", "Ana").await;
    room.join("b", "Ana").await;

    room.start_typing("a").await;
    assert_eq!(room.typing_snapshot().await, vec!["Ana"]);

    room.stop_typing("b").await;
    assert!(room.typing_snapshot().await.is_empty());
}

#[tokio::test]
async fn typing_from_unjoined_connection_is_dropped() {
    let room = ChatRoom::new();
    let _rx_a = connect(&room, "a").await;

    assert!(!room.start_typing("a").await);
    assert!(room.typing_snapshot().await.is_empty());
}

// --- Disconnect ---

#[tokio::test]
async fn disconnect_clears_typing_and_notifies_once() {
    let room = ChatRoom::new();
    let mut rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;

    room.join("a", "Ana").await;
    room.join("b", "Bob").await;
    room.start_typing("a").await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    assert_eq!(room.disconnect("a").await.as_deref(), Some("Ana"));

    // Ana is gone from the typing snapshot immediately after disconnect
    // processing.
    assert!(room.typing_snapshot().await.is_empty());

    // B gets exactly one leave notice naming Ana.
    let left: Vec<_> = drain(&mut rx_b)
        .into_iter()
        .filter(|e| matches!(e, ServerEvent::ParticipantLeft { .. }))
        .collect();
    match &left[..] {
        [ServerEvent::ParticipantLeft { display_name }] => assert_eq!(display_name, "Ana"),
        other => panic!("Expected one ParticipantLeft, got {:?}", other),
    }

    // The leaver's queue got nothing after detach.
    assert!(drain(&mut rx_a).is_empty());
}

#[tokio::test]
async fn duplicate_disconnect_is_a_noop() {
    let room = ChatRoom::new();
    let _rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;
    room.join("a", "Ana").await;
    room.join("b", "Bob").await;
    room.disconnect("a").await;
    drain(&mut rx_b);

    assert_eq!(room.disconnect("a").await, None);
    assert!(drain(&mut rx_b).is_empty());
}

#[tokio::test]
async fn unjoined_disconnect_announces_nothing() {
    let room = ChatRoom::new();
    let _rx_a = connect(&room, "a").await;
    let mut rx_b = connect(&room, "b").await;
    room.join("b", "Bob").await;
    drain(&mut rx_b);

    assert_eq!(room.disconnect("a").await, None);
    assert_eq!(room.connection_count().await, 1);
    assert!(drain(&mut rx_b).is_empty());
}
