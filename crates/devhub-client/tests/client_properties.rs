//! Property-based tests for handler dispatch.

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use devhub_client::{
    ApiBase, ConnectionConfig, EventHandler, RealtimeClient, SocketId, TransportAction,
    TransportEvent,
};
use devhub_proto::{MessageChange, MessageDeleted, TypingUpdate, entities::Message};
use proptest::prelude::*;

#[derive(Clone, Default)]
struct Counter(Arc<Mutex<usize>>);

impl Counter {
    fn bump(&self) {
        *self.0.lock().unwrap() += 1;
    }

    fn get(&self) -> usize {
        *self.0.lock().unwrap()
    }
}

impl EventHandler for Counter {
    fn on_new_message(&mut self, _message: Message) {
        self.bump();
    }

    fn on_message_updated(&mut self, _change: MessageChange) {
        self.bump();
    }

    fn on_message_deleted(&mut self, _deleted: MessageDeleted) {
        self.bump();
    }

    fn on_typing(&mut self, _typing: TypingUpdate) {
        self.bump();
    }
}

const KNOWN: [&str; 7] = [
    "new_message",
    "message_updated",
    "message_deleted",
    "typing",
    "reaction_updated",
    "notification_created",
    "pong",
];

fn open_client(counter: &Counter) -> (RealtimeClient<Instant>, SocketId) {
    let api = ApiBase::parse("http://localhost/api").unwrap();
    let mut client = RealtimeClient::new(api, ConnectionConfig::default());
    let socket = match client.connect("t1", "tok", Box::new(counter.clone())).as_slice() {
        [TransportAction::Open { socket, .. }] => *socket,
        other => panic!("unexpected {other:?}"),
    };
    client.handle(TransportEvent::Opened { socket }, Instant::now());
    (client, socket)
}

proptest! {
    /// Frames with unrecognized tags reach no callback and produce no
    /// transport work.
    #[test]
    fn prop_unknown_tags_are_dropped(tag in "[a-z_]{1,20}", body in "[a-z0-9]{0,10}") {
        prop_assume!(!KNOWN.contains(&tag.as_str()));
        let counter = Counter::default();
        let (mut client, socket) = open_client(&counter);

        let text = format!(r#"{{"type":"{tag}","payload":{{"x":"{body}"}}}}"#);
        let actions = client.handle(TransportEvent::Text { socket, text }, Instant::now());

        prop_assert!(actions.is_empty());
        prop_assert_eq!(counter.get(), 0);
        prop_assert!(client.is_connected());
    }

    /// Arbitrary text never panics and never closes the socket.
    #[test]
    fn prop_garbage_frames_are_harmless(text in ".{0,64}") {
        let counter = Counter::default();
        let (mut client, socket) = open_client(&counter);

        let actions = client.handle(TransportEvent::Text { socket, text }, Instant::now());

        prop_assert!(actions.is_empty());
        prop_assert!(client.is_connected());
    }
}

#[test]
fn typing_event_reaches_handler() {
    let counter = Counter::default();
    let (mut client, socket) = open_client(&counter);

    let text = r#"{"type":"typing","payload":{"user_id":"u2","name":"Bo","is_typing":true}}"#;
    client.handle(TransportEvent::Text { socket, text: text.to_string() }, Instant::now());

    assert_eq!(counter.get(), 1);
}
