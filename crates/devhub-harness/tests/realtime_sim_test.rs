//! Deterministic end-to-end scenarios: the production runtime, App and
//! realtime client against simulated sockets and a virtual clock.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - The exact socket history (opens, delays, frames written)
//! - The App's caches and status after the script settles

use std::time::Duration;

use devhub_app::{ConnectionStatus, Runtime};
use devhub_client::ApiBase;
use devhub_harness::{InvariantRegistry, Scenario, SimDriver};
use devhub_proto::entities::Message;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn runtime(scenario: Scenario) -> Runtime<SimDriver> {
    let api = ApiBase::parse("http://devhub.test/api").unwrap();
    let driver = SimDriver::new(api, scenario).with_invariants(InvariantRegistry::standard());
    Runtime::new(driver)
}

/// Process cycles until the script is done and every callback consumed.
async fn settle(runtime: &mut Runtime<SimDriver>) {
    while !runtime.driver().is_idle() {
        if runtime.process_cycle().await.unwrap() {
            break;
        }
    }
}

fn contents(runtime: &Runtime<SimDriver>) -> Vec<(String, String)> {
    runtime.app().chat().messages().iter().map(|m| (m.id.clone(), m.content.clone())).collect()
}

#[tokio::test]
async fn seed_edit_delete() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![Message::text("1", "t1", "hi")])
        .server_frame(r#"{"type":"message_updated","payload":{"message":{"id":"1","content":"edited"}}}"#);
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    assert_eq!(contents(&rt), vec![("1".into(), "edited".into())]);

    rt.driver_mut().push(devhub_harness::SimStep::ServerFrame(
        r#"{"type":"message_deleted","payload":{"message_id":"1"}}"#.to_string(),
    ));
    settle(&mut rt).await;

    assert!(contents(&rt).is_empty());
}

#[tokio::test]
async fn backoff_then_exhaustion() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![])
        .server_up(false)
        .drop_sockets()
        .advance(secs(120));
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    let sockets = rt.driver().sockets();
    assert_eq!(sockets.scheduled_delays(), &[secs(1), secs(2), secs(4), secs(8), secs(16)]);

    let opened_at: Vec<_> = sockets.opened().iter().map(|r| r.opened_at.elapsed()).collect();
    assert_eq!(opened_at, vec![secs(0), secs(1), secs(3), secs(7), secs(15), secs(31)]);

    assert_eq!(rt.app().status(), ConnectionStatus::GaveUp);
    assert_eq!(sockets.live_count(), 0);
}

#[tokio::test]
async fn recovers_after_short_outage() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![Message::text("1", "t1", "hi")])
        .server_up(false)
        .drop_sockets()
        .advance(secs(2))
        .server_up(true)
        .advance(secs(5));
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    assert_eq!(rt.app().status(), ConnectionStatus::Online);
    assert_eq!(rt.driver().client().connection().attempts(), 0);
    assert_eq!(rt.driver().sockets().live_count(), 1);
    assert_eq!(contents(&rt), vec![("1".into(), "hi".into())]);
}

#[tokio::test]
async fn switching_topics_keeps_one_socket() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![Message::text("1", "t1", "one")])
        .select_topic("t2", vec![Message::text("9", "t2", "nine")])
        .server_frame(r#"{"type":"new_message","payload":{"message":{"id":"10","content":"ten"}}}"#);
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    let sockets = rt.driver().sockets();
    assert_eq!(sockets.opened().len(), 2);
    assert_eq!(sockets.live_count(), 1);
    assert!(sockets.opened()[1].url.contains("/topics/t2/ws"));

    assert_eq!(rt.app().chat().topic_id(), Some("t2"));
    assert_eq!(contents(&rt), vec![("9".into(), "nine".into()), ("10".into(), "ten".into())]);
}

#[tokio::test]
async fn closing_topic_cancels_pending_reconnect() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![])
        .drop_sockets()
        .close_topic()
        .advance(secs(30));
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    assert_eq!(rt.driver().sockets().opened().len(), 1);
    assert_eq!(rt.driver().sockets().live_count(), 0);
    assert_eq!(rt.app().status(), ConnectionStatus::Offline);
}

#[tokio::test]
async fn typing_frames_are_written() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![])
        .type_text("h")
        .type_text("he")
        .submit();
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    let sent: Vec<_> = rt.driver().sockets().sent().iter().map(|(_, text)| text.as_str()).collect();
    assert_eq!(sent, vec![
        r#"{"type":"typing","payload":{"is_typing":true}}"#,
        r#"{"type":"typing","payload":{"is_typing":false}}"#,
    ]);
}

#[tokio::test]
async fn heartbeat_once_per_interval() {
    let scenario = Scenario::new().select_topic("t1", vec![]).advance(secs(31)).advance(secs(31));
    let mut rt = runtime(scenario);
    settle(&mut rt).await;

    let pings = rt.driver().sockets().sent().iter().filter(|(_, text)| text.contains("\"ping\"")).count();
    assert_eq!(pings, 2);
}

#[tokio::test]
async fn remote_typing_expires() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![])
        .server_frame(r#"{"type":"typing","payload":{"user_id":"u2","name":"Bo","is_typing":true}}"#);
    let mut rt = runtime(scenario);
    settle(&mut rt).await;
    assert!(rt.app().chat().typing().contains("u2"));

    rt.driver_mut().push(devhub_harness::SimStep::Advance(secs(4)));
    settle(&mut rt).await;
    assert!(rt.app().chat().typing().is_empty());
}

#[tokio::test]
async fn full_run_ends_offline() {
    let scenario = Scenario::new()
        .select_topic("t1", vec![Message::text("1", "t1", "hi")])
        .server_frame(r#"{"type":"made_up_event","payload":{}}"#);
    let rt = runtime(scenario);

    rt.run().await.unwrap();
}
