//! Property-based simulation: arbitrary scripts through the production
//! runtime with the standard invariants checked on every render.

use std::time::Duration;

use devhub_app::{AppEvent, Runtime};
use devhub_client::ApiBase;
use devhub_harness::{InvariantRegistry, Scenario, SimDriver, SimStep};
use devhub_proto::entities::Message;
use proptest::prelude::*;

fn frame_strategy() -> impl Strategy<Value = String> {
    let id = || 0u8..5;
    prop_oneof![
        3 => id().prop_map(|id| format!(
            r#"{{"type":"new_message","payload":{{"message":{{"id":"{id}","content":"m"}}}}}}"#
        )),
        2 => id().prop_map(|id| format!(
            r#"{{"type":"message_updated","payload":{{"message":{{"id":"{id}","content":"e"}}}}}}"#
        )),
        2 => id().prop_map(|id| format!(
            r#"{{"type":"message_deleted","payload":{{"message_id":"{id}"}}}}"#
        )),
        1 => (id(), any::<bool>()).prop_map(|(id, on)| format!(
            r#"{{"type":"typing","payload":{{"user_id":"u{id}","is_typing":{on}}}}}"#
        )),
        1 => id().prop_map(|id| format!(
            r#"{{"type":"notification_created","payload":{{"id":"n{id}","title":"x"}}}}"#
        )),
        1 => Just(r#"{"type":"made_up_event","payload":{}}"#.to_string()),
        1 => ".{0,16}",
    ]
}

fn step_strategy() -> impl Strategy<Value = SimStep> {
    prop_oneof![
        2 => (0u8..3, prop::collection::vec(0u8..5, 0..3)).prop_map(|(topic, ids)| {
            let topic_id = format!("t{topic}");
            let page: Vec<Message> = ids.iter().map(|id| Message::text(id.to_string(), &*topic_id, "seed")).collect();
            SimStep::App(AppEvent::TopicSelected { topic_id, page })
        }),
        1 => Just(SimStep::App(AppEvent::TopicClosed)),
        1 => "[a-z]{1,5}".prop_map(|text| SimStep::App(AppEvent::InputChanged { text })),
        1 => Just(SimStep::App(AppEvent::MessageSubmitted)),
        6 => frame_strategy().prop_map(SimStep::ServerFrame),
        1 => Just(SimStep::DropSockets),
        1 => any::<bool>().prop_map(SimStep::ServerUp),
        2 => (0u64..20_000).prop_map(|ms| SimStep::Advance(Duration::from_millis(ms))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_invariants_hold_under_arbitrary_scripts(
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let api = ApiBase::parse("http://devhub.test/api").unwrap();
        let scenario: Scenario = steps.into_iter().collect();
        let driver = SimDriver::new(api, scenario).with_invariants(InvariantRegistry::standard());

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(Runtime::new(driver).run()).unwrap();
    }

    #[test]
    fn prop_reconnect_delays_follow_backoff(drops in 1usize..8) {
        let api = ApiBase::parse("http://devhub.test/api").unwrap();
        let mut scenario = Scenario::new().select_topic("t1", vec![]).server_up(false);
        for _ in 0..drops {
            scenario = scenario.drop_sockets().advance(Duration::from_secs(40));
        }
        let mut runtime = Runtime::new(SimDriver::new(api, scenario));

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            while !runtime.driver().is_idle() {
                if runtime.process_cycle().await.unwrap() {
                    break;
                }
            }
        });

        let delays = runtime.driver().sockets().scheduled_delays();
        prop_assert_eq!(delays.len(), 5);
        for (n, delay) in delays.iter().enumerate() {
            prop_assert_eq!(*delay, Duration::from_millis(1000 << n));
        }
    }
}
