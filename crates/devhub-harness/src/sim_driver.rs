//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the tail CLI's driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`devhub_app::Runtime`] orchestration code runs in both production and
//! simulation: a real [`RealtimeClient`] and [`HandlerBridge`], with the
//! sockets replaced by [`SimSockets`] and wall-clock time by [`SimEnv`].

use std::{collections::VecDeque, time::Duration};

use devhub_app::{App, AppEvent, Driver, HandlerBridge};
use devhub_client::{
    ApiBase, ClientError, ConnectionConfig, Environment, RealtimeClient, TransportAction,
    TransportEvent,
};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
    scenario::{Scenario, SimStep},
    sim_env::{SimEnv, SimInstant},
    sim_sockets::SimSockets,
};

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
pub enum SimDriverError {
    /// Realtime client rejected the operation.
    #[error("client: {0}")]
    Client(#[from] ClientError),
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    env: SimEnv,
    client: RealtimeClient<SimInstant>,
    sockets: SimSockets,
    token: String,
    bridge: HandlerBridge,
    events: mpsc::UnboundedReceiver<AppEvent>,
    steps: VecDeque<SimStep>,
    renders: usize,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Driver replaying `scenario` against the API at `api`.
    pub fn new(api: ApiBase, scenario: Scenario) -> Self {
        Self::with_config(api, scenario, ConnectionConfig::default())
    }

    /// Driver with a custom connection config.
    pub fn with_config(api: ApiBase, scenario: Scenario, config: ConnectionConfig) -> Self {
        let (bridge, events) = HandlerBridge::channel();
        Self {
            env: SimEnv::new(),
            client: RealtimeClient::new(api, config),
            sockets: SimSockets::new(),
            token: "sim-token".to_string(),
            bridge,
            events,
            steps: scenario.into_steps(),
            renders: 0,
            invariants: None,
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Append more steps to the script.
    pub fn push(&mut self, step: SimStep) {
        self.steps.push_back(step);
    }

    /// Virtual clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Realtime client, for inspection.
    pub fn client(&self) -> &RealtimeClient<SimInstant> {
        &self.client
    }

    /// Simulated sockets, for inspection.
    pub fn sockets(&self) -> &SimSockets {
        &self.sockets
    }

    /// Whether the script is done and every callback has been consumed.
    pub fn is_idle(&self) -> bool {
        self.steps.is_empty() && self.events.is_empty()
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Capture observable state for invariant checking.
    pub fn snapshot(&self, app: &App<SimInstant>) -> SystemSnapshot {
        SystemSnapshot::single(ClientSnapshot::from_app(0, app, self.sockets.live_count()))
    }

    /// Feed a transport report to the client and execute the fallout until
    /// the sockets go quiet.
    fn feed(&mut self, first: TransportEvent) {
        let mut queue = VecDeque::from([first]);
        while let Some(event) = queue.pop_front() {
            let now = self.env.now();
            let actions = self.client.handle(event, now);
            queue.extend(self.sockets.execute(actions, now));
        }
    }

    fn execute(&mut self, actions: Vec<TransportAction>) {
        let now = self.env.now();
        for report in self.sockets.execute(actions, now) {
            self.feed(report);
        }
    }

    /// Move the clock in timer-sized hops so each reconnect fires at its due
    /// time rather than all at the end.
    fn advance(&mut self, duration: Duration) {
        let end = self.env.now() + duration;
        loop {
            let now = self.env.now();
            let hop_to = match self.sockets.next_timer() {
                Some(due) if due <= end => due,
                _ => end,
            };
            self.env.advance(hop_to - now);

            let now = self.env.now();
            for due in self.sockets.fire_due(now) {
                self.feed(due);
            }
            self.feed(TransportEvent::Tick);

            if now >= end {
                break;
            }
        }
    }

    /// Run one script step. Returns an App event if the step is one.
    fn run_step(&mut self, step: SimStep) -> Option<AppEvent> {
        match step {
            SimStep::App(event) => return Some(event),
            SimStep::ServerFrame(text) => {
                let live: Vec<_> = self.sockets.live().collect();
                for socket in live {
                    self.feed(TransportEvent::Text { socket, text: text.clone() });
                }
            },
            SimStep::DropSockets => {
                for report in self.sockets.drop_all() {
                    self.feed(report);
                }
            },
            SimStep::ServerUp(up) => self.sockets.set_server_up(up),
            SimStep::Advance(duration) => {
                self.advance(duration);
                return Some(AppEvent::Tick);
            },
        }
        None
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    /// Realtime callbacks first, then the next script step; once both are
    /// exhausted the App is told to shut down.
    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Ok(event) = self.events.try_recv() {
            return Ok(Some(event));
        }

        match self.steps.pop_front() {
            Some(step) => Ok(self.run_step(step)),
            None => Ok(Some(AppEvent::Shutdown)),
        }
    }

    async fn connect(&mut self, topic_id: &str) -> Result<(), Self::Error> {
        let actions = self.client.connect(topic_id, &self.token, Box::new(self.bridge.clone()));
        self.execute(actions);
        Ok(())
    }

    fn disconnect(&mut self) {
        let actions = self.client.disconnect();
        self.execute(actions);
    }

    async fn send_typing(&mut self, is_typing: bool) -> Result<(), Self::Error> {
        let actions = self.client.send_typing(is_typing)?;
        self.execute(actions);
        Ok(())
    }

    fn now(&self) -> SimInstant {
        self.env.now()
    }

    fn render(&mut self, app: &App<SimInstant>) -> Result<(), Self::Error> {
        self.renders += 1;
        if let Some(registry) = &self.invariants {
            registry.assert_all(&self.snapshot(app), &format!("after render {}", self.renders));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use devhub_app::Runtime;

    use super::*;

    fn api() -> ApiBase {
        ApiBase::parse("http://devhub.test/api").unwrap()
    }

    #[tokio::test]
    async fn empty_script_shuts_down() {
        let runtime = Runtime::new(SimDriver::new(api(), Scenario::new()));
        runtime.run().await.unwrap();
    }

    #[tokio::test]
    async fn selecting_topic_opens_one_socket() {
        let scenario = Scenario::new().select_topic("t1", vec![]);
        let mut runtime = Runtime::new(SimDriver::new(api(), scenario));

        while !runtime.process_cycle().await.unwrap() {
            if runtime.app().status().is_online() {
                break;
            }
        }

        let opened = runtime.driver().sockets().opened();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].url, "ws://devhub.test/api/topics/t1/ws?token=sim-token");
        assert_eq!(runtime.driver().sockets().live_count(), 1);
    }
}
