//! Scripted simulation steps.

use std::{collections::VecDeque, time::Duration};

use devhub_app::AppEvent;
use devhub_proto::entities::Message;

/// One step of a simulation script.
#[derive(Debug, Clone, PartialEq)]
pub enum SimStep {
    /// Feed an event to the App.
    App(AppEvent),
    /// Server writes a text frame to the live socket.
    ServerFrame(String),
    /// Server closes every live socket.
    DropSockets,
    /// Server becomes unreachable (`false`) or reachable again (`true`).
    ServerUp(bool),
    /// Move the virtual clock, firing due timers and a tick.
    Advance(Duration),
}

/// Builder for a simulation script.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    steps: VecDeque<SimStep>,
}

impl Scenario {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw step.
    #[must_use]
    pub fn step(mut self, step: SimStep) -> Self {
        self.steps.push_back(step);
        self
    }

    /// Open `topic_id` with a newest-first page.
    #[must_use]
    pub fn select_topic(self, topic_id: &str, page: Vec<Message>) -> Self {
        self.step(SimStep::App(AppEvent::TopicSelected { topic_id: topic_id.to_string(), page }))
    }

    /// Close the open topic.
    #[must_use]
    pub fn close_topic(self) -> Self {
        self.step(SimStep::App(AppEvent::TopicClosed))
    }

    /// Type into the draft.
    #[must_use]
    pub fn type_text(self, text: &str) -> Self {
        self.step(SimStep::App(AppEvent::InputChanged { text: text.to_string() }))
    }

    /// Submit the draft.
    #[must_use]
    pub fn submit(self) -> Self {
        self.step(SimStep::App(AppEvent::MessageSubmitted))
    }

    /// Server sends `text` on the live socket.
    #[must_use]
    pub fn server_frame(self, text: &str) -> Self {
        self.step(SimStep::ServerFrame(text.to_string()))
    }

    /// Server drops the connection.
    #[must_use]
    pub fn drop_sockets(self) -> Self {
        self.step(SimStep::DropSockets)
    }

    /// Take the server down or bring it back.
    #[must_use]
    pub fn server_up(self, up: bool) -> Self {
        self.step(SimStep::ServerUp(up))
    }

    /// Advance virtual time.
    #[must_use]
    pub fn advance(self, duration: Duration) -> Self {
        self.step(SimStep::Advance(duration))
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn into_steps(self) -> VecDeque<SimStep> {
        self.steps
    }
}

impl FromIterator<SimStep> for Scenario {
    fn from_iter<T: IntoIterator<Item = SimStep>>(iter: T) -> Self {
        Self { steps: iter.into_iter().collect() }
    }
}
