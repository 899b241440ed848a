//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the view.
    Render,

    /// Stop the runtime.
    Quit,

    /// Subscribe to a topic's realtime stream, replacing any current one.
    Connect {
        /// Topic to subscribe to.
        topic_id: String,
    },

    /// Drop the realtime subscription.
    Disconnect,

    /// Tell the topic whether the user is typing.
    SendTyping {
        /// Started (`true`) or stopped (`false`).
        is_typing: bool,
    },
}
