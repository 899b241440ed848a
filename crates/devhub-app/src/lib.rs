//! Application layer for DevHub
//!
//! Pure state machines and a generic runtime that bind realtime events to the
//! client-side caches a page renders from. The same code runs under the tokio
//! transport and in deterministic simulation.
//!
//! # Components
//!
//! - [`App`]: view state machine (topic lifecycle, event routing, typing)
//! - [`ChatView`]: messages and typing indicators of the open topic
//! - [`NotificationFeed`]: notifications of the signed-in user
//! - [`HandlerBridge`]: forwards client callbacks as [`AppEvent`]s
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic orchestration loop over a [`Driver`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod chat;
mod driver;
mod event;
mod notifications;
mod runtime;
mod state;
mod typing;

pub use action::AppAction;
pub use app::App;
pub use bridge::HandlerBridge;
pub use chat::ChatView;
pub use driver::Driver;
pub use event::AppEvent;
pub use notifications::NotificationFeed;
pub use runtime::Runtime;
pub use state::ConnectionStatus;
pub use typing::{
    TYPING_IDLE_TIMEOUT, TYPING_INDICATOR_TTL, Typist, TypingIndicators, TypingNotifier,
};
