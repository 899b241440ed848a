//! Client
//!
//! Realtime client for one DevHub chat topic at a time. Wraps the Sans-IO
//! [`devhub_core::Connection`] with handler dispatch: decoded events, connect
//! and disconnect notifications reach an [`EventHandler`], while socket and
//! timer work comes back as [`TransportAction`]s for the caller to execute.
//!
//! # Components
//!
//! - [`RealtimeClient`]: handler dispatch over the connection state machine
//! - [`EventHandler`]: callbacks, every method optional
//! - [`TransportEvent`] / [`TransportAction`]: the driver boundary
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::WebSocketClient`]: tokio actor running a [`RealtimeClient`]
//!   over `tokio-tungstenite`
//! - [`transport::SystemEnv`]: wall-clock [`Environment`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod handler;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::RealtimeClient;
pub use devhub_core::{
    ApiBase, ConnectionConfig, ConnectionState, ReconnectConfig, SocketId, env::Environment,
};
pub use error::ClientError;
pub use event::{TransportAction, TransportEvent};
pub use handler::{EventHandler, NoopHandler, dispatch};
