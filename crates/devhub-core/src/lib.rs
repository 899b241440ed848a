//! Core
//!
//! Sans-IO building blocks of the DevHub client: the realtime connection state
//! machine, id-keyed cache containers, durable key-value storage and the two
//! persisted sessions (auth and theme).
//!
//! # Architecture
//!
//! Everything here is synchronous and single-writer. Time is passed in as a
//! method argument and side effects come back as action values
//! ([`connection::ConnectionAction`]) for a driver to execute. The same code
//! runs under the tokio transport and under the deterministic simulation
//! harness.
//!
//! # Components
//!
//! - [`connection::Connection`]: socket lifecycle, event decoding, backoff
//! - [`endpoint::ApiBase`]: API base resolution and socket URL building
//! - [`cache::Cache`]: ordered id → entity container with shallow-merge
//!   updates
//! - [`store`]: domain stores built on [`cache::Cache`]
//! - [`storage`]: key-value persistence with an in-memory fallback
//! - [`session`]: auth token and theme preference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cache;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod env;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;

pub use cache::{Cache, Entity};
pub use config::{ConnectionConfig, ReconnectConfig};
pub use connection::{Connection, ConnectionAction, ConnectionState, SocketId};
pub use endpoint::ApiBase;
pub use env::Environment;
pub use error::ConnectionError;
