//! Deterministic simulation harness for DevHub realtime testing.
//!
//! Virtual-time implementations of the Environment and Driver traits, so the
//! production [`devhub_app::Runtime`] and [`devhub_client::RealtimeClient`]
//! run against scripted sockets with fully reproducible timing.
//!
//! # Scenarios
//!
//! A [`Scenario`] is a list of [`SimStep`]s: app input, server frames, socket
//! drops, server outages and clock advances. [`SimDriver`] replays it through
//! the runtime and then asks the App to shut down.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! view and transport invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod scenario;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_sockets;

pub use invariants::{
    AtMostOneLiveSocket, ClientSnapshot, ClosedTopicIsEmpty, Invariant, InvariantKind,
    InvariantRegistry, InvariantResult, SystemSnapshot, UniqueMessageIds, UniqueNotificationIds,
    Violation,
};
pub use scenario::{Scenario, SimStep};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_sockets::{SimSockets, SocketRecord};
