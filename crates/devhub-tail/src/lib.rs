//! Topic tail for DevHub
//!
//! A thin shell over [`devhub_app::Driver`] that subscribes to one chat topic
//! over the tokio WebSocket transport and logs every change to the local
//! message cache. All orchestration logic lives in the generic
//! [`devhub_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod driver;
pub mod transcript;

pub use devhub_app::{App, AppEvent, Driver, Runtime};
pub use driver::{RuntimeError, TailDriver, stored_token};
pub use transcript::{Change, Transcript};
