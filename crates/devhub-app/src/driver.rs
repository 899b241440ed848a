//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic, so the same
/// orchestration code runs against a real socket and in simulation.
///
/// # Implementations
///
/// - **Tail CLI**: tokio WebSocket transport, log output
/// - **Simulation**: scripted sockets under a virtual clock
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next input event.
    ///
    /// Realtime callbacks, user input and ticks all arrive here. Returns
    /// `None` if nothing is ready yet.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Subscribe to `topic_id`, replacing any current subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be started.
    fn connect(&mut self, topic_id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Drop the subscription. Idempotent.
    fn disconnect(&mut self);

    /// Tell the topic whether the user is typing.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is not open.
    fn send_typing(&mut self, is_typing: bool) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App<Self::Instant>) -> Result<(), Self::Error>;

    /// Release resources before the runtime returns.
    fn stop(&mut self);
}
