//! Environment abstraction for deterministic testing.
//!
//! Decouples connection logic from wall-clock time. Production drivers use
//! `std::time::Instant` and tokio sleeps; the simulation harness uses a virtual
//! clock that only moves when a test advances it.

use std::time::Duration;

/// Abstract environment providing time and async sleeping.
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this. State machines never sleep; they return
    /// a scheduling action instead.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
