//! Optional artificial delay in front of service calls.

use std::time::Duration;

/// Delay applied before each service operation.
///
/// The delay runs before the store lock is taken, so it only stretches
/// wall-clock time and never the critical section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Latency {
    /// No delay.
    #[default]
    None,
    /// Sleep for a fixed duration.
    Fixed(Duration),
}

impl Latency {
    /// Fixed delay in milliseconds; zero disables it.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        if millis == 0 {
            Self::None
        } else {
            Self::Fixed(Duration::from_millis(millis))
        }
    }

    /// Wait out the configured delay.
    pub async fn simulate(self) {
        if let Self::Fixed(delay) = self {
            tokio::time::sleep(delay).await;
        }
    }
}
