use std::time::Duration;

use vision_core::AppendPolicy;

/// Configuration for one exchange with the vision model.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Minimum buffered characters before a display increment is emitted.
    pub flush_threshold: usize,
    /// Pause after each increment so the display reads like typing. Zero disables it.
    pub pacing: Duration,
    /// Behaviour of the conversation store when a turn arrives with nothing active.
    pub append_policy: AppendPolicy,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            flush_threshold: 3,
            pacing: Duration::from_millis(20),
            append_policy: AppendPolicy::Ignore,
        }
    }
}

impl ExchangeConfig {
    /// No pacing delay, for tests and non-interactive output.
    pub fn unpaced() -> Self {
        Self {
            pacing: Duration::ZERO,
            ..Self::default()
        }
    }
}
