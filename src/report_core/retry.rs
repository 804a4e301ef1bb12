use std::time::Duration;
use tokio::time::sleep;

/// Bounded exponential backoff for transient sink failures.
///
/// All retries of one publish must fit inside a single tick, so delays are
/// in milliseconds and the attempt count is small.
#[derive(Debug)]
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    max_retries: u32,
    current_attempt: u32,
}

#[derive(Debug)]
pub struct MaxRetriesExceeded;

impl std::fmt::Display for MaxRetriesExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Maximum retry attempts exceeded")
    }
}

impl std::error::Error for MaxRetriesExceeded {}

impl ExponentialBackoff {
    pub fn new(initial_ms: u64, max_ms: u64, retries: u32) -> Self {
        Self {
            initial_delay_ms: initial_ms,
            max_delay_ms: max_ms,
            max_retries: retries,
            current_attempt: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.current_attempt
    }

    /// Delay before the next attempt, without sleeping
    pub fn next_delay(&self) -> Duration {
        let factor = 2_u64.saturating_pow(self.current_attempt);
        Duration::from_millis(std::cmp::min(
            self.initial_delay_ms.saturating_mul(factor),
            self.max_delay_ms,
        ))
    }

    /// Sleep for `hint` (e.g. a server supplied retry-after) if given,
    /// otherwise for the backoff delay. A hint longer than the maximum delay
    /// gives up immediately instead of retrying before the server allows it.
    pub async fn sleep(&mut self, hint: Option<Duration>) -> Result<(), MaxRetriesExceeded> {
        if self.current_attempt >= self.max_retries {
            return Err(MaxRetriesExceeded);
        }

        let max_delay = Duration::from_millis(self.max_delay_ms);
        let delay = match hint {
            Some(hint) if hint > max_delay => {
                log::warn!(
                    "⏳ Server asked to wait {}ms, more than the {}ms retry budget",
                    hint.as_millis(),
                    self.max_delay_ms
                );
                return Err(MaxRetriesExceeded);
            }
            Some(hint) => hint,
            None => self.next_delay(),
        };

        log::warn!(
            "⏳ Retry attempt {} of {} in {}ms",
            self.current_attempt + 1,
            self.max_retries,
            delay.as_millis()
        );

        sleep(delay).await;
        self.current_attempt += 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }
}
