//! Polling Evaluator
//!
//! Re-runs a check body until it passes or a deadline elapses, for UI
//! state that settles asynchronously.
//!
//! ## Toyota Way Application:
//! - **Heijunka**: Fixed polling interval for predictable test timing
//! - **Jidoka**: Only the final attempt's failure reaches the caller
//!
//! This is a busy-poll: the model is not assumed to publish change
//! notifications. The calling thread blocks for up to the timeout and
//! there is no cancellation other than the deadline.

use crate::config::{seconds, AssertConfig};
use crate::result::AssertResult;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Outcome of a successful polling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of evaluations, including the successful one
    pub attempts: usize,
    /// Time from the first attempt until success
    pub duration: Duration,
}

/// Deadline-bounded re-evaluation of a check body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::from_config(&AssertConfig::default())
    }
}

impl Poller {
    /// Create a poller with an explicit timeout and interval
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Wait timeout and interval from a config
    #[must_use]
    pub const fn from_config(config: &AssertConfig) -> Self {
        Self::new(config.wait_timeout, config.poll_interval)
    }

    /// Replace the timeout, keeping the interval
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The deadline measured from the first attempt
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Re-run `block` until it returns `Ok` or the timeout elapses.
    ///
    /// A zero timeout runs `block` exactly once. Errors that are not
    /// assertion failures (missing subject, bad argument) end polling
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt when the deadline passes.
    pub fn await_until<F>(&self, mut block: F) -> AssertResult<PollReport>
    where
        F: FnMut() -> AssertResult<()>,
    {
        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            trace!(attempt = attempts, "poll attempt");

            let error = match block() {
                Ok(()) => {
                    let report = PollReport {
                        attempts,
                        duration: start.elapsed(),
                    };
                    debug!(
                        attempts,
                        elapsed_ms = report.duration.as_millis() as u64,
                        "poll passed"
                    );
                    return Ok(report);
                }
                Err(error) if !error.is_assertion() => return Err(error),
                Err(error) => error,
            };

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                debug!(attempts, elapsed_ms = elapsed.as_millis() as u64, "poll gave up");
                return Err(error);
            }

            std::thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }

    /// Poll a boolean query until it returns `true` or the timeout
    /// elapses, and return the value read by the final attempt.
    pub fn until_true<F>(&self, mut query: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let start = Instant::now();
        loop {
            if query() {
                return true;
            }
            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return false;
            }
            std::thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }
}

/// Re-run `block` every default interval until it passes or
/// `timeout_secs` whole seconds elapse.
///
/// # Errors
///
/// Returns the error of the final attempt when the deadline passes.
pub fn await_until<F>(timeout_secs: u64, block: F) -> AssertResult<()>
where
    F: FnMut() -> AssertResult<()>,
{
    Poller::default()
        .with_timeout(seconds(timeout_secs))
        .await_until(block)
        .map(|_| ())
}
