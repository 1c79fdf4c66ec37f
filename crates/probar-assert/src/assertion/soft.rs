//! Soft Assertions
//!
//! Collect failures from many checks and report them together.
//!
//! ## Toyota Way Application:
//! - **Jidoka**: Collect all failures for comprehensive error reporting
//! - **Poka-Yoke**: `verify` drains the session, so the same failures are
//!   never reported twice

use crate::assertion::Assert;
use crate::config::AssertConfig;
use crate::description::Description;
use crate::model::Named;
use crate::result::{AggregatedFailure, AssertError, AssertResult, Failure, FailureKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Mode for soft assertions behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssertionMode {
    /// Collect all failures (default)
    #[default]
    Collect,
    /// Stop on first failure (like hard assertions)
    FailFast,
}

/// Soft assertions session
///
/// Assertions created through [`SoftAssertions::assert_that`] record
/// their failures here instead of returning them. [`SoftAssertions::verify`]
/// then reports everything recorded so far as one error.
///
/// ## Example
///
/// ```ignore
/// let mut soft = SoftAssertions::new();
/// soft.assert_that(&title).is_displayed()?;
/// soft.assert_that(&submit).is_enabled()?;
/// // Both failures are collected
/// soft.verify()?;
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<Failure>,
    mode: AssertionMode,
    assertion_count: usize,
    failed_count: usize,
    config: AssertConfig,
}

impl SoftAssertions {
    /// Create a new soft assertions session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a specific mode
    #[must_use]
    pub fn with_mode(mode: AssertionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the assertion mode
    #[must_use]
    pub const fn mode(mut self, mode: AssertionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the config handed to every assertion of this session
    #[must_use]
    pub const fn with_config(mut self, config: AssertConfig) -> Self {
        self.config = config;
        self
    }

    /// Config handed to assertions of this session
    #[must_use]
    pub const fn config(&self) -> AssertConfig {
        self.config
    }

    /// Start a soft assertion on `subject`
    pub fn assert_that<'a, S: Named + ?Sized>(&'a mut self, subject: &'a S) -> Assert<'a, S> {
        Assert::soft(Some(subject), self)
    }

    /// Start a soft assertion on a subject that may be missing. Checks on a
    /// missing subject return `NullSubject` immediately.
    pub fn assert_that_optional<'a, S: Named + ?Sized>(
        &'a mut self,
        subject: Option<&'a S>,
    ) -> Assert<'a, S> {
        Assert::soft(subject, self)
    }

    /// Count one check and record its failure, if any.
    ///
    /// # Errors
    ///
    /// In [`AssertionMode::FailFast`] the failure is returned instead of
    /// recorded.
    pub(crate) fn check(&mut self, failure: Option<Failure>) -> AssertResult<()> {
        self.assertion_count += 1;
        match failure {
            None => Ok(()),
            Some(failure) if self.mode == AssertionMode::FailFast => {
                self.failed_count += 1;
                Err(AssertError::Failed(failure))
            }
            Some(failure) => {
                self.record(failure);
                Ok(())
            }
        }
    }

    /// Count a check whose outcome is already an error, such as a nested
    /// batch or a poll. Each assertion failure in it counts as one failed
    /// check and is recorded; any other error is returned.
    ///
    /// # Errors
    ///
    /// Returns errors that are not assertion failures, and every failure
    /// in [`AssertionMode::FailFast`].
    pub(crate) fn absorb(&mut self, outcome: AssertResult<()>) -> AssertResult<()> {
        match outcome {
            Ok(()) => self.check(None),
            Err(error) if !error.is_assertion() => Err(error),
            Err(error) if self.mode == AssertionMode::FailFast => {
                let failed = error.failures().len().max(1);
                self.assertion_count += failed;
                self.failed_count += failed;
                Err(error)
            }
            Err(error) => {
                self.assertion_count += error.failures().len().max(1);
                for failure in error.failures() {
                    self.record(failure.clone());
                }
                Ok(())
            }
        }
    }

    /// Record a custom failure
    pub fn fail(&mut self, description: impl Into<Description>, message: impl Into<String>) {
        self.assertion_count += 1;
        self.record(Failure::new(
            FailureKind::Mismatch,
            description.into(),
            message,
        ));
    }

    fn record(&mut self, failure: Failure) {
        self.failed_count += 1;
        trace!(
            index = self.failures.len(),
            kind = ?failure.kind,
            description = %failure.description,
            "soft failure recorded"
        );
        self.failures.push(failure);
    }

    /// Get all failures recorded since the last flush
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get the total number of checks evaluated
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Report every recorded failure as one error and empty the session.
    /// A second call without new failures is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AssertError::Aggregated`] listing all failures in
    /// recording order if any were recorded.
    pub fn verify(&mut self) -> AssertResult<()> {
        let failures = std::mem::take(&mut self.failures);
        debug!(
            checks = self.assertion_count,
            failed = failures.len(),
            "soft session flushed"
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AssertError::Aggregated(AggregatedFailure { failures }))
        }
    }

    /// Clear all recorded failures and counters
    pub fn clear(&mut self) {
        self.failures.clear();
        self.assertion_count = 0;
        self.failed_count = 0;
    }

    /// Get a summary of every check since creation or the last
    /// [`SoftAssertions::clear`]. Flushing with `verify` keeps the counts.
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count.saturating_sub(self.failed_count),
            failed: self.failed_count,
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total checks evaluated
    pub total: usize,
    /// Checks that passed
    pub passed: usize,
    /// Checks that failed
    pub failed: usize,
}
