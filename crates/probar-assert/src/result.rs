//! Result and error types for probar-assert.

use crate::description::Description;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for assertion operations
pub type AssertResult<T> = Result<T, AssertError>;

/// Errors raised by assertion checks
#[derive(Debug, Clone, Error)]
pub enum AssertError {
    /// The subject under assertion was missing
    #[error("Subject is missing: {what}")]
    NullSubject {
        /// What was expected to be there
        what: String,
    },

    /// A required parameter was blank or inconsistent
    #[error("Invalid argument `{name}`: {message}")]
    InvalidArgument {
        /// Parameter name
        name: String,
        /// Error message
        message: String,
    },

    /// A single check failed
    #[error("{0}")]
    Failed(Failure),

    /// One or more checks failed inside a soft session
    #[error("{0}")]
    Aggregated(AggregatedFailure),
}

impl AssertError {
    pub(crate) fn null_subject(what: impl Into<String>) -> Self {
        Self::NullSubject { what: what.into() }
    }

    pub(crate) fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from a false condition rather than from
    /// bad input. Only these are retried by the poller and deferred by
    /// soft sessions.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Aggregated(_))
    }

    /// All individual failures carried by this error
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::Failed(failure) => std::slice::from_ref(failure),
            Self::Aggregated(aggregated) => &aggregated.failures,
            Self::NullSubject { .. } | Self::InvalidArgument { .. } => &[],
        }
    }
}

/// Reject blank required string parameters
pub(crate) fn require_not_blank(name: &str, value: &str) -> AssertResult<()> {
    if value.trim().is_empty() {
        Err(AssertError::invalid_argument(
            name,
            "cannot be empty or blank",
        ))
    } else {
        Ok(())
    }
}

/// Category of a failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Expected displayed, was not
    NotDisplayed,
    /// Expected hidden, was displayed
    Displayed,
    /// Expected enabled, was not
    NotEnabled,
    /// Expected disabled, was enabled
    Enabled,
    /// Expected selected, was not
    NotSelected,
    /// Expected unselected, was selected
    Selected,
    /// Class attribute lacks the expected class
    MissingClass,
    /// Class attribute has a forbidden class
    UnexpectedClass,
    /// No member matched the criterion
    NotFound,
    /// A member matched a criterion that must not match
    Found,
    /// A read value did not satisfy the expectation
    Mismatch,
}

/// A single failed check, labelled with the subject it was made on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Category of the failure
    pub kind: FailureKind,
    /// Description of the subject
    pub description: Description,
    /// Message describing what went wrong
    pub message: String,
}

impl Failure {
    /// Create a new failure
    #[must_use]
    pub fn new(kind: FailureKind, description: Description, message: impl Into<String>) -> Self {
        Self {
            kind,
            description,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.description, self.message)
    }
}

impl std::error::Error for Failure {}

/// All failures recorded by one soft session, reported together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedFailure {
    /// Failures in recording order
    pub failures: Vec<Failure>,
}

impl AggregatedFailure {
    /// Number of collected failures
    #[must_use]
    pub fn count(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for AggregatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} assertion(s) failed:", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {failure}", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedFailure {}
