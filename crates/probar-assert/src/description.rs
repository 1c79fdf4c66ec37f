//! Human-readable labels for subjects under assertion.

use crate::model::Named;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label identifying a subject in failure messages.
///
/// Built once and never mutated afterwards. It takes no part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Description(String);

impl Description {
    /// Create a description from caller-supplied text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Describe a subject by its loggable name and, when it has one, its
    /// locator path: `"Submit button => //form//button"`.
    #[must_use]
    pub fn of<S: Named + ?Sized>(subject: &S) -> Self {
        let name = subject.loggable_name();
        match subject.locator_path() {
            Some(path) if !path.trim().is_empty() => Self(format!("{name} => {path}")),
            _ => Self(name),
        }
    }

    /// Derive a description for a value read from this subject
    #[must_use]
    pub fn scoped(&self, suffix: &str) -> Self {
        Self(format!("{} {suffix}", self.0))
    }

    /// The label text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Self(text)
    }
}
