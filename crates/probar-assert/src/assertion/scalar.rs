//! Scalar scopes returned by read checks
//!
//! A scope records into the same sink as the assertion it came from, so a
//! value read inside a soft session is checked softly too.

use super::Sink;
use crate::description::Description;
use crate::result::{AssertError, AssertResult, Failure, FailureKind};
use regex::Regex;

#[derive(Debug)]
struct Scope<'a> {
    description: Description,
    sink: Sink<'a>,
}

impl Scope<'_> {
    fn ensure(
        &mut self,
        passed: bool,
        kind: FailureKind,
        message: impl FnOnce() -> String,
    ) -> AssertResult<()> {
        let failure = (!passed).then(|| Failure::new(kind, self.description.clone(), message()));
        self.sink.report(failure)
    }
}

/// Checks on a string read from a subject; `None` is a null string
#[derive(Debug)]
pub struct StrAssert<'a> {
    actual: Option<String>,
    scope: Scope<'a>,
}

impl<'a> StrAssert<'a> {
    pub(crate) fn new(actual: Option<String>, description: Description, sink: Sink<'a>) -> Self {
        Self {
            actual,
            scope: Scope { description, sink },
        }
    }

    /// The value under test
    #[must_use]
    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    /// Label of this scope
    #[must_use]
    pub fn description(&self) -> &Description {
        &self.scope.description
    }

    fn check(
        mut self,
        passed: impl FnOnce(&str) -> bool,
        message: impl FnOnce(&str) -> String,
    ) -> AssertResult<Self> {
        match self.actual.as_deref() {
            Some(actual) => {
                let ok = passed(actual);
                let shown = format!("{actual:?}");
                self.scope
                    .ensure(ok, FailureKind::Mismatch, || message(&shown))?;
            }
            None => {
                let expectation = message("null");
                self.scope.ensure(false, FailureKind::Mismatch, || expectation)?;
            }
        }
        Ok(self)
    }

    /// Verify equality
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when the value differs or is null.
    pub fn is_equal_to(self, expected: &str) -> AssertResult<Self> {
        self.check(
            |actual| actual == expected,
            |actual| format!("expected {actual} to equal {expected:?}"),
        )
    }

    /// Verify equality ignoring case
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when the value differs or is null.
    pub fn is_equal_to_ignoring_case(self, expected: &str) -> AssertResult<Self> {
        self.check(
            |actual| actual.to_lowercase() == expected.to_lowercase(),
            |actual| format!("expected {actual} to equal {expected:?} ignoring case"),
        )
    }

    /// Verify the value contains `needle`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it does not, or is null.
    pub fn contains(self, needle: &str) -> AssertResult<Self> {
        self.check(
            |actual| actual.contains(needle),
            |actual| format!("expected {actual} to contain {needle:?}"),
        )
    }

    /// Verify the value does not contain `needle`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it does, or is null.
    pub fn does_not_contain(self, needle: &str) -> AssertResult<Self> {
        self.check(
            |actual| !actual.contains(needle),
            |actual| format!("expected {actual} not to contain {needle:?}"),
        )
    }

    /// Verify the value starts with `prefix`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it does not, or is null.
    pub fn starts_with(self, prefix: &str) -> AssertResult<Self> {
        self.check(
            |actual| actual.starts_with(prefix),
            |actual| format!("expected {actual} to start with {prefix:?}"),
        )
    }

    /// Verify the value ends with `suffix`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it does not, or is null.
    pub fn ends_with(self, suffix: &str) -> AssertResult<Self> {
        self.check(
            |actual| actual.ends_with(suffix),
            |actual| format!("expected {actual} to end with {suffix:?}"),
        )
    }

    /// Verify the value is empty
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it is not empty, or is null.
    pub fn is_empty(self) -> AssertResult<Self> {
        self.check(str::is_empty, |actual| format!("expected {actual} to be empty"))
    }

    /// Verify the value is not empty
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it is empty or null.
    pub fn is_not_empty(self) -> AssertResult<Self> {
        self.check(
            |actual| !actual.is_empty(),
            |actual| format!("expected {actual} not to be empty"),
        )
    }

    /// Verify the value is null
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when a value is present.
    pub fn is_null(mut self) -> AssertResult<Self> {
        let actual = self.actual.clone();
        self.scope.ensure(actual.is_none(), FailureKind::Mismatch, || {
            format!("expected null, but was {:?}", actual.unwrap_or_default())
        })?;
        Ok(self)
    }

    /// Verify a value is present
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when the value is null.
    pub fn is_not_null(mut self) -> AssertResult<Self> {
        let present = self.actual.is_some();
        self.scope.ensure(present, FailureKind::Mismatch, || {
            "expected a value, but was null".to_string()
        })?;
        Ok(self)
    }

    /// Verify the whole value matches a regular expression
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed pattern; fails with `Mismatch`
    /// when the value does not match or is null.
    pub fn matches(self, pattern: &str) -> AssertResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| AssertError::invalid_argument("pattern", e.to_string()))?;
        self.check(
            |actual| regex.is_match(actual),
            |actual| format!("expected {actual} to match /{pattern}/"),
        )
    }
}

/// Checks on a count read from a subject
#[derive(Debug)]
pub struct CountAssert<'a> {
    actual: usize,
    scope: Scope<'a>,
}

impl<'a> CountAssert<'a> {
    pub(crate) fn new(actual: usize, description: Description, sink: Sink<'a>) -> Self {
        Self {
            actual,
            scope: Scope { description, sink },
        }
    }

    /// The count under test
    #[must_use]
    pub const fn actual(&self) -> usize {
        self.actual
    }

    fn check(mut self, passed: bool, expectation: &str) -> AssertResult<Self> {
        let actual = self.actual;
        self.scope.ensure(passed, FailureKind::Mismatch, || {
            format!("expected {expectation}, but was {actual}")
        })?;
        Ok(self)
    }

    /// Verify the count equals `expected`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it differs.
    pub fn is_equal_to(self, expected: usize) -> AssertResult<Self> {
        let passed = self.actual == expected;
        self.check(passed, &expected.to_string())
    }

    /// Verify the count is zero
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it is not.
    pub fn is_zero(self) -> AssertResult<Self> {
        let passed = self.actual == 0;
        self.check(passed, "0")
    }

    /// Verify the count is above zero
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it is zero.
    pub fn is_positive(self) -> AssertResult<Self> {
        let passed = self.actual > 0;
        self.check(passed, "a positive count")
    }

    /// Verify the count is above `bound`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it is not.
    pub fn is_greater_than(self, bound: usize) -> AssertResult<Self> {
        let passed = self.actual > bound;
        self.check(passed, &format!("more than {bound}"))
    }

    /// Verify the count is below `bound`
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it is not.
    pub fn is_less_than(self, bound: usize) -> AssertResult<Self> {
        let passed = self.actual < bound;
        self.check(passed, &format!("less than {bound}"))
    }
}

/// Checks on an ordered list of values read from a subject
#[derive(Debug)]
pub struct ListAssert<'a> {
    actual: Vec<String>,
    scope: Scope<'a>,
}

impl<'a> ListAssert<'a> {
    pub(crate) fn new(actual: Vec<String>, description: Description, sink: Sink<'a>) -> Self {
        Self {
            actual,
            scope: Scope { description, sink },
        }
    }

    /// The values under test
    #[must_use]
    pub fn actual(&self) -> &[String] {
        &self.actual
    }

    fn check(mut self, passed: bool, kind: FailureKind, expectation: String) -> AssertResult<Self> {
        let actual = &self.actual;
        let failure = (!passed).then(|| {
            Failure::new(
                kind,
                self.scope.description.clone(),
                format!("expected {actual:?} {expectation}"),
            )
        });
        self.scope.sink.report(failure)?;
        Ok(self)
    }

    /// Verify the number of values
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when it differs.
    pub fn has_size(self, expected: usize) -> AssertResult<Self> {
        let passed = self.actual.len() == expected;
        self.check(passed, FailureKind::Mismatch, format!("to have {expected} value(s)"))
    }

    /// Verify there are no values
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when there are.
    pub fn is_empty(self) -> AssertResult<Self> {
        let passed = self.actual.is_empty();
        self.check(passed, FailureKind::Mismatch, "to be empty".to_string())
    }

    /// Verify `value` is among the values
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when it is not.
    pub fn contains(self, value: &str) -> AssertResult<Self> {
        let passed = self.actual.iter().any(|v| v == value);
        self.check(passed, FailureKind::NotFound, format!("to contain {value:?}"))
    }

    /// Verify `value` is not among the values
    ///
    /// # Errors
    ///
    /// Fails with `Found` when it is.
    pub fn does_not_contain(self, value: &str) -> AssertResult<Self> {
        let passed = self.actual.iter().all(|v| v != value);
        self.check(passed, FailureKind::Found, format!("not to contain {value:?}"))
    }

    /// Verify the values equal `expected`, in order
    ///
    /// # Errors
    ///
    /// Fails with `Mismatch` when they differ.
    pub fn contains_exactly(self, expected: &[&str]) -> AssertResult<Self> {
        let passed = self.actual.len() == expected.len()
            && self.actual.iter().zip(expected).all(|(a, e)| a == e);
        self.check(passed, FailureKind::Mismatch, format!("to be exactly {expected:?}"))
    }

    /// Verify every value of `expected` is present, in any order
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` listing the missing values.
    pub fn contains_all(self, expected: &[&str]) -> AssertResult<Self> {
        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|e| !self.actual.iter().any(|a| a == e))
            .collect();
        let passed = missing.is_empty();
        self.check(
            passed,
            FailureKind::NotFound,
            format!("to contain all of {expected:?}, missing {missing:?}"),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assertion::SoftAssertions;

    fn hard_str(actual: Option<&str>) -> StrAssert<'static> {
        StrAssert::new(actual.map(str::to_string), Description::new("field value"), Sink::Hard)
    }

    mod strings {
        use super::*;

        #[test]
        fn test_chain_passes() {
            assert!(hard_str(Some("Hello, World"))
                .is_not_null()
                .unwrap()
                .starts_with("Hello")
                .unwrap()
                .contains(", ")
                .unwrap()
                .ends_with("World")
                .unwrap()
                .does_not_contain("moon")
                .is_ok());
        }

        #[test]
        fn test_failure_message() {
            let err = hard_str(Some("Ann")).is_equal_to("Bob").unwrap_err();
            assert_eq!(
                err.to_string(),
                "[field value] expected \"Ann\" to equal \"Bob\""
            );
        }

        #[test]
        fn test_ignoring_case() {
            assert!(hard_str(Some("ALICE")).is_equal_to_ignoring_case("alice").is_ok());
        }

        #[test]
        fn test_null_handling() {
            assert!(hard_str(None).is_null().is_ok());
            assert!(hard_str(None).is_empty().is_err());
            assert!(hard_str(None).contains("x").is_err());
            assert!(hard_str(Some("")).is_null().is_err());
            assert!(hard_str(Some("")).is_empty().is_ok());
        }

        #[test]
        fn test_matches_whole_value() {
            assert!(hard_str(Some("2024-01-31")).matches(r"\d{4}-\d{2}-\d{2}").is_ok());
            assert!(hard_str(Some("on 2024-01-31")).matches(r"\d{4}-\d{2}-\d{2}").is_err());
        }

        #[test]
        fn test_malformed_pattern_is_invalid() {
            let err = hard_str(Some("x")).matches("(").unwrap_err();
            assert!(matches!(err, AssertError::InvalidArgument { .. }));
        }

        #[test]
        fn test_soft_scope_keeps_chaining() {
            let mut soft = SoftAssertions::new();
            let scope = StrAssert::new(
                Some("Ann".to_string()),
                Description::new("name"),
                Sink::Soft(&mut soft),
            );
            let _ = scope.is_equal_to("Bob").unwrap().is_empty().unwrap();
            assert_eq!(soft.failure_count(), 2);
        }
    }

    mod counts {
        use super::*;

        fn count(actual: usize) -> CountAssert<'static> {
            CountAssert::new(actual, Description::new("rows"), Sink::Hard)
        }

        #[test]
        fn test_comparisons() {
            assert!(count(3)
                .is_equal_to(3)
                .unwrap()
                .is_positive()
                .unwrap()
                .is_greater_than(2)
                .unwrap()
                .is_less_than(4)
                .is_ok());
            assert!(count(0).is_zero().is_ok());
        }

        #[test]
        fn test_failure_message() {
            let err = count(2).is_equal_to(5).unwrap_err();
            assert_eq!(err.to_string(), "[rows] expected 5, but was 2");
        }
    }

    mod lists {
        use super::*;

        fn list(values: &[&str]) -> ListAssert<'static> {
            ListAssert::new(
                values.iter().map(ToString::to_string).collect(),
                Description::new("names"),
                Sink::Hard,
            )
        }

        #[test]
        fn test_membership() {
            assert!(list(&["Ann", "Bob"])
                .has_size(2)
                .unwrap()
                .contains("Bob")
                .unwrap()
                .does_not_contain("Cid")
                .unwrap()
                .contains_all(&["Bob", "Ann"])
                .unwrap()
                .contains_exactly(&["Ann", "Bob"])
                .is_ok());
        }

        #[test]
        fn test_order_matters_for_exactly() {
            assert!(list(&["Ann", "Bob"]).contains_exactly(&["Bob", "Ann"]).is_err());
        }

        #[test]
        fn test_missing_values_are_listed() {
            let err = list(&["Ann"]).contains_all(&["Ann", "Bob"]).unwrap_err();
            assert_eq!(err.failures()[0].kind, FailureKind::NotFound);
            assert!(err.to_string().contains("missing [\"Bob\"]"));
        }

        #[test]
        fn test_empty() {
            assert!(list(&[]).is_empty().is_ok());
            assert!(list(&["x"]).is_empty().is_err());
        }
    }
}
