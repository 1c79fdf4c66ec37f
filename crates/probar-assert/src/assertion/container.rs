//! Batch checks on containers of named children
//!
//! Every batch runs its per-child checks in a private soft session and
//! reports them as one outcome: an aggregated error for a hard assertion,
//! or one recorded failure per child for a soft one.

use super::{Assert, Poller, SoftAssertions};
use crate::config::{seconds, AssertConfig};
use crate::description::Description;
use crate::matcher::FieldCriteria;
use crate::model::{
    required_leaves, sanitize_key, Child, Container, Displayable, Element, Subject,
};
use crate::result::{require_not_blank, AssertError, AssertResult, Failure, FailureKind};
use std::collections::BTreeSet;
use tracing::debug;

/// Check that every non-optional subject is displayed.
///
/// With `should_wait`, each subject in turn is polled until it appears.
/// Once one fails to appear the rest are read without waiting, so a page
/// that never rendered costs one timeout, not one per child.
pub(crate) fn check_all_displayed<'s>(
    subjects: impl IntoIterator<Item = Subject<'s>>,
    config: &AssertConfig,
    should_wait: bool,
) -> AssertResult<()> {
    let poller = Poller::from_config(config);
    let mut waiting = should_wait;
    let mut batch = SoftAssertions::new().with_config(*config);
    for subject in subjects.into_iter().filter(|s| !s.is_optional()) {
        let displayed = if waiting {
            poller.until_true(|| subject.is_displayed())
        } else {
            subject.is_displayed()
        };
        waiting &= displayed;
        batch.check((!displayed).then(|| {
            Failure::new(
                FailureKind::NotDisplayed,
                Description::of(&subject),
                "expected to be displayed, but was not",
            )
        }))?;
    }
    batch.verify()
}

/// Children of a container that derives its visibility from them
pub(crate) fn check_children_displayed(
    parts: &[Child<'_>],
    config: &AssertConfig,
    should_wait: bool,
) -> AssertResult<()> {
    check_all_displayed(parts.iter().map(|child| child.subject), config, should_wait)
}

fn child_element<'c, C: Container + ?Sized>(
    container: &'c C,
    id: &str,
) -> AssertResult<&'c dyn Element> {
    let child = container.child(id).ok_or_else(|| {
        AssertError::null_subject(format!(
            "child '{id}' of {}",
            Description::of(container)
        ))
    })?;
    child.as_element().ok_or_else(|| {
        AssertError::invalid_argument(
            "id",
            format!("'{id}' is a {}, not an element", child.shape()),
        )
    })
}

fn check_values<C: Container + ?Sized>(
    container: &C,
    expected: &FieldCriteria,
) -> AssertResult<()> {
    let mut batch = SoftAssertions::new();
    for (id, value) in expected.iter() {
        let element = child_element(container, id)?;
        let _ = batch.assert_that(element).value()?.is_equal_to(value)?;
    }
    batch.verify()
}

impl<'a, S: Container + ?Sized> Assert<'a, S> {
    /// Verify every non-optional child is displayed, reading each once
    ///
    /// # Errors
    ///
    /// One `NotDisplayed` failure per hidden child.
    pub fn all_elements_are_displayed(self) -> AssertResult<Self> {
        self.all_elements_are_displayed_waiting(false)
    }

    /// Verify every non-optional child is displayed, waiting for each in
    /// turn when `should_wait` is set
    ///
    /// # Errors
    ///
    /// One `NotDisplayed` failure per hidden child.
    pub fn all_elements_are_displayed_waiting(self, should_wait: bool) -> AssertResult<Self> {
        let subject = self.begin()?;
        let children = subject.children();
        debug!(
            container = %self.label(),
            children = children.len(),
            should_wait,
            "checking all elements are displayed"
        );
        let outcome = check_children_displayed(&children, &self.config, should_wait);
        self.absorb(outcome)
    }

    /// Verify every non-optional leaf element of the nested container tree
    /// is displayed
    ///
    /// # Errors
    ///
    /// One `NotDisplayed` failure per hidden element.
    pub fn deep_all_elements_are_displayed(self) -> AssertResult<Self> {
        self.deep_all_elements_are_displayed_waiting(false)
    }

    /// Deep variant of [`Assert::all_elements_are_displayed_waiting`]
    ///
    /// # Errors
    ///
    /// One `NotDisplayed` failure per hidden element.
    pub fn deep_all_elements_are_displayed_waiting(self, should_wait: bool) -> AssertResult<Self> {
        let subject = self.begin()?;
        let leaves = required_leaves(subject);
        debug!(
            container = %self.label(),
            leaves = leaves.len(),
            should_wait,
            "checking all nested elements are displayed"
        );
        let outcome = check_all_displayed(
            leaves.into_iter().map(|(_, element)| Subject::Element(element)),
            &self.config,
            should_wait,
        );
        self.absorb(outcome)
    }

    /// Verify exactly the listed children are displayed: each listed child
    /// is displayed and every other non-optional child is hidden. Optional
    /// children that are not listed are not read at all.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an id naming no child; otherwise one failure
    /// per child in the wrong state.
    pub fn assert_only_elements_are_displayed<I, T>(self, ids: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.assert_only_elements_are_displayed_waiting(false, ids)
    }

    /// [`Assert::assert_only_elements_are_displayed`], polling each child
    /// towards its expected state when `should_wait` is set
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an id naming no child; otherwise one failure
    /// per child in the wrong state.
    pub fn assert_only_elements_are_displayed_waiting<I, T>(
        self,
        should_wait: bool,
        ids: I,
    ) -> AssertResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let subject = self.begin()?;
        let expected: BTreeSet<String> = ids
            .into_iter()
            .map(|id| sanitize_key(id.as_ref()))
            .collect();
        let children = subject.children();
        let known: BTreeSet<String> = children.iter().map(|child| sanitize_key(child.id)).collect();
        if let Some(unknown) = expected.difference(&known).next() {
            return Err(AssertError::invalid_argument(
                "ids",
                format!("{} has no child '{unknown}'", self.label()),
            ));
        }

        let poller = self.poller();
        let mut batch = SoftAssertions::new().with_config(self.config);
        for child in &children {
            let member = child.subject;
            if expected.contains(&sanitize_key(child.id)) {
                let displayed = if should_wait {
                    poller.until_true(|| member.is_displayed())
                } else {
                    member.is_displayed()
                };
                batch.check((!displayed).then(|| {
                    Failure::new(
                        FailureKind::NotDisplayed,
                        Description::of(&member),
                        "expected to be displayed, but was not",
                    )
                }))?;
            } else if !member.is_optional() {
                let hidden = if should_wait {
                    poller.until_true(|| !member.is_displayed())
                } else {
                    !member.is_displayed()
                };
                batch.check((!hidden).then(|| {
                    Failure::new(
                        FailureKind::Displayed,
                        Description::of(&member),
                        "expected not to be displayed, but was",
                    )
                }))?;
            }
        }
        let outcome = batch.verify();
        self.absorb(outcome)
    }

    /// Verify children hold the expected values, keyed by child id
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map, `NullSubject` for an id naming
    /// no child; otherwise one `Mismatch` per differing value.
    pub fn contains_values<I, K, V>(self, expected: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let expected = FieldCriteria::new(expected)?;
        let subject = self.begin()?;
        let outcome = check_values(subject, &expected);
        self.absorb(outcome)
    }

    /// [`Assert::contains_values`], re-checked until it passes or
    /// `timeout_secs` elapse. Only the final attempt is reported.
    ///
    /// # Errors
    ///
    /// As [`Assert::contains_values`], for the final attempt.
    pub fn contains_values_within<I, K, V>(
        self,
        expected: I,
        timeout_secs: u64,
    ) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let expected = FieldCriteria::new(expected)?;
        let subject = self.begin()?;
        let outcome = self
            .poller()
            .with_timeout(seconds(timeout_secs))
            .await_until(|| check_values(subject, &expected))
            .map(|_| ());
        self.absorb(outcome)
    }

    /// Element assertion on a child, sharing this assertion's sink
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank id or a child that is not an element,
    /// `NullSubject` for an id naming no child.
    pub fn element(self, id: &str) -> AssertResult<Assert<'a, dyn Element + 'a>> {
        require_not_blank("id", id)?;
        let subject = self.begin()?;
        let element = child_element(subject, id)?;
        Ok(self.derive(Some(element)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::assertion::{assert_that, SoftAssertions};
    use crate::config::AssertConfig;
    use crate::mock::{MockContainer, MockElement};
    use crate::result::{AssertError, FailureKind};
    use std::time::{Duration, Instant};

    fn panel() -> MockContainer {
        MockContainer::new("Panel")
            .with_element("A", MockElement::new("A"))
            .with_element("B", MockElement::new("B"))
            .with_element("C", MockElement::new("C").hidden())
            .with_element("D", MockElement::new("D").hidden().optional())
    }

    fn quick() -> AssertConfig {
        AssertConfig::new()
            .with_wait_timeout(Duration::from_millis(300))
            .with_poll_interval(Duration::from_millis(20))
    }

    mod all_displayed {
        use super::*;

        #[test]
        fn test_passes_skipping_optional() {
            let form = MockContainer::new("Form")
                .with_element("User", MockElement::new("User"))
                .with_element("Hint", MockElement::new("Hint").hidden().optional());
            assert!(assert_that(&form).all_elements_are_displayed().is_ok());
        }

        #[test]
        fn test_reports_every_hidden_child() {
            let err = assert_that(&panel()).all_elements_are_displayed().unwrap_err();
            let failures = err.failures();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].description.as_str(), "C");
        }

        #[test]
        fn test_waiting_stops_after_first_absent_child() {
            let form = MockContainer::new("Form")
                .with_element("Header", MockElement::new("Header").hidden())
                .with_element("Body", MockElement::new("Body").hidden())
                .with_element("Footer", MockElement::new("Footer").hidden());
            let start = Instant::now();
            let err = assert_that(&form)
                .with_config(quick())
                .all_elements_are_displayed_waiting(true)
                .unwrap_err();
            assert_eq!(err.failures().len(), 3);
            assert!(start.elapsed() < Duration::from_millis(600));
        }

        #[test]
        fn test_waiting_sees_late_children() {
            let form = MockContainer::new("Form")
                .with_element(
                    "Header",
                    MockElement::new("Header")
                        .hidden()
                        .toggles_visibility_after(Duration::from_millis(60)),
                )
                .with_element("Body", MockElement::new("Body"));
            assert!(assert_that(&form)
                .with_config(quick())
                .all_elements_are_displayed_waiting(true)
                .is_ok());
        }

        #[test]
        fn test_deep_checks_nested_leaves() {
            let page = MockContainer::new("Page")
                .with_element("Title", MockElement::new("Title"))
                .with_container(
                    "Footer",
                    MockContainer::new("Footer")
                        .with_element("Help", MockElement::new("Help").hidden())
                        .with_element("Legal", MockElement::new("Legal").hidden().optional()),
                )
                .with_container(
                    "Promo",
                    MockContainer::new("Promo")
                        .optional()
                        .with_element("Banner", MockElement::new("Banner").hidden()),
                );
            let err = assert_that(&page).deep_all_elements_are_displayed().unwrap_err();
            let failures = err.failures();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].description.as_str(), "Help");
        }
    }

    mod only_displayed {
        use super::*;

        #[test]
        fn test_exact_set_passes() {
            assert!(assert_that(&panel())
                .assert_only_elements_are_displayed(["A", "B"])
                .is_ok());
        }

        #[test]
        fn test_unexpected_child_fails_and_optional_is_never_read() {
            let panel = panel();
            let err = assert_that(&panel)
                .assert_only_elements_are_displayed(["a"])
                .unwrap_err();
            let failures = err.failures();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].kind, FailureKind::Displayed);
            assert_eq!(failures[0].description.as_str(), "B");
            assert_eq!(panel.element("D").unwrap().displayed_reads(), 0);
        }

        #[test]
        fn test_listed_hidden_child_fails() {
            let err = assert_that(&panel())
                .assert_only_elements_are_displayed(["A", "B", "C"])
                .unwrap_err();
            assert_eq!(err.failures()[0].kind, FailureKind::NotDisplayed);
        }

        #[test]
        fn test_unknown_id_is_invalid() {
            let err = assert_that(&panel())
                .assert_only_elements_are_displayed(["A", "Z"])
                .unwrap_err();
            assert!(matches!(err, AssertError::InvalidArgument { .. }));
        }

        #[test]
        fn test_waiting_for_disappearance() {
            let panel = MockContainer::new("Panel")
                .with_element("Result", MockElement::new("Result"))
                .with_element(
                    "Spinner",
                    MockElement::new("Spinner").toggles_visibility_after(Duration::from_millis(60)),
                );
            assert!(assert_that(&panel)
                .with_config(quick())
                .assert_only_elements_are_displayed_waiting(true, ["Result"])
                .is_ok());
        }
    }

    mod values {
        use super::*;

        fn profile() -> MockContainer {
            MockContainer::with_fields("Profile", &[("First Name", "Ann"), ("Role", "admin")])
        }

        #[test]
        fn test_matching_values() {
            assert!(assert_that(&profile())
                .contains_values([("first name", "Ann"), ("ROLE", "admin")])
                .is_ok());
        }

        #[test]
        fn test_every_mismatch_is_reported() {
            let err = assert_that(&profile())
                .contains_values([("First Name", "Bob"), ("Role", "viewer")])
                .unwrap_err();
            assert_eq!(err.failures().len(), 2);
            assert!(err.failures()[0].message.contains("\"Bob\""));
        }

        #[test]
        fn test_missing_child_is_null_subject() {
            let err = assert_that(&profile())
                .contains_values([("Email", "ann@example.com")])
                .unwrap_err();
            assert!(matches!(err, AssertError::NullSubject { .. }));
        }

        #[test]
        fn test_empty_map_is_invalid() {
            let err = assert_that(&profile())
                .contains_values(Vec::<(&str, &str)>::new())
                .unwrap_err();
            assert!(matches!(err, AssertError::InvalidArgument { .. }));
        }

        #[test]
        fn test_within_waits_for_settled_value() {
            let form = MockContainer::new("Order").with_element(
                "Status",
                MockElement::new("Status")
                    .with_value("pending")
                    .with_value_after(Duration::from_millis(150), "shipped"),
            );
            assert!(assert_that(&form)
                .with_config(AssertConfig::new().with_poll_interval(Duration::from_millis(20)))
                .contains_values_within([("Status", "shipped")], 2)
                .is_ok());
        }

        #[test]
        fn test_within_zero_seconds_is_single_attempt() {
            let err = assert_that(&profile())
                .contains_values_within([("Role", "viewer")], 0)
                .unwrap_err();
            assert_eq!(err.failures().len(), 1);
        }

        #[test]
        fn test_soft_batch_records_each_mismatch() {
            let profile = profile();
            let mut soft = SoftAssertions::new();
            let _ = soft
                .assert_that(&profile)
                .contains_values([("First Name", "Bob"), ("Role", "viewer")])
                .unwrap();
            assert_eq!(soft.failure_count(), 2);
        }
    }

    mod child_element {
        use super::*;

        #[test]
        fn test_element_assertion() {
            let form = MockContainer::new("Form")
                .with_element("Submit", MockElement::new("Submit").disabled());
            let err = assert_that(&form)
                .element("submit")
                .unwrap()
                .is_enabled()
                .unwrap_err();
            assert_eq!(err.failures()[0].description.as_str(), "Submit");
        }

        #[test]
        fn test_missing_and_blank_ids() {
            let form = MockContainer::new("Form");
            assert!(matches!(
                assert_that(&form).element("Submit").unwrap_err(),
                AssertError::NullSubject { .. }
            ));
            assert!(matches!(
                assert_that(&form).element(" ").unwrap_err(),
                AssertError::InvalidArgument { .. }
            ));
        }

        #[test]
        fn test_nested_container_is_not_an_element() {
            let form =
                MockContainer::new("Form").with_container("Footer", MockContainer::new("Footer"));
            assert!(matches!(
                assert_that(&form).element("Footer").unwrap_err(),
                AssertError::InvalidArgument { .. }
            ));
        }
    }
}
