//! Checks on single elements: visibility, state, class and read values.

use super::container::check_children_displayed;
use super::scalar::StrAssert;
use super::Assert;
use crate::model::{Displayable, Enableable, Readable, Selectable};
use crate::result::{require_not_blank, AssertError, AssertResult, FailureKind};

impl<'a, S: Displayable + ?Sized> Assert<'a, S> {
    /// Verify the subject is displayed right now
    ///
    /// # Errors
    ///
    /// Fails with `NotDisplayed` when the subject is hidden.
    pub fn is_displayed(self) -> AssertResult<Self> {
        self.is_displayed_waiting(false)
    }

    /// Verify the subject is displayed, polling up to the configured wait
    /// timeout when `should_wait` is set.
    ///
    /// Subjects whose visibility is derived from their children (see
    /// [`Displayable::visibility_parts`]) report one failure per hidden
    /// non-optional child.
    ///
    /// # Errors
    ///
    /// Fails with `NotDisplayed` when the subject is hidden once polling
    /// ends.
    pub fn is_displayed_waiting(self, should_wait: bool) -> AssertResult<Self> {
        let subject = self.begin()?;
        if let Some(parts) = subject.visibility_parts() {
            let outcome = check_children_displayed(&parts, &self.config, should_wait);
            return self.absorb(outcome);
        }
        let displayed = if should_wait {
            self.poller().until_true(|| subject.is_displayed())
        } else {
            subject.is_displayed()
        };
        self.ensure(displayed, FailureKind::NotDisplayed, || {
            "expected to be displayed, but was not".to_string()
        })
    }

    /// Verify the subject is hidden right now
    ///
    /// # Errors
    ///
    /// Fails with `Displayed` when the subject is displayed.
    pub fn is_not_displayed(self) -> AssertResult<Self> {
        self.is_not_displayed_waiting(false)
    }

    /// Verify the subject is hidden, polling until it disappears when
    /// `should_wait` is set.
    ///
    /// # Errors
    ///
    /// Fails with `Displayed` when the subject is still displayed once
    /// polling ends.
    pub fn is_not_displayed_waiting(self, should_wait: bool) -> AssertResult<Self> {
        let subject = self.begin()?;
        let hidden = if should_wait {
            self.poller().until_true(|| !subject.is_displayed())
        } else {
            !subject.is_displayed()
        };
        self.ensure(hidden, FailureKind::Displayed, || {
            "expected not to be displayed, but was".to_string()
        })
    }
}

impl<S: Enableable + ?Sized> Assert<'_, S> {
    /// Verify the subject is enabled
    ///
    /// # Errors
    ///
    /// Fails with `NotEnabled` when it is disabled.
    pub fn is_enabled(self) -> AssertResult<Self> {
        let subject = self.begin()?;
        self.ensure(subject.is_enabled(), FailureKind::NotEnabled, || {
            "expected to be enabled, but was not".to_string()
        })
    }

    /// Verify the subject is disabled
    ///
    /// # Errors
    ///
    /// Fails with `Enabled` when it is enabled.
    pub fn is_not_enabled(self) -> AssertResult<Self> {
        let subject = self.begin()?;
        self.ensure(!subject.is_enabled(), FailureKind::Enabled, || {
            "expected not to be enabled, but was".to_string()
        })
    }
}

impl<'a, S: Selectable + ?Sized> Assert<'a, S> {
    fn selectable(&self) -> AssertResult<&'a S> {
        let subject = self.begin()?;
        if subject.supports_selection() {
            Ok(subject)
        } else {
            Err(AssertError::invalid_argument(
                "subject",
                format!("{} has no selection state", self.label()),
            ))
        }
    }

    /// Verify the subject is selected
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an element without selection state; fails
    /// with `NotSelected` when it is not selected.
    pub fn is_selected(self) -> AssertResult<Self> {
        let subject = self.selectable()?;
        self.ensure(subject.is_selected(), FailureKind::NotSelected, || {
            "expected to be selected, but was not".to_string()
        })
    }

    /// Verify the subject is not selected
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an element without selection state; fails
    /// with `Selected` when it is selected.
    pub fn is_not_selected(self) -> AssertResult<Self> {
        let subject = self.selectable()?;
        self.ensure(!subject.is_selected(), FailureKind::Selected, || {
            "expected not to be selected, but was".to_string()
        })
    }
}

impl<'a, S: Readable + ?Sized> Assert<'a, S> {
    /// Verify the `class` attribute contains `class` as a substring
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank class name; fails with `MissingClass`
    /// otherwise.
    pub fn contains_class(self, class: &str) -> AssertResult<Self> {
        require_not_blank("class", class)?;
        let subject = self.begin()?;
        let actual = subject.attribute("class").unwrap_or_default();
        self.ensure(actual.contains(class), FailureKind::MissingClass, || {
            format!("expected class '{actual}' to contain '{class}'")
        })
    }

    /// Verify the `class` attribute does not contain `class`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank class name; fails with
    /// `UnexpectedClass` otherwise.
    pub fn not_contains_class(self, class: &str) -> AssertResult<Self> {
        require_not_blank("class", class)?;
        let subject = self.begin()?;
        let actual = subject.attribute("class").unwrap_or_default();
        self.ensure(!actual.contains(class), FailureKind::UnexpectedClass, || {
            format!("expected class '{actual}' not to contain '{class}'")
        })
    }

    fn read(self, what: &str, actual: Option<String>) -> StrAssert<'a> {
        let (description, _, sink) = self.into_scope(what);
        StrAssert::new(actual, description, sink)
    }

    /// Scope on the element value
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn value(self) -> AssertResult<StrAssert<'a>> {
        let value = self.begin()?.read_value();
        Ok(self.read("value", Some(value)))
    }

    /// Scope on the element value with line breaks read as spaces
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn value_ignoring_new_lines(self) -> AssertResult<StrAssert<'a>> {
        let mut value = self.begin()?.read_value();
        if !value.trim().is_empty() {
            value = value.replace('\n', " ");
        }
        Ok(self.read("value ignoring line breaks", Some(value)))
    }

    /// Scope on the visible text
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn text(self) -> AssertResult<StrAssert<'a>> {
        let text = self.begin()?.read_text();
        Ok(self.read("text", Some(text)))
    }

    /// Scope on the full text, hidden descendants included
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn full_text(self) -> AssertResult<StrAssert<'a>> {
        let text = self.begin()?.read_full_text();
        Ok(self.read("full text", Some(text)))
    }

    /// Scope on the tag name
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn tag_name(self) -> AssertResult<StrAssert<'a>> {
        let tag = self.begin()?.read_tag_name();
        Ok(self.read("tag name", Some(tag)))
    }

    /// Scope on an attribute; an absent attribute is a null string
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name, `NullSubject` when the subject
    /// is missing.
    pub fn attribute(self, name: &str) -> AssertResult<StrAssert<'a>> {
        require_not_blank("attribute", name)?;
        let value = self.begin()?.attribute(name);
        Ok(self.read(&format!("[{name}] attribute"), value))
    }

    /// Scope on a computed CSS property
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name, `NullSubject` when the subject
    /// is missing.
    pub fn css_value(self, name: &str) -> AssertResult<StrAssert<'a>> {
        require_not_blank("css value", name)?;
        let value = self.begin()?.read_css_value(name);
        Ok(self.read(&format!("[{name}] css value"), Some(value)))
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

    fn fast_wait() -> AssertConfig {
        AssertConfig::new()
            .with_wait_timeout(Duration::from_secs(1))
            .with_poll_interval(Duration::from_millis(20))
    }

    mod visibility {
        use super::*;

        #[test]
        fn test_displayed_passes() {
            let element = MockElement::new("Logo");
            assert!(assert_that(&element).is_displayed().is_ok());
        }

        #[test]
        fn test_hidden_fails_with_description() {
            let element = MockElement::new("Logo").with_locator("header img").hidden();
            let err = assert_that(&element).is_displayed().unwrap_err();
            let failure = &err.failures()[0];
            assert_eq!(failure.kind, FailureKind::NotDisplayed);
            assert_eq!(failure.description.as_str(), "Logo => header img");
        }

        #[test]
        fn test_wait_sees_late_appearance() {
            let element = MockElement::new("Toast")
                .hidden()
                .toggles_visibility_after(Duration::from_millis(100));
            let start = Instant::now();
            assert!(assert_that(&element)
                .with_config(fast_wait())
                .is_displayed_waiting(true)
                .is_ok());
            assert!(start.elapsed() < Duration::from_secs(1));
        }

        #[test]
        fn test_no_wait_reads_current_state() {
            let element = MockElement::new("Toast")
                .hidden()
                .toggles_visibility_after(Duration::from_millis(100));
            assert!(assert_that(&element).is_displayed().is_err());
        }

        #[test]
        fn test_wait_gives_up_at_timeout() {
            let element = MockElement::new("Toast").hidden();
            let start = Instant::now();
            let result = assert_that(&element)
                .with_config(
                    AssertConfig::new()
                        .with_wait_timeout(Duration::from_millis(200))
                        .with_poll_interval(Duration::from_millis(20)),
                )
                .is_displayed_waiting(true);
            assert!(result.is_err());
            assert!(start.elapsed() >= Duration::from_millis(200));
        }

        #[test]
        fn test_not_displayed_waits_for_disappearance() {
            let element =
                MockElement::new("Spinner").toggles_visibility_after(Duration::from_millis(80));
            assert!(assert_that(&element).is_not_displayed().is_err());
            assert!(assert_that(&element)
                .with_config(fast_wait())
                .is_not_displayed_waiting(true)
                .is_ok());
        }

        #[test]
        fn test_container_without_locator_reports_each_hidden_child() {
            let form = MockContainer::new("Form")
                .with_element("User", MockElement::new("User").hidden())
                .with_element("Password", MockElement::new("Password").hidden())
                .with_element("Hint", MockElement::new("Hint").hidden().optional());
            let err = assert_that(&form).is_displayed().unwrap_err();
            assert!(matches!(err, AssertError::Aggregated(_)));
            assert_eq!(err.failures().len(), 2);
        }

        #[test]
        fn test_container_with_locator_is_single_query() {
            let dialog = MockContainer::new("Dialog")
                .with_locator("#dialog")
                .hidden()
                .with_element("Ok", MockElement::new("Ok"));
            let err = assert_that(&dialog).is_displayed().unwrap_err();
            assert!(matches!(err, AssertError::Failed(_)));
        }
    }

    mod state {
        use super::*;

        #[test]
        fn test_enabled_chain() {
            let element = MockElement::new("Submit").disabled();
            assert!(assert_that(&element).is_not_enabled().is_ok());
            element.set_enabled(true);
            assert!(assert_that(&element).is_displayed().unwrap().is_enabled().is_ok());
        }

        #[test]
        fn test_selected() {
            let checkbox = MockElement::new("Remember me").selected();
            assert!(assert_that(&checkbox).is_selected().is_ok());
            let err = assert_that(&checkbox).is_not_selected().unwrap_err();
            assert_eq!(err.failures()[0].kind, FailureKind::Selected);
        }

        #[test]
        fn test_selected_child_by_id() {
            let form = MockContainer::new("Login")
                .with_element("Remember me", MockElement::new("Remember me").selectable())
                .with_element("Terms", MockElement::new("Terms").selected())
                .with_element("User", MockElement::new("User"));
            assert!(assert_that(&form)
                .element("remember me")
                .unwrap()
                .is_not_selected()
                .is_ok());
            assert!(assert_that(&form).element("terms").unwrap().is_selected().is_ok());
            let err = assert_that(&form)
                .element("Remember me")
                .unwrap()
                .is_selected()
                .unwrap_err();
            assert_eq!(err.failures()[0].kind, FailureKind::NotSelected);
        }

        #[test]
        fn test_selection_on_plain_element_is_invalid() {
            let form = MockContainer::new("Login").with_element("User", MockElement::new("User"));
            let err = assert_that(&form).element("User").unwrap().is_selected().unwrap_err();
            assert!(matches!(err, AssertError::InvalidArgument { .. }));
            assert!(err.to_string().contains("no selection state"));
        }
    }

    mod class {
        use super::*;

        #[test]
        fn test_contains_class_is_substring_match() {
            let element = MockElement::new("Tab").with_attribute("class", "tab tab-active");
            assert!(assert_that(&element).contains_class("active").is_ok());
            assert!(assert_that(&element).not_contains_class("disabled").is_ok());
            let err = assert_that(&element).not_contains_class("tab").unwrap_err();
            assert_eq!(err.failures()[0].kind, FailureKind::UnexpectedClass);
        }

        #[test]
        fn test_missing_class_attribute_reads_empty() {
            let element = MockElement::new("Tab");
            let err = assert_that(&element).contains_class("active").unwrap_err();
            assert_eq!(err.failures()[0].kind, FailureKind::MissingClass);
        }

        #[test]
        fn test_blank_class_is_invalid_even_in_soft_mode() {
            let element = MockElement::new("Tab");
            let mut soft = SoftAssertions::new();
            let err = soft.assert_that(&element).contains_class(" ").unwrap_err();
            assert!(matches!(err, AssertError::InvalidArgument { .. }));
        }
    }

    mod reads {
        use super::*;

        #[test]
        fn test_value_scope() {
            let element = MockElement::new("Email").with_value("ann@example.com");
            assert!(assert_that(&element)
                .value()
                .unwrap()
                .ends_with("@example.com")
                .is_ok());
        }

        #[test]
        fn test_value_ignoring_new_lines() {
            let element = MockElement::new("Address").with_value("1 Main St\nSpringfield");
            assert!(assert_that(&element)
                .value_ignoring_new_lines()
                .unwrap()
                .is_equal_to("1 Main St Springfield")
                .is_ok());
        }

        #[test]
        fn test_scoped_description() {
            let element = MockElement::new("Title").with_text("Hello");
            let err = assert_that(&element)
                .text()
                .unwrap()
                .is_equal_to("Goodbye")
                .unwrap_err();
            assert_eq!(err.failures()[0].description.as_str(), "Title text");
        }

        #[test]
        fn test_absent_attribute_is_null() {
            let element = MockElement::new("Link").with_attribute("href", "/home");
            assert!(assert_that(&element).attribute("href").unwrap().is_equal_to("/home").is_ok());
            assert!(assert_that(&element).attribute("target").unwrap().is_null().is_ok());
        }

        #[test]
        fn test_blank_names_are_invalid() {
            let element = MockElement::new("Link");
            assert!(matches!(
                assert_that(&element).attribute("").unwrap_err(),
                AssertError::InvalidArgument { .. }
            ));
            assert!(matches!(
                assert_that(&element).css_value("  ").unwrap_err(),
                AssertError::InvalidArgument { .. }
            ));
        }

        #[test]
        fn test_css_and_tag() {
            let element = MockElement::new("Alert").with_tag("span").with_css("color", "red");
            assert!(assert_that(&element).tag_name().unwrap().is_equal_to("span").is_ok());
            assert!(assert_that(&element).css_value("color").unwrap().is_equal_to("red").is_ok());
        }

        #[test]
        fn test_soft_scope_records_into_session() {
            let element = MockElement::new("Title")
                .with_text("Hello")
                .with_full_text("Hello world");
            let mut soft = SoftAssertions::new();
            let _ = soft
                .assert_that(&element)
                .full_text()
                .unwrap()
                .is_equal_to("Hello")
                .unwrap();
            assert_eq!(soft.failure_count(), 1);
        }
    }
}
