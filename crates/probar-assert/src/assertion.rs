//! Fluent assertions on the element model
//!
//! One generic [`Assert`] carries the subject, its description, a config
//! and a sink. The checks it offers depend on which capability traits the
//! subject implements; see the submodules.
//!
//! ## Toyota Way Application:
//! - **Poka-Yoke**: Checks exist only for subjects that support them
//! - **Jidoka**: A failed check stops the chain unless a soft session
//!   collects it

pub mod collection;
pub mod container;
pub mod element;
pub mod poll;
pub mod scalar;
pub mod soft;
pub mod table;

pub use poll::{await_until, PollReport, Poller};
pub use scalar::{CountAssert, ListAssert, StrAssert};
pub use soft::{AssertionMode, AssertionSummary, SoftAssertions};

use crate::config::AssertConfig;
use crate::description::Description;
use crate::model::{
    Column, Container, Element, IndexedCollection, IndexedElements, Named, Shape, Subject, Table,
};
use crate::result::{AssertError, AssertResult, Failure, FailureKind};
use std::any::type_name;
use std::cell::OnceCell;
use std::fmt;

/// Where failures go: returned to the caller, or recorded in a session
pub(crate) enum Sink<'a> {
    Hard,
    Soft(&'a mut SoftAssertions),
}

impl Sink<'_> {
    pub(crate) fn report(&mut self, failure: Option<Failure>) -> AssertResult<()> {
        match self {
            Self::Hard => failure.map_or(Ok(()), |failure| Err(AssertError::Failed(failure))),
            Self::Soft(session) => session.check(failure),
        }
    }

    pub(crate) fn absorb(&mut self, outcome: AssertResult<()>) -> AssertResult<()> {
        match self {
            Self::Hard => outcome,
            Self::Soft(session) => session.absorb(outcome),
        }
    }

    const fn is_soft(&self) -> bool {
        matches!(self, Self::Soft(_))
    }
}

impl fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_soft() { "Soft" } else { "Hard" })
    }
}

/// Fluent assertion on one subject.
///
/// Every check consumes the assertion and hands it back on success, so
/// checks chain with `?`:
///
/// ```ignore
/// assert_that(&submit)
///     .is_displayed()?
///     .is_enabled()?
///     .contains_class("primary")?;
/// ```
pub struct Assert<'a, S: ?Sized> {
    subject: Option<&'a S>,
    description: OnceCell<Description>,
    config: AssertConfig,
    sink: Sink<'a>,
}

impl<'a, S: ?Sized> Assert<'a, S> {
    pub(crate) fn hard(subject: Option<&'a S>) -> Self {
        Self {
            subject,
            description: OnceCell::new(),
            config: AssertConfig::default(),
            sink: Sink::Hard,
        }
    }

    pub(crate) fn soft(subject: Option<&'a S>, session: &'a mut SoftAssertions) -> Self {
        Self {
            subject,
            description: OnceCell::new(),
            config: session.config(),
            sink: Sink::Soft(session),
        }
    }

    /// Replace the generated description
    #[must_use]
    pub fn described_as(mut self, text: impl Into<String>) -> Self {
        self.description = OnceCell::from(Description::new(text));
        self
    }

    /// Override the timing config
    #[must_use]
    pub const fn with_config(mut self, config: AssertConfig) -> Self {
        self.config = config;
        self
    }

    /// Timing config in effect
    #[must_use]
    pub const fn config(&self) -> AssertConfig {
        self.config
    }

    /// Whether failures are recorded in a soft session
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        self.sink.is_soft()
    }

    /// The description, once set by the caller or by a first check
    #[must_use]
    pub fn description(&self) -> Option<&Description> {
        self.description.get()
    }

    pub(crate) fn poller(&self) -> Poller {
        Poller::from_config(&self.config)
    }

    pub(crate) fn label(&self) -> Description {
        self.description
            .get()
            .cloned()
            .unwrap_or_else(|| Description::new(type_name::<S>()))
    }

    /// Report a check outcome and hand the assertion back
    pub(crate) fn ensure(
        mut self,
        passed: bool,
        kind: FailureKind,
        message: impl FnOnce() -> String,
    ) -> AssertResult<Self> {
        let failure = (!passed).then(|| Failure::new(kind, self.label(), message()));
        self.sink.report(failure)?;
        Ok(self)
    }

    /// Report an outcome that is already an error, such as a nested batch
    pub(crate) fn absorb(mut self, outcome: AssertResult<()>) -> AssertResult<Self> {
        self.sink.absorb(outcome)?;
        Ok(self)
    }

    /// Give up the subject, keeping the sink for a derived scope
    pub(crate) fn into_scope(self, suffix: &str) -> (Description, AssertConfig, Sink<'a>) {
        (self.label().scoped(suffix), self.config, self.sink)
    }

    /// Same sink and config, new subject
    pub(crate) fn derive<T: ?Sized>(self, subject: Option<&'a T>) -> Assert<'a, T> {
        Assert {
            subject,
            description: OnceCell::new(),
            config: self.config,
            sink: self.sink,
        }
    }
}

impl<'a, S: Named + ?Sized> Assert<'a, S> {
    /// The subject, with the description computed on first use.
    ///
    /// # Errors
    ///
    /// Returns `NullSubject` when the assertion was made on a missing
    /// subject.
    pub(crate) fn begin(&self) -> AssertResult<&'a S> {
        let subject = self.subject.ok_or_else(|| {
            AssertError::null_subject(
                self.description
                    .get()
                    .map_or_else(|| type_name::<S>().to_string(), ToString::to_string),
            )
        })?;
        let _ = self.description.get_or_init(|| Description::of(subject));
        Ok(subject)
    }
}

impl<S: ?Sized> fmt::Debug for Assert<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assert")
            .field("subject", &type_name::<S>())
            .field("present", &self.subject.is_some())
            .field("description", &self.description.get())
            .field("sink", &self.sink)
            .finish()
    }
}

/// Start a hard assertion: the first failed check returns an error
pub fn assert_that<S: Named + ?Sized>(subject: &S) -> Assert<'_, S> {
    Assert::hard(Some(subject))
}

/// Start a hard assertion on a subject that may be missing. Checks on a
/// missing subject return `NullSubject`.
pub fn assert_that_optional<S: Named + ?Sized>(subject: Option<&S>) -> Assert<'_, S> {
    Assert::hard(subject)
}

/// Assertion picked by the runtime shape of a [`Subject`]
#[derive(Debug)]
pub enum ShapedAssert<'a> {
    /// Element checks
    Element(Assert<'a, dyn Element + 'a>),
    /// Container checks
    Container(Assert<'a, dyn Container + 'a>),
    /// Collection checks
    Collection(Assert<'a, dyn IndexedCollection + 'a>),
    /// Element list checks
    Elements(Assert<'a, dyn IndexedElements + 'a>),
    /// Column checks
    Column(Assert<'a, dyn Column + 'a>),
    /// Table checks
    Table(Assert<'a, dyn Table + 'a>),
}

impl<'a> ShapedAssert<'a> {
    fn dispatch(subject: Subject<'a>, sink: Sink<'a>, config: AssertConfig) -> Self {
        fn build<'s, T: ?Sized>(
            subject: &'s T,
            sink: Sink<'s>,
            config: AssertConfig,
        ) -> Assert<'s, T> {
            Assert {
                subject: Some(subject),
                description: OnceCell::new(),
                config,
                sink,
            }
        }
        match subject {
            Subject::Element(s) => Self::Element(build(s, sink, config)),
            Subject::Container(s) => Self::Container(build(s, sink, config)),
            Subject::Collection(s) => Self::Collection(build(s, sink, config)),
            Subject::Elements(s) => Self::Elements(build(s, sink, config)),
            Subject::Column(s) => Self::Column(build(s, sink, config)),
            Subject::Table(s) => Self::Table(build(s, sink, config)),
        }
    }

    /// Shape the assertion was picked for
    #[must_use]
    pub const fn shape(&self) -> Shape {
        match self {
            Self::Element(_) => Shape::Element,
            Self::Container(_) => Shape::Container,
            Self::Collection(_) => Shape::Collection,
            Self::Elements(_) => Shape::Elements,
            Self::Column(_) => Shape::Column,
            Self::Table(_) => Shape::Table,
        }
    }

    /// The element assertion, if the subject is an element
    #[must_use]
    pub fn into_element(self) -> Option<Assert<'a, dyn Element + 'a>> {
        match self {
            Self::Element(assert) => Some(assert),
            _ => None,
        }
    }

    /// The container assertion, if the subject is a container
    #[must_use]
    pub fn into_container(self) -> Option<Assert<'a, dyn Container + 'a>> {
        match self {
            Self::Container(assert) => Some(assert),
            _ => None,
        }
    }

    /// The collection assertion, if the subject is a container collection
    #[must_use]
    pub fn into_collection(self) -> Option<Assert<'a, dyn IndexedCollection + 'a>> {
        match self {
            Self::Collection(assert) => Some(assert),
            _ => None,
        }
    }

    /// The element list assertion, if the subject is an element list
    #[must_use]
    pub fn into_elements(self) -> Option<Assert<'a, dyn IndexedElements + 'a>> {
        match self {
            Self::Elements(assert) => Some(assert),
            _ => None,
        }
    }

    /// The column assertion, if the subject is a table column
    #[must_use]
    pub fn into_column(self) -> Option<Assert<'a, dyn Column + 'a>> {
        match self {
            Self::Column(assert) => Some(assert),
            _ => None,
        }
    }

    /// The table assertion, if the subject is a table
    #[must_use]
    pub fn into_table(self) -> Option<Assert<'a, dyn Table + 'a>> {
        match self {
            Self::Table(assert) => Some(assert),
            _ => None,
        }
    }
}

/// Start a hard assertion on a subject of any shape
#[must_use]
pub fn assert_that_subject(subject: Subject<'_>) -> ShapedAssert<'_> {
    ShapedAssert::dispatch(subject, Sink::Hard, AssertConfig::default())
}

impl SoftAssertions {
    /// Start a soft assertion on a subject of any shape
    pub fn assert_that_subject<'a>(&'a mut self, subject: Subject<'a>) -> ShapedAssert<'a> {
        let config = self.config();
        ShapedAssert::dispatch(subject, Sink::Soft(self), config)
    }
}
