//! Probar Assert: fluent assertions over page-object UI models
//!
//! Subjects are UI nodes described by capability traits (displayed,
//! enabled, readable, ...) and shape traits (element, container, indexed
//! collection, table). Assertions read state through those traits only, so
//! any backend that implements them can be checked.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  PROBAR ASSERT Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Subject    │    │ Assert<S>  │    │ Sink       │            │
//! │   │ (traits)   │───►│ checks     │───►│ hard: Err  │            │
//! │   │            │    │ + Poller   │    │ soft: log  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Toyota Way Application:
//! - **Jidoka**: A hard assertion stops at the first failed check
//! - **Poka-Yoke**: Blank names, empty maps and row 0 are rejected before
//!   any state is read
//! - **Genchi Genbutsu**: Every failure names the subject it was read from
//!
//! # Example
//!
//! ```ignore
//! use probar_assert::prelude::*;
//!
//! let mut soft = SoftAssertions::new();
//! soft.assert_that(&login).element("User")?.value()?.is_equal_to("alice")?;
//! soft.assert_that(&users).contains_fields([("name", "Ann")])?;
//! soft.verify()?;
//! ```

#![warn(missing_docs)]

pub mod assertion;
pub mod config;
pub mod description;
pub mod matcher;
pub mod mock;
pub mod model;
pub mod result;

pub use assertion::{
    assert_that, assert_that_optional, assert_that_subject, await_until, Assert, AssertionMode,
    AssertionSummary, CountAssert, ListAssert, PollReport, Poller, ShapedAssert, SoftAssertions,
    StrAssert,
};
pub use config::AssertConfig;
pub use description::Description;
pub use matcher::{CaseSensitivity, FieldCriteria, MatchCriterion, TableRow};
pub use model::{
    Child, Column, Container, Countable, Displayable, Element, Enableable, FieldSource,
    IndexedCollection, IndexedElements, Named, Readable, RowIndex, Selectable, Shape, Subject,
    Table, ValueList,
};
pub use result::{AggregatedFailure, AssertError, AssertResult, Failure, FailureKind};

/// Everything needed to write assertions against a custom model
pub mod prelude {
    pub use super::assertion::*;
    pub use super::config::*;
    pub use super::description::*;
    pub use super::matcher::*;
    pub use super::model::*;
    pub use super::result::*;
}
