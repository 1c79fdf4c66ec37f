//! Checks on indexed collections: membership, counts and value lists.

use super::scalar::{CountAssert, ListAssert};
use super::Assert;
use crate::config::seconds;
use crate::description::Description;
use crate::matcher::{
    ensure_same_keys, find, find_all, find_all_matching, find_matching, find_rows, read_all,
    unmatched, FieldCriteria, MatchCriterion,
};
use crate::model::{
    normalize_space, Container, Countable, Element, IndexedCollection, IndexedElements, RowIndex,
    ValueList,
};
use crate::result::{AssertError, AssertResult, Failure, FailureKind};
use tracing::debug;

fn names(members: &[&dyn Container]) -> String {
    members
        .iter()
        .map(|member| Description::of(*member).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_criteria(list: &[&FieldCriteria]) -> String {
    list.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a, S: Countable + ?Sized> Assert<'a, S> {
    /// Scope on the number of members
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn count(self) -> AssertResult<CountAssert<'a>> {
        let count = self.begin()?.count();
        let (description, _, sink) = self.into_scope("count");
        Ok(CountAssert::new(count, description, sink))
    }
}

impl<'a, S: ValueList + ?Sized> Assert<'a, S> {
    /// Scope on the member values, in order
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn values(self) -> AssertResult<ListAssert<'a>> {
        let values = self.begin()?.read_values();
        let (description, _, sink) = self.into_scope("values");
        Ok(ListAssert::new(values, description, sink))
    }

    /// Scope on the member values with whitespace runs collapsed
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn values_normalized_space(self) -> AssertResult<ListAssert<'a>> {
        let values = self
            .begin()?
            .read_values()
            .iter()
            .map(|value| normalize_space(value))
            .collect();
        let (description, _, sink) = self.into_scope("values with normalized space");
        Ok(ListAssert::new(values, description, sink))
    }

    /// Verify some member (for a column, some row) has exactly `value`
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when none does.
    pub fn contains_value(self, value: &str) -> AssertResult<Self> {
        let subject = self.begin()?;
        let rows: Vec<usize> = find_rows(subject, value)
            .into_iter()
            .map(RowIndex::get)
            .collect();
        debug!(value, rows = ?rows, "value lookup");
        self.ensure(!rows.is_empty(), FailureKind::NotFound, || {
            format!(
                "expected a member with value {value:?}, but values were {:?}",
                subject.read_values()
            )
        })
    }
}

impl<'a, S: IndexedElements + ?Sized> Assert<'a, S> {
    /// Element assertion on the first member whose value is `value`,
    /// sharing this assertion's sink
    ///
    /// # Errors
    ///
    /// `NullSubject` when no member has that value.
    pub fn element_with_value(self, value: &str) -> AssertResult<Assert<'a, dyn Element + 'a>> {
        let members = self.begin()?.elements();
        let member = find(&members, |member| member.read_value() == value).ok_or_else(|| {
            AssertError::null_subject(format!("member with value {value:?} of {}", self.label()))
        })?;
        Ok(self.derive(Some(member)))
    }
}

impl<S: IndexedCollection + ?Sized> Assert<'_, S> {
    /// Verify some member satisfies `predicate`
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when none does.
    pub fn contains(self, predicate: impl Fn(&dyn Container) -> bool) -> AssertResult<Self> {
        let members = self.begin()?.containers();
        let found = find(&members, |member| predicate(member)).is_some();
        self.ensure(found, FailureKind::NotFound, || {
            format!(
                "expected one of {} member(s) to match the predicate, but none did",
                members.len()
            )
        })
    }

    /// Verify no member satisfies `predicate`
    ///
    /// # Errors
    ///
    /// Fails with `Found` naming every matching member.
    pub fn does_not_contain(
        self,
        predicate: impl Fn(&dyn Container) -> bool,
    ) -> AssertResult<Self> {
        let members = self.begin()?.containers();
        let offending = find_all(&members, |member| predicate(member));
        self.ensure(offending.is_empty(), FailureKind::Found, || {
            format!(
                "expected no member to match the predicate, but found {}",
                names(&offending)
            )
        })
    }

    fn contains_criteria(self, criteria: FieldCriteria) -> AssertResult<Self> {
        let members = self.begin()?.containers();
        let shown = criteria.to_string();
        let criterion: MatchCriterion<'_, dyn Container + '_> = criteria.into();
        let found = find_matching(&members, &criterion).is_some();
        self.ensure(found, FailureKind::NotFound, || {
            format!("expected a member matching {shown}, but none did")
        })
    }

    /// Verify some member has all the given field values
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map; fails with `NotFound` when no
    /// member matches.
    pub fn contains_fields<I, K, V>(self, expected: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let criteria = FieldCriteria::new(expected)?;
        self.contains_criteria(criteria)
    }

    /// [`Assert::contains_fields`] comparing values ignoring case
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map; fails with `NotFound` when no
    /// member matches.
    pub fn contains_ignore_case<I, K, V>(self, expected: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let criteria = FieldCriteria::new(expected)?.ignoring_case();
        self.contains_criteria(criteria)
    }

    /// [`Assert::contains_fields`], re-checked until a member matches or
    /// `timeout_secs` elapse
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map; fails with `NotFound` when no
    /// member matched by the deadline.
    pub fn contains_within<I, K, V>(self, expected: I, timeout_secs: u64) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let criteria = FieldCriteria::new(expected)?;
        let subject = self.begin()?;
        let label = self.label();
        let criterion: MatchCriterion<'_, dyn Container + '_> = criteria.clone().into();
        let outcome = self
            .poller()
            .with_timeout(seconds(timeout_secs))
            .await_until(|| {
                let members = subject.containers();
                if find_matching(&members, &criterion).is_some() {
                    Ok(())
                } else {
                    Err(AssertError::Failed(Failure::new(
                        FailureKind::NotFound,
                        label.clone(),
                        format!(
                            "expected a member matching {criteria} within {timeout_secs}s, \
                             but none did"
                        ),
                    )))
                }
            })
            .map(|_| ());
        self.absorb(outcome)
    }

    /// Verify no member has all the given field values
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map; fails with `Found` naming every
    /// matching member.
    pub fn does_not_contain_fields<I, K, V>(self, expected: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let criteria = FieldCriteria::new(expected)?;
        let members = self.begin()?.containers();
        let shown = criteria.to_string();
        let criterion: MatchCriterion<'_, dyn Container + '_> = criteria.into();
        let offending = find_all_matching(&members, &criterion);
        self.ensure(offending.is_empty(), FailureKind::Found, || {
            format!("expected no member matching {shown}, but found {}", names(&offending))
        })
    }

    /// Verify every row of `rows` equals some member on the row's fields.
    /// All rows must name the same fields.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty list, an empty row or differing
    /// field sets; fails with `NotFound` listing the rows with no match.
    pub fn contains_all<I, R, K, V>(self, rows: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let expected = FieldCriteria::list(rows)?;
        let keys = ensure_same_keys(&expected)?;
        let records = read_all(&self.begin()?.containers(), &keys);
        let missing = unmatched(&records, &expected);
        self.ensure(missing.is_empty(), FailureKind::NotFound, || {
            format!("expected members matching {}", list_criteria(&missing))
        })
    }

    /// Verify no row of `rows` equals any member on the row's fields.
    /// All rows must name the same fields.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty list, an empty row or differing
    /// field sets; fails with `Found` listing the rows that matched.
    pub fn does_not_contain_any<I, R, K, V>(self, rows: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let expected = FieldCriteria::list(rows)?;
        let keys = ensure_same_keys(&expected)?;
        let records = read_all(&self.begin()?.containers(), &keys);
        let present: Vec<&FieldCriteria> = expected
            .iter()
            .filter(|criteria| records.iter().any(|record| criteria.matches_record(record)))
            .collect();
        self.ensure(present.is_empty(), FailureKind::Found, || {
            format!("expected no members matching {}", list_criteria(&present))
        })
    }
}
