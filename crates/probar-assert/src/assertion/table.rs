//! Checks on tables and their columns
//!
//! Rows are numbered from 1. Column names are compared after key
//! sanitizing, so `"First  Name"` finds the `first name` column.

use super::scalar::CountAssert;
use super::Assert;
use crate::config::seconds;
use crate::matcher::{find_row, find_row_index, FieldCriteria};
use crate::model::{Column, Element, RowIndex, Table};
use crate::result::{require_not_blank, AssertError, AssertResult, Failure, FailureKind};

impl<'a, S: Column + ?Sized> Assert<'a, S> {
    /// Element assertion on the cell at 1-based `row`, sharing this
    /// assertion's sink
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for row 0, `NullSubject` for a row past the end.
    pub fn row(self, row: usize) -> AssertResult<Assert<'a, dyn Element + 'a>> {
        let index = RowIndex::new(row)
            .ok_or_else(|| AssertError::invalid_argument("row", "rows are numbered from 1"))?;
        let column = self.begin()?;
        let cell = column.cell(index).ok_or_else(|| {
            AssertError::null_subject(format!(
                "row {row} of {} ({} rows)",
                self.label(),
                column.rows_count()
            ))
        })?;
        Ok(self.derive(Some(cell)))
    }
}

impl<'a, S: Table + ?Sized> Assert<'a, S> {
    /// Verify some row has `value` in `column`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank column name; fails with `NotFound`
    /// when the column is missing or no cell holds the value.
    pub fn contains_column_value(self, column: &str, value: &str) -> AssertResult<Self> {
        require_not_blank("column", column)?;
        let table = self.begin()?;
        if table.find_column_by_name(column).is_none() {
            return self.ensure(false, FailureKind::NotFound, || {
                format!("expected a column named {column:?}, but there was none")
            });
        }
        let found = find_row(table, column, value).is_some();
        self.ensure(found, FailureKind::NotFound, || {
            format!("expected a row with {column} = {value:?}, but none had it")
        })
    }

    /// Verify some row holds every given value, keys being column names
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map; fails with `NotFound` when no
    /// row matches.
    pub fn contains_column_values<I, K, V>(self, expected: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let criteria = FieldCriteria::new(expected)?;
        let table = self.begin()?;
        let found = find_row_index(table, &criteria).is_some();
        self.ensure(found, FailureKind::NotFound, || {
            format!("expected a row matching {criteria}, but none did")
        })
    }

    /// [`Assert::contains_column_values`], re-checked until a row matches
    /// or `timeout_secs` elapse
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty map; fails with `NotFound` when no
    /// row matched by the deadline.
    pub fn contains_column_values_within<I, K, V>(
        self,
        expected: I,
        timeout_secs: u64,
    ) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let criteria = FieldCriteria::new(expected)?;
        let table = self.begin()?;
        let label = self.label();
        let outcome = self
            .poller()
            .with_timeout(seconds(timeout_secs))
            .await_until(|| match find_row_index(table, &criteria) {
                Some(_) => Ok(()),
                None => Err(AssertError::Failed(Failure::new(
                    FailureKind::NotFound,
                    label.clone(),
                    format!(
                        "expected a row matching {criteria} within {timeout_secs}s, but none did"
                    ),
                ))),
            })
            .map(|_| ());
        self.absorb(outcome)
    }

    /// Scope on the number of rows
    ///
    /// # Errors
    ///
    /// `NullSubject` when the subject is missing.
    pub fn rows_count(self) -> AssertResult<CountAssert<'a>> {
        let rows = self.begin()?.rows_count();
        let (description, _, sink) = self.into_scope("rows count");
        Ok(CountAssert::new(rows, description, sink))
    }

    /// Column assertion by header name, sharing this assertion's sink
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name, `NullSubject` when no column
    /// has that name.
    pub fn column(self, name: &str) -> AssertResult<Assert<'a, dyn Column + 'a>> {
        require_not_blank("column", name)?;
        let table = self.begin()?;
        let column = table.find_column_by_name(name).ok_or_else(|| {
            AssertError::null_subject(format!("column {name:?} of {}", self.label()))
        })?;
        Ok(self.derive(Some(column)))
    }
}
