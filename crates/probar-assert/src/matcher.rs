//! Collection Matcher
//!
//! Search over indexed collections and tables by predicate or by field
//! criteria. These functions only read the model; the assertions in
//! [`crate::assertion`] turn their results into failures.
//!
//! Field names are compared after [`sanitize_key`], so `"First Name"`,
//! `" first  name "` and `"FIRST NAME"` address the same field.

use crate::model::{sanitize_key, FieldSource, RowIndex, Table, ValueList};
use crate::result::{AssertError, AssertResult};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How field values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseSensitivity {
    /// Exact comparison
    #[default]
    Sensitive,
    /// Comparison after lowercasing both sides
    Insensitive,
}

impl CaseSensitivity {
    /// Compare two values under this mode
    #[must_use]
    pub fn equals(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Sensitive => actual == expected,
            Self::Insensitive => actual.to_lowercase() == expected.to_lowercase(),
        }
    }
}

/// Expected field values, keyed by sanitized field name. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCriteria {
    fields: BTreeMap<String, String>,
    case: CaseSensitivity,
}

impl FieldCriteria {
    /// Build criteria from `(field, value)` pairs.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when there are no pairs, a field name is blank, or
    /// two field names are the same once sanitized.
    pub fn new<I, K, V>(entries: I) -> AssertResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = BTreeMap::new();
        for (key, value) in entries {
            let key = sanitize_key(key.as_ref());
            if key.is_empty() {
                return Err(AssertError::invalid_argument(
                    "criteria",
                    "field names cannot be blank",
                ));
            }
            match fields.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(AssertError::invalid_argument(
                        "criteria",
                        format!("field '{}' is given more than once", entry.key()),
                    ));
                }
                Entry::Vacant(entry) => {
                    let _ = entry.insert(value.into());
                }
            }
        }
        if fields.is_empty() {
            return Err(AssertError::invalid_argument(
                "criteria",
                "at least one field is required",
            ));
        }
        Ok(Self {
            fields,
            case: CaseSensitivity::Sensitive,
        })
    }

    /// Build one criteria per row.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when any row is invalid.
    pub fn list<I, R, K, V>(rows: I) -> AssertResult<Vec<Self>>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        rows.into_iter().map(Self::new).collect()
    }

    /// Compare values under `case`
    #[must_use]
    pub const fn with_case(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    /// Compare values ignoring case
    #[must_use]
    pub const fn ignoring_case(self) -> Self {
        self.with_case(CaseSensitivity::Insensitive)
    }

    /// Comparison mode
    #[must_use]
    pub const fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Expected value of a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(&sanitize_key(field)).map(String::as_str)
    }

    /// Sanitized field names
    #[must_use]
    pub fn keys(&self) -> BTreeSet<String> {
        self.fields.keys().cloned().collect()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: criteria hold at least one field
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(field, value)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every field of `item` has the expected value. A missing
    /// field never matches.
    pub fn matches<T: FieldSource + ?Sized>(&self, item: &T) -> bool {
        self.fields.iter().all(|(key, expected)| {
            item.field(key)
                .is_some_and(|actual| self.case.equals(&actual, expected))
        })
    }

    /// Whether a record read by [`read_all`] equals these criteria on
    /// every field
    #[must_use]
    pub fn matches_record(&self, record: &BTreeMap<String, String>) -> bool {
        self.fields.iter().all(|(key, expected)| {
            record
                .get(key)
                .is_some_and(|actual| self.case.equals(actual, expected))
        })
    }
}

impl fmt::Display for FieldCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

/// What a member must satisfy: an arbitrary predicate, or field values
pub enum MatchCriterion<'p, T: ?Sized> {
    /// Caller-supplied predicate
    Predicate(Box<dyn Fn(&T) -> bool + 'p>),
    /// Expected field values
    Fields(FieldCriteria),
}

impl<'p, T: FieldSource + ?Sized> MatchCriterion<'p, T> {
    /// Wrap a predicate
    pub fn predicate(predicate: impl Fn(&T) -> bool + 'p) -> Self {
        Self::Predicate(Box::new(predicate))
    }

    /// Whether `item` satisfies the criterion
    pub fn matches(&self, item: &T) -> bool {
        match self {
            Self::Predicate(predicate) => predicate(item),
            Self::Fields(criteria) => criteria.matches(item),
        }
    }
}

impl<T: ?Sized> From<FieldCriteria> for MatchCriterion<'_, T> {
    fn from(criteria: FieldCriteria) -> Self {
        Self::Fields(criteria)
    }
}

impl<T: ?Sized> fmt::Display for MatchCriterion<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("<predicate>"),
            Self::Fields(criteria) => fmt::Display::fmt(criteria, f),
        }
    }
}

impl<T: ?Sized> fmt::Debug for MatchCriterion<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Fields(criteria) => f.debug_tuple("Fields").field(criteria).finish(),
        }
    }
}

/// One row of a table, read through its column names
pub struct TableRow<'t, T: ?Sized> {
    table: &'t T,
    row: RowIndex,
}

impl<T: ?Sized> Clone for TableRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for TableRow<'_, T> {}

impl<T: ?Sized> fmt::Debug for TableRow<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRow").field("row", &self.row).finish()
    }
}

impl<'t, T: Table + ?Sized> TableRow<'t, T> {
    /// View row `row` of `table`
    pub const fn new(table: &'t T, row: RowIndex) -> Self {
        Self { table, row }
    }

    /// Row number
    #[must_use]
    pub const fn index(&self) -> RowIndex {
        self.row
    }
}

impl<T: Table + ?Sized> FieldSource for TableRow<'_, T> {
    fn field(&self, key: &str) -> Option<String> {
        self.table.cell_value(self.row, key)
    }
}

/// First member satisfying `predicate`
pub fn find<'i, T: ?Sized>(items: &[&'i T], predicate: impl Fn(&T) -> bool) -> Option<&'i T> {
    items.iter().copied().find(|item| predicate(item))
}

/// Every member satisfying `predicate`, in order
pub fn find_all<'i, T: ?Sized>(items: &[&'i T], predicate: impl Fn(&T) -> bool) -> Vec<&'i T> {
    items.iter().copied().filter(|item| predicate(item)).collect()
}

/// First member satisfying `criterion`
pub fn find_matching<'i, T: FieldSource + ?Sized>(
    items: &[&'i T],
    criterion: &MatchCriterion<'_, T>,
) -> Option<&'i T> {
    find(items, |item| criterion.matches(item))
}

/// Every member satisfying `criterion`, in order
pub fn find_all_matching<'i, T: FieldSource + ?Sized>(
    items: &[&'i T],
    criterion: &MatchCriterion<'_, T>,
) -> Vec<&'i T> {
    find_all(items, |item| criterion.matches(item))
}

/// Every 1-based position of `list` whose value equals `value`, such as
/// the rows of a column holding it
pub fn find_rows<L: ValueList + ?Sized>(list: &L, value: &str) -> Vec<RowIndex> {
    list
        .read_values()
        .iter()
        .enumerate()
        .filter(|(_, cell)| *cell == value)
        .map(|(offset, _)| RowIndex::from_offset(offset))
        .collect()
}

/// First row whose cell in `column` equals `value`. `None` when the
/// column does not exist or no cell matches.
pub fn find_row<T: Table + ?Sized>(table: &T, column: &str, value: &str) -> Option<RowIndex> {
    let column = table.find_column_by_name(column)?;
    column
        .read_values()
        .iter()
        .position(|cell| cell == value)
        .map(RowIndex::from_offset)
}

/// First row whose cells satisfy every field of `criteria`, field names
/// being column names
pub fn find_row_index<T: Table + ?Sized>(table: &T, criteria: &FieldCriteria) -> Option<RowIndex> {
    (0..table.rows_count())
        .map(RowIndex::from_offset)
        .find(|&row| criteria.matches(&TableRow::new(table, row)))
}

/// Read `keys` from every member. Fields a member lacks are left out of
/// its record.
pub fn read_all<T: FieldSource + ?Sized>(
    items: &[&T],
    keys: &BTreeSet<String>,
) -> Vec<BTreeMap<String, String>> {
    items
        .iter()
        .map(|item| {
            keys.iter()
                .filter_map(|key| item.field(key).map(|value| (key.clone(), value)))
                .collect()
        })
        .collect()
}

/// The key set shared by every criteria of `list`.
///
/// # Errors
///
/// `InvalidArgument` when the list is empty or key sets differ.
pub fn ensure_same_keys(list: &[FieldCriteria]) -> AssertResult<BTreeSet<String>> {
    let first = list
        .first()
        .ok_or_else(|| AssertError::invalid_argument("rows", "at least one row is required"))?
        .keys();
    if let Some((i, other)) = list.iter().enumerate().find(|(_, c)| c.keys() != first) {
        return Err(AssertError::invalid_argument(
            "rows",
            format!(
                "row {} has fields {:?}, expected {:?}",
                i + 1,
                other.keys(),
                first
            ),
        ));
    }
    Ok(first)
}

/// Criteria of `expected` that match none of `records`
pub fn unmatched<'c>(
    records: &[BTreeMap<String, String>],
    expected: &'c [FieldCriteria],
) -> Vec<&'c FieldCriteria> {
    expected
        .iter()
        .filter(|criteria| !records.iter().any(|record| criteria.matches_record(record)))
        .collect()
}
