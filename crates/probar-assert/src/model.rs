//! Queryable Element Model
//!
//! Read-only view of a rendered UI that assertions query. Implementations
//! live in the page-object layer (or in [`crate::mock`] for tests); this
//! crate never mutates them.
//!
//! Capabilities are split into small traits so a single generic
//! [`Assert`](crate::Assert) can offer exactly the checks a subject
//! supports:
//!
//! | Capability     | Trait            |
//! |----------------|------------------|
//! | displayable    | [`Displayable`]  |
//! | enableable     | [`Enableable`]   |
//! | selectable     | [`Selectable`]   |
//! | readable       | [`Readable`]     |
//! | collection     | [`Countable`], [`ValueList`], [`IndexedCollection`], [`IndexedElements`] |
//! | tabular        | [`Table`], [`Column`] |

use std::fmt;
use std::num::NonZeroUsize;

/// Anything that can be named in a failure message
pub trait Named {
    /// Human-readable name of the subject
    fn loggable_name(&self) -> String;

    /// Chain of locators from the page root down to this subject
    fn locator_path(&self) -> Option<String> {
        None
    }
}

/// Subjects with a visibility state
pub trait Displayable: Named {
    /// Current visibility, read without waiting
    fn is_displayed(&self) -> bool;

    /// Optional subjects are skipped by batch visibility checks
    fn is_optional(&self) -> bool {
        false
    }

    /// Children whose visibility defines this subject's own. Containers
    /// without a locator return their children here so that a failed
    /// visibility check reports every hidden child.
    fn visibility_parts(&self) -> Option<Vec<Child<'_>>> {
        None
    }
}

/// Subjects that can be enabled or disabled
pub trait Enableable: Named {
    /// Current enabled state
    fn is_enabled(&self) -> bool;
}

/// Subjects that can be checked or selected
pub trait Selectable: Named {
    /// Current selection state
    fn is_selected(&self) -> bool;

    /// Whether the selection state is meaningful for this subject. Only
    /// elements reached through `dyn Element` can answer `false`.
    fn supports_selection(&self) -> bool {
        true
    }
}

/// Subjects whose content can be read
pub trait Readable: Named {
    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, name: &str) -> Option<String>;

    /// Logical value (input value, or text for static elements)
    fn read_value(&self) -> String;

    /// Visible text
    fn read_text(&self) -> String;

    /// Text including hidden descendants
    fn read_full_text(&self) -> String {
        self.read_text()
    }

    /// Tag name
    fn read_tag_name(&self) -> String;

    /// Computed CSS property value
    fn read_css_value(&self, name: &str) -> String;
}

/// Leaf element: displayable, enableable and readable
///
/// Checkboxes, radio buttons and options also expose their selection
/// state through [`Element::as_selectable`], so it stays reachable when
/// the element is looked up by id or row.
pub trait Element: Displayable + Enableable + Readable {
    /// Selection view of this element, `None` when it has no such state
    fn as_selectable(&self) -> Option<&dyn Selectable> {
        None
    }
}

impl Selectable for dyn Element + '_ {
    fn is_selected(&self) -> bool {
        self.as_selectable().is_some_and(Selectable::is_selected)
    }

    fn supports_selection(&self) -> bool {
        self.as_selectable().is_some()
    }
}

/// Named mapping of child subjects
pub trait Container: Displayable {
    /// Locator of the container itself. Containers without one have a
    /// derived visibility, see [`children_displayed`], and should return
    /// their children from [`Displayable::visibility_parts`].
    fn locator(&self) -> Option<String> {
        None
    }

    /// Children in declaration order
    fn children(&self) -> Vec<Child<'_>>;

    /// Child by id, compared after [`sanitize_key`]
    fn child(&self, id: &str) -> Option<Subject<'_>> {
        let wanted = sanitize_key(id);
        self.children()
            .into_iter()
            .find(|child| sanitize_key(&child.id) == wanted)
            .map(|child| child.subject)
    }
}

/// Subjects with a member count
pub trait Countable: Named {
    /// Number of members
    fn count(&self) -> usize;
}

/// Subjects that read as an ordered list of values
pub trait ValueList: Named {
    /// Values in order
    fn read_values(&self) -> Vec<String>;
}

/// Ordered sequence of containers, such as repeated cards or list rows
pub trait IndexedCollection: Displayable + Countable {
    /// Members in order
    fn containers(&self) -> Vec<&dyn Container>;
}

/// Ordered sequence of elements
pub trait IndexedElements: Displayable + Countable + ValueList {
    /// Members in order
    fn elements(&self) -> Vec<&dyn Element>;
}

/// Table column: cells addressed by 1-based row index
pub trait Column: Displayable + ValueList {
    /// Column header name
    fn name(&self) -> String;

    /// Cells top to bottom
    fn cells(&self) -> Vec<&dyn Element>;

    /// Cell at a row
    fn cell(&self, row: RowIndex) -> Option<&dyn Element> {
        self.cells().get(row.offset()).copied()
    }

    /// Number of rows
    fn rows_count(&self) -> usize {
        self.cells().len()
    }
}

/// Rows × named columns
pub trait Table: Displayable {
    /// Columns left to right
    fn columns(&self) -> Vec<&dyn Column>;

    /// Column by header name, compared after [`sanitize_key`]
    fn find_column_by_name(&self, name: &str) -> Option<&dyn Column> {
        let wanted = sanitize_key(name);
        self.columns()
            .into_iter()
            .find(|column| sanitize_key(&column.name()) == wanted)
    }

    /// Number of rows
    fn rows_count(&self) -> usize {
        self.columns()
            .iter()
            .map(|column| column.rows_count())
            .max()
            .unwrap_or(0)
    }

    /// Value of one cell, `None` when the column or row does not exist
    fn cell_value(&self, row: RowIndex, column: &str) -> Option<String> {
        self.find_column_by_name(column)
            .and_then(|c| c.cell(row))
            .map(|cell| cell.read_value())
    }
}

/// Field lookup used by map criteria. Keys arrive already sanitized.
pub trait FieldSource {
    /// Value of a field, `None` when the subject has no such field
    fn field(&self, key: &str) -> Option<String>;
}

impl FieldSource for dyn Container + '_ {
    fn field(&self, key: &str) -> Option<String> {
        match self.child(key)? {
            Subject::Element(element) => Some(element.read_value()),
            _ => None,
        }
    }
}

/// 1-based row number. Absence of a row is `Option::None`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowIndex(NonZeroUsize);

impl RowIndex {
    /// Create from a 1-based number, `None` for zero
    #[must_use]
    pub const fn new(row: usize) -> Option<Self> {
        match NonZeroUsize::new(row) {
            Some(row) => Some(Self(row)),
            None => None,
        }
    }

    /// Create from a 0-based offset
    #[must_use]
    pub const fn from_offset(offset: usize) -> Self {
        match NonZeroUsize::new(offset.saturating_add(1)) {
            Some(row) => Self(row),
            None => Self(NonZeroUsize::MAX),
        }
    }

    /// The 1-based row number
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// The 0-based offset
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0.get() - 1
    }

    /// Convert a search result to the legacy integer convention where
    /// any value `<= 0` means "not found".
    #[must_use]
    pub fn to_legacy(found: Option<Self>) -> i64 {
        found.map_or(0, |row| i64::try_from(row.get()).unwrap_or(i64::MAX))
    }

    /// Read a legacy integer row reference; `<= 0` is "not found"
    #[must_use]
    pub fn from_legacy(row: i64) -> Option<Self> {
        usize::try_from(row).ok().and_then(Self::new)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a field key or child id: trimmed, lowercased, inner
/// whitespace runs collapsed to one space.
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse whitespace runs to single spaces and trim the ends
#[must_use]
pub fn normalize_space(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derived visibility of a container without its own locator: every
/// non-optional child is displayed.
pub fn children_displayed<C: Container + ?Sized>(container: &C) -> bool {
    container
        .children()
        .iter()
        .filter(|child| !child.subject.is_optional())
        .all(|child| child.subject.is_displayed())
}

/// Non-optional leaf elements of a container tree, depth first.
/// Optional nested containers are skipped with their whole subtree.
pub fn required_leaves<C: Container + ?Sized>(container: &C) -> Vec<(String, &dyn Element)> {
    let mut leaves = Vec::new();
    for child in container.children() {
        match child.subject {
            _ if child.subject.is_optional() => {}
            Subject::Element(element) => leaves.push((child.id.to_string(), element)),
            Subject::Container(nested) => leaves.extend(required_leaves(nested)),
            _ => {}
        }
    }
    leaves
}

/// A named child of a container
#[derive(Debug, Clone, Copy)]
pub struct Child<'a> {
    /// Child id as declared by the container
    pub id: &'a str,
    /// The child itself
    pub subject: Subject<'a>,
}

/// Runtime shape of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Leaf element
    Element,
    /// Container of named children
    Container,
    /// Indexed collection of containers
    Collection,
    /// Indexed collection of elements
    Elements,
    /// Table column
    Column,
    /// Table
    Table,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Element => "element",
            Self::Container => "container",
            Self::Collection => "collection",
            Self::Elements => "element list",
            Self::Column => "column",
            Self::Table => "table",
        };
        f.write_str(name)
    }
}

/// Any subject, tagged by its shape
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    /// Leaf element
    Element(&'a dyn Element),
    /// Container of named children
    Container(&'a dyn Container),
    /// Indexed collection of containers
    Collection(&'a dyn IndexedCollection),
    /// Indexed collection of elements
    Elements(&'a dyn IndexedElements),
    /// Table column
    Column(&'a dyn Column),
    /// Table
    Table(&'a dyn Table),
}

impl<'a> Subject<'a> {
    /// Runtime shape
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

    /// The element, if this subject is one
    #[must_use]
    pub fn as_element(&self) -> Option<&'a dyn Element> {
        match *self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The container, if this subject is one
    #[must_use]
    pub fn as_container(&self) -> Option<&'a dyn Container> {
        match *self {
            Self::Container(container) => Some(container),
            _ => None,
        }
    }
}

impl Named for Subject<'_> {
    fn loggable_name(&self) -> String {
        match self {
            Self::Element(s) => s.loggable_name(),
            Self::Container(s) => s.loggable_name(),
            Self::Collection(s) => s.loggable_name(),
            Self::Elements(s) => s.loggable_name(),
            Self::Column(s) => s.loggable_name(),
            Self::Table(s) => s.loggable_name(),
        }
    }

    fn locator_path(&self) -> Option<String> {
        match self {
            Self::Element(s) => s.locator_path(),
            Self::Container(s) => s.locator_path(),
            Self::Collection(s) => s.locator_path(),
            Self::Elements(s) => s.locator_path(),
            Self::Column(s) => s.locator_path(),
            Self::Table(s) => s.locator_path(),
        }
    }
}

impl Displayable for Subject<'_> {
    fn is_displayed(&self) -> bool {
        match self {
            Self::Element(s) => s.is_displayed(),
            Self::Container(s) => s.is_displayed(),
            Self::Collection(s) => s.is_displayed(),
            Self::Elements(s) => s.is_displayed(),
            Self::Column(s) => s.is_displayed(),
            Self::Table(s) => s.is_displayed(),
        }
    }

    fn is_optional(&self) -> bool {
        match self {
            Self::Element(s) => s.is_optional(),
            Self::Container(s) => s.is_optional(),
            Self::Collection(s) => s.is_optional(),
            Self::Elements(s) => s.is_optional(),
            Self::Column(s) => s.is_optional(),
            Self::Table(s) => s.is_optional(),
        }
    }

    fn visibility_parts(&self) -> Option<Vec<Child<'_>>> {
        match self {
            Self::Element(s) => s.visibility_parts(),
            Self::Container(s) => s.visibility_parts(),
            Self::Collection(s) => s.visibility_parts(),
            Self::Elements(s) => s.visibility_parts(),
            Self::Column(s) => s.visibility_parts(),
            Self::Table(s) => s.visibility_parts(),
        }
    }
}

impl fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("shape", &self.shape())
            .field("name", &self.loggable_name())
            .finish()
    }
}

impl<'a> From<&'a dyn Element> for Subject<'a> {
    fn from(element: &'a dyn Element) -> Self {
        Self::Element(element)
    }
}

impl<'a> From<&'a dyn Container> for Subject<'a> {
    fn from(container: &'a dyn Container) -> Self {
        Self::Container(container)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockColumn, MockContainer, MockElement, MockTable};

    mod sanitize {
        use super::*;

        #[test]
        fn test_sanitize_key_trims_and_lowercases() {
            assert_eq!(sanitize_key("  First   Name "), "first name");
            assert_eq!(sanitize_key("ID"), "id");
            assert_eq!(sanitize_key(""), "");
        }

        #[test]
        fn test_normalize_space_keeps_case() {
            assert_eq!(normalize_space(" Hello \n  World "), "Hello World");
        }
    }

    mod row_index {
        use super::*;

        #[test]
        fn test_zero_is_not_a_row() {
            assert!(RowIndex::new(0).is_none());
            assert_eq!(RowIndex::new(3).unwrap().get(), 3);
            assert_eq!(RowIndex::new(3).unwrap().offset(), 2);
            assert_eq!(RowIndex::from_offset(0).get(), 1);
        }

        #[test]
        fn test_legacy_conversion() {
            assert_eq!(RowIndex::to_legacy(None), 0);
            assert_eq!(RowIndex::to_legacy(RowIndex::new(4)), 4);
            assert_eq!(RowIndex::from_legacy(0), None);
            assert_eq!(RowIndex::from_legacy(-7), None);
            assert_eq!(RowIndex::from_legacy(2), RowIndex::new(2));
        }
    }

    mod container {
        use super::*;

        fn form() -> MockContainer {
            MockContainer::new("Form")
                .with_element("Login", MockElement::new("Login").with_value("alice"))
                .with_element("Remember me", MockElement::new("Remember").hidden().optional())
                .with_container(
                    "Footer",
                    MockContainer::new("Footer")
                        .with_element("Help", MockElement::new("Help")),
                )
        }

        #[test]
        fn test_child_lookup_is_sanitized() {
            let form = form();
            let child = form.child("  REMEMBER   me").unwrap();
            assert_eq!(child.shape(), Shape::Element);
            assert!(form.child("missing").is_none());
        }

        #[test]
        fn test_children_displayed_skips_optional() {
            let form = form();
            assert!(children_displayed(&form));
        }

        #[test]
        fn test_children_displayed_fails_on_hidden_required_child() {
            let form = form().with_element("Password", MockElement::new("Password").hidden());
            assert!(!children_displayed(&form));
        }

        #[test]
        fn test_required_leaves_is_deep() {
            let form = form();
            let ids: Vec<_> = required_leaves(&form).into_iter().map(|(id, _)| id).collect();
            assert_eq!(ids, vec!["Login", "Help"]);
        }

        #[test]
        fn test_container_field_reads_child_value() {
            let form = form();
            let dynamic: &dyn Container = &form;
            assert_eq!(dynamic.field("login"), Some("alice".to_string()));
            assert_eq!(dynamic.field("footer"), None);
            assert_eq!(dynamic.field("absent"), None);
        }
    }

    mod table {
        use super::*;

        #[test]
        fn test_cell_value_and_rows_count() {
            let table = MockTable::new("Users")
                .with_column(MockColumn::with_values("Name", &["Ann", "Bob"]))
                .with_column(MockColumn::with_values("Role", &["admin"]));
            assert_eq!(table.rows_count(), 2);
            assert_eq!(
                table.cell_value(RowIndex::new(2).unwrap(), " name "),
                Some("Bob".to_string())
            );
            assert_eq!(table.cell_value(RowIndex::new(2).unwrap(), "Role"), None);
            assert_eq!(table.cell_value(RowIndex::new(1).unwrap(), "Age"), None);
        }
    }

    #[test]
    fn test_subject_delegates() {
        let element = MockElement::new("Logo").hidden().optional();
        let subject = Subject::Element(&element);
        assert_eq!(subject.loggable_name(), "Logo");
        assert!(!subject.is_displayed());
        assert!(subject.is_optional());
        assert!(subject.as_element().is_some());
        assert!(subject.as_container().is_none());
        assert_eq!(subject.shape().to_string(), "element");
    }
}
