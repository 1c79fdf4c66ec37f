//! In-memory element model for unit testing
//!
//! Test doubles for every subject shape. State lives behind `Cell` /
//! `RefCell` so tests can change it while assertions hold shared
//! references, and visibility or values can be scheduled to flip after a
//! delay to exercise polling.
//!
//! ## Example
//!
//! ```ignore
//! let form = MockContainer::new("Login form")
//!     .with_element("User", MockElement::new("User").with_value("alice"))
//!     .with_element("Help", MockElement::new("Help").hidden().optional());
//! assert_that(&form).all_elements_are_displayed()?;
//! ```

use crate::model::{
    children_displayed, Child, Column, Container, Countable, Displayable, Element, Enableable,
    IndexedCollection, IndexedElements, Named, Readable, Selectable, Subject, Table, ValueList,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A value that switches to a new state once a deadline passes
#[derive(Debug, Clone)]
struct Scheduled<T> {
    at: Instant,
    value: T,
}

/// Mock leaf element
#[derive(Debug)]
pub struct MockElement {
    name: String,
    locator: Option<String>,
    optional: bool,
    displayed: Cell<bool>,
    enabled: Cell<bool>,
    selectable: bool,
    selected: Cell<bool>,
    value: RefCell<String>,
    text: RefCell<Option<String>>,
    full_text: Option<String>,
    tag_name: String,
    attributes: RefCell<BTreeMap<String, String>>,
    css: BTreeMap<String, String>,
    visibility_switch: Cell<Option<Instant>>,
    pending_value: RefCell<Option<Scheduled<String>>>,
    displayed_reads: Cell<usize>,
}

impl MockElement {
    /// Create a displayed, enabled, unselected element
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: None,
            optional: false,
            displayed: Cell::new(true),
            enabled: Cell::new(true),
            selectable: false,
            selected: Cell::new(false),
            value: RefCell::new(String::new()),
            text: RefCell::new(None),
            full_text: None,
            tag_name: "div".to_string(),
            attributes: RefCell::new(BTreeMap::new()),
            css: BTreeMap::new(),
            visibility_switch: Cell::new(None),
            pending_value: RefCell::new(None),
            displayed_reads: Cell::new(0),
        }
    }

    /// Set the locator path
    #[must_use]
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Start hidden
    #[must_use]
    pub fn hidden(self) -> Self {
        self.displayed.set(false);
        self
    }

    /// Mark as optional
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Start disabled
    #[must_use]
    pub fn disabled(self) -> Self {
        self.enabled.set(false);
        self
    }

    /// Give the element a selection state, initially unselected
    #[must_use]
    pub const fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    /// Start selectable and selected
    #[must_use]
    pub fn selected(self) -> Self {
        self.selected.set(true);
        self.selectable()
    }

    /// Set the value
    #[must_use]
    pub fn with_value(self, value: impl Into<String>) -> Self {
        *self.value.borrow_mut() = value.into();
        self
    }

    /// Set the visible text (defaults to the value)
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        *self.text.borrow_mut() = Some(text.into());
        self
    }

    /// Set the full text (defaults to the visible text)
    #[must_use]
    pub fn with_full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = Some(text.into());
        self
    }

    /// Set the tag name
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = tag.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into());
        self
    }

    /// Set a CSS property
    #[must_use]
    pub fn with_css(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.css.insert(name.into(), value.into());
        self
    }

    /// Toggle visibility once `delay` has elapsed from now
    #[must_use]
    pub fn toggles_visibility_after(self, delay: Duration) -> Self {
        self.visibility_switch.set(Some(Instant::now() + delay));
        self
    }

    /// Replace the value once `delay` has elapsed from now
    #[must_use]
    pub fn with_value_after(self, delay: Duration, value: impl Into<String>) -> Self {
        *self.pending_value.borrow_mut() = Some(Scheduled {
            at: Instant::now() + delay,
            value: value.into(),
        });
        self
    }

    /// Change visibility
    pub fn set_displayed(&self, displayed: bool) {
        self.visibility_switch.set(None);
        self.displayed.set(displayed);
    }

    /// Change enabled state
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Change selection state
    pub fn set_selected(&self, selected: bool) {
        self.selected.set(selected);
    }

    /// Change the value
    pub fn set_value(&self, value: impl Into<String>) {
        *self.pending_value.borrow_mut() = None;
        *self.value.borrow_mut() = value.into();
    }

    /// Change an attribute
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let _ = self
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    /// How many times visibility was queried
    #[must_use]
    pub fn displayed_reads(&self) -> usize {
        self.displayed_reads.get()
    }

    fn apply_schedule(&self) {
        if let Some(at) = self.visibility_switch.get() {
            if Instant::now() >= at {
                self.visibility_switch.set(None);
                self.displayed.set(!self.displayed.get());
            }
        }
        let due = self
            .pending_value
            .borrow()
            .as_ref()
            .is_some_and(|pending| Instant::now() >= pending.at);
        if due {
            if let Some(pending) = self.pending_value.borrow_mut().take() {
                *self.value.borrow_mut() = pending.value;
            }
        }
    }
}

impl Named for MockElement {
    fn loggable_name(&self) -> String {
        self.name.clone()
    }

    fn locator_path(&self) -> Option<String> {
        self.locator.clone()
    }
}

impl Displayable for MockElement {
    fn is_displayed(&self) -> bool {
        self.displayed_reads.set(self.displayed_reads.get() + 1);
        self.apply_schedule();
        self.displayed.get()
    }

    fn is_optional(&self) -> bool {
        self.optional
    }
}

impl Enableable for MockElement {
    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl Selectable for MockElement {
    fn is_selected(&self) -> bool {
        self.selected.get()
    }
}

impl Element for MockElement {
    fn as_selectable(&self) -> Option<&dyn Selectable> {
        self.selectable.then_some(self as &dyn Selectable)
    }
}

impl Readable for MockElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn read_value(&self) -> String {
        self.apply_schedule();
        self.value.borrow().clone()
    }

    fn read_text(&self) -> String {
        self.text
            .borrow()
            .clone()
            .unwrap_or_else(|| self.read_value())
    }

    fn read_full_text(&self) -> String {
        self.full_text.clone().unwrap_or_else(|| self.read_text())
    }

    fn read_tag_name(&self) -> String {
        self.tag_name.clone()
    }

    fn read_css_value(&self, name: &str) -> String {
        self.css.get(name).cloned().unwrap_or_default()
    }
}

/// Child node of a [`MockContainer`]
#[derive(Debug)]
pub enum MockNode {
    /// Leaf element
    Element(MockElement),
    /// Nested container
    Container(MockContainer),
}

/// Mock container of named children
#[derive(Debug)]
pub struct MockContainer {
    name: String,
    locator: Option<String>,
    optional: bool,
    displayed: Cell<bool>,
    children: Vec<(String, MockNode)>,
}

impl MockContainer {
    /// Create an empty container without a locator
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: None,
            optional: false,
            displayed: Cell::new(true),
            children: Vec::new(),
        }
    }

    /// Container whose children are elements holding the given values
    #[must_use]
    pub fn with_fields(name: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        fields.iter().fold(Self::new(name), |container, (id, value)| {
            container.with_element(*id, MockElement::new(*id).with_value(*value))
        })
    }

    /// Give the container its own locator; its visibility is then read
    /// directly instead of derived from its children
    #[must_use]
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Start hidden (only meaningful with a locator)
    #[must_use]
    pub fn hidden(self) -> Self {
        self.displayed.set(false);
        self
    }

    /// Mark as optional
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Append an element child
    #[must_use]
    pub fn with_element(mut self, id: impl Into<String>, element: MockElement) -> Self {
        self.children.push((id.into(), MockNode::Element(element)));
        self
    }

    /// Append a nested container child
    #[must_use]
    pub fn with_container(mut self, id: impl Into<String>, container: Self) -> Self {
        self.children.push((id.into(), MockNode::Container(container)));
        self
    }

    /// Element child by exact id
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&MockElement> {
        self.children.iter().find_map(|(child_id, node)| match node {
            MockNode::Element(element) if child_id == id => Some(element),
            _ => None,
        })
    }

    /// Change visibility of a container with a locator
    pub fn set_displayed(&self, displayed: bool) {
        self.displayed.set(displayed);
    }
}

impl Named for MockContainer {
    fn loggable_name(&self) -> String {
        self.name.clone()
    }

    fn locator_path(&self) -> Option<String> {
        self.locator.clone()
    }
}

impl Displayable for MockContainer {
    fn is_displayed(&self) -> bool {
        if self.locator.is_some() {
            self.displayed.get()
        } else {
            children_displayed(self)
        }
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn visibility_parts(&self) -> Option<Vec<Child<'_>>> {
        self.locator.is_none().then(|| self.children())
    }
}

impl Container for MockContainer {
    fn locator(&self) -> Option<String> {
        self.locator.clone()
    }

    fn children(&self) -> Vec<Child<'_>> {
        self.children
            .iter()
            .map(|(id, node)| Child {
                id: id.as_str(),
                subject: match node {
                    MockNode::Element(element) => Subject::Element(element),
                    MockNode::Container(container) => Subject::Container(container),
                },
            })
            .collect()
    }
}

/// Mock indexed collection of containers
#[derive(Debug)]
pub struct MockCollection {
    name: String,
    displayed: Cell<bool>,
    containers: Vec<MockContainer>,
}

impl MockCollection {
    /// Create an empty collection
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            displayed: Cell::new(true),
            containers: Vec::new(),
        }
    }

    /// Append a member
    #[must_use]
    pub fn with_container(mut self, container: MockContainer) -> Self {
        self.containers.push(container);
        self
    }

    /// Append a member built from field values
    #[must_use]
    pub fn with_row(self, fields: &[(&str, &str)]) -> Self {
        let name = format!("{} #{}", self.name, self.containers.len() + 1);
        self.with_container(MockContainer::with_fields(name, fields))
    }

    /// Member by 0-based position
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<&MockContainer> {
        self.containers.get(offset)
    }
}

impl Named for MockCollection {
    fn loggable_name(&self) -> String {
        self.name.clone()
    }
}

impl Displayable for MockCollection {
    fn is_displayed(&self) -> bool {
        self.displayed.get()
    }
}

impl Countable for MockCollection {
    fn count(&self) -> usize {
        self.containers.len()
    }
}

impl IndexedCollection for MockCollection {
    fn containers(&self) -> Vec<&dyn Container> {
        self.containers
            .iter()
            .map(|container| container as &dyn Container)
            .collect()
    }
}

/// Mock indexed collection of elements
#[derive(Debug)]
pub struct MockElementList {
    name: String,
    elements: Vec<MockElement>,
}

impl MockElementList {
    /// Create an empty list
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// List of elements holding the given values
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: &[&str]) -> Self {
        values.iter().fold(Self::new(name), |list, value| {
            list.with_element(MockElement::new(*value).with_value(*value))
        })
    }

    /// Append a member
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Member by 0-based position
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<&MockElement> {
        self.elements.get(offset)
    }
}

impl Named for MockElementList {
    fn loggable_name(&self) -> String {
        self.name.clone()
    }
}

impl Displayable for MockElementList {
    fn is_displayed(&self) -> bool {
        self.elements.iter().any(Displayable::is_displayed)
    }
}

impl Countable for MockElementList {
    fn count(&self) -> usize {
        self.elements.len()
    }
}

impl ValueList for MockElementList {
    fn read_values(&self) -> Vec<String> {
        self.elements.iter().map(Readable::read_value).collect()
    }
}

impl IndexedElements for MockElementList {
    fn elements(&self) -> Vec<&dyn Element> {
        self.elements
            .iter()
            .map(|element| element as &dyn Element)
            .collect()
    }
}

/// Mock table column
#[derive(Debug)]
pub struct MockColumn {
    name: String,
    cells: Vec<MockElement>,
}

impl MockColumn {
    /// Create an empty column
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
        }
    }

    /// Column whose cells hold the given values
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: &[&str]) -> Self {
        let name = name.into();
        let cells = values
            .iter()
            .enumerate()
            .map(|(i, value)| MockElement::new(format!("{name}[{}]", i + 1)).with_value(*value))
            .collect();
        Self { name, cells }
    }

    /// Append a cell
    #[must_use]
    pub fn with_cell(mut self, cell: MockElement) -> Self {
        self.cells.push(cell);
        self
    }

    /// Cell by 0-based position
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<&MockElement> {
        self.cells.get(offset)
    }
}

impl Named for MockColumn {
    fn loggable_name(&self) -> String {
        self.name.clone()
    }
}

impl Displayable for MockColumn {
    fn is_displayed(&self) -> bool {
        self.cells.iter().any(Displayable::is_displayed)
    }
}

impl ValueList for MockColumn {
    fn read_values(&self) -> Vec<String> {
        self.cells.iter().map(Readable::read_value).collect()
    }
}

impl Column for MockColumn {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn cells(&self) -> Vec<&dyn Element> {
        self.cells.iter().map(|cell| cell as &dyn Element).collect()
    }
}

/// Mock table
#[derive(Debug)]
pub struct MockTable {
    name: String,
    locator: Option<String>,
    displayed: Cell<bool>,
    columns: Vec<MockColumn>,
}

impl MockTable {
    /// Create a table without columns
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: None,
            displayed: Cell::new(true),
            columns: Vec::new(),
        }
    }

    /// Set the locator path
    #[must_use]
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Append a column
    #[must_use]
    pub fn with_column(mut self, column: MockColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Column by exact name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&MockColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Change visibility
    pub fn set_displayed(&self, displayed: bool) {
        self.displayed.set(displayed);
    }
}

impl Named for MockTable {
    fn loggable_name(&self) -> String {
        self.name.clone()
    }

    fn locator_path(&self) -> Option<String> {
        self.locator.clone()
    }
}

impl Displayable for MockTable {
    fn is_displayed(&self) -> bool {
        self.displayed.get()
    }
}

impl Table for MockTable {
    fn columns(&self) -> Vec<&dyn Column> {
        self.columns
            .iter()
            .map(|column| column as &dyn Column)
            .collect()
    }
}
