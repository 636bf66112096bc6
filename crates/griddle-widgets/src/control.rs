#![forbid(unsafe_code)]

//! Filter controls: the child contract of the filters panel, plus the
//! stock control types (text, range, select).
//!
//! A control owns one slot in the panel's pending filters mapping,
//! addressed by a dotted `name` path. It writes edits straight into the
//! shared [`Observable<Value>`] the panel hands out; the panel itself only
//! ever reads controls through the [`FilterControl`] trait.
//!
//! Clearing writes an empty string into the slot rather than removing the
//! key: the apply step purges empty-string leaves, so a cleared control
//! vanishes from the committed mapping on the next apply.

use std::cell::RefCell;
use std::rc::Rc;

use griddle_core::{Observable, Value, path};

/// Contract every filter control exposes to the panel.
pub trait FilterControl {
    /// Dotted slot in the pending filters mapping, e.g. `price` or
    /// `created_at.from`.
    fn name(&self) -> &str;

    /// Human-readable label, shown in the panel and in previews.
    fn label(&self) -> &str;

    /// Reset the control's slot to empty.
    fn clear(&mut self);

    /// Whether the control currently holds a non-empty value.
    fn has_data(&self) -> bool;

    /// Whether the control should be rendered. Driven externally, e.g. by
    /// grid column visibility.
    fn is_visible(&self) -> bool;

    /// Short human-readable rendering of the current value. Empty when
    /// there is nothing meaningful to show.
    fn preview(&self) -> String;
}

/// Shared handle to a filter control.
///
/// Equality is reference identity: two handles are equal iff they point at
/// the same control instance. That is the membership test the panel's
/// active list uses.
#[derive(Clone)]
pub struct ControlHandle(Rc<RefCell<dyn FilterControl>>);

impl ControlHandle {
    pub fn new(control: impl FilterControl + 'static) -> Self {
        Self(Rc::new(RefCell::new(control)))
    }

    /// Wrap an already-shared control. Lets callers keep a typed handle to
    /// the concrete control alongside the panel's erased one.
    pub fn from_rc<C: FilterControl + 'static>(control: Rc<RefCell<C>>) -> Self {
        Self(control)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.0.borrow().name().to_owned()
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.0.borrow().label().to_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.0.borrow().has_data()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.0.borrow().is_visible()
    }

    #[must_use]
    pub fn preview(&self) -> String {
        self.0.borrow().preview()
    }
}

impl PartialEq for ControlHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let control = self.0.borrow();
        f.debug_struct("ControlHandle")
            .field("name", &control.name())
            .field("label", &control.label())
            .finish_non_exhaustive()
    }
}

/// Free-text filter: one string slot, previewed verbatim.
pub struct TextFilter {
    name: String,
    label: String,
    visible: bool,
    filters: Observable<Value>,
}

impl TextFilter {
    pub fn new(
        filters: Observable<Value>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            visible: true,
            filters,
        }
    }

    pub fn set_value(&self, value: &str) {
        let name = self.name.clone();
        let value = Value::from(value);
        self.filters.update(|root| root.set_at(&name, value));
    }

    #[must_use]
    pub fn value(&self) -> String {
        read_str(&self.filters, &self.name)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl FilterControl for TextFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn clear(&mut self) {
        self.set_value("");
    }

    fn has_data(&self) -> bool {
        !self.value().is_empty()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn preview(&self) -> String {
        self.value()
    }
}

/// Range filter: a `{from, to}` map slot. Either bound may be empty.
pub struct RangeFilter {
    name: String,
    label: String,
    visible: bool,
    filters: Observable<Value>,
}

impl RangeFilter {
    pub fn new(
        filters: Observable<Value>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            visible: true,
            filters,
        }
    }

    pub fn set_from(&self, value: &str) {
        self.write_bound("from", value);
    }

    pub fn set_to(&self, value: &str) {
        self.write_bound("to", value);
    }

    #[must_use]
    pub fn from(&self) -> String {
        read_str(&self.filters, &path::join(&self.name, "from"))
    }

    #[must_use]
    pub fn to(&self) -> String {
        read_str(&self.filters, &path::join(&self.name, "to"))
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn write_bound(&self, bound: &str, value: &str) {
        let slot = path::join(&self.name, bound);
        let value = Value::from(value);
        self.filters.update(|root| root.set_at(&slot, value));
    }
}

impl FilterControl for RangeFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn clear(&mut self) {
        self.set_from("");
        self.set_to("");
    }

    fn has_data(&self) -> bool {
        !self.from().is_empty() || !self.to().is_empty()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn preview(&self) -> String {
        match (self.from(), self.to()) {
            (from, to) if from.is_empty() && to.is_empty() => String::new(),
            (from, to) if to.is_empty() => format!("{from} -"),
            (from, to) if from.is_empty() => format!("- {to}"),
            (from, to) => format!("{from} - {to}"),
        }
    }
}

/// Select filter: a string slot constrained to a fixed option list.
/// The preview shows the selected option's label, not its raw value.
pub struct SelectFilter {
    name: String,
    label: String,
    visible: bool,
    options: Vec<(String, String)>,
    filters: Observable<Value>,
}

impl SelectFilter {
    pub fn new(
        filters: Observable<Value>,
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<(String, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            visible: true,
            options,
            filters,
        }
    }

    pub fn select(&self, value: &str) {
        let name = self.name.clone();
        let value = Value::from(value);
        self.filters.update(|root| root.set_at(&name, value));
    }

    #[must_use]
    pub fn selected(&self) -> String {
        read_str(&self.filters, &self.name)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl FilterControl for SelectFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn clear(&mut self) {
        self.select("");
    }

    fn has_data(&self) -> bool {
        !self.selected().is_empty()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn preview(&self) -> String {
        let selected = self.selected();
        self.options
            .iter()
            .find(|(value, _)| *value == selected)
            .map(|(_, label)| label.clone())
            .unwrap_or_default()
    }
}

fn read_str(filters: &Observable<Value>, slot: &str) -> String {
    filters.with(|root| {
        root.at(slot)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> Observable<Value> {
        Observable::new(Value::map())
    }

    #[test]
    fn text_filter_round_trip() {
        let shared = filters();
        let control = TextFilter::new(shared.clone(), "title", "Title");
        assert!(!control.has_data());

        control.set_value("widget");
        assert!(control.has_data());
        assert_eq!(control.preview(), "widget");
        assert_eq!(shared.with(|v| v.at("title").cloned()), Some(Value::from("widget")));
    }

    #[test]
    fn text_filter_clear_writes_empty_string() {
        let shared = filters();
        let mut control = TextFilter::new(shared.clone(), "title", "Title");
        control.set_value("widget");
        control.clear();
        assert!(!control.has_data());
        assert_eq!(shared.with(|v| v.at("title").cloned()), Some(Value::from("")));
    }

    #[test]
    fn range_filter_nested_slot_and_preview() {
        let shared = filters();
        let control = RangeFilter::new(shared.clone(), "price", "Price");
        assert_eq!(control.preview(), "");

        control.set_from("10");
        assert!(control.has_data());
        assert_eq!(control.preview(), "10 -");

        control.set_to("99");
        assert_eq!(control.preview(), "10 - 99");
        assert_eq!(
            shared.with(|v| v.at("price.from").cloned()),
            Some(Value::from("10"))
        );
    }

    #[test]
    fn select_filter_previews_label() {
        let shared = filters();
        let control = SelectFilter::new(
            shared,
            "status",
            "Status",
            vec![
                ("1".to_owned(), "Enabled".to_owned()),
                ("0".to_owned(), "Disabled".to_owned()),
            ],
        );
        control.select("1");
        assert!(control.has_data());
        assert_eq!(control.preview(), "Enabled");

        // Unknown value: data present, nothing previewable.
        control.select("99");
        assert!(control.has_data());
        assert_eq!(control.preview(), "");
    }

    #[test]
    fn handle_equality_is_identity() {
        let shared = filters();
        let a = ControlHandle::new(TextFilter::new(shared.clone(), "a", "A"));
        let b = ControlHandle::new(TextFilter::new(shared, "a", "A"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
