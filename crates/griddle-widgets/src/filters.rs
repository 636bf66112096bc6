#![forbid(unsafe_code)]

//! Collapsible filters panel for a data grid.
//!
//! The panel tracks two filter mappings: `filters`, the pending values the
//! user is editing, and `applied`, the last committed state that actually
//! drives the grid query. `apply()` commits pending values (minus empty
//! leaves); `cancel()` discards pending edits by copying `applied` back.
//!
//! Two derived observables follow the child controls: `active`, the
//! controls currently holding data, and `previews`, the label/preview
//! projection of the active set shown in the panel header.
//!
//! # Wiring
//!
//! All reactive wiring is explicit and registered at construction:
//!
//! - `active` change → rebuild `previews`;
//! - `applied` change → `cancel()`, then recompute `active`;
//! - `applied` change → publish to the states store at the configured
//!   namespace (bidirectional link, outbound) and export to the grid
//!   source provider at `params.filters`;
//! - states-store write at the namespace → set `applied` (inbound link).
//!
//! Equality-gated notification in both [`Observable`] and [`StateStore`]
//! makes the applied ⇄ store cycle converge after a single hop.

use std::cell::RefCell;
use std::rc::Rc;

use griddle_core::{Observable, StateStore, Subscription, Value, path};
use tracing::{debug, trace};

use crate::collapsible::Collapsible;
use crate::control::ControlHandle;

/// Provider path the committed filters are exported to; the grid's
/// data-fetch layer reads it to build the actual query.
pub const EXPORT_PATH: &str = "params.filters";

/// Default namespace in the states store the panel links `applied` to.
pub const DEFAULT_NAMESPACE: &str = "current.filters";

/// Default view template identifier.
pub const DEFAULT_TEMPLATE: &str = "ui/grid/filters/filters";

/// One entry of the applied-filters summary row.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPreview {
    pub label: String,
    pub preview: String,
    pub elem: ControlHandle,
}

/// Panel configuration.
#[derive(Debug, Clone)]
pub struct FiltersOptions {
    template: String,
    applied: Value,
    namespace: String,
}

impl Default for FiltersOptions {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_owned(),
            applied: Value::map(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
        }
    }
}

impl FiltersOptions {
    /// View template identifier.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Initial committed-filter mapping. Ignored when the states store
    /// already holds a value at the namespace (e.g. restored bookmarks).
    #[must_use]
    pub fn applied(mut self, applied: Value) -> Self {
        self.applied = applied;
        self
    }

    /// States-store path the applied mapping is linked to.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

/// Collapsible filters panel: pending vs. applied filter state, active
/// controls, and previews, linked to the grid's shared providers.
pub struct FiltersPanel {
    collapsible: Collapsible,
    template: String,
    elems: Rc<RefCell<Vec<ControlHandle>>>,
    filters: Observable<Value>,
    applied: Observable<Value>,
    active: Observable<Vec<ControlHandle>>,
    previews: Observable<Vec<FilterPreview>>,
    _subscriptions: Vec<Subscription>,
}

impl FiltersPanel {
    /// Build a panel linked to the grid's `source` provider (query
    /// parameters) and `states` provider (persisted grid state).
    ///
    /// Seeds `applied` from the states store when it already holds a value
    /// at the namespace, else from `options.applied`, then publishes the
    /// seed both ways and runs the initial `cancel()` / `extract_active()`.
    #[must_use]
    pub fn new(source: &StateStore, states: &StateStore, options: FiltersOptions) -> Self {
        let seed = match states.get(&options.namespace) {
            Value::Null => options.applied.clone(),
            restored => restored,
        };

        let elems: Rc<RefCell<Vec<ControlHandle>>> = Rc::new(RefCell::new(Vec::new()));
        let filters = Observable::new(Value::map());
        let applied = Observable::new(seed.clone());
        let active = Observable::new(Vec::new());
        let previews = Observable::new(Vec::new());

        let mut subscriptions = Vec::new();

        // active -> previews
        {
            let previews = previews.clone();
            subscriptions.push(active.subscribe(move |elems: &Vec<ControlHandle>| {
                previews.set(build_previews(elems));
            }));
        }

        // applied -> cancel, then extract_active. Resyncing the pending
        // values first matters: controls read their slots out of `filters`,
        // so the active list must be computed against the new state.
        {
            let filters = filters.clone();
            let active = active.clone();
            let elems = Rc::clone(&elems);
            subscriptions.push(applied.subscribe(move |value: &Value| {
                filters.set(value.clone());
                active.set(collect_active(&elems.borrow()));
            }));
        }

        // applied -> states link (outbound) and source export.
        {
            let states = states.clone();
            let source = source.clone();
            let namespace = options.namespace.clone();
            subscriptions.push(applied.subscribe(move |value: &Value| {
                states.set(&namespace, value.clone());
                source.set(EXPORT_PATH, value.clone());
            }));
        }

        // states link (inbound): external commits land in `applied`.
        {
            let applied = applied.clone();
            subscriptions.push(states.subscribe(&options.namespace, move |value: &Value| {
                applied.set(value.clone());
            }));
        }

        let panel = Self {
            collapsible: Collapsible::new(),
            template: options.template,
            elems,
            filters,
            applied,
            active,
            previews,
            _subscriptions: subscriptions,
        };

        states.set(&options.namespace, seed.clone());
        source.set(EXPORT_PATH, seed);
        panel.cancel();
        panel.extract_active();
        panel
    }

    /// Register a child control. Recomputes the active list right away: a
    /// control added after state restore may already hold data.
    pub fn add_control(&self, control: ControlHandle) {
        self.elems.borrow_mut().push(control);
        self.extract_active();
    }

    /// Clear one control, or every active control when `filter` is `None`,
    /// and commit immediately.
    pub fn clear(&self, filter: Option<&ControlHandle>) {
        match filter {
            Some(control) => {
                debug!(all = false, "clearing filter");
                control.clear();
            }
            None => {
                let active = self.active.get();
                debug!(all = true, cleared = active.len(), "clearing filters");
                for control in &active {
                    control.clear();
                }
            }
        }
        self.apply();
    }

    /// Commit pending values: flatten, drop empty-string leaves, unflatten,
    /// store as `applied`. The sole writer of the applied mapping.
    pub fn apply(&self) {
        let flat = path::flatten(&self.filters.get());
        let total = flat.len();
        let kept: Vec<_> = flat
            .into_iter()
            .filter(|(_, leaf)| !leaf.is_empty_str())
            .collect();
        debug!(total, kept = kept.len(), "applying filters");
        self.applied.set(path::unflatten(kept));
    }

    /// Discard pending edits: reset `filters` to a copy of `applied`.
    pub fn cancel(&self) {
        trace!("resetting pending filters to applied state");
        self.filters.set(self.applied.get());
    }

    /// Whether the expanded body should render: the panel is open and at
    /// least one control is visible.
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.collapsible.is_open() && self.has_visible()
    }

    /// A control is shown when its own visibility flag says so, or when it
    /// is active: an applied filter must stay reachable for clearing even
    /// if its grid column was hidden.
    #[must_use]
    pub fn is_filter_visible(&self, filter: &ControlHandle) -> bool {
        filter.is_visible() || self.is_filter_active(filter)
    }

    /// Membership in the active list, by control identity.
    #[must_use]
    pub fn is_filter_active(&self, filter: &ControlHandle) -> bool {
        self.active.with(|active| active.contains(filter))
    }

    #[must_use]
    pub fn has_visible(&self) -> bool {
        self.elems
            .borrow()
            .iter()
            .any(|control| self.is_filter_visible(control))
    }

    /// Recompute `active`: the child controls holding data, in child order.
    /// Idempotent; equality gating suppresses redundant notifications.
    pub fn extract_active(&self) {
        let next = collect_active(&self.elems.borrow());
        self.active.set(next);
    }

    /// Rebuild `previews` from an ordered control sequence, dropping
    /// entries whose preview is empty. Runs automatically whenever
    /// `active` changes.
    pub fn extract_previews(&self, elems: &[ControlHandle]) {
        self.previews.set(build_previews(elems));
    }

    /// Pending filter values; controls bind their slots to this.
    #[must_use]
    pub fn filters(&self) -> &Observable<Value> {
        &self.filters
    }

    /// Last committed filter values.
    #[must_use]
    pub fn applied(&self) -> &Observable<Value> {
        &self.applied
    }

    /// Controls currently holding data, in child order.
    #[must_use]
    pub fn active(&self) -> &Observable<Vec<ControlHandle>> {
        &self.active
    }

    /// Label/preview projection of the active controls.
    #[must_use]
    pub fn previews(&self) -> &Observable<Vec<FilterPreview>> {
        &self.previews
    }

    /// Snapshot of the child controls, in insertion order.
    #[must_use]
    pub fn controls(&self) -> Vec<ControlHandle> {
        self.elems.borrow().clone()
    }

    /// Open/close behavior of the panel chrome.
    #[must_use]
    pub fn collapsible(&self) -> &Collapsible {
        &self.collapsible
    }

    /// View template identifier.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl std::fmt::Debug for FiltersPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiltersPanel")
            .field("template", &self.template)
            .field("controls", &self.elems.borrow().len())
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

fn collect_active(elems: &[ControlHandle]) -> Vec<ControlHandle> {
    elems
        .iter()
        .filter(|control| control.has_data())
        .cloned()
        .collect()
}

fn build_previews(elems: &[ControlHandle]) -> Vec<FilterPreview> {
    elems
        .iter()
        .map(|control| FilterPreview {
            label: control.label(),
            preview: control.preview(),
            elem: control.clone(),
        })
        .filter(|entry| !entry.preview.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::TextFilter;

    fn panel() -> (StateStore, StateStore, FiltersPanel) {
        let source = StateStore::new();
        let states = StateStore::new();
        let panel = FiltersPanel::new(&source, &states, FiltersOptions::default());
        (source, states, panel)
    }

    #[test]
    fn defaults() {
        let (_, _, panel) = panel();
        assert_eq!(panel.template(), DEFAULT_TEMPLATE);
        assert_eq!(panel.applied().get(), Value::map());
        assert_eq!(panel.filters().get(), Value::map());
        assert!(panel.active().get().is_empty());
        assert!(panel.previews().get().is_empty());
    }

    #[test]
    fn apply_purges_empty_string_leaves() {
        let (_, _, panel) = panel();
        panel.filters().update(|root| {
            root.set_at("a", Value::from(""));
            root.set_at("b.c", Value::from("x"));
        });
        panel.apply();

        let expected: Value =
            serde_json::from_value(serde_json::json!({ "b": { "c": "x" } })).unwrap();
        assert_eq!(panel.applied().get(), expected);
    }

    #[test]
    fn apply_keeps_null_leaves() {
        let (_, _, panel) = panel();
        panel.filters().update(|root| root.set_at("flag", Value::Null));
        panel.apply();
        assert_eq!(panel.applied().get().at("flag"), Some(&Value::Null));
    }

    #[test]
    fn apply_is_idempotent() {
        let (_, _, panel) = panel();
        panel
            .filters()
            .update(|root| root.set_at("status", Value::from("enabled")));
        panel.apply();
        let first = panel.applied().get();
        let version = panel.applied().version();
        panel.apply();
        assert_eq!(panel.applied().get(), first);
        assert_eq!(panel.applied().version(), version);
    }

    #[test]
    fn cancel_then_apply_round_trips() {
        let (_, _, panel) = panel();
        panel
            .filters()
            .update(|root| root.set_at("status", Value::from("enabled")));
        panel.apply();
        let committed = panel.applied().get();

        panel.cancel();
        panel.apply();
        assert_eq!(panel.applied().get(), committed);
    }

    #[test]
    fn cancel_does_not_alias_applied() {
        let (_, _, panel) = panel();
        panel
            .filters()
            .update(|root| root.set_at("status", Value::from("enabled")));
        panel.apply();
        panel.cancel();

        // Mutating pending state must leave the committed mapping alone.
        panel
            .filters()
            .update(|root| root.set_at("status", Value::from("changed")));
        assert_eq!(
            panel.applied().get().at("status"),
            Some(&Value::from("enabled"))
        );
    }

    #[test]
    fn extract_active_preserves_child_order() {
        let (_, _, panel) = panel();
        let shared = panel.filters().clone();
        let a = ControlHandle::new(TextFilter::new(shared.clone(), "a", "A"));
        let b = ControlHandle::new(TextFilter::new(shared.clone(), "b", "B"));
        let c = ControlHandle::new(TextFilter::new(shared, "c", "C"));
        panel.add_control(a.clone());
        panel.add_control(b.clone());
        panel.add_control(c.clone());

        panel.filters().update(|root| {
            root.set_at("b", Value::from("2"));
            root.set_at("c", Value::from("3"));
        });
        panel.extract_active();

        assert_eq!(panel.active().get(), vec![b, c]);
        assert!(!panel.is_filter_active(&a));
    }

    #[test]
    fn extract_previews_projects_a_given_sequence() {
        let (_, _, panel) = panel();
        let shared = panel.filters().clone();
        let control = ControlHandle::new(TextFilter::new(shared, "status", "Status"));
        panel
            .filters()
            .update(|root| root.set_at("status", Value::from("Enabled")));

        panel.extract_previews(&[control.clone()]);
        assert_eq!(
            panel.previews().get(),
            vec![FilterPreview {
                label: "Status".to_owned(),
                preview: "Enabled".to_owned(),
                elem: control,
            }]
        );
    }

    #[test]
    fn previews_drop_empty_entries() {
        let (_, _, panel) = panel();
        let shared = panel.filters().clone();
        let status = ControlHandle::new(TextFilter::new(shared.clone(), "status", "Status"));
        let date = ControlHandle::new(TextFilter::new(shared, "date", "Date"));
        panel.add_control(status.clone());
        panel.add_control(date);

        panel
            .filters()
            .update(|root| root.set_at("status", Value::from("Enabled")));
        panel.extract_active();

        let previews = panel.previews().get();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].label, "Status");
        assert_eq!(previews[0].preview, "Enabled");
        assert_eq!(previews[0].elem, status);
    }
}
