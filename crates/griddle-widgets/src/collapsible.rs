#![forbid(unsafe_code)]

//! Collapsible base behavior: the open/closed toggle shared by panels.
//!
//! Widgets that expand and collapse (the filters panel, column menus,
//! export menus) compose this instead of reimplementing the toggle. The
//! open flag is an [`Observable`] so views can re-render on change.

use griddle_core::{Observable, Subscription};

/// Open/closed state with an optional lock against toggling.
#[derive(Debug)]
pub struct Collapsible {
    opened: Observable<bool>,
    collapsible: bool,
}

impl Default for Collapsible {
    fn default() -> Self {
        Self::new()
    }
}

impl Collapsible {
    /// Create a collapsible in the closed state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            opened: Observable::new(false),
            collapsible: true,
        }
    }

    /// Disable toggling; the panel stays in whatever state it is in.
    #[must_use]
    pub fn non_collapsible(mut self) -> Self {
        self.collapsible = false;
        self
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened.get()
    }

    #[must_use]
    pub fn is_collapsible(&self) -> bool {
        self.collapsible
    }

    pub fn open(&self) {
        self.opened.set(true);
    }

    pub fn close(&self) {
        self.opened.set(false);
    }

    /// Flip the open state. No-op when toggling is disabled.
    pub fn toggle(&self) {
        if self.collapsible {
            self.opened.set(!self.opened.get());
        }
    }

    /// Observe open-state changes.
    pub fn on_toggle(&self, handler: impl Fn(&bool) + 'static) -> Subscription {
        self.opened.subscribe(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn starts_closed() {
        assert!(!Collapsible::new().is_open());
    }

    #[test]
    fn toggle_flips_state() {
        let panel = Collapsible::new();
        panel.toggle();
        assert!(panel.is_open());
        panel.toggle();
        assert!(!panel.is_open());
    }

    #[test]
    fn non_collapsible_ignores_toggle() {
        let panel = Collapsible::new().non_collapsible();
        panel.toggle();
        assert!(!panel.is_open());
        // Direct open/close still works; only the user-facing toggle locks.
        panel.open();
        assert!(panel.is_open());
    }

    #[test]
    fn on_toggle_fires_on_change() {
        let panel = Collapsible::new();
        let hits = Rc::new(Cell::new(0u32));
        let hits_in = Rc::clone(&hits);
        let _sub = panel.on_toggle(move |_| hits_in.set(hits_in.get() + 1));

        panel.open();
        panel.open(); // already open, no change
        panel.close();
        assert_eq!(hits.get(), 2);
    }
}
