#![forbid(unsafe_code)]

//! Grid UI view-model widgets.
//!
//! Headless widget state for a data grid: the collapsible chrome, the
//! filter-control contract, and the filters panel that ties pending and
//! committed filter values to the grid's shared providers. Rendering and
//! input handling live in the view layer; everything here is plain
//! observable state.

pub mod collapsible;
pub mod control;
pub mod filters;

pub use collapsible::Collapsible;
pub use control::{ControlHandle, FilterControl, RangeFilter, SelectFilter, TextFilter};
pub use filters::{FilterPreview, FiltersOptions, FiltersPanel};
