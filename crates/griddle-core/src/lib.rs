#![forbid(unsafe_code)]

//! Reactive value substrate for griddle.
//!
//! Three pieces, used together by the widget crates:
//!
//! - [`Observable`]: a shared value cell with synchronous change
//!   notification, the backbone of derived widget state.
//! - [`Value`] and the [`path`] utilities: a string-keyed value tree with
//!   dotted-path access, flatten and unflatten.
//! - [`StateStore`]: a path-keyed publish/subscribe registry, the shared
//!   "provider" that links components in a grid tree.

pub mod observable;
pub mod path;
pub mod store;
pub mod value;

pub use observable::{Observable, Subscription};
pub use store::StateStore;
pub use value::Value;
