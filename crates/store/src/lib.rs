//! Argonaut resource forest: graph builder, expansion state, identity index and
//! the flattening projector, tied together by [`TreeViewState`].
//!
//! Everything here is in-memory and synchronous. Fetching belongs to `argonaut_api`.

#![forbid(unsafe_code)]

pub mod build;
pub mod index;
pub mod project;
pub mod view;

pub use build::{build_forest, build_forest_with};
pub use index::{collapse_fully, expand_fully, toggle_node, IdentityIndex};
pub use project::{flatten, flatten_all, prefix};
pub use view::{FilterMode, RebuildPolicy, TreeViewState};
