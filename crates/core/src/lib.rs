//! Host-agnostic logic behind the fleet owner console: dynamic input
//! lists, the edit-listing flow, and map marker placement.
//!
//! Nothing in this crate renders or performs I/O. Display and transport
//! collaborators are traits the host implements.

pub mod binding;
pub mod dynamic_list;
pub mod error;
pub mod geo;
pub mod listing;
pub mod listing_editor;
pub mod map_markers;
pub mod surface;
pub mod types;
