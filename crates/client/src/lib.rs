//! HTTP side of the fleet owner console.
//!
//! Provides the `reqwest` client for the listing endpoints, the transport
//! trait the edit flow is written against, and [`session::EditorSession`],
//! which drives fetch, edit, submit, and reconcile for one edit modal.

pub mod api;
pub mod error;
pub mod session;
pub mod transport;
