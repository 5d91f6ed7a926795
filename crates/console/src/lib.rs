//! Headless driver for the fleet owner console logic.
//!
//! Loads one listing through the edit session, seeds the destination list,
//! and places the listing's map scene on a logging map backend. Used for
//! smoke runs against a live backend.

pub mod config;
pub mod display;
pub mod inspect;
