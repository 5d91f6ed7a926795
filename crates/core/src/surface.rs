//! Host display capabilities used by the editor flow: the modal that hosts
//! the edit form and the feedback region where outcomes are reported.

use serde::Serialize;

/// Severity of a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Info,
    Error,
}

/// Where a message was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Inline,
    Alert,
}

/// A surface that can show messages to the user.
pub trait FeedbackSurface {
    /// Whether an inline feedback region is present on the current view.
    fn has_inline_region(&self) -> bool;

    /// Write a message into the inline region.
    fn show_inline(&mut self, kind: FeedbackKind, message: &str);

    /// Show a blocking alert.
    fn alert(&mut self, message: &str);
}

/// Show/hide capability of the modal hosting an edit form.
pub trait ModalDisplay {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Report a message through the inline region if there is one, else a
/// blocking alert. Errors are always delivered somewhere.
pub fn report<S: FeedbackSurface + ?Sized>(
    surface: &mut S,
    kind: FeedbackKind,
    message: &str,
) -> Delivery {
    if kind == FeedbackKind::Error {
        tracing::error!(detail = message, "Reporting failure to user");
    }
    if surface.has_inline_region() {
        surface.show_inline(kind, message);
        Delivery::Inline
    } else {
        surface.alert(message);
        Delivery::Alert
    }
}
