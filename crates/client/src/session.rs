//! One edit-listing modal bound to a transport.
//!
//! [`EditorSession`] owns the [`ListingEditor`] state and drives the round
//! trip: fetch the listing, show the modal, let the host edit the draft and
//! photo slots, submit, and reconcile the card with the server's copy.
//! Every failure is logged and reported to the user before it is returned.

use fleetdesk_core::listing::ListingCard;
use fleetdesk_core::listing_editor::ListingEditor;
use fleetdesk_core::surface::{report, FeedbackKind, FeedbackSurface, ModalDisplay};

use crate::error::ClientError;
use crate::transport::ListingTransport;

/// Message reported after a successful save.
pub const UPDATE_SUCCESS_MESSAGE: &str = "Listing updated";

pub struct EditorSession<T, F, D> {
    transport: T,
    editor: ListingEditor,
    feedback: F,
    modal: D,
}

impl<T, F, D> EditorSession<T, F, D>
where
    T: ListingTransport,
    F: FeedbackSurface,
    D: ModalDisplay,
{
    pub fn new(transport: T, feedback: F, modal: D) -> Self {
        Self {
            transport,
            editor: ListingEditor::new(),
            feedback,
            modal,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn editor(&self) -> &ListingEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ListingEditor {
        &mut self.editor
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn modal(&self) -> &D {
        &self.modal
    }

    /// Load the listing behind `detail_url` into the editor and show the
    /// modal. Returns the card of the freshly loaded listing.
    pub async fn open(&mut self, detail_url: &str) -> Result<ListingCard, ClientError> {
        match self.transport.fetch_listing(detail_url).await {
            Ok(listing) => {
                tracing::info!(listing_id = listing.id, "Listing loaded for editing");
                let card = ListingCard::from_payload(&listing);
                self.editor.open(listing);
                self.modal.show();
                Ok(card)
            }
            Err(e) => {
                tracing::error!(error = %e, detail_url, "Failed to load listing");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Submit the current draft. On success the modal closes and the
    /// refreshed card is returned; on failure the modal stays open with the
    /// draft intact.
    pub async fn submit(&mut self) -> Result<ListingCard, ClientError> {
        let form = match self.editor.build_submission() {
            Ok(form) => form,
            Err(e) => {
                let e = ClientError::from(e);
                tracing::warn!(error = %e, "Listing draft rejected before submit");
                self.fail(&e);
                return Err(e);
            }
        };

        let response = match self.transport.submit_update(&form).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, listing_id = form.listing_id, "Listing update failed");
                self.fail(&e);
                return Err(e);
            }
        };

        match self.editor.reconcile(response) {
            Ok(card) => {
                tracing::info!(listing_id = card.id, "Listing updated");
                report(&mut self.feedback, FeedbackKind::Success, UPDATE_SUCCESS_MESSAGE);
                self.modal.hide();
                Ok(card)
            }
            Err(e) => {
                let e = ClientError::from(e);
                tracing::error!(error = %e, listing_id = form.listing_id, "Listing update rejected");
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Discard the current record and hide the modal.
    pub fn close(&mut self) {
        self.editor.close();
        self.modal.hide();
    }

    fn fail(&mut self, error: &ClientError) {
        report(&mut self.feedback, FeedbackKind::Error, &error.user_message());
    }
}
