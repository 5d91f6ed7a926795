//! Transport seam between the edit session and the listing backend.

use std::future::Future;

use fleetdesk_core::listing::{ListingPayload, UpdateResponse};
use fleetdesk_core::listing_editor::UpdateForm;

use crate::api::ListingApi;
use crate::error::ClientError;

/// Trait implemented by anything that can load and update listings.
///
/// [`ListingApi`] is the HTTP implementation; tests and embedded hosts
/// provide their own.
pub trait ListingTransport: Send + Sync {
    /// Load the listing behind `detail_url`.
    fn fetch_listing(
        &self,
        detail_url: &str,
    ) -> impl Future<Output = Result<ListingPayload, ClientError>> + Send;

    /// Submit an update and return the server's verdict.
    fn submit_update(
        &self,
        form: &UpdateForm,
    ) -> impl Future<Output = Result<UpdateResponse, ClientError>> + Send;
}

impl ListingTransport for ListingApi {
    fn fetch_listing(
        &self,
        detail_url: &str,
    ) -> impl Future<Output = Result<ListingPayload, ClientError>> + Send {
        ListingApi::fetch_listing(self, detail_url)
    }

    fn submit_update(
        &self,
        form: &UpdateForm,
    ) -> impl Future<Output = Result<UpdateResponse, ClientError>> + Send {
        ListingApi::submit_update(self, form)
    }
}
