//! Edit-listing modal state: draft fields, stored-photo deletions, the
//! new-photo upload list, and reconciliation with the server's answer.
//!
//! This module has no transport dependency. The caller fetches a
//! [`ListingPayload`], hands it to [`ListingEditor::open`], submits the
//! [`UpdateForm`] from [`ListingEditor::build_submission`] however it likes,
//! and passes the response to [`ListingEditor::reconcile`].

use std::collections::BTreeSet;

use validator::{Validate, ValidationError};

use crate::binding::DEFAULT_FILE_FIELD;
use crate::dynamic_list::{FileSelection, ListConfig, ListManager};
use crate::error::CoreError;
use crate::listing::{
    normalize_city, DeliveryOptions, ListingCard, ListingPayload, UpdateResponse,
    DELIVERY_DISTANCE_CHOICES, MAX_LISTING_IMAGES,
};
use crate::types::DbId;

/// Form field carrying one stored-image id to delete.
pub const DELETE_IMAGES_FIELD: &str = "delete_images";

/// Form field carrying one enabled delivery distance.
pub const DELIVERY_OPTIONS_FIELD: &str = "delivery_options";

/// Message used when the server rejects an update without saying why.
pub const DEFAULT_UPDATE_ERROR: &str = "Unable to update listing";

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Editable fields of a listing, as populated into the edit form.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ListingDraft {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub licence_plate: String,
    pub vehicle_type: String,
    pub size_category: String,
    pub fuel_type: String,
    pub transmission: String,
    pub city: String,
    /// Zero means "not set"; the backend stores missing seat counts that way.
    #[validate(range(min = 0, max = 50, message = "Seats must be between 0 and 50"))]
    pub seats: i32,
    #[validate(range(min = 0.0, message = "Hourly rate cannot be negative"))]
    pub rate_per_hour: f64,
    #[validate(range(min = 0.0, message = "Daily rate cannot be negative"))]
    pub daily_rate: f64,
    pub has_gps: bool,
    pub image_url: String,
    pub description: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,
    #[validate(custom(function = "validate_delivery_options"))]
    pub delivery_options: DeliveryOptions,
}

fn validate_delivery_options(options: &DeliveryOptions) -> Result<(), ValidationError> {
    for (distance, price) in options {
        if !DELIVERY_DISTANCE_CHOICES.contains(distance) {
            let mut err = ValidationError::new("delivery_distance");
            err.message = Some(format!("Unsupported delivery distance {distance} km").into());
            return Err(err);
        }
        if !price.is_finite() || *price < 0.0 {
            let mut err = ValidationError::new("delivery_price");
            err.message = Some(format!("Invalid delivery price for {distance} km").into());
            return Err(err);
        }
    }
    Ok(())
}

impl ListingDraft {
    pub fn from_payload(listing: &ListingPayload) -> Self {
        Self {
            name: listing.name.clone(),
            brand: listing.brand.clone(),
            model: listing.model.clone(),
            licence_plate: listing.licence_plate.clone(),
            vehicle_type: listing.vehicle_type.clone(),
            size_category: listing.size_category.clone(),
            fuel_type: listing.fuel_type.clone(),
            transmission: listing.transmission.clone(),
            city: listing.city.clone(),
            seats: listing.seats,
            rate_per_hour: listing.rate_per_hour,
            daily_rate: listing.daily_rate,
            has_gps: listing.has_gps,
            image_url: listing.image_url.clone(),
            description: listing.description.clone(),
            latitude: listing.latitude,
            longitude: listing.longitude,
            delivery_options: listing.delivery_options.clone(),
        }
    }

    /// Text fields in submission order. Optional coordinates submit as
    /// empty strings; `has_gps` follows checkbox semantics and is only sent
    /// when set.
    fn form_fields(&self) -> Vec<(String, String)> {
        let coord = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        let mut fields: Vec<(String, String)> = [
            ("name", self.name.trim().to_string()),
            ("brand", self.brand.trim().to_string()),
            ("model", self.model.trim().to_string()),
            ("licence_plate", self.licence_plate.trim().to_string()),
            ("vehicle_type", self.vehicle_type.trim().to_string()),
            ("size_category", self.size_category.trim().to_string()),
            ("fuel_type", self.fuel_type.trim().to_string()),
            ("transmission", self.transmission.trim().to_string()),
            ("city", normalize_city(&self.city)),
            ("seats", self.seats.to_string()),
            ("rate_per_hour", self.rate_per_hour.to_string()),
            ("daily_rate", self.daily_rate.to_string()),
            ("image_url", self.image_url.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("latitude", coord(self.latitude)),
            ("longitude", coord(self.longitude)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

        if self.has_gps {
            fields.push(("has_gps".into(), "on".into()));
        }
        for (distance, price) in &self.delivery_options {
            fields.push((DELIVERY_OPTIONS_FIELD.into(), distance.to_string()));
            fields.push((format!("delivery_price_{distance}"), price.to_string()));
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Everything a listing update submits.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateForm {
    pub listing_id: DbId,
    pub update_url: String,
    /// Ordered text fields, repeated names allowed.
    pub fields: Vec<(String, String)>,
    /// Stored images to delete, ascending.
    pub delete_images: Vec<DbId>,
    /// Field name of the new-photo file parts.
    pub photo_field: String,
    pub new_photos: Vec<FileSelection>,
}

impl UpdateForm {
    /// All text pairs of the form: draft fields followed by one
    /// `delete_images` entry per id.
    pub fn text_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.fields.clone();
        pairs.extend(
            self.delete_images
                .iter()
                .map(|id| (DELETE_IMAGES_FIELD.to_string(), id.to_string())),
        );
        pairs
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// State behind the edit-listing modal.
#[derive(Debug, Clone)]
pub struct ListingEditor {
    listing: Option<ListingPayload>,
    draft: ListingDraft,
    pending_deletions: BTreeSet<DbId>,
    photos: ListManager,
}

impl Default for ListingEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingEditor {
    pub fn new() -> Self {
        Self {
            listing: None,
            draft: ListingDraft::default(),
            pending_deletions: BTreeSet::new(),
            photos: ListManager::bind(
                ListConfig::file(DEFAULT_FILE_FIELD).with_max_rows(MAX_LISTING_IMAGES),
            ),
        }
    }

    /// Populate the editor from a fetched listing. Any previous record's
    /// draft, deletions, and photo selections are discarded.
    pub fn open(&mut self, listing: ListingPayload) {
        tracing::debug!(listing_id = listing.id, "Opening listing editor");
        self.draft = ListingDraft::from_payload(&listing);
        self.pending_deletions.clear();
        self.photos
            .reset(Some(listing.remaining_image_slots() as i64));
        self.listing = Some(listing);
    }

    /// Drop the current record and reset every list.
    pub fn close(&mut self) {
        self.listing = None;
        self.draft = ListingDraft::default();
        self.pending_deletions.clear();
        self.photos.reset(Some(MAX_LISTING_IMAGES as i64));
    }

    pub fn is_open(&self) -> bool {
        self.listing.is_some()
    }

    pub fn listing(&self) -> Option<&ListingPayload> {
        self.listing.as_ref()
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ListingDraft {
        &mut self.draft
    }

    pub fn photos(&self) -> &ListManager {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut ListManager {
        &mut self.photos
    }

    pub fn is_marked_for_deletion(&self, image_id: DbId) -> bool {
        self.pending_deletions.contains(&image_id)
    }

    /// Stored images that survive the pending deletions.
    pub fn kept_image_count(&self) -> usize {
        self.listing.as_ref().map_or(0, |listing| {
            listing
                .images
                .iter()
                .filter(|image| !self.pending_deletions.contains(&image.id))
                .count()
        })
    }

    /// New photos the listing can still take.
    pub fn remaining_capacity(&self) -> usize {
        MAX_LISTING_IMAGES.saturating_sub(self.kept_image_count())
    }

    /// Mark or unmark a stored image for deletion and resize the new-photo
    /// list to the freed capacity. Returns whether the image is now marked;
    /// ids not on the open listing are ignored.
    pub fn toggle_image_deletion(&mut self, image_id: DbId) -> bool {
        let known = self
            .listing
            .as_ref()
            .is_some_and(|listing| listing.images.iter().any(|image| image.id == image_id));
        if !known {
            tracing::debug!(image_id, "Ignoring deletion toggle for unknown image");
            return false;
        }

        let marked = if self.pending_deletions.remove(&image_id) {
            false
        } else {
            self.pending_deletions.insert(image_id);
            true
        };
        self.photos.set_max(self.remaining_capacity() as i64);
        marked
    }

    /// Validate the draft and assemble the update submission.
    pub fn build_submission(&self) -> Result<UpdateForm, CoreError> {
        let listing = self
            .listing
            .as_ref()
            .ok_or_else(|| CoreError::Validation("No listing is open for editing".into()))?;
        if listing.update_url.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Listing {} has no update URL",
                listing.id
            )));
        }
        self.draft.validate()?;

        Ok(UpdateForm {
            listing_id: listing.id,
            update_url: listing.update_url.clone(),
            fields: self.draft.form_fields(),
            delete_images: self.pending_deletions.iter().copied().collect(),
            photo_field: self.photos.field_name().to_string(),
            new_photos: self.photos.selected_files().into_iter().cloned().collect(),
        })
    }

    /// Apply the server's answer to an update.
    ///
    /// On success the returned listing becomes authoritative: the editor is
    /// re-opened on it and the refreshed card is returned. A success without
    /// a listing keeps the current one. A rejection surfaces the server's
    /// message.
    pub fn reconcile(&mut self, response: UpdateResponse) -> Result<ListingCard, CoreError> {
        if !response.success {
            let message = response
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UPDATE_ERROR.to_string());
            return Err(CoreError::Remote(message));
        }

        match response.car {
            Some(listing) => {
                let card = ListingCard::from_payload(&listing);
                self.open(listing);
                Ok(card)
            }
            None => self
                .listing
                .as_ref()
                .map(ListingCard::from_payload)
                .ok_or_else(|| CoreError::Internal("Update succeeded with no open listing".into())),
        }
    }
}
