//! Vehicle listing payloads exchanged with the listing backend, and the
//! card summary the owner's vehicle grid displays for each listing.
//!
//! The backend writes empty strings and zeros for unset columns but older
//! rows may still carry `null`; every scalar field tolerates both.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::GeoPoint;
use crate::types::DbId;

/// Upper bound on stored photos per listing.
pub const MAX_LISTING_IMAGES: usize = 8;

/// Delivery distances (km) an owner may offer.
pub const DELIVERY_DISTANCE_CHOICES: &[u32] = &[25, 50, 100, 200];

/// Path prefix under which stored uploads are served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Delivery distance (km) to delivery price.
pub type DeliveryOptions = BTreeMap<u32, f64>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A stored listing photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingImage {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

impl ListingImage {
    /// URL to display: the served `url`, else the upload path of `filename`.
    pub fn src(&self) -> String {
        if !self.url.trim().is_empty() {
            self.url.clone()
        } else {
            format!("{UPLOADS_PATH}/{}", self.filename.trim_start_matches('/'))
        }
    }
}

/// Full JSON representation of a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPayload {
    pub id: DbId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub licence_plate: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vehicle_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size_category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fuel_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub transmission: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub seats: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub rate_per_hour: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub daily_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub has_gps: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<ListingImage>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_available: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub detail_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub update_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_options: DeliveryOptions,
}

impl ListingPayload {
    /// Display title: `display_name`, else `name`, else `"brand model"`,
    /// else a numbered placeholder.
    pub fn title(&self) -> String {
        let display = self.display_name.trim();
        if !display.is_empty() {
            return display.to_string();
        }
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        let combined = format!("{} {}", self.brand.trim(), self.model.trim());
        let combined = combined.trim();
        if combined.is_empty() {
            format!("Listing #{}", self.id)
        } else {
            combined.to_string()
        }
    }

    /// Vehicle location, if the listing has been geolocated.
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    /// Photo to show on the card: the first stored image, else the legacy
    /// `image_url`.
    pub fn cover_image(&self) -> Option<String> {
        self.images.first().map(ListingImage::src).or_else(|| {
            let legacy = self.image_url.trim();
            (!legacy.is_empty()).then(|| legacy.to_string())
        })
    }

    /// How many more photos the listing can take.
    pub fn remaining_image_slots(&self) -> usize {
        MAX_LISTING_IMAGES.saturating_sub(self.images.len())
    }
}

/// `GET <detail_url>` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEnvelope {
    pub car: ListingPayload,
}

/// `POST <update_url>` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub car: Option<ListingPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Keep only the city name of a `"City, State"` label, as the backend
/// stores it.
pub fn normalize_city(raw: &str) -> String {
    raw.split(',').next().unwrap_or_default().trim().to_string()
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// Summary shown in the owner's vehicle grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCard {
    pub id: DbId,
    pub title: String,
    pub city: String,
    pub rate_line: String,
    pub is_available: bool,
    pub availability_label: &'static str,
    pub cover_image: Option<String>,
    pub photo_count: usize,
    pub has_gps: bool,
    pub detail_url: String,
}

impl ListingCard {
    pub fn from_payload(listing: &ListingPayload) -> Self {
        Self {
            id: listing.id,
            title: listing.title(),
            city: listing.city.trim().to_string(),
            rate_line: rate_line(listing.rate_per_hour, listing.daily_rate),
            is_available: listing.is_available,
            availability_label: if listing.is_available {
                "Available"
            } else {
                "Unavailable"
            },
            cover_image: listing.cover_image(),
            photo_count: listing.images.len(),
            has_gps: listing.has_gps,
            detail_url: listing.detail_url.clone(),
        }
    }
}

/// `"₹150/hr · ₹2400/day"`. The daily part is omitted when unset.
fn rate_line(hourly: f64, daily: f64) -> String {
    let hourly = format!("₹{hourly:.0}/hr");
    if daily > 0.0 {
        format!("{hourly} · ₹{daily:.0}/day")
    } else {
        hourly
    }
}
