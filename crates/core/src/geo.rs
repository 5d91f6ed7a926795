//! Geographic points, great-circle distance, and place-name lookup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for distance estimates (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a point from optional coordinates as stored on records.
    ///
    /// Missing, out-of-range, and the `(0, 0)` placeholder written by
    /// forms that were never geolocated all yield `None`.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let point = Self::new(lat?, lng?);
        if !point.is_valid() || (point.lat == 0.0 && point.lng == 0.0) {
            return None;
        }
        Some(point)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Haversine distance between two points in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

/// Resolves a free-form place name to coordinates.
pub trait GeocodeLookup {
    fn lookup(&self, place: &str) -> Option<GeoPoint>;
}

/// One known city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl CityEntry {
    /// Display label, `"Name, State"` or just `"Name"`.
    pub fn label(&self) -> String {
        let name = self.name.trim();
        let state = self.state.trim();
        if state.is_empty() {
            name.to_string()
        } else {
            format!("{name}, {state}")
        }
    }

    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

/// In-memory city list backing both destination autocomplete and
/// destination geocoding.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    entries: Vec<CityEntry>,
}

impl CityDirectory {
    /// Build a directory, dropping blank entries and case-insensitive
    /// duplicate labels (first one wins).
    pub fn new(entries: impl IntoIterator<Item = CityEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| {
                let label = entry.label();
                !label.is_empty() && seen.insert(label.to_lowercase())
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Autocomplete suggestions, in directory order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(CityEntry::label).collect()
    }
}

impl GeocodeLookup for CityDirectory {
    /// Match an exact label first, then the bare city name (text before the
    /// first comma), then a label prefix. Entries without coordinates never
    /// match.
    fn lookup(&self, place: &str) -> Option<GeoPoint> {
        let query = place.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let bare = query.split(',').next().unwrap_or_default().trim();
        let located = || self.entries.iter().filter_map(|e| e.point().map(|p| (e, p)));

        located()
            .find(|(entry, _)| entry.label().to_lowercase() == query)
            .or_else(|| located().find(|(entry, _)| entry.name.trim().to_lowercase() == bare))
            .or_else(|| located().find(|(entry, _)| entry.label().to_lowercase().starts_with(&query)))
            .map(|(_, point)| point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, state: &str, lat: f64, lng: f64) -> CityEntry {
        CityEntry {
            name: name.into(),
            state: state.into(),
            latitude: Some(lat),
            longitude: Some(lng),
        }
    }

    fn directory() -> CityDirectory {
        CityDirectory::new(vec![
            city("Pune", "Maharashtra", 18.5204, 73.8567),
            city("Panaji", "Goa", 15.4909, 73.8278),
            city("pune", "maharashtra", 0.5, 0.5),
            CityEntry {
                name: "Nowhere".into(),
                state: String::new(),
                latitude: None,
                longitude: None,
            },
        ])
    }

    #[test]
    fn labels_are_deduplicated_case_insensitively() {
        assert_eq!(
            directory().labels(),
            vec!["Pune, Maharashtra", "Panaji, Goa", "Nowhere"]
        );
    }

    #[test]
    fn lookup_by_label_name_and_prefix() {
        let dir = directory();
        let pune = GeoPoint::new(18.5204, 73.8567);
        assert_eq!(dir.lookup("Pune, Maharashtra"), Some(pune));
        assert_eq!(dir.lookup("  pune "), Some(pune));
        assert_eq!(dir.lookup("Pune, MH"), Some(pune));
        assert_eq!(dir.lookup("pan"), Some(GeoPoint::new(15.4909, 73.8278)));
    }

    #[test]
    fn lookup_misses() {
        let dir = directory();
        assert_eq!(dir.lookup(""), None);
        assert_eq!(dir.lookup("Nowhere"), None);
        assert_eq!(dir.lookup("Atlantis"), None);
    }

    #[test]
    fn zero_placeholder_is_not_a_location() {
        assert_eq!(GeoPoint::from_parts(Some(0.0), Some(0.0)), None);
        assert_eq!(GeoPoint::from_parts(Some(91.0), Some(10.0)), None);
        assert_eq!(GeoPoint::from_parts(None, Some(10.0)), None);
        assert!(GeoPoint::from_parts(Some(12.97), Some(77.59)).is_some());
    }

    #[test]
    fn haversine_pune_to_mumbai() {
        let pune = GeoPoint::new(18.5204, 73.8567);
        let mumbai = GeoPoint::new(19.0760, 72.8777);
        let d = haversine_km(pune, mumbai);
        assert!((118.0..122.0).contains(&d), "got {d}");
        assert_eq!(haversine_km(pune, pune), 0.0);
    }
}
