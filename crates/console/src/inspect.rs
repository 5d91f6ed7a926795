//! Headless inspection of one listing: open it in an editor session, bind the
//! trip destination list, and place the listing on a logged map.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use fleetdesk_client::api::ListingApi;
use fleetdesk_client::error::ClientError;
use fleetdesk_client::session::EditorSession;
use fleetdesk_core::binding::DEFAULT_TEXT_FIELD;
use fleetdesk_core::dynamic_list::{ListConfig, ListManager};
use fleetdesk_core::error::CoreError;
use fleetdesk_core::geo::{CityDirectory, CityEntry};
use fleetdesk_core::listing::{ListingCard, ListingPayload};
use fleetdesk_core::map_markers::{MapScene, MarkerRenderer, ScenePoint, StandardIcons, Viewport};

use crate::config::ConsoleConfig;
use crate::display::{LogFeedback, LogModal, TracingMap};

/// Datalist the destination inputs suggest from.
pub const CITY_DATALIST: &str = "city-options";

/// Container name of the inspection map.
pub const MAP_CONTAINER: &str = "listing-map";

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to read cities file {}: {source}", .path.display())]
    Cities {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cities file: {0}")]
    CitiesJson(#[from] serde_json::Error),
}

/// Summary printed after an inspection run.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub card: ListingCard,
    /// New photos the editor would still accept.
    pub photo_slots: usize,
    /// Destination values as they would be submitted.
    pub destinations: Vec<(String, String)>,
    pub placed: Vec<ScenePoint>,
    pub unresolved: Vec<String>,
    pub viewport: Viewport,
}

/// Read a JSON array of city entries.
pub async fn load_cities(path: &Path) -> Result<CityDirectory, ConsoleError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConsoleError::Cities {
            path: path.to_path_buf(),
            source,
        })?;
    let entries: Vec<CityEntry> = serde_json::from_str(&raw)?;
    let directory = CityDirectory::new(entries);
    tracing::info!(path = %path.display(), cities = directory.len(), "Cities loaded");
    Ok(directory)
}

/// Run one inspection against the configured backend.
pub async fn run(config: &ConsoleConfig) -> Result<InspectReport, ConsoleError> {
    let cities = match &config.cities_file {
        Some(path) => load_cities(path).await?,
        None => CityDirectory::default(),
    };

    let api = ListingApi::with_timeout(
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let mut session = EditorSession::new(api, LogFeedback::default(), LogModal::default());

    let card = session.open(&config.listing_url).await?;
    let photo_slots = session.editor().remaining_capacity();
    let report = session
        .editor()
        .listing()
        .map(|listing| inspect_listing(listing, card, photo_slots, &config.destinations, &cities));
    session.close();

    // `open` succeeded, so the editor held a listing until `close`.
    report.ok_or_else(|| {
        ClientError::from(CoreError::Internal("editor closed before inspection".into())).into()
    })
}

/// Build the report for a loaded listing without touching the network.
pub fn inspect_listing(
    listing: &ListingPayload,
    card: ListingCard,
    photo_slots: usize,
    destinations: &[String],
    cities: &CityDirectory,
) -> InspectReport {
    let config = ListConfig::text(DEFAULT_TEXT_FIELD)
        .with_required(true)
        .with_initial_values(destinations.to_vec())
        .with_datalist(CITY_DATALIST);
    let trip = ListManager::bind(config);

    let mut scene = MapScene::new();
    if let Some(point) = listing.location() {
        scene = scene.with_vehicle(point, listing.title());
    }
    let scene = scene.with_destinations(trip.text_values());

    let icons = StandardIcons::default();
    let mut backend = TracingMap::default();
    let rendered = MarkerRenderer::new(&icons, cities).render(&mut backend, MAP_CONTAINER, &scene);

    if !rendered.unresolved.is_empty() {
        tracing::warn!(
            listing_id = listing.id,
            unresolved = ?rendered.unresolved,
            "Some destinations could not be placed",
        );
    }

    InspectReport {
        card,
        photo_slots,
        destinations: trip.submitted_values(),
        placed: rendered.placed,
        unresolved: rendered.unresolved,
        viewport: rendered.viewport,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use fleetdesk_core::map_markers::{MarkerKind, SINGLE_POINT_ZOOM};
    use std::io::Write;

    const CITIES: &str = r#"[
        {"name": "Pune", "state": "Maharashtra", "latitude": 18.5204, "longitude": 73.8567},
        {"name": "Goa", "state": "Goa", "latitude": 15.2993, "longitude": 74.124}
    ]"#;

    fn listing() -> ListingPayload {
        ListingPayload {
            id: 7,
            brand: "Maruti".into(),
            model: "Swift".into(),
            latitude: Some(18.52),
            longitude: Some(73.85),
            ..Default::default()
        }
    }

    fn directory() -> CityDirectory {
        CityDirectory::new(serde_json::from_str::<Vec<CityEntry>>(CITIES).unwrap())
    }

    #[tokio::test]
    async fn load_cities_reads_json_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CITIES.as_bytes()).unwrap();

        let cities = load_cities(file.path()).await.unwrap();
        assert_eq!(cities.len(), 2);
    }

    #[tokio::test]
    async fn load_cities_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            load_cities(&dir.path().join("cities.json")).await,
            Err(ConsoleError::Cities { .. })
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert_matches!(
            load_cities(file.path()).await,
            Err(ConsoleError::CitiesJson(_))
        );
    }

    #[test]
    fn destinations_are_placed_after_the_vehicle() {
        let listing = listing();
        let card = ListingCard::from_payload(&listing);
        let report = inspect_listing(
            &listing,
            card,
            8,
            &["Goa".to_string(), "Atlantis".to_string()],
            &directory(),
        );

        let kinds: Vec<MarkerKind> = report.placed.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::Vehicle, MarkerKind::Destination]);
        assert!(report.placed[1].label.starts_with("Goa ("));
        assert_eq!(report.unresolved, vec!["Atlantis".to_string()]);
        assert_matches!(report.viewport, Viewport::Bounds(ref points) if points.len() == 2);
        assert_eq!(
            report.destinations,
            vec![
                (DEFAULT_TEXT_FIELD.to_string(), "Goa".to_string()),
                (DEFAULT_TEXT_FIELD.to_string(), "Atlantis".to_string()),
            ]
        );
    }

    #[test]
    fn lone_vehicle_is_centred() {
        let listing = listing();
        let card = ListingCard::from_payload(&listing);
        let report = inspect_listing(&listing, card, 8, &[], &CityDirectory::default());

        assert_eq!(report.placed.len(), 1);
        assert_matches!(
            report.viewport,
            Viewport::Centered { zoom, .. } if zoom == SINGLE_POINT_ZOOM
        );
        assert!(report.destinations.is_empty());
    }
}
