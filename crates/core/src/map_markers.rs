//! Map marker placement for vehicle, delivery, and destination pins.
//!
//! Rendering is delegated to a [`MapCapability`]; icons come from an
//! injected [`IconFactory`] and destination names are resolved through an
//! injected [`GeocodeLookup`]. The renderer only decides what goes on the
//! map and how the viewport is framed.

use serde::Serialize;

use crate::geo::{haversine_km, GeoPoint, GeocodeLookup};
use crate::listing::ListingPayload;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// National default view centre.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(20.5937, 78.9629);

/// Zoom of the national default view.
pub const DEFAULT_ZOOM: u8 = 5;

/// Zoom used when the scene holds a single point.
pub const SINGLE_POINT_ZOOM: u8 = 13;

/// Default location of the marker icon set.
pub const DEFAULT_ICON_BASE: &str = "/static/img/markers";

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Vehicle,
    Delivery,
    Destination,
}

impl MarkerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Delivery => "delivery",
            Self::Destination => "destination",
        }
    }
}

/// Icon descriptor handed to the map capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub kind: MarkerKind,
    pub url: String,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Pixel offset of the point the icon marks.
    pub anchor: (u32, u32),
}

/// Produces the icon for each marker kind.
pub trait IconFactory {
    fn icon(&self, kind: MarkerKind) -> MarkerIcon;
}

/// Pin icons `<base>/<kind>.png`, 25x41 anchored at the tip.
#[derive(Debug, Clone)]
pub struct StandardIcons {
    base_url: String,
}

impl StandardIcons {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for StandardIcons {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE)
    }
}

impl IconFactory for StandardIcons {
    fn icon(&self, kind: MarkerKind) -> MarkerIcon {
        MarkerIcon {
            kind,
            url: format!("{}/{}.png", self.base_url.trim_end_matches('/'), kind.as_str()),
            size: (25, 41),
            anchor: (12, 41),
        }
    }
}

// ---------------------------------------------------------------------------
// Map capability
// ---------------------------------------------------------------------------

/// Map-rendering backend.
pub trait MapCapability {
    type Map;
    type Marker;

    fn create_map(&mut self, container: &str) -> Self::Map;

    fn add_marker(
        &mut self,
        map: &mut Self::Map,
        point: GeoPoint,
        icon: &MarkerIcon,
        label: &str,
    ) -> Self::Marker;

    fn add_polyline(&mut self, map: &mut Self::Map, points: &[GeoPoint]);

    fn fit_bounds(&mut self, map: &mut Self::Map, points: &[GeoPoint]);

    fn set_view(&mut self, map: &mut Self::Map, center: GeoPoint, zoom: u8);
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A labelled point already known to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePoint {
    pub kind: MarkerKind,
    pub point: GeoPoint,
    pub label: String,
}

/// Everything one map widget should show.
#[derive(Debug, Clone, Default)]
pub struct MapScene {
    vehicles: Vec<ScenePoint>,
    delivery: Option<ScenePoint>,
    destinations: Vec<String>,
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vehicle pins for every geolocated listing.
    pub fn fleet(listings: &[ListingPayload]) -> Self {
        let mut scene = Self::new();
        for listing in listings {
            if let Some(point) = listing.location() {
                scene = scene.with_vehicle(point, listing.title());
            }
        }
        scene
    }

    pub fn with_vehicle(mut self, point: GeoPoint, label: impl Into<String>) -> Self {
        self.vehicles.push(ScenePoint {
            kind: MarkerKind::Vehicle,
            point,
            label: label.into(),
        });
        self
    }

    pub fn with_delivery(mut self, point: GeoPoint, label: impl Into<String>) -> Self {
        self.delivery = Some(ScenePoint {
            kind: MarkerKind::Delivery,
            point,
            label: label.into(),
        });
        self
    }

    /// Destination place names, resolved at render time. Blank names are
    /// skipped.
    pub fn with_destinations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destinations.extend(
            names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.trim().is_empty()),
        );
        self
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }
}

/// How the viewport was framed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Viewport {
    Centered { center: GeoPoint, zoom: u8 },
    Bounds(Vec<GeoPoint>),
}

/// Result of placing a scene.
pub struct RenderedScene<M: MapCapability> {
    pub map: M::Map,
    pub markers: Vec<M::Marker>,
    /// Points in placement order.
    pub placed: Vec<ScenePoint>,
    /// Destination names the geocoder could not resolve.
    pub unresolved: Vec<String>,
    pub viewport: Viewport,
}

/// Places scenes onto a map capability.
pub struct MarkerRenderer<'a, I: IconFactory, G: GeocodeLookup> {
    icons: &'a I,
    geocoder: &'a G,
}

impl<'a, I: IconFactory, G: GeocodeLookup> MarkerRenderer<'a, I, G> {
    pub fn new(icons: &'a I, geocoder: &'a G) -> Self {
        Self { icons, geocoder }
    }

    /// Resolve the scene's points without touching a map: vehicles, then
    /// delivery, then destinations in order. Destination labels carry the
    /// distance from the first vehicle when it is known.
    pub fn resolve(&self, scene: &MapScene) -> (Vec<ScenePoint>, Vec<String>) {
        let mut points: Vec<ScenePoint> = scene.vehicles.clone();
        points.extend(scene.delivery.clone());
        let origin = scene.vehicles.first().map(|v| v.point);

        let mut unresolved = Vec::new();
        for name in &scene.destinations {
            let name = name.trim();
            match self.geocoder.lookup(name) {
                Some(point) => {
                    let label = match origin {
                        Some(origin) => format!("{name} ({:.1} km)", haversine_km(origin, point)),
                        None => name.to_string(),
                    };
                    points.push(ScenePoint {
                        kind: MarkerKind::Destination,
                        point,
                        label,
                    });
                }
                None => {
                    tracing::debug!(destination = name, "Destination could not be geocoded");
                    unresolved.push(name.to_string());
                }
            }
        }
        (points, unresolved)
    }

    /// Create a map in `container` and place the scene on it.
    ///
    /// A route polyline joins all points when destinations were placed and
    /// there are at least two points. The viewport falls back to the
    /// national default with no points, centres on a lone point, and fits
    /// bounds otherwise.
    pub fn render<M: MapCapability>(
        &self,
        backend: &mut M,
        container: &str,
        scene: &MapScene,
    ) -> RenderedScene<M> {
        let (placed, unresolved) = self.resolve(scene);
        let mut map = backend.create_map(container);

        let markers: Vec<M::Marker> = placed
            .iter()
            .map(|p| backend.add_marker(&mut map, p.point, &self.icons.icon(p.kind), &p.label))
            .collect();

        let coords: Vec<GeoPoint> = placed.iter().map(|p| p.point).collect();
        let has_destinations = placed.iter().any(|p| p.kind == MarkerKind::Destination);
        if has_destinations && coords.len() >= 2 {
            backend.add_polyline(&mut map, &coords);
        }

        let viewport = match coords.as_slice() {
            [] => Viewport::Centered {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            [only] => Viewport::Centered {
                center: *only,
                zoom: SINGLE_POINT_ZOOM,
            },
            _ => Viewport::Bounds(coords),
        };
        match &viewport {
            Viewport::Centered { center, zoom } => backend.set_view(&mut map, *center, *zoom),
            Viewport::Bounds(points) => backend.fit_bounds(&mut map, points),
        }

        tracing::debug!(
            container,
            markers = placed.len(),
            unresolved = unresolved.len(),
            "Map scene rendered",
        );

        RenderedScene {
            map,
            markers,
            placed,
            unresolved,
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{CityDirectory, CityEntry};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(String),
        Marker(MarkerKind, GeoPoint, String),
        Polyline(usize),
        Fit(usize),
        View(GeoPoint, u8),
    }

    #[derive(Default)]
    struct RecordingMap {
        calls: Vec<Call>,
    }

    impl MapCapability for RecordingMap {
        type Map = String;
        type Marker = usize;

        fn create_map(&mut self, container: &str) -> String {
            self.calls.push(Call::Create(container.to_string()));
            container.to_string()
        }

        fn add_marker(
            &mut self,
            _map: &mut String,
            point: GeoPoint,
            icon: &MarkerIcon,
            label: &str,
        ) -> usize {
            self.calls.push(Call::Marker(icon.kind, point, label.to_string()));
            self.calls.len()
        }

        fn add_polyline(&mut self, _map: &mut String, points: &[GeoPoint]) {
            self.calls.push(Call::Polyline(points.len()));
        }

        fn fit_bounds(&mut self, _map: &mut String, points: &[GeoPoint]) {
            self.calls.push(Call::Fit(points.len()));
        }

        fn set_view(&mut self, _map: &mut String, center: GeoPoint, zoom: u8) {
            self.calls.push(Call::View(center, zoom));
        }
    }

    const PUNE: GeoPoint = GeoPoint::new(18.5204, 73.8567);
    const GOA: GeoPoint = GeoPoint::new(15.4909, 73.8278);

    fn cities() -> CityDirectory {
        CityDirectory::new(vec![CityEntry {
            name: "Panaji".into(),
            state: "Goa".into(),
            latitude: Some(GOA.lat),
            longitude: Some(GOA.lng),
        }])
    }

    #[test]
    fn empty_scene_uses_national_default() {
        let icons = StandardIcons::default();
        let geo = cities();
        let mut map = RecordingMap::default();

        let rendered = MarkerRenderer::new(&icons, &geo).render(&mut map, "map", &MapScene::new());

        assert!(rendered.markers.is_empty());
        assert_eq!(
            map.calls,
            vec![
                Call::Create("map".into()),
                Call::View(DEFAULT_CENTER, DEFAULT_ZOOM)
            ]
        );
    }

    #[test]
    fn single_vehicle_is_centred() {
        let icons = StandardIcons::default();
        let geo = cities();
        let mut map = RecordingMap::default();
        let scene = MapScene::new().with_vehicle(PUNE, "Swift");

        let rendered = MarkerRenderer::new(&icons, &geo).render(&mut map, "map", &scene);

        assert_eq!(
            rendered.viewport,
            Viewport::Centered {
                center: PUNE,
                zoom: SINGLE_POINT_ZOOM
            }
        );
        assert!(!map.calls.iter().any(|c| matches!(c, Call::Polyline(_))));
    }

    #[test]
    fn trip_scene_draws_route_and_fits_bounds() {
        let icons = StandardIcons::default();
        let geo = cities();
        let mut map = RecordingMap::default();
        let scene = MapScene::new()
            .with_vehicle(PUNE, "Swift")
            .with_destinations(["Panaji, Goa", "Atlantis", "  "]);

        let rendered = MarkerRenderer::new(&icons, &geo).render(&mut map, "trip-map", &scene);

        assert_eq!(rendered.markers.len(), 2);
        assert_eq!(rendered.unresolved, vec!["Atlantis".to_string()]);
        assert_eq!(rendered.placed[1].kind, MarkerKind::Destination);
        assert!(rendered.placed[1].label.starts_with("Panaji, Goa ("));
        assert!(rendered.placed[1].label.ends_with(" km)"));
        assert!(map.calls.contains(&Call::Polyline(2)));
        assert_eq!(map.calls.last(), Some(&Call::Fit(2)));
    }

    #[test]
    fn delivery_without_destinations_has_no_route() {
        let icons = StandardIcons::default();
        let geo = cities();
        let mut map = RecordingMap::default();
        let scene = MapScene::new()
            .with_vehicle(PUNE, "Swift")
            .with_delivery(GOA, "Drop-off");

        let rendered = MarkerRenderer::new(&icons, &geo).render(&mut map, "map", &scene);

        assert_eq!(rendered.placed[1].kind, MarkerKind::Delivery);
        assert!(!map.calls.iter().any(|c| matches!(c, Call::Polyline(_))));
        assert_eq!(map.calls.last(), Some(&Call::Fit(2)));
    }

    #[test]
    fn fleet_scene_skips_unlocated_listings() {
        let listings = vec![
            ListingPayload {
                id: 1,
                name: "Swift".into(),
                latitude: Some(PUNE.lat),
                longitude: Some(PUNE.lng),
                ..Default::default()
            },
            ListingPayload {
                id: 2,
                latitude: Some(0.0),
                longitude: Some(0.0),
                ..Default::default()
            },
        ];
        let scene = MapScene::fleet(&listings);
        let icons = StandardIcons::default();
        let geo = cities();
        let (points, _) = MarkerRenderer::new(&icons, &geo).resolve(&scene);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "Swift");
    }

    #[test]
    fn standard_icon_urls() {
        let icons = StandardIcons::new("/assets/pins/");
        assert_eq!(icons.icon(MarkerKind::Delivery).url, "/assets/pins/delivery.png");
        assert_eq!(icons.icon(MarkerKind::Vehicle).anchor, (12, 41));
    }
}
