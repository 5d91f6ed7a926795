//! Logging implementations of the display capabilities, for headless runs.

use fleetdesk_core::geo::GeoPoint;
use fleetdesk_core::map_markers::{MapCapability, MarkerIcon};
use fleetdesk_core::surface::{FeedbackKind, FeedbackSurface, ModalDisplay};

/// Map handle of the [`TracingMap`] backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMap {
    pub container: String,
    pub markers: usize,
    pub polylines: usize,
    pub center: Option<(GeoPoint, u8)>,
    pub bounds: Option<Vec<GeoPoint>>,
}

/// Map backend that records and logs every call instead of drawing.
#[derive(Debug, Default)]
pub struct TracingMap {
    maps_created: usize,
}

impl TracingMap {
    pub fn maps_created(&self) -> usize {
        self.maps_created
    }
}

impl MapCapability for TracingMap {
    type Map = LoggedMap;
    type Marker = usize;

    fn create_map(&mut self, container: &str) -> LoggedMap {
        self.maps_created += 1;
        tracing::info!(container, "Map created");
        LoggedMap {
            container: container.to_string(),
            markers: 0,
            polylines: 0,
            center: None,
            bounds: None,
        }
    }

    fn add_marker(
        &mut self,
        map: &mut LoggedMap,
        point: GeoPoint,
        icon: &MarkerIcon,
        label: &str,
    ) -> usize {
        map.markers += 1;
        tracing::info!(
            container = %map.container,
            kind = icon.kind.as_str(),
            lat = point.lat,
            lng = point.lng,
            label,
            "Marker placed",
        );
        map.markers
    }

    fn add_polyline(&mut self, map: &mut LoggedMap, points: &[GeoPoint]) {
        map.polylines += 1;
        tracing::info!(container = %map.container, points = points.len(), "Route drawn");
    }

    fn fit_bounds(&mut self, map: &mut LoggedMap, points: &[GeoPoint]) {
        tracing::info!(container = %map.container, points = points.len(), "Viewport fitted");
        map.bounds = Some(points.to_vec());
    }

    fn set_view(&mut self, map: &mut LoggedMap, center: GeoPoint, zoom: u8) {
        tracing::info!(
            container = %map.container,
            lat = center.lat,
            lng = center.lng,
            zoom,
            "Viewport centred",
        );
        map.center = Some((center, zoom));
    }
}

/// Feedback surface backed by the log. Reports go to the "inline region"
/// (the log) unless it is disabled, in which case they become alerts.
#[derive(Debug)]
pub struct LogFeedback {
    inline: bool,
    delivered: Vec<String>,
}

impl LogFeedback {
    pub fn new(inline: bool) -> Self {
        Self {
            inline,
            delivered: Vec::new(),
        }
    }

    /// Messages reported so far, in order.
    pub fn delivered(&self) -> &[String] {
        &self.delivered
    }
}

impl Default for LogFeedback {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FeedbackSurface for LogFeedback {
    fn has_inline_region(&self) -> bool {
        self.inline
    }

    fn show_inline(&mut self, kind: FeedbackKind, message: &str) {
        match kind {
            FeedbackKind::Error => tracing::warn!(feedback = message, "Inline error"),
            FeedbackKind::Success | FeedbackKind::Info => {
                tracing::info!(feedback = message, "Inline message")
            }
        }
        self.delivered.push(message.to_string());
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!(feedback = message, "Alert");
        self.delivered.push(message.to_string());
    }
}

/// Modal stand-in that only tracks visibility.
#[derive(Debug, Default)]
pub struct LogModal {
    visible: bool,
}

impl LogModal {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl ModalDisplay for LogModal {
    fn show(&mut self) {
        tracing::debug!("Edit modal shown");
        self.visible = true;
    }

    fn hide(&mut self) {
        tracing::debug!("Edit modal hidden");
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_core::geo::CityDirectory;
    use fleetdesk_core::map_markers::{MapScene, MarkerRenderer, StandardIcons};
    use fleetdesk_core::surface::{report, Delivery};

    #[test]
    fn tracing_map_records_scene() {
        let icons = StandardIcons::default();
        let cities = CityDirectory::default();
        let mut backend = TracingMap::default();
        let scene = MapScene::new()
            .with_vehicle(GeoPoint::new(18.52, 73.85), "Swift")
            .with_delivery(GeoPoint::new(18.60, 73.90), "Drop-off");

        let rendered = MarkerRenderer::new(&icons, &cities).render(&mut backend, "fleet-map", &scene);

        assert_eq!(backend.maps_created(), 1);
        assert_eq!(rendered.map.markers, 2);
        assert_eq!(rendered.map.polylines, 0);
        assert_eq!(rendered.map.bounds.as_ref().map(Vec::len), Some(2));
        assert_eq!(rendered.markers, vec![1, 2]);
    }

    #[test]
    fn log_feedback_delivery_modes() {
        let mut inline = LogFeedback::default();
        assert_eq!(report(&mut inline, FeedbackKind::Info, "Loaded"), Delivery::Inline);

        let mut alerts = LogFeedback::new(false);
        assert_eq!(report(&mut alerts, FeedbackKind::Error, "Failed"), Delivery::Alert);
        assert_eq!(alerts.delivered(), ["Failed".to_string()]);
    }

    #[test]
    fn modal_tracks_visibility() {
        let mut modal = LogModal::default();
        modal.show();
        assert!(modal.is_visible());
        modal.hide();
        assert!(!modal.is_visible());
    }
}
