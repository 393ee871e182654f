use std::collections::HashMap;
use std::sync::Mutex;

use courier_shared::Category;
use tracing::info;

use crate::summary::RouteSummary;
use crate::ui;

/// Handle to a marker or polyline owned by the renderer. Handles are only
/// meaningful to the surface that issued them.
pub type LayerId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub lat: f64,
    pub lon: f64,
    /// "Start" for the first stop, the stop number otherwise.
    pub label: String,
    pub icon: MarkerIcon,
    pub title: String,
    pub popup: Option<Popup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    /// Plain numbered disc.
    Plain,
    /// Category glyph for stops with full location details.
    Category(Category),
    /// The "you are here" marker; not part of the route overlay set.
    CurrentLocation,
}

/// Popup body as ordered text lines; the presentation layer owns markup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Popup {
    pub lines: Vec<String>,
}

impl Popup {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    /// (lat, lon) pairs, already flipped from the backend's lon/lat order.
    pub points: Vec<(f64, f64)>,
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    pub popup: Option<Popup>,
}

/// Geographic bounding box for viewport fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_points<'a, I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a (f64, f64)>,
    {
        let mut bounds: Option<Bounds> = None;
        for &(lat, lon) in points {
            bounds = Some(match bounds {
                None => Bounds {
                    south: lat,
                    west: lon,
                    north: lat,
                    east: lon,
                },
                Some(b) => Bounds {
                    south: b.south.min(lat),
                    west: b.west.min(lon),
                    north: b.north.max(lat),
                    east: b.east.max(lon),
                },
            });
        }
        bounds
    }
}

/// UI controls the renderer shows and hides around a redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    RouteSummary,
    StartNavigation,
    SaveRouteForm,
    ExportOptions,
    AnalyticsError,
}

impl Control {
    pub fn element_id(&self) -> &'static str {
        match self {
            Control::RouteSummary => ui::ROUTE_SUMMARY,
            Control::StartNavigation => ui::START_NAVIGATION_BTN,
            Control::SaveRouteForm => ui::SAVE_ROUTE_FORM,
            Control::ExportOptions => ui::EXPORT_OPTIONS,
            Control::AnalyticsError => ui::ANALYTICS_ERROR,
        }
    }
}

/// The map widget seam. The real presentation layer binds this to Leaflet;
/// tests and headless runs bind it to in-memory or logging surfaces.
pub trait MapSurface: Send + Sync {
    fn add_marker(&self, spec: MarkerSpec) -> LayerId;
    fn add_polyline(&self, spec: PolylineSpec) -> LayerId;
    fn remove_layer(&self, id: LayerId);
    fn set_view(&self, lat: f64, lon: f64, zoom: u8);
    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]);
    fn set_control_visible(&self, control: Control, visible: bool);
    fn show_summary(&self, summary: &RouteSummary);
}

/// In-memory surface that records every operation. Used by tests and by
/// headless runs that want to inspect the drawn state.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    inner: Mutex<RecordingInner>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    next_id: LayerId,
    markers: HashMap<LayerId, MarkerSpec>,
    polylines: HashMap<LayerId, PolylineSpec>,
    controls: HashMap<Control, bool>,
    last_bounds: Option<(Bounds, [u32; 2])>,
    last_view: Option<(f64, f64, u8)>,
    summaries: Vec<RouteSummary>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.lock().markers.len()
    }

    pub fn polyline_count(&self) -> usize {
        self.lock().polylines.len()
    }

    pub fn markers(&self) -> Vec<MarkerSpec> {
        let inner = self.lock();
        let mut markers: Vec<(LayerId, MarkerSpec)> =
            inner.markers.iter().map(|(id, m)| (*id, m.clone())).collect();
        markers.sort_by_key(|(id, _)| *id);
        markers.into_iter().map(|(_, m)| m).collect()
    }

    pub fn polylines(&self) -> Vec<PolylineSpec> {
        let inner = self.lock();
        let mut lines: Vec<(LayerId, PolylineSpec)> = inner
            .polylines
            .iter()
            .map(|(id, l)| (*id, l.clone()))
            .collect();
        lines.sort_by_key(|(id, _)| *id);
        lines.into_iter().map(|(_, l)| l).collect()
    }

    pub fn control_visible(&self, control: Control) -> bool {
        self.lock().controls.get(&control).copied().unwrap_or(false)
    }

    pub fn last_bounds(&self) -> Option<(Bounds, [u32; 2])> {
        self.lock().last_bounds
    }

    pub fn last_view(&self) -> Option<(f64, f64, u8)> {
        self.lock().last_view
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.lock().summaries.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&self, spec: MarkerSpec) -> LayerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.markers.insert(id, spec);
        id
    }

    fn add_polyline(&self, spec: PolylineSpec) -> LayerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.polylines.insert(id, spec);
        id
    }

    fn remove_layer(&self, id: LayerId) {
        let mut inner = self.lock();
        if inner.markers.remove(&id).is_none() {
            inner.polylines.remove(&id);
        }
    }

    fn set_view(&self, lat: f64, lon: f64, zoom: u8) {
        self.lock().last_view = Some((lat, lon, zoom));
    }

    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]) {
        self.lock().last_bounds = Some((bounds, padding));
    }

    fn set_control_visible(&self, control: Control, visible: bool) {
        self.lock().controls.insert(control, visible);
    }

    fn show_summary(&self, summary: &RouteSummary) {
        self.lock().summaries.push(summary.clone());
    }
}

/// Surface that logs operations instead of drawing. Backs the headless
/// binary so a live session is observable from the terminal.
#[derive(Debug, Default)]
pub struct TracingSurface {
    ids: Mutex<LayerId>,
}

impl TracingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> LayerId {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *ids += 1;
        *ids
    }
}

impl MapSurface for TracingSurface {
    fn add_marker(&self, spec: MarkerSpec) -> LayerId {
        let id = self.next_id();
        info!(id, label = %spec.label, lat = spec.lat, lon = spec.lon, "marker added");
        id
    }

    fn add_polyline(&self, spec: PolylineSpec) -> LayerId {
        let id = self.next_id();
        info!(
            id,
            points = spec.points.len(),
            color = %spec.color,
            weight = spec.weight,
            "polyline added"
        );
        id
    }

    fn remove_layer(&self, id: LayerId) {
        info!(id, "layer removed");
    }

    fn set_view(&self, lat: f64, lon: f64, zoom: u8) {
        info!(lat, lon, zoom, "view moved");
    }

    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]) {
        info!(
            south = bounds.south,
            west = bounds.west,
            north = bounds.north,
            east = bounds.east,
            ?padding,
            "viewport fitted"
        );
    }

    fn set_control_visible(&self, control: Control, visible: bool) {
        info!(element = control.element_id(), visible, "control visibility changed");
    }

    fn show_summary(&self, summary: &RouteSummary) {
        info!(
            distance = %summary.distance_label(),
            time = %summary.total_time,
            stops = summary.stops.len(),
            "route summary updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, Control, MapSurface, MarkerIcon, MarkerSpec, RecordingSurface};

    fn marker(lat: f64, lon: f64) -> MarkerSpec {
        MarkerSpec {
            lat,
            lon,
            label: "1".to_string(),
            icon: MarkerIcon::Plain,
            title: "Stop 1".to_string(),
            popup: None,
        }
    }

    #[test]
    fn bounds_cover_all_points() {
        let points = vec![(52.2, 21.0), (52.4, 20.9), (52.1, 21.3)];
        let bounds = Bounds::from_points(&points).expect("bounds for non-empty points");
        assert_eq!(bounds.south, 52.1);
        assert_eq!(bounds.north, 52.4);
        assert_eq!(bounds.west, 20.9);
        assert_eq!(bounds.east, 21.3);
    }

    #[test]
    fn bounds_of_nothing_is_none() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn removing_a_layer_forgets_it() {
        let surface = RecordingSurface::new();
        let id = surface.add_marker(marker(52.2, 21.0));
        assert_eq!(surface.marker_count(), 1);
        surface.remove_layer(id);
        assert_eq!(surface.marker_count(), 0);
    }

    #[test]
    fn controls_default_to_hidden() {
        let surface = RecordingSurface::new();
        assert!(!surface.control_visible(Control::RouteSummary));
        surface.set_control_visible(Control::RouteSummary, true);
        assert!(surface.control_visible(Control::RouteSummary));
    }

    #[test]
    fn control_element_ids_match_the_ui_contract() {
        assert_eq!(Control::RouteSummary.element_id(), "route-summary");
        assert_eq!(Control::StartNavigation.element_id(), "start-navigation-btn");
        assert_eq!(Control::AnalyticsError.element_id(), "analytics-error");
    }
}
