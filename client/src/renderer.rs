use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use courier_shared::{
    DEFAULT_ROUTE_COLOR, DEFAULT_STROKE_WEIGHT, LocationDetail, LonLat, RoutePayload, Segment,
    delay_label, level_label,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::VIEWPORT_PADDING;
use crate::map_surface::{
    Bounds, Control, LayerId, MapSurface, MarkerIcon, MarkerSpec, Popup, PolylineSpec,
};
use crate::summary::RouteSummary;

const SEGMENT_OPACITY: f64 = 0.8;
const FALLBACK_OPACITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// Payload had no coordinates; nothing was drawn and the previous
    /// overlay state is left untouched.
    EmptyRoute,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptyRoute => write!(f, "no valid route data provided"),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { markers: usize, polylines: usize },
    /// A newer payload arrived while this render waited its turn; nothing
    /// was drawn for it.
    Superseded,
}

/// Owns the route overlays on the map. Every redraw first releases all
/// previously owned layers, so repeated renders never accumulate markers or
/// polylines. Renders are serialized; when payloads race, the newest wins.
pub struct RouteRenderer<S: MapSurface> {
    surface: S,
    export_options: bool,
    generation: AtomicU64,
    inner: Mutex<RendererInner>,
}

#[derive(Default)]
struct RendererInner {
    overlays: Vec<LayerId>,
    current_payload: Option<RoutePayload>,
}

impl<S: MapSurface> RouteRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            export_options: false,
            generation: AtomicU64::new(0),
            inner: Mutex::new(RendererInner::default()),
        }
    }

    pub fn with_export_options(mut self, enabled: bool) -> Self {
        self.export_options = enabled;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Redraws the map from `payload`. Idempotent: rendering the same
    /// payload twice leaves the same overlay set as rendering it once.
    pub async fn render(&self, payload: RoutePayload) -> Result<RenderOutcome, RenderError> {
        let generation = self.claim();
        self.render_claimed(generation, payload).await
    }

    /// Retained copy of the last rendered payload, for navigation.
    pub async fn current_payload(&self) -> Option<RoutePayload> {
        self.inner.lock().await.current_payload.clone()
    }

    /// Removes every owned overlay and hides the route controls. Safe when
    /// nothing was drawn.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        self.clear_locked(&mut inner);
    }

    fn claim(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn render_claimed(
        &self,
        generation: u64,
        payload: RoutePayload,
    ) -> Result<RenderOutcome, RenderError> {
        // Validate before touching the map: a bad payload must not wipe a
        // good route that is already displayed.
        if payload.is_empty() {
            error!("no valid route data provided");
            return Err(RenderError::EmptyRoute);
        }

        let mut inner = self.inner.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "render superseded by newer payload");
            return Ok(RenderOutcome::Superseded);
        }

        self.clear_locked(&mut inner);

        let stops = payload.stops();
        for (index, coord) in stops.iter().enumerate() {
            let spec = marker_spec(index, coord, &payload);
            inner.overlays.push(self.surface.add_marker(spec));
        }
        let markers = stops.len();

        let mut polyline_points: Vec<(f64, f64)> = Vec::new();
        let mut polylines = 0usize;
        match payload.effective_segments() {
            Some(segments) => {
                for segment in segments {
                    if segment.geometry.len() < 2 {
                        debug!("segment with degenerate geometry skipped");
                        continue;
                    }
                    let spec = segment_polyline(segment);
                    polyline_points.extend_from_slice(&spec.points);
                    inner.overlays.push(self.surface.add_polyline(spec));
                    polylines += 1;
                }
            }
            None => {
                let points: Vec<(f64, f64)> = payload
                    .coordinates
                    .iter()
                    .map(|c| (c.lat(), c.lon()))
                    .collect();
                polyline_points.extend_from_slice(&points);
                inner.overlays.push(self.surface.add_polyline(PolylineSpec {
                    points,
                    color: DEFAULT_ROUTE_COLOR.to_string(),
                    weight: DEFAULT_STROKE_WEIGHT,
                    opacity: FALLBACK_OPACITY,
                    popup: None,
                }));
                polylines = 1;
            }
        }

        if let Some(bounds) = Bounds::from_points(&polyline_points) {
            self.surface.fit_bounds(bounds, VIEWPORT_PADDING);
        }

        let summary = RouteSummary::from_payload(&payload);
        self.surface.show_summary(&summary);
        self.surface.set_control_visible(Control::RouteSummary, true);
        self.surface
            .set_control_visible(Control::StartNavigation, true);
        self.surface
            .set_control_visible(Control::SaveRouteForm, true);
        if self.export_options {
            self.surface
                .set_control_visible(Control::ExportOptions, true);
        }

        inner.current_payload = Some(payload);
        info!(markers, polylines, "route drawn");
        Ok(RenderOutcome::Rendered { markers, polylines })
    }

    fn clear_locked(&self, inner: &mut RendererInner) {
        for id in inner.overlays.drain(..) {
            self.surface.remove_layer(id);
        }
        self.surface
            .set_control_visible(Control::RouteSummary, false);
        self.surface
            .set_control_visible(Control::StartNavigation, false);
        self.surface
            .set_control_visible(Control::SaveRouteForm, false);
        self.surface
            .set_control_visible(Control::ExportOptions, false);
    }
}

/// Marker presentation priority: full location details, then a bare
/// address, then just the stop number.
fn marker_spec(index: usize, coord: &LonLat, payload: &RoutePayload) -> MarkerSpec {
    let label = if index == 0 {
        "Start".to_string()
    } else {
        index.to_string()
    };
    let title = format!("Stop {index}");

    if let Some(detail) = payload.location_details.get(&index) {
        return MarkerSpec {
            lat: coord.lat(),
            lon: coord.lon(),
            label,
            icon: MarkerIcon::Category(detail.category),
            title,
            popup: Some(detail_popup(detail)),
        };
    }

    if let Some(address) = payload.addresses.get(index) {
        return MarkerSpec {
            lat: coord.lat(),
            lon: coord.lon(),
            label,
            icon: MarkerIcon::Plain,
            title,
            popup: Some(Popup::new(vec![address.clone()])),
        };
    }

    MarkerSpec {
        lat: coord.lat(),
        lon: coord.lon(),
        label,
        icon: MarkerIcon::Plain,
        title,
        popup: None,
    }
}

fn detail_popup(detail: &LocationDetail) -> Popup {
    let mut lines = vec![
        format!("{} {}", detail.street, detail.number),
        detail.city.clone(),
        detail.category.label().to_string(),
    ];
    if let Some(eta) = &detail.estimated_arrival {
        lines.push(format!("Estimated arrival: {eta}"));
    }
    if let Some((start, end)) = detail.time_window() {
        lines.push(format!("Window: {start} - {end}"));
    }
    Popup::new(lines)
}

fn segment_polyline(segment: &Segment) -> PolylineSpec {
    let points = segment.geometry.iter().map(|c| (c.lat(), c.lon())).collect();
    let (color, weight) = match segment.traffic_color {
        Some(color) => (color.hex().to_string(), color.stroke_weight()),
        None => (DEFAULT_ROUTE_COLOR.to_string(), DEFAULT_STROKE_WEIGHT),
    };

    let popup = segment.traffic_level.map(|level| {
        let mut lines = vec![level_label(level).to_string()];
        if let Some(delay) = segment.traffic_delay.and_then(delay_label) {
            lines.push(delay);
        }
        Popup::new(lines)
    });

    PolylineSpec {
        points,
        color,
        weight,
        opacity: SEGMENT_OPACITY,
        popup,
    }
}
