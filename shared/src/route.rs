use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::traffic::TrafficColor;

/// Coordinate in backend order: `[lon, lat]` (GeoJSON convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat(pub f64, pub f64);

impl LonLat {
    pub fn lon(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

/// Route payload returned by `GET /get_route`.
///
/// The backend is lenient about which fields it includes depending on
/// whether the route was freshly optimized or re-checked for traffic, so
/// everything except the coordinate list is optional and defaulted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePayload {
    #[serde(default)]
    pub coordinates: Vec<LonLat>,
    /// Per-leg geometry with traffic annotations. Newer backends emit this
    /// top-level; older ones nest it under `route_details`.
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub route_details: Option<RouteDetails>,
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Stop index -> detail. Sparse: stops without form details are absent.
    #[serde(default)]
    pub location_details: HashMap<usize, LocationDetail>,
    #[serde(default)]
    pub total_distance: f64,
    #[serde(default)]
    pub total_time: String,
    #[serde(default)]
    pub traffic_conditions: Vec<TrafficCondition>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_delay_text: Option<String>,
    #[serde(default)]
    pub has_traffic_data: bool,
    #[serde(default)]
    pub has_traffic_update: bool,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_update_reason: Option<String>,
}

impl RoutePayload {
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn first_stop(&self) -> Option<LonLat> {
        self.coordinates.first().copied()
    }

    /// A closed-loop route repeats the first coordinate at the end. That
    /// trailing point is a return leg, not a stop, and must not get its own
    /// marker or summary entry.
    pub fn has_trailing_duplicate(&self) -> bool {
        match (self.coordinates.first(), self.coordinates.last()) {
            (Some(first), Some(last)) => self.coordinates.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Coordinates that represent actual stops, indexed in visit order.
    pub fn stops(&self) -> &[LonLat] {
        if self.has_trailing_duplicate() {
            &self.coordinates[..self.coordinates.len() - 1]
        } else {
            &self.coordinates
        }
    }

    /// Segment source precedence: top-level `segments`, then the legacy
    /// `route_details.segments` nesting. `None` means the caller should fall
    /// back to a single polyline through all coordinates.
    pub fn effective_segments(&self) -> Option<&[Segment]> {
        if !self.segments.is_empty() {
            return Some(&self.segments);
        }
        self.route_details
            .as_ref()
            .filter(|details| !details.segments.is_empty())
            .map(|details| details.segments.as_slice())
    }
}

/// Legacy envelope for segment data. Older backends put the whole routing
/// response here; only the segments are consumed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteDetails {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// At least two points; exactly two is the straight-line fallback the
    /// backend emits when it has no road geometry for a leg.
    pub geometry: Vec<LonLat>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_color: Option<TrafficColor>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_level: Option<u8>,
    /// Seconds of delay attributed to traffic on this leg.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_delay: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficCondition {
    #[serde(default)]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDetail {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub category: Category,
    /// "HH:MM", passed through opaquely.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window_start: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window_end: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<String>,
}

impl LocationDetail {
    pub fn address(&self) -> String {
        format!("{} {}, {}", self.street, self.number, self.city)
    }

    /// Both bounds must be present for the window to count.
    pub fn time_window(&self) -> Option<(&str, &str)> {
        match (&self.time_window_start, &self.time_window_end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => None,
        }
    }
}

/// Stop category used for marker icons, summary labels and the analytics
/// dashboard. The enum values are part of the form-field contract with the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Home,
    Office,
    Business,
    PickupPoint,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Home,
        Category::Office,
        Category::Business,
        Category::PickupPoint,
        Category::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Home => "home",
            Category::Office => "office",
            Category::Business => "business",
            Category::PickupPoint => "pickup_point",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Home => "Home",
            Category::Office => "Office",
            Category::Business => "Business",
            Category::PickupPoint => "Pickup Point",
            Category::Other => "Other",
        }
    }
}
