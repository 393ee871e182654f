use serde::{Deserialize, Serialize};

/// Line style for route legs without any traffic annotation.
pub const DEFAULT_ROUTE_COLOR: &str = "#0d6efd";
pub const DEFAULT_STROKE_WEIGHT: u32 = 5;
/// Heavy-traffic legs are drawn thicker so they stand out on the map.
pub const HEAVY_STROKE_WEIGHT: u32 = 6;

/// Traffic severity on a 0-3 scale as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLevel {
    Free,
    Light,
    Moderate,
    Heavy,
}

impl TrafficLevel {
    pub fn from_level(level: u8) -> Option<TrafficLevel> {
        match level {
            0 => Some(TrafficLevel::Free),
            1 => Some(TrafficLevel::Light),
            2 => Some(TrafficLevel::Moderate),
            3 => Some(TrafficLevel::Heavy),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrafficLevel::Free => "Free flowing traffic",
            TrafficLevel::Light => "Light traffic",
            TrafficLevel::Moderate => "Moderate traffic",
            TrafficLevel::Heavy => "Heavy traffic",
        }
    }
}

/// Status text for a raw backend level, including out-of-range values.
pub fn level_label(level: u8) -> &'static str {
    TrafficLevel::from_level(level).map_or("Unknown", |l| l.label())
}

/// Segment color as emitted by the backend. Unrecognized values render with
/// the default style rather than failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficColor {
    Green,
    Yellow,
    Orange,
    Red,
    #[serde(other)]
    Unknown,
}

impl TrafficColor {
    pub fn hex(&self) -> &'static str {
        match self {
            TrafficColor::Green => "#198754",
            TrafficColor::Yellow => "#ffc107",
            TrafficColor::Orange => "#fd7e14",
            TrafficColor::Red => "#dc3545",
            TrafficColor::Unknown => DEFAULT_ROUTE_COLOR,
        }
    }

    pub fn stroke_weight(&self) -> u32 {
        match self {
            TrafficColor::Red => HEAVY_STROKE_WEIGHT,
            _ => DEFAULT_STROKE_WEIGHT,
        }
    }
}

/// Popup line for a traffic delay, rounded to whole minutes. Zero or
/// negative delays produce no line.
pub fn delay_label(delay_seconds: f64) -> Option<String> {
    if delay_seconds <= 0.0 {
        return None;
    }
    let minutes = (delay_seconds / 60.0).round() as i64;
    Some(format!("+{minutes} min delay"))
}
