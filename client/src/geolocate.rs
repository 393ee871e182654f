use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::map_surface::{MapSurface, MarkerIcon, MarkerSpec, Popup};

/// Current device position, latitude first (display order, unlike the
/// backend's lon/lat payloads).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// Classified geolocation failure. Every call site gets a taxonomy and a
/// human-readable reason; none may leave a failure unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown,
}

impl GeoError {
    pub fn reason(&self) -> &'static str {
        match self {
            GeoError::PermissionDenied => {
                "Please enable location permissions in your browser settings."
            }
            GeoError::PositionUnavailable => "Location information is unavailable.",
            GeoError::Timeout => "Location request timed out.",
            GeoError::Unknown => "An unknown error occurred.",
        }
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not get your location. {}", self.reason())
    }
}

impl std::error::Error for GeoError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the caller will accept.
    pub max_age: Duration,
}

impl LocateOptions {
    /// Initial map centering wants a fresh, fast fix.
    pub fn centering() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(5),
            max_age: Duration::ZERO,
        }
    }

    /// Navigation handoff tolerates a cached fix up to a minute old and
    /// waits longer before giving up.
    pub fn navigation() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(60),
        }
    }
}

/// Seam over the platform location API.
pub trait LocationProvider: Send + Sync {
    fn locate(
        &self,
        options: LocateOptions,
    ) -> impl Future<Output = Result<Position, GeoError>> + Send;
}

/// Provider with a fixed position, for headless runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocationProvider {
    pub position: Position,
}

impl LocationProvider for StaticLocationProvider {
    async fn locate(&self, _options: LocateOptions) -> Result<Position, GeoError> {
        Ok(self.position)
    }
}

/// Provider that always fails with a fixed classification; stands in for a
/// device without location support.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableLocationProvider {
    pub error: GeoError,
}

impl Default for UnavailableLocationProvider {
    fn default() -> Self {
        Self {
            error: GeoError::PositionUnavailable,
        }
    }
}

impl LocationProvider for UnavailableLocationProvider {
    async fn locate(&self, _options: LocateOptions) -> Result<Position, GeoError> {
        Err(self.error)
    }
}

/// Uniform success/failure gate over a location provider. Callers decide UI
/// behavior; the gate guarantees classification and logging.
pub struct GeolocationGate<P: LocationProvider> {
    provider: P,
}

impl<P: LocationProvider> GeolocationGate<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn locate(&self, options: LocateOptions) -> Result<Position, GeoError> {
        match self.provider.locate(options).await {
            Ok(position) => Ok(position),
            Err(e) => {
                warn!(error = %e, "geolocation failed");
                Err(e)
            }
        }
    }
}

/// Centers the map on the device and drops a "you are here" marker. The
/// marker is deliberately not part of the route overlay set, so redraws
/// leave it alone. Failure degrades to keeping the current view.
pub async fn show_current_location<P, S>(
    gate: &GeolocationGate<P>,
    surface: &S,
) -> Result<Position, GeoError>
where
    P: LocationProvider,
    S: MapSurface,
{
    let position = gate.locate(LocateOptions::centering()).await?;
    surface.set_view(position.lat, position.lon, 15);
    surface.add_marker(MarkerSpec {
        lat: position.lat,
        lon: position.lon,
        label: String::new(),
        icon: MarkerIcon::CurrentLocation,
        title: "You are here".to_string(),
        popup: Some(Popup::new(vec!["You are here".to_string()])),
    });
    info!(lat = position.lat, lon = position.lon, "map centered on current location");
    Ok(position)
}
