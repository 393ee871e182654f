use std::fmt;
use std::sync::Mutex;

use courier_shared::RoutePayload;
use tracing::{debug, error, info, warn};

use crate::geolocate::{GeolocationGate, LocateOptions, LocationProvider, Position};

/// Directions deep link from the current position to the first stop. The
/// format must match exactly; it is an outbound compatibility contract.
pub fn directions_link(origin: Position, destination: Position) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode=driving",
        origin.lat, origin.lon, destination.lat, destination.lon
    )
}

/// Search deep link centered on a single point, the fallback when the
/// current position is unknown.
pub fn search_link(point: Position) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        point.lat, point.lon
    )
}

/// Seam over `window.open`. Returns false when the target page is no longer
/// there, so a stale in-flight locate result can be dropped harmlessly.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> bool;
}

/// Opener that logs the link; backs the headless binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOpener;

impl LinkOpener for LogOpener {
    fn open(&self, url: &str) -> bool {
        info!(%url, "opening external navigation link");
        true
    }
}

/// Opener that records every link, for tests.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
    accept: bool,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            accept: true,
        }
    }

    /// An opener whose page has gone away; it refuses every link.
    pub fn closed() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            accept: false,
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> bool {
        if !self.accept {
            return false;
        }
        self.opened
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Located successfully; turn-by-turn directions link opened.
    Directions { url: String },
    /// Geolocation failed; search link centered on the first stop opened,
    /// with a user-visible explanation.
    FallbackSearch { url: String, explanation: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    /// The retained payload has no coordinates; nothing to navigate to.
    NoRoute,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::NoRoute => {
                write!(f, "no valid route data found; optimize a route first")
            }
        }
    }
}

impl std::error::Error for NavigationError {}

/// Hands off to an external maps app for the drive to the first stop.
/// Locate failure is not an error: navigation degrades to a search link on
/// the stop itself.
pub async fn navigate_to_first_stop<P: LocationProvider>(
    gate: &GeolocationGate<P>,
    opener: &impl LinkOpener,
    payload: &RoutePayload,
) -> Result<NavigationOutcome, NavigationError> {
    let Some(first) = payload.first_stop() else {
        error!("navigation requested without a valid route");
        return Err(NavigationError::NoRoute);
    };
    let destination = Position {
        lat: first.lat(),
        lon: first.lon(),
    };

    match gate.locate(LocateOptions::navigation()).await {
        Ok(origin) => {
            let url = directions_link(origin, destination);
            if !opener.open(&url) {
                debug!("navigation target gone; dropping stale locate result");
            }
            Ok(NavigationOutcome::Directions { url })
        }
        Err(e) => {
            warn!(error = %e, "navigating to the first stop without a current position");
            let url = search_link(destination);
            if !opener.open(&url) {
                debug!("navigation target gone; dropping fallback link");
            }
            Ok(NavigationOutcome::FallbackSearch {
                url,
                explanation: format!(
                    "{e} Navigation will start from the first stop of the route."
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_shared::{LonLat, RoutePayload};

    use super::{
        NavigationError, NavigationOutcome, RecordingOpener, directions_link,
        navigate_to_first_stop, search_link,
    };
    use crate::geolocate::{
        GeoError, GeolocationGate, Position, StaticLocationProvider, UnavailableLocationProvider,
    };

    fn payload() -> RoutePayload {
        RoutePayload {
            coordinates: vec![LonLat(21.0, 52.2), LonLat(21.1, 52.3)],
            ..RoutePayload::default()
        }
    }

    #[test]
    fn deep_link_formats_are_exact() {
        let origin = Position {
            lat: 52.23,
            lon: 21.01,
        };
        let dest = Position {
            lat: 52.2,
            lon: 21.0,
        };
        assert_eq!(
            directions_link(origin, dest),
            "https://www.google.com/maps/dir/?api=1&origin=52.23,21.01&destination=52.2,21&travelmode=driving"
        );
        assert_eq!(
            search_link(dest),
            "https://www.google.com/maps/search/?api=1&query=52.2,21"
        );
    }

    #[tokio::test]
    async fn located_navigation_opens_the_directions_variant() {
        let gate = GeolocationGate::new(StaticLocationProvider {
            position: Position {
                lat: 52.23,
                lon: 21.01,
            },
        });
        let opener = RecordingOpener::new();

        let outcome = navigate_to_first_stop(&gate, &opener, &payload())
            .await
            .expect("navigation should succeed");
        match outcome {
            NavigationOutcome::Directions { url } => {
                assert!(url.contains("/maps/dir/"));
                // Destination is the first stop, in lat,lon order.
                assert!(url.contains("destination=52.2,21"));
            }
            other => panic!("expected directions outcome, got {other:?}"),
        }
        assert_eq!(opener.opened().len(), 1);
    }

    #[tokio::test]
    async fn locate_timeout_falls_back_to_the_search_variant() {
        let gate = GeolocationGate::new(UnavailableLocationProvider {
            error: GeoError::Timeout,
        });
        let opener = RecordingOpener::new();

        let outcome = navigate_to_first_stop(&gate, &opener, &payload())
            .await
            .expect("fallback navigation should succeed");
        match outcome {
            NavigationOutcome::FallbackSearch { url, explanation } => {
                assert_eq!(
                    url,
                    "https://www.google.com/maps/search/?api=1&query=52.2,21"
                );
                assert!(explanation.contains("Location request timed out."));
                assert!(explanation.contains("first stop"));
            }
            other => panic!("expected fallback outcome, got {other:?}"),
        }
        assert_eq!(opener.opened(), vec![
            "https://www.google.com/maps/search/?api=1&query=52.2,21".to_string()
        ]);
    }

    #[tokio::test]
    async fn empty_route_is_an_error_and_opens_nothing() {
        let gate = GeolocationGate::new(StaticLocationProvider {
            position: Position {
                lat: 52.23,
                lon: 21.01,
            },
        });
        let opener = RecordingOpener::new();

        let err = navigate_to_first_stop(&gate, &opener, &RoutePayload::default())
            .await
            .expect_err("no route must fail");
        assert_eq!(err, NavigationError::NoRoute);
        assert!(opener.opened().is_empty());
    }

    #[tokio::test]
    async fn stale_result_after_page_gone_is_tolerated() {
        let gate = GeolocationGate::new(StaticLocationProvider {
            position: Position {
                lat: 52.23,
                lon: 21.01,
            },
        });
        let opener = RecordingOpener::closed();

        // The opener refusing the link must not turn into an error.
        let outcome = navigate_to_first_stop(&gate, &opener, &payload())
            .await
            .expect("stale drop is not an error");
        assert!(matches!(outcome, NavigationOutcome::Directions { .. }));
        assert!(opener.opened().is_empty());
    }
}
