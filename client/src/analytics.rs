use courier_shared::AnalyticsData;
use tracing::{info, warn};

use crate::map_surface::{Control, MapSurface};
use crate::state::ClientState;

/// Loads the pre-aggregated dashboard payload. A failure is not fatal to the
/// page; the dashboard shows its error banner and everything else keeps
/// working.
pub async fn load_dashboard<S: MapSurface>(
    state: &ClientState,
    surface: &S,
) -> Option<AnalyticsData> {
    let result = fetch_analytics(&state.http_client, state.backend_url.as_str()).await;
    apply_dashboard(result, surface)
}

fn apply_dashboard<S: MapSurface>(
    result: Result<AnalyticsData, String>,
    surface: &S,
) -> Option<AnalyticsData> {
    match result {
        Ok(data) => {
            surface.set_control_visible(Control::AnalyticsError, false);
            info!(
                total_routes = data.total_routes,
                total_distance = data.total_distance,
                "analytics dashboard loaded"
            );
            Some(data)
        }
        Err(e) => {
            warn!("failed to load analytics data: {e}");
            surface.set_control_visible(Control::AnalyticsError, true);
            None
        }
    }
}

async fn fetch_analytics(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<AnalyticsData, String> {
    let resp = client
        .get(format!("{base_url}/analytics/data"))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("backend status {status}"));
    }
    resp.json::<AnalyticsData>()
        .await
        .map_err(|e| format!("failed to decode analytics payload: {e}"))
}

/// Headline value for the total-distance card.
pub fn total_distance_label(data: &AnalyticsData) -> String {
    format!("{:.1} km", data.total_distance)
}

/// Headline value for the total-routes card.
pub fn total_routes_label(data: &AnalyticsData) -> String {
    data.total_routes.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use courier_shared::AnalyticsData;

    use super::{apply_dashboard, load_dashboard, total_distance_label, total_routes_label};
    use crate::map_surface::{Control, MapSurface, RecordingSurface};
    use crate::state::ClientState;

    fn sample() -> AnalyticsData {
        AnalyticsData {
            total_distance: 412.5,
            total_routes: 37,
            monthly_routes: HashMap::new(),
            category_distribution: HashMap::new(),
        }
    }

    #[test]
    fn success_clears_the_error_banner() {
        let surface = RecordingSurface::new();
        surface.set_control_visible(Control::AnalyticsError, true);

        let data = apply_dashboard(Ok(sample()), &surface).expect("data should be returned");
        assert_eq!(data.total_routes, 37);
        assert!(!surface.control_visible(Control::AnalyticsError));
    }

    #[test]
    fn failure_shows_the_error_banner_and_yields_nothing() {
        let surface = RecordingSurface::new();
        let data = apply_dashboard(Err("backend status 500".to_string()), &surface);
        assert!(data.is_none());
        assert!(surface.control_visible(Control::AnalyticsError));
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_the_error_banner() {
        let state = ClientState::new("http://127.0.0.1:9".to_string(), Duration::ZERO);
        let surface = RecordingSurface::new();
        assert!(load_dashboard(&state, &surface).await.is_none());
        assert!(surface.control_visible(Control::AnalyticsError));
    }

    #[test]
    fn headline_labels_round_and_count() {
        let data = sample();
        assert_eq!(total_distance_label(&data), "412.5 km");
        assert_eq!(total_routes_label(&data), "37");
    }
}
