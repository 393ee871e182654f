use std::sync::Arc;

use courier_client::analytics;
use courier_client::config;
use courier_client::geolocate::{
    GeolocationGate, Position, StaticLocationProvider, UnavailableLocationProvider,
    show_current_location,
};
use courier_client::map_surface::{MapSurface, TracingSurface};
use courier_client::notify::TransientNotices;
use courier_client::renderer::RouteRenderer;
use courier_client::services::traffic_poller;
use courier_client::state::ClientState;
use tokio::signal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let backend_url = config::backend_url();
    tracing::info!(%backend_url, "starting courier client session");
    let state = ClientState::new(backend_url, config::min_poll_gap());

    let surface = TracingSurface::new();
    surface.set_view(config::DEFAULT_CENTER.0, config::DEFAULT_CENTER.1, config::DEFAULT_ZOOM);

    let renderer = Arc::new(
        RouteRenderer::new(surface).with_export_options(config::export_options_enabled()),
    );
    let notices = Arc::new(TransientNotices::new(config::notice_dismiss()));

    // Center on the device if a position is available; otherwise keep the
    // default view.
    match fixed_position_from_env() {
        Some(position) => {
            let gate = GeolocationGate::new(StaticLocationProvider { position });
            if let Err(e) = show_current_location(&gate, renderer.surface()).await {
                tracing::warn!(error = %e, "keeping the default map view");
            }
        }
        None => {
            let gate = GeolocationGate::new(UnavailableLocationProvider::default());
            if let Err(e) = show_current_location(&gate, renderer.surface()).await {
                tracing::warn!(error = %e, "keeping the default map view");
            }
        }
    }

    // Initial draw of whatever route the session already has.
    match traffic_poller::fetch_current_route(&state.http_client, state.backend_url.as_str()).await
    {
        Ok(payload) if !payload.is_empty() => {
            if let Err(e) = renderer.render(payload).await {
                tracing::warn!(error = %e, "failed to draw the current route");
            }
        }
        Ok(_) => {
            tracing::info!("no active route for this session yet");
        }
        Err(e) => {
            tracing::warn!("failed to load the current route: {e}");
        }
    }

    if let Some(data) = analytics::load_dashboard(&state, renderer.surface()).await {
        let today = chrono::Utc::now().date_naive();
        for point in courier_shared::monthly_series(today, &data.monthly_routes) {
            tracing::info!(month = %point.month, count = point.count, "monthly route count");
        }
        tracing::info!(
            total_distance = %analytics::total_distance_label(&data),
            total_routes = %analytics::total_routes_label(&data),
            "dashboard totals"
        );
    }

    let (visibility_tx, visibility_rx) = mpsc::channel(8);
    // The sender half stands in for the page visibility hook; the headless
    // binary never hides, so the channel stays idle.
    let _visibility = visibility_tx;
    tokio::spawn(traffic_poller::run(
        traffic_poller::PollerConfig::from_env(),
        state.clone(),
        Arc::clone(&renderer),
        Arc::clone(&notices),
        visibility_rx,
    ));

    shutdown_signal().await;
    let counters = state.counters.snapshot();
    tracing::info!(
        polls_attempted = counters.polls_attempted_total,
        polls_skipped = counters.polls_skipped_total,
        poll_failures = counters.poll_failures_total,
        traffic_updates_applied = counters.traffic_updates_applied_total,
        "client session ended"
    );
}

/// `COURIER_POSITION=lat,lon` pins the device position for headless runs.
fn fixed_position_from_env() -> Option<Position> {
    let raw = std::env::var("COURIER_POSITION").ok()?;
    let (lat, lon) = raw.split_once(',')?;
    match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Some(Position { lat, lon }),
        _ => {
            tracing::warn!(%raw, "ignoring malformed COURIER_POSITION");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
