use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use courier_shared::RoutePayload;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config;
use crate::map_surface::MapSurface;
use crate::notify::{NotificationSink, TrafficNotice};
use crate::renderer::{RenderOutcome, RouteRenderer};
use crate::state::ClientState;

type FetchResultFuture<'a> = Pin<Box<dyn Future<Output = Result<RoutePayload, String>> + Send + 'a>>;

/// Page visibility transitions, forwarded from the presentation layer.
/// Becoming visible is a chance to catch up on a missed check; everything
/// still goes through the rate-limiting gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: Duration,
    pub warmup_delay: Duration,
}

impl PollerConfig {
    pub fn from_env() -> Self {
        Self {
            interval: config::poll_interval(),
            warmup_delay: config::warmup_delay(),
        }
    }
}

/// Background traffic check loop. Runs for the page session; ticks and
/// visibility-restored events funnel into one gated poll. Failures never
/// stop the timer.
pub async fn run<S, N>(
    cfg: PollerConfig,
    state: ClientState,
    renderer: Arc<RouteRenderer<S>>,
    sink: Arc<N>,
    mut visibility: mpsc::Receiver<Visibility>,
) where
    S: MapSurface,
    N: NotificationSink,
{
    // Early warm-up check shortly after the map comes up.
    tokio::time::sleep(cfg.warmup_delay).await;
    maybe_poll(&state, &renderer, sink.as_ref()).await;

    let mut interval =
        tokio::time::interval_at(tokio::time::Instant::now() + cfg.interval, cfg.interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                maybe_poll(&state, &renderer, sink.as_ref()).await;
            }
            Some(event) = visibility.recv() => {
                if event == Visibility::Visible {
                    maybe_poll(&state, &renderer, sink.as_ref()).await;
                }
            }
        }
    }
}

/// The single poll gate. Claims the watermark *before* fetching so a slow
/// response cannot overlap with the next tick; a claim that is too soon is
/// dropped outright.
pub async fn maybe_poll<S, N>(state: &ClientState, renderer: &RouteRenderer<S>, sink: &N)
where
    S: MapSurface,
    N: NotificationSink,
{
    let now_ms = Utc::now().timestamp_millis().max(0) as u64;
    if !state.gate.try_claim(now_ms) {
        state.counters.record_poll_skipped();
        debug!("traffic check skipped, minimum gap not reached");
        return;
    }
    state.counters.record_poll_attempted();

    poll_once_with(state, renderer, sink, |client, base_url| {
        Box::pin(fetch_route_update(client, base_url))
    })
    .await;
}

async fn poll_once_with<S, N, F>(
    state: &ClientState,
    renderer: &RouteRenderer<S>,
    sink: &N,
    fetch_fn: F,
) where
    S: MapSurface,
    N: NotificationSink,
    F: for<'a> FnOnce(&'a reqwest::Client, &'a str) -> FetchResultFuture<'a>,
{
    match fetch_fn(&state.http_client, state.backend_url.as_str()).await {
        Ok(payload) if payload.has_traffic_update => {
            let reason = payload
                .traffic_update_reason
                .clone()
                .unwrap_or_else(|| "Route conditions have changed".to_string());
            sink.traffic_update(TrafficNotice { reason });

            match renderer.render(payload).await {
                Ok(RenderOutcome::Rendered { markers, polylines }) => {
                    state.counters.record_traffic_update_applied();
                    info!(markers, polylines, "route redrawn with fresh traffic data");
                }
                Ok(RenderOutcome::Superseded) => {
                    state.counters.record_render_superseded();
                }
                Err(e) => {
                    // Background redraw failure degrades silently; the
                    // previous route stays on screen.
                    state.counters.record_render_failure();
                    warn!(error = %e, "failed to redraw route from traffic update");
                }
            }
        }
        Ok(_) => {
            debug!("no traffic update available");
        }
        Err(e) => {
            // The timer keeps running and the watermark stands, so the next
            // natural tick still respects the minimum gap.
            state.counters.record_poll_failure();
            warn!("failed to check for traffic updates: {e}");
        }
    }
}

/// One traffic re-check against the backend.
async fn fetch_route_update(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<RoutePayload, String> {
    fetch_route(client, &format!("{base_url}/get_route?check_traffic=true")).await
}

/// The current route without forcing a traffic re-check, for the initial
/// draw on page load.
pub async fn fetch_current_route(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<RoutePayload, String> {
    fetch_route(client, &format!("{base_url}/get_route")).await
}

async fn fetch_route(client: &reqwest::Client, url: &str) -> Result<RoutePayload, String> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| format!("failed to read response body: {e}"))?;

    if !status.is_success() {
        let preview = String::from_utf8_lossy(&bytes)
            .chars()
            .take(200)
            .collect::<String>();
        return Err(format!("backend status {status}; body preview: {preview}"));
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        let preview = String::from_utf8_lossy(&bytes)
            .chars()
            .take(200)
            .collect::<String>();
        format!("failed to decode route payload: {e}; body preview: {preview}")
    })
}
