use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::warn;

use crate::config;
use crate::poll_gate::PollGate;

/// Shared per-session client state. One instance per page session; cheap to
/// clone into background tasks.
#[derive(Clone)]
pub struct ClientState {
    pub http_client: reqwest::Client,
    pub backend_url: Arc<String>,
    pub gate: Arc<PollGate>,
    pub counters: Arc<ClientCounters>,
}

impl ClientState {
    pub fn new(backend_url: String, min_poll_gap: Duration) -> Self {
        let request_timeout = config::http_timeout();
        let connect_timeout = config::connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("courier-client/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });

        Self {
            http_client,
            backend_url: Arc::new(backend_url),
            gate: Arc::new(PollGate::new(min_poll_gap)),
            counters: Arc::new(ClientCounters::default()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientCounters {
    polls_attempted_total: AtomicU64,
    polls_skipped_total: AtomicU64,
    poll_failures_total: AtomicU64,
    traffic_updates_applied_total: AtomicU64,
    renders_superseded_total: AtomicU64,
    render_failures_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ClientCountersSnapshot {
    pub polls_attempted_total: u64,
    pub polls_skipped_total: u64,
    pub poll_failures_total: u64,
    pub traffic_updates_applied_total: u64,
    pub renders_superseded_total: u64,
    pub render_failures_total: u64,
}

impl ClientCounters {
    pub fn snapshot(&self) -> ClientCountersSnapshot {
        ClientCountersSnapshot {
            polls_attempted_total: self.polls_attempted_total.load(Ordering::Relaxed),
            polls_skipped_total: self.polls_skipped_total.load(Ordering::Relaxed),
            poll_failures_total: self.poll_failures_total.load(Ordering::Relaxed),
            traffic_updates_applied_total: self.traffic_updates_applied_total.load(Ordering::Relaxed),
            renders_superseded_total: self.renders_superseded_total.load(Ordering::Relaxed),
            render_failures_total: self.render_failures_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_poll_attempted(&self) {
        self.polls_attempted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_poll_skipped(&self) {
        self.polls_skipped_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_poll_failure(&self) {
        self.poll_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_traffic_update_applied(&self) {
        self.traffic_updates_applied_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_render_superseded(&self) {
        self.renders_superseded_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_render_failure(&self) {
        self.render_failures_total.fetch_add(1, Ordering::Relaxed);
    }
}
