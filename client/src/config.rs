use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

// The two historical map-module variants disagreed on the polling constants
// (120 s vs 30 s). 120 s is canonical: it matches the backend's own 2-minute
// staleness window for traffic re-checks. Both knobs stay configurable.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 120;
pub const DEFAULT_MIN_POLL_GAP_SECS: u64 = 120;
pub const DEFAULT_WARMUP_DELAY_SECS: u64 = 5;
pub const DEFAULT_NOTICE_DISMISS_SECS: u64 = 10;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

/// Warsaw city center, the map's default view before any route is drawn.
pub const DEFAULT_CENTER: (f64, f64) = (52.2297, 21.0122);
pub const DEFAULT_ZOOM: u8 = 13;
pub const VIEWPORT_PADDING: [u32; 2] = [50, 50];

pub fn backend_url() -> String {
    std::env::var("COURIER_BACKEND_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

pub fn poll_interval() -> Duration {
    duration_from_env("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)
}

pub fn min_poll_gap() -> Duration {
    duration_from_env("MIN_POLL_GAP_SECS", DEFAULT_MIN_POLL_GAP_SECS)
}

pub fn warmup_delay() -> Duration {
    duration_from_env("WARMUP_DELAY_SECS", DEFAULT_WARMUP_DELAY_SECS)
}

pub fn notice_dismiss() -> Duration {
    duration_from_env("NOTICE_DISMISS_SECS", DEFAULT_NOTICE_DISMISS_SECS)
}

pub fn http_timeout() -> Duration {
    duration_from_env("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
}

pub fn connect_timeout() -> Duration {
    duration_from_env("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)
}

/// Optional export-controls capability. Off by default; only one of the two
/// historical UI variants shipped it.
pub fn export_options_enabled() -> bool {
    std::env::var("EXPORT_OPTIONS")
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

fn duration_from_env(key: &str, default_secs: u64) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn poll_interval_honors_env_override() {
        temp_env::with_var("POLL_INTERVAL_SECS", Some("30"), || {
            assert_eq!(super::poll_interval(), Duration::from_secs(30));
        });
    }

    #[test]
    fn invalid_override_falls_back_to_default() {
        temp_env::with_var("MIN_POLL_GAP_SECS", Some("soon"), || {
            assert_eq!(
                super::min_poll_gap(),
                Duration::from_secs(super::DEFAULT_MIN_POLL_GAP_SECS)
            );
        });
        temp_env::with_var("MIN_POLL_GAP_SECS", Some("0"), || {
            assert_eq!(
                super::min_poll_gap(),
                Duration::from_secs(super::DEFAULT_MIN_POLL_GAP_SECS)
            );
        });
    }

    #[test]
    fn backend_url_strips_trailing_slash() {
        temp_env::with_var("COURIER_BACKEND_URL", Some("http://backend:5000/"), || {
            assert_eq!(super::backend_url(), "http://backend:5000");
        });
    }

    #[test]
    fn export_options_flag_parses_truthy_values() {
        temp_env::with_var("EXPORT_OPTIONS", Some("on"), || {
            assert!(super::export_options_enabled());
        });
        temp_env::with_var("EXPORT_OPTIONS", Some("off"), || {
            assert!(!super::export_options_enabled());
        });
        temp_env::with_var("EXPORT_OPTIONS", None::<&str>, || {
            assert!(!super::export_options_enabled());
        });
    }
}
