use std::str::FromStr;
use std::time::Duration;

use engine::{ErrorPolicy, MonitorConfig};
use market::YahooChartClient;

const DEFAULT_BASE_URL: &str = YahooChartClient::DEFAULT_BASE_URL;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the chart endpoint.
    pub provider_url: String,

    /// Per-request timeout for the HTTP client.
    pub http_timeout: Duration,

    // =========================
    // Monitor configuration
    // =========================
    /// Sleep between two poll cycles.
    ///
    /// Each cycle costs one provider round-trip (the freshness probe), plus
    /// two more when a report is due.
    pub poll_interval: Duration,

    /// Minimum time between two reports.
    ///
    /// Even if the provider publishes new samples every few seconds, the
    /// operator sees at most one report per interval.
    pub min_report_interval: Duration,

    /// Sleep after an unexpected failure (e.g. the freshness probe itself failed).
    pub error_backoff: Duration,

    /// Whether a failed report attempt counts against the time gate.
    ///
    /// - `retry`: re-attempt on the next poll (an error line every poll while
    ///   the failure persists)
    /// - `debounce`: at most one error line per `min_report_interval`
    pub error_policy: ErrorPolicy,

    /// Provider round-trips slower than this are logged as warnings.
    pub slow_fetch: Duration,

    /// JSON logs instead of the pretty formatter.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| Duration::from_secs(parsed(&lookup, key, default));

        Self {
            provider_url: lookup("PAIRWATCH_PROVIDER_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http_timeout: secs("PAIRWATCH_HTTP_TIMEOUT_SECS", 10),

            // Monitor defaults: poll every 5s, report at most once a minute.
            poll_interval: secs("PAIRWATCH_POLL_INTERVAL_SECS", 5),
            min_report_interval: secs("PAIRWATCH_MIN_REPORT_INTERVAL_SECS", 60),
            error_backoff: secs("PAIRWATCH_ERROR_BACKOFF_SECS", 5),
            error_policy: parsed(&lookup, "PAIRWATCH_ERROR_POLICY", ErrorPolicy::Retry),

            slow_fetch: Duration::from_millis(parsed(&lookup, "PAIRWATCH_SLOW_FETCH_MS", 2_000)),
            json_logs: lookup("APP_ENV").is_some_and(|v| v == "production"),
        }
    }

    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: self.poll_interval,
            min_report_interval: self.min_report_interval,
            error_backoff: self.error_backoff,
            error_policy: self.error_policy,
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, ?default, "unparsable config value; using default");
            default
        }
    }
}
