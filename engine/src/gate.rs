//! Report debounce.
//!
//! A report is due when both gates are open:
//! - time: nothing reported yet, or at least `min_interval` since the last report
//! - growth: no sample count recorded yet, or the freshness probe saw more samples

use std::str::FromStr;
use std::time::Duration;

use tokio::time::Instant;

/// What a failed report attempt does to the gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Leave the state untouched; the next poll re-attempts as soon as both
    /// gates are still open.
    #[default]
    Retry,
    /// Advance the report instant (not the sample count) so errors are emitted
    /// at most once per minimum report interval.
    Debounce,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retry" => Ok(ErrorPolicy::Retry),
            "debounce" => Ok(ErrorPolicy::Debounce),
            other => Err(format!("unknown error policy: {other:?}")),
        }
    }
}

/// Owned by the monitor loop; dies with the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub last_report_at: Option<Instant>,
    pub last_sample_count: Option<usize>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_gate_open(&self, now: Instant, min_interval: Duration) -> bool {
        match self.last_report_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= min_interval,
        }
    }

    pub fn growth_gate_open(&self, sample_count: usize) -> bool {
        match self.last_sample_count {
            None => true,
            Some(last) => sample_count > last,
        }
    }

    pub fn should_report(&self, now: Instant, sample_count: usize, min_interval: Duration) -> bool {
        self.time_gate_open(now, min_interval) && self.growth_gate_open(sample_count)
    }

    pub fn record_report(&mut self, now: Instant, sample_count: usize) {
        self.last_report_at = Some(now);
        self.last_sample_count = Some(sample_count);
    }

    pub fn record_error(&mut self, now: Instant, policy: ErrorPolicy) {
        match policy {
            ErrorPolicy::Retry => {}
            ErrorPolicy::Debounce => self.last_report_at = Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Duration = Duration::from_secs(60);

    #[test]
    fn fresh_state_reports_immediately() {
        let state = MonitorState::new();
        assert!(state.should_report(Instant::now(), 0, MIN));
    }

    #[test]
    fn time_gate_blocks_before_interval_even_with_growth() {
        let t0 = Instant::now();
        let mut state = MonitorState::new();
        state.record_report(t0, 252);

        for secs in [0, 5, 30, 59] {
            assert!(
                !state.should_report(t0 + Duration::from_secs(secs), 500, MIN),
                "reported {secs}s after last report"
            );
        }
        assert!(state.should_report(t0 + MIN, 253, MIN));
    }

    #[test]
    fn growth_gate_blocks_after_interval_without_new_samples() {
        let t0 = Instant::now();
        let mut state = MonitorState::new();
        state.record_report(t0, 252);

        let later = t0 + Duration::from_secs(3_600);
        assert!(!state.should_report(later, 252, MIN));
        assert!(!state.should_report(later, 251, MIN));
        assert!(state.should_report(later, 253, MIN));
    }

    #[test]
    fn retry_policy_leaves_state_alone() {
        let t0 = Instant::now();
        let mut state = MonitorState::new();
        state.record_error(t0, ErrorPolicy::Retry);

        assert_eq!(state, MonitorState::new());
    }

    #[test]
    fn debounce_policy_only_advances_time_gate() {
        let t0 = Instant::now();
        let mut state = MonitorState::new();
        state.record_error(t0, ErrorPolicy::Debounce);

        assert_eq!(state.last_report_at, Some(t0));
        assert_eq!(state.last_sample_count, None);
        assert!(!state.should_report(t0 + Duration::from_secs(5), 10, MIN));
        assert!(state.should_report(t0 + MIN, 10, MIN));
    }

    #[test]
    fn error_policy_parses() {
        assert_eq!("Retry".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Retry));
        assert_eq!("debounce".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Debounce));
        assert!("backoff".parse::<ErrorPolicy>().is_err());
    }
}
