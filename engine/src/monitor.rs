//! Correlation monitor loop
//!
//! One sequential task: probe -> gate -> correlate -> emit -> sleep.
//!
//! Each cycle fetches the first instrument as a freshness probe. When the
//! time and growth gates are both open, both instruments are fetched again and
//! correlated; the outcome is emitted as a report or an error. A probe that
//! fails is a report failure as soon as the time gate is open, and goes through
//! the error policy like any other.
//!
//! Malformed provider payloads are unexpected: they are emitted, logged, and
//! followed by a backoff sleep instead of the poll sleep.
//!
//! Shutdown is observed at cycle boundaries and during the sleep, never in the
//! middle of a fetch.

use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use common::logger::{TraceId, root_span};
use market::PriceHistoryProvider;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};

use crate::correlation::{CorrelationEngine, CorrelationError};
use crate::gate::{ErrorPolicy, MonitorState};
use crate::report::{CorrelationReport, EventHandler, MonitorEvent};
use crate::types::PairRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Sleep between cycles.
    pub poll_interval: Duration,

    /// Minimum time between two reports (time gate).
    pub min_report_interval: Duration,

    /// Sleep after an unexpected failure.
    pub error_backoff: Duration,

    pub error_policy: ErrorPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            min_report_interval: Duration::from_secs(60),
            error_backoff: Duration::from_secs(5),
            error_policy: ErrorPolicy::Retry,
        }
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Reported,
    Failed,
    Waiting,
    Unexpected,
}

pub struct CorrelationMonitor<P> {
    engine: CorrelationEngine<P>,
    request: PairRequest,
    config: MonitorConfig,
    handler: EventHandler,
}

impl<P: PriceHistoryProvider> CorrelationMonitor<P> {
    pub fn new(
        engine: CorrelationEngine<P>,
        request: PairRequest,
        config: MonitorConfig,
        handler: EventHandler,
    ) -> Self {
        Self {
            engine,
            request,
            config,
            handler,
        }
    }

    /// Polls until `shutdown` turns `true`, then emits a single stop notice.
    ///
    /// Returns the final gate state.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> MonitorState {
        let mut state = MonitorState::new();

        info!(
            pair = %self.request.id(),
            interval = %self.request.interval,
            lookback = %self.request.lookback(),
            poll_ms = self.config.poll_interval.as_millis() as u64,
            min_report_ms = self.config.min_report_interval.as_millis() as u64,
            policy = ?self.config.error_policy,
            "correlation monitor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let trace_id = TraceId::new();
            let span = root_span("poll_cycle", &trace_id);
            span.record("pair_id", self.request.id().as_str());

            let outcome = self.poll_once(&mut state).instrument(span).await;

            let pause = match outcome {
                PollOutcome::Unexpected => self.config.error_backoff,
                _ => self.config.poll_interval,
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = stop_requested(&mut shutdown) => break,
            }
        }

        info!(pair = %self.request.id(), "correlation monitor stopped");
        (self.handler)(&MonitorEvent::Stopped);
        state
    }

    /// Runs one cycle against `state`. Never fails; failures become events.
    pub async fn poll_once(&self, state: &mut MonitorState) -> PollOutcome {
        match self.try_poll(state).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(error = ?error, "poll cycle failed; backing off");
                (self.handler)(&MonitorEvent::Unexpected {
                    at: Local::now(),
                    error,
                });
                PollOutcome::Unexpected
            }
        }
    }

    async fn try_poll(&self, state: &mut MonitorState) -> anyhow::Result<PollOutcome> {
        let probe = self.engine.fetch(&self.request.first, &self.request).await;
        let now = Instant::now();

        let probe = match probe {
            Ok(series) => series,
            Err(error) if error.is_unexpected() => {
                return Err(error).context("freshness probe failed");
            }
            Err(error) => {
                if !state.time_gate_open(now, self.config.min_report_interval) {
                    debug!(%error, "freshness probe failed; no report due");
                    return Ok(PollOutcome::Waiting);
                }
                return Ok(self.fail(state, now, error));
            }
        };

        let sample_count = probe.len();
        if !state.should_report(now, sample_count, self.config.min_report_interval) {
            debug!(
                sample_count,
                last_sample_count = ?state.last_sample_count,
                "no report due"
            );
            return Ok(PollOutcome::Waiting);
        }

        match self.engine.correlate(&self.request).await {
            Ok(value) => {
                info!(value, sample_count, "correlation reported");
                (self.handler)(&MonitorEvent::Report(CorrelationReport {
                    at: Local::now(),
                    first: self.request.first.clone(),
                    second: self.request.second.clone(),
                    value,
                    interval: self.request.interval,
                    window: self.request.window,
                    sample_count,
                }));
                state.record_report(now, sample_count);
                Ok(PollOutcome::Reported)
            }
            Err(error) if error.is_unexpected() => {
                Err(error).context("correlation attempt failed")
            }
            Err(error) => Ok(self.fail(state, now, error)),
        }
    }

    fn fail(&self, state: &mut MonitorState, now: Instant, error: CorrelationError) -> PollOutcome {
        warn!(%error, "correlation attempt failed");
        (self.handler)(&MonitorEvent::Failed {
            at: Local::now(),
            error,
        });
        state.record_error(now, self.config.error_policy);
        PollOutcome::Failed
    }
}

/// Resolves once a stop is signalled. A dropped sender can never signal, so
/// that case never resolves.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
