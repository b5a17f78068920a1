use std::error::Error;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Local};
use market::{Interval, Window};

use crate::correlation::CorrelationError;

/// Callback that consumes monitor output.
pub type EventHandler = Arc<dyn Fn(&MonitorEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationReport {
    pub at: DateTime<Local>,
    pub first: String,
    pub second: String,
    pub value: f64,
    pub interval: Interval,
    pub window: Window,
    /// Freshness-probe sample count that triggered this report.
    pub sample_count: usize,
}

impl fmt::Display for CorrelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "! New data update at {}", clock(&self.at))?;
        writeln!(
            f,
            "Pearson's correlation between {} and {}: {:.4}",
            self.first, self.second, self.value
        )?;
        writeln!(f, "Timeframe: {}", self.interval)?;
        if self.interval.is_daily_or_coarser() {
            write!(f, "Period: {}", self.window)
        } else {
            write!(f, "Period: Automatically set based on timeframe")
        }
    }
}

#[derive(Debug)]
pub enum MonitorEvent {
    Report(CorrelationReport),

    /// Report attempt failed (fetch, alignment or computation).
    Failed {
        at: DateTime<Local>,
        error: CorrelationError,
    },

    /// Loop-body failure outside the report attempt; followed by backoff.
    Unexpected {
        at: DateTime<Local>,
        error: anyhow::Error,
    },

    Stopped,
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorEvent::Report(report) => write!(f, "{report}"),
            MonitorEvent::Failed { at, error } => {
                write!(f, "Error at {}: {}", clock(at), error)?;
                let mut source = error.source();
                while let Some(cause) = source {
                    write!(f, ": {cause}")?;
                    source = cause.source();
                }
                Ok(())
            }
            MonitorEvent::Unexpected { at, error } => {
                write!(f, "Unexpected error at {}: {:#}", clock(at), error)
            }
            MonitorEvent::Stopped => write!(f, "Monitoring stopped by user"),
        }
    }
}

fn clock(at: &DateTime<Local>) -> impl fmt::Display + '_ {
    at.format("%H:%M:%S")
}

/// Prints each event to stdout, preceded by a blank line, and flushes.
pub fn console_handler() -> EventHandler {
    Arc::new(|event: &MonitorEvent| {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "\n{event}");
        let _ = out.flush();
    })
}
