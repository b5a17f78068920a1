//! Pearson correlation over two aligned closing-price series.
//!
//!   r = Σ(xᵢ−x̄)(yᵢ−ȳ) / ( sqrt(Σ(xᵢ−x̄)²) · sqrt(Σ(yᵢ−ȳ)²) )
//!
//! Undefined cases (fewer than two points, a constant column, a non-finite
//! result) are errors, never numbers.

use std::time::Duration;

use common::logger::{child_span, warn_if_slow};
use market::{FetchError, PriceHistoryProvider, PriceSeries};
use thiserror::Error;
use tracing::{Instrument, debug};

use crate::align::align;
use crate::types::PairRequest;

pub const DEFAULT_SLOW_FETCH: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("failed to fetch {symbol}")]
    Fetch {
        symbol: String,
        #[source]
        source: FetchError,
    },

    #[error("not enough overlapping data points ({overlap}, need at least 2)")]
    Alignment { overlap: usize },

    #[error("correlation undefined: {0}")]
    Computation(String),
}

impl CorrelationError {
    /// The provider answered with something that could not be read. Not part
    /// of the fetch contract, so the monitor backs off instead of reporting.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            CorrelationError::Fetch {
                source: FetchError::InvalidResponse(_),
                ..
            }
        )
    }
}

/// `Ok` values are finite and within `[-1, 1]`.
pub type CorrelationResult = Result<f64, CorrelationError>;

/// Sample Pearson coefficient of two equal-length columns.
pub fn pearson(xs: &[f64], ys: &[f64]) -> CorrelationResult {
    pearson_labeled(xs, ys, ("first series", "second series"))
}

fn pearson_labeled(xs: &[f64], ys: &[f64], labels: (&str, &str)) -> CorrelationResult {
    if xs.len() != ys.len() {
        return Err(CorrelationError::Computation(format!(
            "column lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(CorrelationError::Alignment { overlap: xs.len() });
    }
    if is_constant(xs) {
        return Err(CorrelationError::Computation(format!(
            "{} has zero variance",
            labels.0
        )));
    }
    if is_constant(ys) {
        return Err(CorrelationError::Computation(format!(
            "{} has zero variance",
            labels.1
        )));
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if !r.is_finite() {
        return Err(CorrelationError::Computation(
            "result is not a finite number".to_string(),
        ));
    }

    // rounding can push |r| a hair past 1
    Ok(r.clamp(-1.0, 1.0))
}

// Exact comparison: a column of identical closes has variance 0 even when the
// mean picks up rounding error.
fn is_constant(col: &[f64]) -> bool {
    col.iter().all(|v| *v == col[0])
}

/// Aligns two series on timestamp and correlates the shared closes.
pub fn correlate(a: &PriceSeries, b: &PriceSeries) -> CorrelationResult {
    let pair = align(a, b);
    debug!(
        first = a.len(),
        second = b.len(),
        aligned = pair.len(),
        "series aligned"
    );
    pearson_labeled(&pair.a, &pair.b, (a.symbol(), b.symbol()))
}

/// Fetches both legs of a [`PairRequest`] and correlates them.
///
/// Every failure comes back as a [`CorrelationError`] value.
pub struct CorrelationEngine<P> {
    provider: P,
    slow_fetch: Duration,
}

impl<P: PriceHistoryProvider> CorrelationEngine<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slow_fetch: DEFAULT_SLOW_FETCH,
        }
    }

    pub fn with_slow_fetch_threshold(mut self, threshold: Duration) -> Self {
        self.slow_fetch = threshold;
        self
    }

    pub async fn fetch(
        &self,
        symbol: &str,
        request: &PairRequest,
    ) -> Result<PriceSeries, CorrelationError> {
        let span = child_span("fetch");
        span.record("symbol", symbol);

        warn_if_slow(
            "price_history_fetch",
            self.slow_fetch,
            self.provider
                .fetch(symbol, request.interval, request.window),
        )
        .instrument(span)
        .await
        .map_err(|source| CorrelationError::Fetch {
            symbol: symbol.to_string(),
            source,
        })
    }

    /// Fetches are sequential: first instrument, then second.
    pub async fn correlate(&self, request: &PairRequest) -> CorrelationResult {
        let a = self.fetch(&request.first, request).await?;
        let b = self.fetch(&request.second, request).await?;
        correlate(&a, &b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market::PricePoint;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        PriceSeries::new(
            symbol,
            closes.iter().enumerate().map(|(i, c)| {
                PricePoint::new(Utc.timestamp_opt(86_400 * i as i64, 0).unwrap(), *c)
            }),
        )
    }

    #[test]
    fn perfect_positive() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn perfect_negative() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_value() {
        // cov = 6, var_x = 10, var_y = 6 -> r = 6 / sqrt(60)
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0]).unwrap();
        assert!((r - 6.0 / 60f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_point_is_alignment_error() {
        let err = pearson(&[1.0], &[2.0]).unwrap_err();
        assert!(matches!(err, CorrelationError::Alignment { overlap: 1 }));
    }

    #[test]
    fn constant_column_is_computation_error() {
        let err = pearson(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, CorrelationError::Computation(_)));
        assert!(err.to_string().contains("first series"));
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, CorrelationError::Computation(_)));
    }

    #[test]
    fn correlate_names_the_flat_symbol() {
        let a = series("AAPL", &[1.0, 2.0, 3.0]);
        let b = series("PEG", &[5.0, 5.0, 5.0]);

        let err = correlate(&a, &b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "correlation undefined: PEG has zero variance"
        );
    }

    #[test]
    fn correlate_with_itself_is_one() {
        let a = series("AAPL", &[189.1, 190.4, 188.7, 192.3, 195.0, 193.2]);

        let r = correlate(&a, &a).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlate_without_overlap_reports_zero_overlap() {
        let a = series("A", &[1.0, 2.0, 3.0]);
        let b = PriceSeries::new(
            "B",
            (0..3).map(|i| {
                PricePoint::new(Utc.timestamp_opt(86_400 * i + 3_600, 0).unwrap(), i as f64)
            }),
        );

        let err = correlate(&a, &b).unwrap_err();
        assert!(matches!(err, CorrelationError::Alignment { overlap: 0 }));
    }
}
