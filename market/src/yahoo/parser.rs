//! Yahoo Finance chart payload parser
//!
//! The chart endpoint answers with a single envelope for both success and
//! failure:
//!
//! ```jsonc
//! {
//!   "chart": {
//!     "result": [{
//!       "meta": { "symbol": "AAPL", "gmtoffset": -14400 },
//!       "timestamp": [1717421400, 1717507800],
//!       "indicators": { "quote": [{ "close": [194.03, null] }] }
//!     }],
//!     "error": null
//!   }
//! }
//! ```
//!
//! Unknown or delisted symbols come back with `"result": null` and a populated
//! `"error"` object, usually alongside HTTP 404. The provider's description is
//! surfaced verbatim since it is the most useful thing to show the operator.
//!
//! `timestamp[i]` pairs with `close[i]`. Null closes (bars without trades) are
//! skipped; everything else goes through [`PriceSeries::new`], which sorts and
//! deduplicates.
//!
//! Daily-or-coarser bars are keyed by exchange-local date (`meta.gmtoffset`).
//! The provider stamps the live bar with the last trade time instead of the
//! session open, so raw timestamps would never line up across instruments. A
//! live bar that repeats a date replaces the earlier one.

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, Utc};

use super::types::{ChartEnvelope, ChartResult};
use crate::errors::FetchError;
use crate::types::{Interval, PricePoint, PriceSeries};

pub fn parse_chart_response(
    symbol: &str,
    interval: Interval,
    status: u16,
    body: &str,
) -> Result<PriceSeries, FetchError> {
    let success = (200..300).contains(&status);

    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(env) => env,
        Err(_) if !success => return Err(FetchError::Status { status }),
        Err(e) => return Err(FetchError::InvalidResponse(e.to_string())),
    };

    if let Some(err) = envelope.chart.error {
        return Err(FetchError::Provider {
            code: err.code,
            description: err.description,
        });
    }
    if !success {
        return Err(FetchError::Status { status });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::EmptySeries {
            symbol: symbol.to_string(),
        })?;

    let series = closes_from_result(symbol, interval, result)?;
    if series.is_empty() {
        return Err(FetchError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }
    Ok(series)
}

fn closes_from_result(
    symbol: &str,
    interval: Interval,
    result: ChartResult,
) -> Result<PriceSeries, FetchError> {
    let offset = result
        .meta
        .and_then(|m| m.gmtoffset)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if timestamps.len() != closes.len() {
        return Err(FetchError::InvalidResponse(format!(
            "{} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    let mut points = Vec::with_capacity(timestamps.len());
    for (secs, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let ts = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| FetchError::InvalidResponse(format!("timestamp out of range: {secs}")))?;
        let ts = if interval.is_daily_or_coarser() {
            session_date(ts, offset)
        } else {
            ts
        };
        points.push(PricePoint::new(ts, close));
    }

    Ok(PriceSeries::new(symbol, points))
}

/// Midnight UTC of the exchange-local calendar date of `ts`.
fn session_date(ts: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    ts.with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::default())
        .and_utc()
}
