use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use super::parser::parse_chart_response;
use crate::errors::FetchError;
use crate::lookback::effective_lookback;
use crate::provider::PriceHistoryProvider;
use crate::types::{Interval, Lookback, PriceSeries, Window};

/// HTTP client for the Yahoo Finance v8 chart endpoint.
#[derive(Clone)]
pub struct YahooChartClient {
    http: Client,
    base_url: Url,
}

impl YahooChartClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl(base_url.to_string()));
        }

        // The endpoint rejects requests without a browser-like agent.
        let http = Client::builder()
            .user_agent(concat!(
                "Mozilla/5.0 (compatible; pairwatch/",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// `{base}/v8/finance/chart/{symbol}?interval=..&range=..`, symbol percent-encoded.
    pub fn chart_url(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<Url, FetchError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(FetchError::InvalidSymbol(symbol.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("interval", interval.code())
            .append_pair("range", &lookback.to_string())
            .append_pair("includePrePost", "false")
            .append_pair("events", "div,splits");

        Ok(url)
    }

    #[instrument(
        skip(self),
        fields(symbol = %symbol, interval = %interval, lookback = %lookback),
        level = "debug"
    )]
    pub async fn fetch_chart(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(symbol, interval, lookback)?;

        let resp = self.http.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        let series = parse_chart_response(symbol, interval, status, &body)?;

        debug!(
            points = series.len(),
            first = ?series.first_ts(),
            last = ?series.last_ts(),
            "chart fetched"
        );

        Ok(series)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooChartClient {
    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        window: Window,
    ) -> Result<PriceSeries, FetchError> {
        let lookback = effective_lookback(interval, window);
        self.fetch_chart(symbol, interval, lookback).await
    }
}
