use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::types::{Interval, PriceSeries, Window};

/// Source of closing-price history.
///
/// Implementations apply the intraday lookback override themselves (see
/// [`crate::lookback::effective_lookback`]); callers always pass the window the
/// operator asked for.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        window: Window,
    ) -> Result<PriceSeries, FetchError>;
}

#[async_trait]
impl<P: PriceHistoryProvider + ?Sized> PriceHistoryProvider for Arc<P> {
    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        window: Window,
    ) -> Result<PriceSeries, FetchError> {
        (**self).fetch(symbol, interval, window).await
    }
}
