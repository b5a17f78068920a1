pub mod errors;
pub mod lookback;
pub mod provider;
pub mod types;
pub mod yahoo;

pub use errors::FetchError;
pub use lookback::{effective_lookback, validate_overrides};
pub use provider::PriceHistoryProvider;
pub use types::{Interval, Lookback, PricePoint, PriceSeries, Window};
pub use yahoo::YahooChartClient;
