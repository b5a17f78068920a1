use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported interval: {0:?}")]
    Interval(String),

    #[error("unsupported window: {0:?}")]
    Window(String),
}

/// Sampling granularity of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    #[default]
    OneDay,
    OneWeek,
    OneMonth,
}

impl Interval {
    pub const ALL: [Interval; 9] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
    ];

    /// Provider code, e.g. `"15m"` or `"1wk"`.
    pub fn code(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
        }
    }

    /// Daily or coarser intervals honor the caller's window; finer ones don't.
    pub fn is_daily_or_coarser(&self) -> bool {
        matches!(
            self,
            Interval::OneDay | Interval::OneWeek | Interval::OneMonth
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Interval::ALL
            .into_iter()
            .find(|i| i.code() == normalized)
            .ok_or_else(|| ParseError::Interval(s.to_string()))
    }
}

/// Caller-selected lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Window {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Window {
    pub const ALL: [Window; 11] = [
        Window::OneDay,
        Window::FiveDays,
        Window::OneMonth,
        Window::ThreeMonths,
        Window::SixMonths,
        Window::OneYear,
        Window::TwoYears,
        Window::FiveYears,
        Window::TenYears,
        Window::YearToDate,
        Window::Max,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Window::OneDay => "1d",
            Window::FiveDays => "5d",
            Window::OneMonth => "1mo",
            Window::ThreeMonths => "3mo",
            Window::SixMonths => "6mo",
            Window::OneYear => "1y",
            Window::TwoYears => "2y",
            Window::FiveYears => "5y",
            Window::TenYears => "10y",
            Window::YearToDate => "ytd",
            Window::Max => "max",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Window {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Window::ALL
            .into_iter()
            .find(|w| w.code() == normalized)
            .ok_or_else(|| ParseError::Window(s.to_string()))
    }
}

/// Lookback actually sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// Caller's window, honored as-is.
    Window(Window),
    /// Provider-imposed maximum for fine-grained data.
    Days(u32),
}

impl Lookback {
    pub fn is_override(&self) -> bool {
        matches!(self, Lookback::Days(_))
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Window(w) => f.write_str(w.code()),
            Lookback::Days(n) => write!(f, "{n}d"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub ts: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(ts: DateTime<Utc>, close: f64) -> Self {
        Self { ts, close }
    }
}

/// Closing prices for one instrument.
///
/// Invariants: timestamps strictly increasing, every close finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points in any order.
    ///
    /// Non-finite closes are dropped. When a timestamp repeats, the point that
    /// came last in the input wins (providers append the live bar last).
    pub fn new(symbol: impl Into<String>, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut raw: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite())
            .collect();

        // stable: equal timestamps keep input order
        raw.sort_by_key(|p| p.ts);

        let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());
        for p in raw {
            match points.last_mut() {
                Some(last) if last.ts == p.ts => *last = p,
                _ => points.push(p),
            }
        }

        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_ts(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|p| p.ts)
    }

    pub fn last_ts(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.ts)
    }
}
