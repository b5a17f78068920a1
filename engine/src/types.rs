use market::{Interval, Lookback, Window, effective_lookback};

/// The instrument pair being monitored and how to sample it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRequest {
    pub first: String,
    pub second: String,
    pub interval: Interval,
    pub window: Window,
}

impl PairRequest {
    /// Symbols are trimmed and upper-cased.
    pub fn new(first: &str, second: &str, interval: Interval, window: Window) -> Self {
        Self {
            first: first.trim().to_uppercase(),
            second: second.trim().to_uppercase(),
            interval,
            window,
        }
    }

    pub fn id(&self) -> String {
        format!("{}/{}", self.first, self.second)
    }

    pub fn lookback(&self) -> Lookback {
        effective_lookback(self.interval, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_normalized() {
        let req = PairRequest::new(" aapl", "msft ", Interval::OneDay, Window::OneYear);
        assert_eq!(req.first, "AAPL");
        assert_eq!(req.second, "MSFT");
        assert_eq!(req.id(), "AAPL/MSFT");
    }

    #[test]
    fn lookback_follows_override_table() {
        let req = PairRequest::new("SPY", "QQQ", Interval::OneMinute, Window::Max);
        assert_eq!(req.lookback(), Lookback::Days(7));

        let req = PairRequest::new("SPY", "QQQ", Interval::OneWeek, Window::Max);
        assert_eq!(req.lookback(), Lookback::Window(Window::Max));
    }
}
