//! Provider-imposed lookback limits.
//!
//! Fine-grained history is only retained for a bounded number of days, so for
//! intraday intervals the caller's window is replaced with the provider maximum.
//! Daily-or-coarser intervals use the caller's window unchanged.

use thiserror::Error;

use crate::types::{Interval, Lookback, Window};

/// Interval -> maximum lookback in days. `None` means the caller's window is used.
pub const WINDOW_OVERRIDES: [(Interval, Option<u32>); 9] = [
    (Interval::OneMinute, Some(7)),
    (Interval::FiveMinutes, Some(60)),
    (Interval::FifteenMinutes, Some(60)),
    (Interval::ThirtyMinutes, Some(60)),
    (Interval::OneHour, Some(730)),
    (Interval::FourHours, Some(730)),
    (Interval::OneDay, None),
    (Interval::OneWeek, None),
    (Interval::OneMonth, None),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookbackTableError {
    #[error("no lookback entry for interval {0}")]
    Missing(Interval),

    #[error("interval {0} has more than one lookback entry")]
    Duplicate(Interval),

    #[error("interval {0} must override the window")]
    MissingOverride(Interval),

    #[error("interval {0} must honor the caller's window")]
    UnexpectedOverride(Interval),
}

pub fn window_override(interval: Interval) -> Option<u32> {
    WINDOW_OVERRIDES
        .iter()
        .find(|(i, _)| *i == interval)
        .and_then(|(_, days)| *days)
}

/// Lookback to request for `interval`, given the caller's `window`.
pub fn effective_lookback(interval: Interval, window: Window) -> Lookback {
    match window_override(interval) {
        Some(days) => Lookback::Days(days),
        None => Lookback::Window(window),
    }
}

/// Checks the table covers every interval exactly once, with overrides on
/// exactly the intraday intervals. Run once at startup.
pub fn validate_overrides() -> Result<(), LookbackTableError> {
    check_table(&WINDOW_OVERRIDES)
}

fn check_table(table: &[(Interval, Option<u32>)]) -> Result<(), LookbackTableError> {
    for interval in Interval::ALL {
        let mut entries = table.iter().filter(|(i, _)| *i == interval);

        let Some((_, days)) = entries.next() else {
            return Err(LookbackTableError::Missing(interval));
        };
        if entries.next().is_some() {
            return Err(LookbackTableError::Duplicate(interval));
        }

        match (interval.is_daily_or_coarser(), days) {
            (false, None) | (false, Some(0)) => {
                return Err(LookbackTableError::MissingOverride(interval));
            }
            (true, Some(_)) => return Err(LookbackTableError::UnexpectedOverride(interval)),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_table_is_valid() {
        assert_eq!(validate_overrides(), Ok(()));
    }

    #[test]
    fn missing_interval_is_rejected() {
        let table = &WINDOW_OVERRIDES[..8];
        assert_eq!(
            check_table(table),
            Err(LookbackTableError::Missing(Interval::OneMonth))
        );
    }

    #[test]
    fn duplicate_interval_is_rejected() {
        let mut table = WINDOW_OVERRIDES.to_vec();
        table.push((Interval::OneMinute, Some(7)));
        assert_eq!(
            check_table(&table),
            Err(LookbackTableError::Duplicate(Interval::OneMinute))
        );
    }

    #[test]
    fn intraday_without_override_is_rejected() {
        let mut table = WINDOW_OVERRIDES.to_vec();
        table[1] = (Interval::FiveMinutes, None);
        assert_eq!(
            check_table(&table),
            Err(LookbackTableError::MissingOverride(Interval::FiveMinutes))
        );
    }

    #[test]
    fn daily_with_override_is_rejected() {
        let mut table = WINDOW_OVERRIDES.to_vec();
        table[6] = (Interval::OneDay, Some(365));
        assert_eq!(
            check_table(&table),
            Err(LookbackTableError::UnexpectedOverride(Interval::OneDay))
        );
    }
}
