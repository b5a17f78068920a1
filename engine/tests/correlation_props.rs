use chrono::{TimeZone, Utc};
use engine::{CorrelationError, correlate, pearson};
use market::{PricePoint, PriceSeries};
use proptest::prelude::*;

fn closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..10_000.0, 2..300)
}

fn series(symbol: &str, offset_days: i64, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        symbol,
        closes.iter().enumerate().map(|(i, c)| {
            let ts = Utc.timestamp_opt(86_400 * (i as i64 + offset_days), 0).unwrap();
            PricePoint::new(ts, *c)
        }),
    )
}

proptest! {
    #[test]
    fn coefficient_is_bounded_or_an_error(pair in closes().prop_flat_map(|xs| {
        let n = xs.len();
        (Just(xs), prop::collection::vec(1.0f64..10_000.0, n))
    })) {
        let (xs, ys) = pair;
        match pearson(&xs, &ys) {
            Ok(r) => prop_assert!(r.is_finite() && (-1.0..=1.0).contains(&r)),
            Err(CorrelationError::Computation(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn self_correlation_is_one(xs in closes()) {
        prop_assume!(xs.iter().any(|x| *x != xs[0]));
        let a = series("A", 0, &xs);

        let r = correlate(&a, &a).unwrap();
        prop_assert!((r - 1.0).abs() < 1e-9, "r = {r}");
    }

    #[test]
    fn symmetric_in_its_arguments(xs in closes(), ys in closes(), shift in 0i64..20) {
        let a = series("A", 0, &xs);
        let b = series("B", shift, &ys);

        match (correlate(&a, &b), correlate(&b, &a)) {
            (Ok(ab), Ok(ba)) => prop_assert!((ab - ba).abs() < 1e-9),
            (Err(_), Err(_)) => {}
            (ab, ba) => prop_assert!(false, "asymmetric outcome: {ab:?} vs {ba:?}"),
        }
    }
}
