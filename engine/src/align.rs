use chrono::{DateTime, Utc};
use market::PriceSeries;

/// Inner join of two series on timestamp.
///
/// Invariant: `len() <= min(a.len(), b.len())`, timestamps strictly increasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPair {
    pub ts: Vec<DateTime<Utc>>,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }
}

/// Merge-walks both series; each is already sorted with unique timestamps.
pub fn align(a: &PriceSeries, b: &PriceSeries) -> AlignedPair {
    let (xs, ys) = (a.points(), b.points());
    let cap = xs.len().min(ys.len());
    let mut out = AlignedPair {
        ts: Vec::with_capacity(cap),
        a: Vec::with_capacity(cap),
        b: Vec::with_capacity(cap),
    };

    let (mut i, mut j) = (0, 0);
    while i < xs.len() && j < ys.len() {
        match xs[i].ts.cmp(&ys[j].ts) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.ts.push(xs[i].ts);
                out.a.push(xs[i].close);
                out.b.push(ys[j].close);
                i += 1;
                j += 1;
            }
        }
    }

    out
}
