//! Quartile-based price-tier classification.
//!
//! Boundaries are computed fresh from the dataset being analyzed and
//! never persisted. Classification operates on an already-aggregated
//! per-entity measure (e.g. one average price per order id), not on
//! raw rows.

use crate::aggregate::{aggregate, AggValue, MetricSpec, Reducer};
use crate::dataset::Dataset;
use crate::error::AnalyticsError;

/// Quartile boundaries of a numeric distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Price tier assigned by comparing a value against [`Quartiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceTier {
    Low,
    MidLow,
    MidHigh,
    High,
}

impl PriceTier {
    pub const ALL: [PriceTier; 4] = [
        PriceTier::Low,
        PriceTier::MidLow,
        PriceTier::MidHigh,
        PriceTier::High,
    ];
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceTier::Low => write!(f, "Low"),
            PriceTier::MidLow => write!(f, "Mid-Low"),
            PriceTier::MidHigh => write!(f, "Mid-High"),
            PriceTier::High => write!(f, "High"),
        }
    }
}

/// Linear-interpolation quantile over unsorted data (the estimator
/// pandas and numpy default to). Returns `None` on empty input.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}

/// 25th / 50th / 75th percentile boundaries of `values`.
pub fn quartiles(values: &[f64]) -> Option<Quartiles> {
    Some(Quartiles {
        q1: quantile(values, 0.25)?,
        q2: quantile(values, 0.50)?,
        q3: quantile(values, 0.75)?,
    })
}

impl Quartiles {
    /// Tier boundary policy, inclusive upper bounds:
    /// value <= Q1 -> Low; Q1 < value <= Q2 -> Mid-Low;
    /// Q2 < value <= Q3 -> Mid-High; value > Q3 -> High.
    ///
    /// When every input value is equal all boundaries coincide and
    /// everything classifies as Low; that is accepted, not an error.
    pub fn tier(&self, value: f64) -> PriceTier {
        if value <= self.q1 {
            PriceTier::Low
        } else if value <= self.q2 {
            PriceTier::MidLow
        } else if value <= self.q3 {
            PriceTier::MidHigh
        } else {
            PriceTier::High
        }
    }
}

/// Assigns a tier to every `(id, value)` pair.
///
/// Boundaries default to the quartiles of the given values; callers
/// may pass precomputed ones to classify against another distribution.
/// Returns `None` only when there are no values and no boundaries.
pub fn classify(
    values: &[(String, f64)],
    boundaries: Option<Quartiles>,
) -> Option<(Quartiles, Vec<(String, PriceTier)>)> {
    let boundaries = match boundaries {
        Some(b) => b,
        None => {
            let nums: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
            quartiles(&nums)?
        }
    };
    let assignments = values
        .iter()
        .map(|(id, v)| (id.clone(), boundaries.tier(*v)))
        .collect();
    Some((boundaries, assignments))
}

/// Average price per distinct order id, the per-entity measure the
/// tier classification runs on.
pub fn average_order_value(dataset: &Dataset) -> Result<Vec<(String, f64)>, AnalyticsError> {
    let grouped = aggregate(
        dataset,
        &["order_id"],
        &[MetricSpec::new("avg_price", "price", Reducer::Mean)],
    )?;
    Ok(grouped
        .groups
        .into_iter()
        .filter_map(|g| {
            let id = g.key.into_iter().next()?;
            match g.values[0] {
                AggValue::Number(v) => Some((id, v)),
                _ => None,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;

    fn pairs(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("ORD-{}", i), *v))
            .collect()
    }

    #[test]
    fn quartiles_use_linear_interpolation() {
        let q = quartiles(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(q.q1, 17.5);
        assert_eq!(q.q2, 25.0);
        assert_eq!(q.q3, 32.5);
    }

    #[test]
    fn tier_boundaries_are_inclusive_on_the_upper_edge() {
        let q = quartiles(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(q.tier(17.5), PriceTier::Low);
        assert_eq!(q.tier(17.6), PriceTier::MidLow);
        assert_eq!(q.tier(25.0), PriceTier::MidLow);
        assert_eq!(q.tier(32.5), PriceTier::MidHigh);
        assert_eq!(q.tier(32.6), PriceTier::High);
    }

    #[test]
    fn all_equal_values_classify_low() {
        let (q, assigned) = classify(&pairs(&[5.0, 5.0, 5.0, 5.0]), None).unwrap();
        assert_eq!(q.q1, 5.0);
        assert_eq!(q.q3, 5.0);
        assert!(assigned.iter().all(|(_, t)| *t == PriceTier::Low));
    }

    #[test]
    fn precomputed_boundaries_are_honored() {
        let fixed = Quartiles {
            q1: 1.0,
            q2: 2.0,
            q3: 3.0,
        };
        let (q, assigned) = classify(&pairs(&[0.5, 2.5, 10.0]), Some(fixed)).unwrap();
        assert_eq!(q, fixed);
        assert_eq!(assigned[0].1, PriceTier::Low);
        assert_eq!(assigned[1].1, PriceTier::MidHigh);
        assert_eq!(assigned[2].1, PriceTier::High);
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(quartiles(&[]).is_none());
        assert!(classify(&[], None).is_none());
    }

    #[test]
    fn average_order_value_collapses_line_items() {
        let ds = Dataset::new(vec![
            Order {
                order_id: "A".to_string(),
                price: Some(10.0),
                ..Default::default()
            },
            Order {
                order_id: "A".to_string(),
                price: Some(20.0),
                ..Default::default()
            },
            Order {
                order_id: "B".to_string(),
                price: Some(40.0),
                ..Default::default()
            },
        ]);
        let mut avg = average_order_value(&ds).unwrap();
        avg.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(avg, vec![("A".to_string(), 15.0), ("B".to_string(), 40.0)]);
    }
}
