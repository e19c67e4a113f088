//! Record-level filtering over categorical fields.
//!
//! A [`Filter`] is a conjunction of per-field allow-lists, the shape a
//! dashboard multiselect produces. Applying it yields a new [`Dataset`]
//! the aggregation core treats exactly like an unfiltered one, so every
//! selection change is a pure recomputation over the filtered view.

use crate::dataset::Dataset;
use crate::error::AnalyticsError;
use crate::models::Order;
use std::collections::HashSet;

/// Conjunction of per-field value allow-lists. A filter with no
/// clauses matches every record.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, HashSet<String>)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts `field` to the given values. Repeated calls on the
    /// same field intersect.
    pub fn include<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: HashSet<String> = values.into_iter().map(Into::into).collect();
        self.clauses.push((field.to_string(), values));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when the record satisfies every clause. Missing values are
    /// matched through their own category label, so they can be
    /// selected or excluded like any other value.
    pub fn matches(&self, order: &Order) -> Result<bool, AnalyticsError> {
        for (field, allowed) in &self.clauses {
            let value = order.field(field)?.key();
            if !allowed.contains(&value) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Produces the sub-dataset of matching records, preserving the
    /// dataset's natural row order.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, AnalyticsError> {
        for (field, _) in &self.clauses {
            dataset.check_field(field)?;
        }
        let mut kept = Vec::new();
        for order in dataset.iter() {
            if self.matches(order)? {
                kept.push(order.clone());
            }
        }
        Ok(Dataset::new(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, MetricSpec, Reducer};

    fn orders() -> Dataset {
        let rows = [
            ("Lahore", "Card"),
            ("Lahore", "Cash"),
            ("Karachi", "Card"),
            ("Karachi", "Cash"),
            ("Multan", "Card"),
        ];
        Dataset::new(
            rows.iter()
                .enumerate()
                .map(|(i, (city, payment))| Order {
                    order_id: format!("ORD-{}", i),
                    city: Some(city.to_string()),
                    payment_method: Some(payment.to_string()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn conjunction_of_clauses() {
        let ds = orders();
        let filter = Filter::new()
            .include("city", ["Lahore", "Karachi"])
            .include("payment_method", ["Card"]);
        let subset = filter.apply(&ds).unwrap();
        assert_eq!(subset.len(), 2);
    }

    #[test]
    fn filter_is_idempotent() {
        let ds = orders();
        let filter = Filter::new().include("city", ["Karachi"]);
        let once = filter.apply(&ds).unwrap();
        let twice = filter.apply(&once).unwrap();
        assert_eq!(once.len(), twice.len());

        let metrics = [MetricSpec::new("orders", "order_id", Reducer::Count)];
        let a = aggregate(&once, &["payment_method"], &metrics).unwrap();
        let b = aggregate(&twice, &["payment_method"], &metrics).unwrap();
        assert_eq!(a.len(), b.len());
        for (ga, gb) in a.groups.iter().zip(&b.groups) {
            assert_eq!(ga.key, gb.key);
            assert_eq!(ga.values, gb.values);
        }
    }

    #[test]
    fn empty_selection_is_a_value_not_an_error() {
        let ds = orders();
        let filter = Filter::new().include("city", ["Quetta"]);
        let subset = filter.apply(&ds).unwrap();
        assert!(subset.is_empty());
        // Aggregation over the empty subset stays total.
        let grouped = aggregate(
            &subset,
            &["city"],
            &[MetricSpec::new("orders", "order_id", Reducer::Count)],
        )
        .unwrap();
        assert!(grouped.is_empty());
    }

    #[test]
    fn unknown_filter_field_is_rejected() {
        let ds = orders();
        let filter = Filter::new().include("tip_amount", ["5"]);
        assert!(matches!(
            filter.apply(&ds),
            Err(AnalyticsError::MissingField { .. })
        ));
    }

    #[test]
    fn unrestricted_filter_passes_everything() {
        let ds = orders();
        let subset = Filter::new().apply(&ds).unwrap();
        assert_eq!(subset.len(), ds.len());
    }
}
