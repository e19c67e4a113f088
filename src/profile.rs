//! Dataset-level overview statistics.
//!
//! The describe-style numeric summary and the dashboard headline
//! metrics. Everything here is a thin composition over the aggregation
//! core and stays total on the empty dataset.

use crate::aggregate::{aggregate, value_counts, AggValue, MetricSpec, Reducer};
use crate::dataset::Dataset;
use crate::error::AnalyticsError;
use crate::tiers::quantile;
use chrono::Weekday;
use serde::Serialize;

/// Describe-style summary of one numeric field, missing cells skipped.
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub field: String,
    pub count: u64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Computes the numeric summary for `field`, or `None` when the field
/// holds no numeric values in this dataset.
pub fn describe(dataset: &Dataset, field: &str) -> Result<Option<NumericSummary>, AnalyticsError> {
    dataset.check_field(field)?;
    let mut values = Vec::new();
    for order in dataset.iter() {
        if let Some(v) = order.field(field)?.as_number() {
            values.push(v);
        }
    }
    if values.is_empty() {
        return Ok(None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    // Sample standard deviation, matching the describe() convention.
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok(Some(NumericSummary {
        field: field.to_string(),
        count: values.len() as u64,
        mean,
        std,
        min,
        q1: quantile(&values, 0.25).unwrap_or(min),
        median: quantile(&values, 0.50).unwrap_or(min),
        q3: quantile(&values, 0.75).unwrap_or(min),
        max,
    }))
}

/// Headline metrics for the dashboard. Rates and means over an empty
/// subset are `None` ("no data"), never NaN.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlineMetrics {
    pub total_orders: u64,
    pub unique_cities: u64,
    pub unique_restaurants: u64,
    pub unique_dishes: u64,
    pub unique_categories: u64,
    pub avg_rating: Option<f64>,
    pub avg_order_frequency: Option<f64>,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
}

pub fn headline_metrics(dataset: &Dataset) -> Result<HeadlineMetrics, AnalyticsError> {
    let grouped = aggregate(
        dataset,
        &[],
        &[
            MetricSpec::new("cities", "city", Reducer::CountDistinct),
            MetricSpec::new("restaurants", "restaurant_name", Reducer::CountDistinct),
            MetricSpec::new("dishes", "dish_name", Reducer::CountDistinct),
            MetricSpec::new("categories", "category", Reducer::CountDistinct),
            MetricSpec::new("avg_rating", "rating", Reducer::Mean),
            MetricSpec::new("avg_order_frequency", "order_frequency", Reducer::Mean),
            MetricSpec::new("total_revenue", "price", Reducer::Sum),
            MetricSpec::new("avg_order_value", "price", Reducer::Mean),
        ],
    )?;

    let count_of = |name: &str| -> u64 {
        match grouped.value(&[], name) {
            Some(AggValue::Count(c)) => *c,
            _ => 0,
        }
    };
    let number_of = |name: &str| -> Option<f64> {
        match grouped.value(&[], name) {
            Some(AggValue::Number(n)) => Some(*n),
            _ => None,
        }
    };

    Ok(HeadlineMetrics {
        total_orders: dataset.len() as u64,
        unique_cities: count_of("cities"),
        unique_restaurants: count_of("restaurants"),
        unique_dishes: count_of("dishes"),
        unique_categories: count_of("categories"),
        avg_rating: number_of("avg_rating"),
        avg_order_frequency: number_of("avg_order_frequency"),
        total_revenue: number_of("total_revenue").unwrap_or(0.0),
        avg_order_value: number_of("avg_order_value"),
    })
}

/// Number of distinct non-missing values of `field`.
pub fn nunique(dataset: &Dataset, field: &str) -> Result<u64, AnalyticsError> {
    let grouped = aggregate(
        dataset,
        &[],
        &[MetricSpec::new("n", field, Reducer::CountDistinct)],
    )?;
    Ok(match grouped.value(&[], "n") {
        Some(AggValue::Count(c)) => *c,
        _ => 0,
    })
}

/// Rate with a guarded divisor: `None` means "undefined", not NaN.
pub fn rate(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64)
    }
}

/// Orders-per-day tabulation rendered Monday through Sunday, with zero
/// counts for days absent from the data.
pub fn orders_by_weekday(dataset: &Dataset) -> Result<Vec<(Weekday, u64)>, AnalyticsError> {
    let counts = value_counts(dataset, "order_day_of_week")?;
    let week = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    Ok(week
        .into_iter()
        .map(|day| {
            let name = crate::models::weekday_name(day);
            let count = counts
                .iter()
                .find(|(label, _)| label == name)
                .map(|(_, c)| *c)
                .unwrap_or(0);
            (day, count)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;

    fn orders() -> Dataset {
        Dataset::new(
            [
                ("Lahore", Some(10.0), Some(4.0), Some(Weekday::Mon)),
                ("Lahore", Some(20.0), Some(5.0), Some(Weekday::Sat)),
                ("Karachi", Some(30.0), None, Some(Weekday::Sat)),
                ("Karachi", Some(40.0), Some(3.0), None),
            ]
            .iter()
            .enumerate()
            .map(|(i, (city, price, rating, day))| Order {
                order_id: format!("ORD-{}", i),
                city: Some(city.to_string()),
                restaurant_name: Some(format!("R{}", i % 3)),
                price: *price,
                rating: *rating,
                order_day_of_week: *day,
                ..Default::default()
            })
            .collect(),
        )
    }

    #[test]
    fn describe_matches_hand_computation() {
        let ds = orders();
        let summary = describe(&ds, "price").unwrap().unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 25.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 40.0);
        assert_eq!(summary.q1, 17.5);
        assert_eq!(summary.median, 25.0);
        assert_eq!(summary.q3, 32.5);
        // Sample std of 10,20,30,40.
        assert!((summary.std - 12.909944487358056).abs() < 1e-9);
    }

    #[test]
    fn describe_of_all_missing_is_none() {
        let ds = Dataset::new(vec![Order::default()]);
        assert!(describe(&ds, "price").unwrap().is_none());
    }

    #[test]
    fn headline_metrics_on_empty_subset_report_no_data() {
        let ds = Dataset::default();
        let m = headline_metrics(&ds).unwrap();
        assert_eq!(m.total_orders, 0);
        assert_eq!(m.unique_cities, 0);
        assert!(m.avg_rating.is_none());
        assert!(m.avg_order_value.is_none());
        assert_eq!(m.total_revenue, 0.0);
    }

    #[test]
    fn headline_metrics_aggregate_the_whole_dataset() {
        let ds = orders();
        let m = headline_metrics(&ds).unwrap();
        assert_eq!(m.total_orders, 4);
        assert_eq!(m.unique_cities, 2);
        assert_eq!(m.unique_restaurants, 3);
        assert_eq!(m.total_revenue, 100.0);
        assert_eq!(m.avg_order_value, Some(25.0));
        assert_eq!(m.avg_rating, Some(4.0));
    }

    #[test]
    fn rate_guards_the_divisor() {
        assert_eq!(rate(1, 4), Some(0.25));
        assert_eq!(rate(0, 0), None);
    }

    #[test]
    fn weekday_tabulation_is_ordered_and_dense() {
        let ds = orders();
        let days = orders_by_weekday(&ds).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], (Weekday::Mon, 1));
        assert_eq!(days[5], (Weekday::Sat, 2));
        assert_eq!(days[6], (Weekday::Sun, 0));
    }
}
