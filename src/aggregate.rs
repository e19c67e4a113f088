//! Group-wise aggregation over the dataset.
//!
//! [`aggregate`] groups rows by one or more key fields and computes a
//! set of named summary metrics per group, mirroring the classic
//! `GROUP BY` + reducer pattern. Grouping with an empty key list
//! produces a single overall group (the "group all" case), and an
//! empty dataset always produces an empty result.

use crate::dataset::{Dataset, FieldValue};
use crate::error::AnalyticsError;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Supported per-group reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Arithmetic mean over numeric values; missing cells are skipped.
    Mean,
    /// Sum over numeric values; missing cells are skipped.
    Sum,
    /// Row count of the group, missing cells included.
    Count,
    /// Number of distinct non-missing values.
    CountDistinct,
    /// Most frequent non-missing value. Ties resolve to the value
    /// first encountered in the dataset's natural row order.
    Mode,
}

impl FromStr for Reducer {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Reducer::Mean),
            "sum" => Ok(Reducer::Sum),
            "count" => Ok(Reducer::Count),
            "count_distinct" | "nunique" => Ok(Reducer::CountDistinct),
            "mode" => Ok(Reducer::Mode),
            other => Err(AnalyticsError::UnknownReducer {
                name: other.to_string(),
            }),
        }
    }
}

/// One requested output column: a name, a source field, and a reducer.
#[derive(Debug, Clone)]
pub struct MetricSpec {
    pub name: String,
    pub field: String,
    pub reducer: Reducer,
}

impl MetricSpec {
    pub fn new(name: &str, field: &str, reducer: Reducer) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            reducer,
        }
    }

    /// Parses the `name=reducer(field)` form used on the command line,
    /// e.g. `avg_rating=mean(rating)`.
    pub fn parse(spec: &str) -> Result<Self, AnalyticsError> {
        let bad = || AnalyticsError::UnknownReducer {
            name: spec.to_string(),
        };
        let (name, rest) = spec.split_once('=').ok_or_else(bad)?;
        let rest = rest.strip_suffix(')').ok_or_else(bad)?;
        let (reducer, field) = rest.split_once('(').ok_or_else(bad)?;
        Ok(Self {
            name: name.trim().to_string(),
            field: field.trim().to_string(),
            reducer: reducer.trim().parse()?,
        })
    }
}

/// A computed aggregate cell.
#[derive(Debug, Clone, PartialEq)]
pub enum AggValue {
    Number(f64),
    Count(u64),
    Text(String),
    /// A reducer with no usable input (e.g. mean of an all-missing
    /// column). Reported explicitly instead of NaN.
    Undefined,
}

impl AggValue {
    /// Numeric view for sorting and rendering.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AggValue::Number(n) => Some(*n),
            AggValue::Count(c) => Some(*c as f64),
            _ => None,
        }
    }
}

impl std::fmt::Display for AggValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggValue::Number(n) => write!(f, "{:.2}", n),
            AggValue::Count(c) => write!(f, "{}", c),
            AggValue::Text(s) => write!(f, "{}", s),
            AggValue::Undefined => write!(f, "undefined"),
        }
    }
}

/// Summary row for one group: the key tuple plus one value per metric,
/// in the order the metrics were requested.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub key: Vec<String>,
    pub values: Vec<AggValue>,
}

impl GroupSummary {
    /// Single-field group keys render without tuple syntax.
    pub fn key_label(&self) -> String {
        self.key.join(" / ")
    }
}

/// Result of [`aggregate`]: metric names plus one summary per distinct
/// group key, in first-encountered order.
#[derive(Debug, Clone, Default)]
pub struct Grouped {
    pub metrics: Vec<String>,
    pub groups: Vec<GroupSummary>,
}

impl Grouped {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Value of a named metric for a given group, if both exist.
    pub fn value(&self, key: &[&str], metric: &str) -> Option<&AggValue> {
        let col = self.metrics.iter().position(|m| m == metric)?;
        self.groups
            .iter()
            .find(|g| g.key.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|g| &g.values[col])
    }

    /// Sorts groups by a metric value. Undefined values sort last.
    /// Explicit post-processing, never part of aggregation itself.
    pub fn sort_by_metric(mut self, metric: &str, ascending: bool) -> Self {
        if let Some(col) = self.metrics.iter().position(|m| m == metric) {
            self.groups.sort_by(|a, b| {
                let av = a.values[col].as_f64();
                let bv = b.values[col].as_f64();
                // Undefined stays last in either direction.
                match (av, bv) {
                    (Some(x), Some(y)) => {
                        let ord = x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal);
                        if ascending {
                            ord
                        } else {
                            ord.reverse()
                        }
                    }
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            });
        }
        self
    }

    /// Sorts groups lexicographically by key tuple.
    pub fn sort_by_key(mut self) -> Self {
        self.groups.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }

    /// Keeps only the first `n` groups.
    pub fn top(mut self, n: usize) -> Self {
        self.groups.truncate(n);
        self
    }
}

enum Accum {
    Mean { sum: f64, n: u64 },
    Sum { sum: f64 },
    Count { n: u64 },
    Distinct { seen: HashSet<String> },
    Mode { counts: HashMap<String, (u64, usize)> },
}

impl Accum {
    fn new(reducer: Reducer) -> Self {
        match reducer {
            Reducer::Mean => Accum::Mean { sum: 0.0, n: 0 },
            Reducer::Sum => Accum::Sum { sum: 0.0 },
            Reducer::Count => Accum::Count { n: 0 },
            Reducer::CountDistinct => Accum::Distinct {
                seen: HashSet::new(),
            },
            Reducer::Mode => Accum::Mode {
                counts: HashMap::new(),
            },
        }
    }

    fn update(&mut self, value: &FieldValue, row_idx: usize) {
        match self {
            Accum::Mean { sum, n } => {
                if let Some(v) = value.as_number() {
                    *sum += v;
                    *n += 1;
                }
            }
            Accum::Sum { sum } => {
                if let Some(v) = value.as_number() {
                    *sum += v;
                }
            }
            Accum::Count { n } => *n += 1,
            Accum::Distinct { seen } => {
                if !value.is_missing() {
                    seen.insert(value.key());
                }
            }
            Accum::Mode { counts } => {
                if !value.is_missing() {
                    let entry = counts.entry(value.key()).or_insert((0, row_idx));
                    entry.0 += 1;
                }
            }
        }
    }

    fn finish(self) -> AggValue {
        match self {
            Accum::Mean { sum, n } => {
                if n == 0 {
                    AggValue::Undefined
                } else {
                    AggValue::Number(sum / n as f64)
                }
            }
            Accum::Sum { sum } => AggValue::Number(sum),
            Accum::Count { n } => AggValue::Count(n),
            Accum::Distinct { seen } => AggValue::Count(seen.len() as u64),
            Accum::Mode { counts } => {
                // Highest count wins; ties go to the earliest row index.
                counts
                    .into_iter()
                    .min_by(|(_, (ca, ia)), (_, (cb, ib))| cb.cmp(ca).then(ia.cmp(ib)))
                    .map(|(value, _)| AggValue::Text(value))
                    .unwrap_or(AggValue::Undefined)
            }
        }
    }
}

/// Groups the dataset by `group_by` and computes `metrics` per group.
///
/// Purely a read-only single pass; runs identically over any filtered
/// subset, including the empty one (which yields an empty result).
pub fn aggregate(
    dataset: &Dataset,
    group_by: &[&str],
    metrics: &[MetricSpec],
) -> Result<Grouped, AnalyticsError> {
    for field in group_by {
        dataset.check_field(field)?;
    }
    for metric in metrics {
        dataset.check_field(&metric.field)?;
    }

    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut keys: Vec<Vec<String>> = Vec::new();
    let mut accums: Vec<Vec<Accum>> = Vec::new();

    for (row_idx, order) in dataset.iter().enumerate() {
        let mut key = Vec::with_capacity(group_by.len());
        for field in group_by {
            key.push(order.field(field)?.key());
        }
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = keys.len();
                index.insert(key.clone(), slot);
                keys.push(key);
                accums.push(metrics.iter().map(|m| Accum::new(m.reducer)).collect());
                slot
            }
        };
        for (metric, accum) in metrics.iter().zip(&mut accums[slot]) {
            let value = order.field(&metric.field)?;
            accum.update(&value, row_idx);
        }
    }

    let groups = keys
        .into_iter()
        .zip(accums)
        .map(|(key, accums)| GroupSummary {
            key,
            values: accums.into_iter().map(Accum::finish).collect(),
        })
        .collect();

    Ok(Grouped {
        metrics: metrics.iter().map(|m| m.name.clone()).collect(),
        groups,
    })
}

/// Count of rows per distinct value of `field`, most frequent first.
/// Ties keep first-encountered order.
pub fn value_counts(dataset: &Dataset, field: &str) -> Result<Vec<(String, u64)>, AnalyticsError> {
    let grouped = aggregate(
        dataset,
        &[field],
        &[MetricSpec::new("count", field, Reducer::Count)],
    )?;
    let mut counts: Vec<(String, u64)> = grouped
        .groups
        .into_iter()
        .map(|g| {
            let count = match g.values[0] {
                AggValue::Count(c) => c,
                _ => 0,
            };
            (g.key.into_iter().next().unwrap_or_default(), count)
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;

    fn orders() -> Dataset {
        let rows = [
            ("Lahore", "Biryani", Some(10.0), Some(4.0)),
            ("Lahore", "Karahi", Some(20.0), None),
            ("Karachi", "Biryani", Some(30.0), Some(5.0)),
            ("Karachi", "Karahi", None, Some(3.0)),
            ("Karachi", "Biryani", Some(40.0), Some(4.0)),
        ];
        Dataset::new(
            rows.iter()
                .enumerate()
                .map(|(i, (city, dish, price, rating))| Order {
                    order_id: format!("ORD-{}", i),
                    city: Some(city.to_string()),
                    dish_name: Some(dish.to_string()),
                    price: *price,
                    rating: *rating,
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn counts_sum_to_dataset_size() {
        let ds = orders();
        let grouped = aggregate(
            &ds,
            &["city"],
            &[MetricSpec::new("orders", "order_id", Reducer::Count)],
        )
        .unwrap();
        let total: u64 = grouped
            .groups
            .iter()
            .filter_map(|g| g.values[0].as_f64())
            .map(|v| v as u64)
            .sum();
        assert_eq!(total as usize, ds.len());
    }

    #[test]
    fn mean_skips_missing_but_count_does_not() {
        let ds = orders();
        let grouped = aggregate(
            &ds,
            &["city"],
            &[
                MetricSpec::new("avg_price", "price", Reducer::Mean),
                MetricSpec::new("orders", "price", Reducer::Count),
            ],
        )
        .unwrap();
        // Karachi prices: 30, missing, 40 -> mean 35 over two valid rows,
        // count 3 over all rows.
        assert_eq!(
            grouped.value(&["Karachi"], "avg_price"),
            Some(&AggValue::Number(35.0))
        );
        assert_eq!(
            grouped.value(&["Karachi"], "orders"),
            Some(&AggValue::Count(3))
        );
    }

    #[test]
    fn mode_tie_breaks_on_first_encounter() {
        let rows = ["A", "B", "A", "B"];
        let ds = Dataset::new(
            rows.iter()
                .map(|c| Order {
                    category: Some(c.to_string()),
                    ..Default::default()
                })
                .collect(),
        );
        let grouped = aggregate(
            &ds,
            &[],
            &[MetricSpec::new("top_category", "category", Reducer::Mode)],
        )
        .unwrap();
        assert_eq!(
            grouped.groups[0].values[0],
            AggValue::Text("A".to_string())
        );
    }

    #[test]
    fn group_all_over_nonempty_dataset_yields_one_group() {
        let ds = orders();
        let grouped = aggregate(
            &ds,
            &[],
            &[MetricSpec::new("avg_rating", "rating", Reducer::Mean)],
        )
        .unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(
            grouped.groups[0].values[0],
            AggValue::Number((4.0 + 5.0 + 3.0 + 4.0) / 4.0)
        );
    }

    #[test]
    fn empty_dataset_yields_empty_result() {
        let ds = Dataset::default();
        let grouped = aggregate(
            &ds,
            &["city"],
            &[MetricSpec::new("orders", "order_id", Reducer::Count)],
        )
        .unwrap();
        assert!(grouped.is_empty());

        let all = aggregate(
            &ds,
            &[],
            &[MetricSpec::new("avg", "price", Reducer::Mean)],
        )
        .unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn multi_key_groups_collapse_regardless_of_row_order() {
        let ds = orders();
        let grouped = aggregate(
            &ds,
            &["city", "dish_name"],
            &[MetricSpec::new("orders", "order_id", Reducer::Count)],
        )
        .unwrap();
        assert_eq!(grouped.len(), 4);
        assert_eq!(
            grouped.value(&["Karachi", "Biryani"], "orders"),
            Some(&AggValue::Count(2))
        );
    }

    #[test]
    fn count_distinct_ignores_missing() {
        let ds = orders();
        let grouped = aggregate(
            &ds,
            &[],
            &[MetricSpec::new("dishes", "dish_name", Reducer::CountDistinct)],
        )
        .unwrap();
        assert_eq!(grouped.groups[0].values[0], AggValue::Count(2));
    }

    #[test]
    fn mean_of_all_missing_is_undefined() {
        let ds = Dataset::new(vec![Order::default(), Order::default()]);
        let grouped = aggregate(
            &ds,
            &[],
            &[MetricSpec::new("avg", "price", Reducer::Mean)],
        )
        .unwrap();
        assert_eq!(grouped.groups[0].values[0], AggValue::Undefined);
    }

    #[test]
    fn sorting_and_top_are_post_processing() {
        let ds = orders();
        let grouped = aggregate(
            &ds,
            &["city"],
            &[MetricSpec::new("revenue", "price", Reducer::Sum)],
        )
        .unwrap()
        .sort_by_metric("revenue", false)
        .top(1);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped.groups[0].key, vec!["Karachi".to_string()]);
    }

    #[test]
    fn undefined_metric_ranks_last_in_either_direction() {
        // "Mystery" has no priced rows, so its mean is undefined; a
        // descending revenue ranking must not promote it above real
        // entries.
        let rows = [
            ("Biryani", Some(10.0)),
            ("Mystery", None),
            ("Karahi", Some(20.0)),
        ];
        let ds = Dataset::new(
            rows.iter()
                .map(|(dish, price)| Order {
                    dish_name: Some(dish.to_string()),
                    price: *price,
                    ..Default::default()
                })
                .collect(),
        );
        let metrics = [MetricSpec::new("avg_price", "price", Reducer::Mean)];

        let desc = aggregate(&ds, &["dish_name"], &metrics)
            .unwrap()
            .sort_by_metric("avg_price", false);
        let order: Vec<&str> = desc.groups.iter().map(|g| g.key[0].as_str()).collect();
        assert_eq!(order, vec!["Karahi", "Biryani", "Mystery"]);

        let asc = aggregate(&ds, &["dish_name"], &metrics)
            .unwrap()
            .sort_by_metric("avg_price", true);
        let order: Vec<&str> = asc.groups.iter().map(|g| g.key[0].as_str()).collect();
        assert_eq!(order, vec!["Biryani", "Karahi", "Mystery"]);
    }

    #[test]
    fn missing_group_field_fails_that_call_only() {
        let ds = orders();
        let err = aggregate(&ds, &["tip_amount"], &[]).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingField { .. }));
        // The dataset itself is untouched and reusable.
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn reducer_parsing_rejects_unknowns() {
        assert_eq!("mean".parse::<Reducer>().unwrap(), Reducer::Mean);
        assert_eq!("nunique".parse::<Reducer>().unwrap(), Reducer::CountDistinct);
        assert!(matches!(
            "median".parse::<Reducer>(),
            Err(AnalyticsError::UnknownReducer { .. })
        ));
    }

    #[test]
    fn metric_spec_parses_cli_form() {
        let spec = MetricSpec::parse("avg_rating=mean(rating)").unwrap();
        assert_eq!(spec.name, "avg_rating");
        assert_eq!(spec.field, "rating");
        assert_eq!(spec.reducer, Reducer::Mean);
        assert!(MetricSpec::parse("avg_rating").is_err());
    }

    #[test]
    fn value_counts_sorts_descending() {
        let ds = orders();
        let counts = value_counts(&ds, "city").unwrap();
        assert_eq!(counts[0], ("Karachi".to_string(), 3));
        assert_eq!(counts[1], ("Lahore".to_string(), 2));
    }
}
