//! Two-way contingency tables between categorical fields.
//!
//! [`cross_tab`] counts row/column label co-occurrences, with optional
//! "All" margin totals and row / column / grand-total normalization.
//! Raw counts are always retained alongside any normalized view, so a
//! normalized table still recovers the totals a direct row filter
//! would produce.

use crate::dataset::Dataset;
use crate::error::AnalyticsError;
use std::collections::HashMap;

/// Which total each cell is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalize {
    #[default]
    None,
    /// Each cell divided by its row total.
    Rows,
    /// Each cell divided by its column total.
    Cols,
    /// Each cell divided by the grand total.
    All,
}

/// How margin cells are reported when the body is normalized.
///
/// `Counts` shows margins as the raw totals they were computed from,
/// `Normalized` divides them by the same denominator as the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarginStyle {
    #[default]
    Counts,
    Normalized,
}

/// Options for [`cross_tab`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossTabOptions {
    pub normalize: Normalize,
    pub include_margins: bool,
    pub margin_style: MarginStyle,
    /// Drop rows where either field is missing instead of giving
    /// missing values their own category.
    pub exclude_missing: bool,
}

/// Label of the synthetic margin row/column.
pub const MARGIN_LABEL: &str = "All";

/// A 2D contingency table over two categorical fields.
#[derive(Debug, Clone)]
pub struct ContingencyTable {
    pub row_field: String,
    pub col_field: String,
    /// Body labels, sorted, without the margin.
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub options: CrossTabOptions,
    counts: Vec<u64>, // row-major, row_labels.len() * col_labels.len()
}

impl ContingencyTable {
    /// Raw co-occurrence count for a body cell.
    pub fn count(&self, row: usize, col: usize) -> u64 {
        self.counts[row * self.col_labels.len() + col]
    }

    pub fn row_total(&self, row: usize) -> u64 {
        (0..self.col_labels.len()).map(|c| self.count(row, c)).sum()
    }

    pub fn col_total(&self, col: usize) -> u64 {
        (0..self.row_labels.len()).map(|r| self.count(r, col)).sum()
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Body cell after normalization. A zero denominator reports 0.0
    /// rather than NaN; it can only arise on an empty table.
    pub fn cell(&self, row: usize, col: usize) -> f64 {
        let count = self.count(row, col) as f64;
        let denom = match self.options.normalize {
            Normalize::None => return count,
            Normalize::Rows => self.row_total(row),
            Normalize::Cols => self.col_total(col),
            Normalize::All => self.grand_total(),
        };
        if denom == 0 {
            0.0
        } else {
            count / denom as f64
        }
    }

    /// Margin cell at the end of a row, honoring the margin style.
    pub fn row_margin(&self, row: usize) -> f64 {
        let total = self.row_total(row) as f64;
        match (self.options.normalize, self.options.margin_style) {
            (Normalize::None, _) | (_, MarginStyle::Counts) => total,
            (Normalize::Rows, MarginStyle::Normalized) => {
                if total == 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            (Normalize::Cols | Normalize::All, MarginStyle::Normalized) => {
                let grand = self.grand_total() as f64;
                if grand == 0.0 {
                    0.0
                } else {
                    total / grand
                }
            }
        }
    }

    /// Margin cell at the bottom of a column, honoring the margin style.
    pub fn col_margin(&self, col: usize) -> f64 {
        let total = self.col_total(col) as f64;
        match (self.options.normalize, self.options.margin_style) {
            (Normalize::None, _) | (_, MarginStyle::Counts) => total,
            (Normalize::Cols, MarginStyle::Normalized) => {
                if total == 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            (Normalize::Rows | Normalize::All, MarginStyle::Normalized) => {
                let grand = self.grand_total() as f64;
                if grand == 0.0 {
                    0.0
                } else {
                    total / grand
                }
            }
        }
    }

    /// The corner cell where both margins meet.
    pub fn grand_margin(&self) -> f64 {
        match (self.options.normalize, self.options.margin_style) {
            (Normalize::None, _) | (_, MarginStyle::Counts) => self.grand_total() as f64,
            (_, MarginStyle::Normalized) => {
                if self.grand_total() == 0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Index of a row label, if present.
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    pub fn col_index(&self, label: &str) -> Option<usize> {
        self.col_labels.iter().position(|l| l == label)
    }
}

/// Builds a contingency table between two categorical fields.
///
/// Missing values form their own category unless
/// [`CrossTabOptions::exclude_missing`] is set. Labels are sorted.
pub fn cross_tab(
    dataset: &Dataset,
    row_field: &str,
    col_field: &str,
    options: CrossTabOptions,
) -> Result<ContingencyTable, AnalyticsError> {
    dataset.check_field(row_field)?;
    dataset.check_field(col_field)?;

    let mut pair_counts: HashMap<(String, String), u64> = HashMap::new();
    for order in dataset.iter() {
        let row_value = order.field(row_field)?;
        let col_value = order.field(col_field)?;
        if options.exclude_missing && (row_value.is_missing() || col_value.is_missing()) {
            continue;
        }
        *pair_counts
            .entry((row_value.key(), col_value.key()))
            .or_insert(0) += 1;
    }

    let mut row_labels: Vec<String> = pair_counts.keys().map(|(r, _)| r.clone()).collect();
    let mut col_labels: Vec<String> = pair_counts.keys().map(|(_, c)| c.clone()).collect();
    row_labels.sort();
    row_labels.dedup();
    col_labels.sort();
    col_labels.dedup();

    let row_index: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_index: HashMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let mut counts = vec![0u64; row_labels.len() * col_labels.len()];
    for ((row, col), count) in &pair_counts {
        if let (Some(&r), Some(&c)) = (row_index.get(row.as_str()), col_index.get(col.as_str())) {
            counts[r * col_labels.len() + c] = *count;
        }
    }

    Ok(ContingencyTable {
        row_field: row_field.to_string(),
        col_field: col_field.to_string(),
        row_labels,
        col_labels,
        options,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MISSING_LABEL;
    use crate::models::{Churn, DeliveryStatus, Order};

    fn orders() -> Dataset {
        let rows: &[(&str, Option<Churn>)] = &[
            ("Delivered", Some(Churn::Active)),
            ("Delivered", Some(Churn::Active)),
            ("Delivered", Some(Churn::Inactive)),
            ("Cancelled", Some(Churn::Inactive)),
            ("Cancelled", Some(Churn::Inactive)),
            ("Cancelled", None),
        ];
        Dataset::new(
            rows.iter()
                .map(|(status, churned)| Order {
                    delivery_status: Some(DeliveryStatus::from(*status)),
                    churned: *churned,
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn raw_cells_sum_to_dataset_size() {
        let ds = orders();
        let table = cross_tab(&ds, "delivery_status", "churned", CrossTabOptions::default())
            .unwrap();
        assert_eq!(table.grand_total() as usize, ds.len());
    }

    #[test]
    fn missing_values_form_their_own_category() {
        let ds = orders();
        let table = cross_tab(&ds, "delivery_status", "churned", CrossTabOptions::default())
            .unwrap();
        let missing_col = table.col_index(MISSING_LABEL).unwrap();
        assert_eq!(table.col_total(missing_col), 1);
    }

    #[test]
    fn exclusion_shrinks_the_grand_total() {
        let ds = orders();
        let table = cross_tab(
            &ds,
            "delivery_status",
            "churned",
            CrossTabOptions {
                exclude_missing: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(table.grand_total() as usize, ds.len() - 1);
        assert!(table.col_index(MISSING_LABEL).is_none());
    }

    #[test]
    fn row_normalized_rows_sum_to_one() {
        let ds = orders();
        let table = cross_tab(
            &ds,
            "delivery_status",
            "churned",
            CrossTabOptions {
                normalize: Normalize::Rows,
                ..Default::default()
            },
        )
        .unwrap();
        for r in 0..table.row_labels.len() {
            let sum: f64 = (0..table.col_labels.len()).map(|c| table.cell(r, c)).sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {} sums to {}", r, sum);
        }
    }

    #[test]
    fn margins_default_to_raw_counts() {
        let ds = orders();
        let table = cross_tab(
            &ds,
            "delivery_status",
            "churned",
            CrossTabOptions {
                normalize: Normalize::Rows,
                include_margins: true,
                margin_style: MarginStyle::Counts,
                ..Default::default()
            },
        )
        .unwrap();
        let delivered = table.row_index("Delivered").unwrap();
        assert_eq!(table.row_margin(delivered), 3.0);
        assert_eq!(table.grand_margin(), 6.0);
    }

    #[test]
    fn normalized_margin_style_reports_fractions() {
        let ds = orders();
        let table = cross_tab(
            &ds,
            "delivery_status",
            "churned",
            CrossTabOptions {
                normalize: Normalize::Rows,
                include_margins: true,
                margin_style: MarginStyle::Normalized,
                ..Default::default()
            },
        )
        .unwrap();
        let delivered = table.row_index("Delivered").unwrap();
        assert_eq!(table.row_margin(delivered), 1.0);
        let active = table.col_index("Active").unwrap();
        assert!((table.col_margin(active) - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(table.grand_margin(), 1.0);
    }

    #[test]
    fn grand_normalization_sums_to_one() {
        let ds = orders();
        let table = cross_tab(
            &ds,
            "delivery_status",
            "churned",
            CrossTabOptions {
                normalize: Normalize::All,
                ..Default::default()
            },
        )
        .unwrap();
        let mut sum = 0.0;
        for r in 0..table.row_labels.len() {
            for c in 0..table.col_labels.len() {
                sum += table.cell(r, c);
            }
        }
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_dataset_yields_empty_table() {
        let ds = Dataset::default();
        let table = cross_tab(&ds, "delivery_status", "churned", CrossTabOptions::default())
            .unwrap();
        assert!(table.row_labels.is_empty());
        assert!(table.col_labels.is_empty());
        assert_eq!(table.grand_total(), 0);
        assert_eq!(table.grand_margin(), 0.0);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let ds = orders();
        let err = cross_tab(&ds, "delivery_status", "refund_reason", CrossTabOptions::default())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingField { .. }));
    }
}
