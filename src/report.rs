//! Text rendering for report binaries.
//!
//! Formatting behavior is explicit configuration carried in
//! [`FormatOptions`]; there is no process-wide display state. The core
//! returns plain data structures and the functions here turn them into
//! the section/table layout the report binaries print.

use crate::aggregate::{AggValue, Grouped};
use crate::crosstab::{ContingencyTable, Normalize, MARGIN_LABEL};

/// Explicit formatting configuration passed to every renderer.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Decimal places for floating-point cells.
    pub precision: usize,
    /// Truncate tables after this many body rows.
    pub max_rows: Option<usize>,
    /// Render normalized contingency cells as percentages.
    pub percent: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            precision: 2,
            max_rows: None,
            percent: false,
        }
    }
}

pub fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

pub fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

/// Proportional `#` bar for histogram-style listings.
pub fn bar(pct: f64) -> String {
    "#".repeat((pct / 2.0).max(0.0) as usize)
}

fn fmt_agg(value: &AggValue, options: &FormatOptions) -> String {
    match value {
        AggValue::Number(n) => format!("{:.*}", options.precision, n),
        AggValue::Count(c) => format!("{}", c),
        AggValue::Text(s) => s.clone(),
        AggValue::Undefined => "undefined".to_string(),
    }
}

/// Renders a grouped-aggregation result as an aligned table with one
/// row per group. Returns a "no data" notice for empty results.
pub fn render_grouped(grouped: &Grouped, key_header: &str, options: &FormatOptions) -> String {
    if grouped.is_empty() {
        return "  (no data)\n".to_string();
    }

    let mut header: Vec<String> = vec![key_header.to_string()];
    header.extend(grouped.metrics.iter().cloned());

    let rows: Vec<Vec<String>> = grouped
        .groups
        .iter()
        .take(options.max_rows.unwrap_or(usize::MAX))
        .map(|g| {
            let mut row = vec![g.key_label()];
            row.extend(g.values.iter().map(|v| fmt_agg(v, options)));
            row
        })
        .collect();

    render_table(&header, &rows)
}

/// Renders a contingency table, appending the "All" margins when the
/// table was built with them.
pub fn render_contingency(table: &ContingencyTable, options: &FormatOptions) -> String {
    if table.row_labels.is_empty() {
        return "  (no data)\n".to_string();
    }

    let normalized = table.options.normalize != Normalize::None;
    let fmt_cell = |value: f64, is_count: bool| -> String {
        if is_count {
            format!("{}", value as u64)
        } else if options.percent {
            format!("{:.*}%", options.precision, value * 100.0)
        } else {
            format!("{:.*}", options.precision, value)
        }
    };

    let mut header: Vec<String> = vec![table.row_field.clone()];
    header.extend(table.col_labels.iter().cloned());
    if table.options.include_margins {
        header.push(MARGIN_LABEL.to_string());
    }

    let mut rows = Vec::new();
    for r in 0..table.row_labels.len() {
        let mut row = vec![table.row_labels[r].clone()];
        for c in 0..table.col_labels.len() {
            row.push(fmt_cell(table.cell(r, c), !normalized));
        }
        if table.options.include_margins {
            let raw = matches!(
                table.options.margin_style,
                crate::crosstab::MarginStyle::Counts
            ) || !normalized;
            row.push(fmt_cell(table.row_margin(r), raw));
        }
        rows.push(row);
    }
    if table.options.include_margins {
        let raw = matches!(
            table.options.margin_style,
            crate::crosstab::MarginStyle::Counts
        ) || !normalized;
        let mut row = vec![MARGIN_LABEL.to_string()];
        for c in 0..table.col_labels.len() {
            row.push(fmt_cell(table.col_margin(c), raw));
        }
        row.push(fmt_cell(table.grand_margin(), raw));
        rows.push(row);
    }

    render_table(&header, &rows)
}

/// Column-aligned plain-text table: left-aligned label column,
/// right-aligned value columns.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let n_cols = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < n_cols {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut out = String::new();
    let fmt_row = |row: &[String]| -> String {
        let mut line = String::from("  ");
        for (i, cell) in row.iter().enumerate() {
            if i == 0 {
                line.push_str(&format!("{:<width$}", cell, width = widths[0]));
            } else {
                line.push_str(&format!("  {:>width$}", cell, width = widths[i]));
            }
        }
        line.push('\n');
        line
    };

    out.push_str(&fmt_row(header));
    let rule_len = widths.iter().sum::<usize>() + 2 * n_cols.saturating_sub(1);
    out.push_str(&format!("  {}\n", "─".repeat(rule_len)));
    for row in rows {
        out.push_str(&fmt_row(row));
    }
    out
}
