//! Filterable dashboard rendered as text.
//! Run: ./target/release/dashboard [OPTIONS]
//!
//! Takes one filter from the command line, recomputes every view over
//! the filtered subset, then renders headline metrics, rankings, and
//! crosstabs. The subset can be exported as CSV and the metrics as
//! JSON. Nothing is cached between runs; a different filter is a full
//! recomputation.

use anyhow::Result;
use clap::Parser;
use order_insights::aggregate::{aggregate, value_counts, MetricSpec, Reducer};
use order_insights::crosstab::{cross_tab, CrossTabOptions, Normalize};
use order_insights::dataset::Dataset;
use order_insights::filter::Filter;
use order_insights::loader::load_orders;
use order_insights::profile::{headline_metrics, rate};
use order_insights::report::{
    bar, print_section_header, print_subsection, render_contingency, render_grouped,
    FormatOptions,
};
use std::fs::File;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Filterable text dashboard over the orders dataset")]
struct Args {
    /// Input CSV path
    #[arg(long, default_value = "data/orders.csv")]
    input: PathBuf,

    /// Restrict to these cities (repeatable)
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Restrict to these genders (repeatable)
    #[arg(long = "gender")]
    genders: Vec<String>,

    /// Restrict to these age ranges (repeatable)
    #[arg(long = "age")]
    ages: Vec<String>,

    /// Restrict to these payment methods (repeatable)
    #[arg(long = "payment")]
    payments: Vec<String>,

    /// Restrict to these delivery statuses (repeatable)
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Ranking depth
    #[arg(long, default_value = "5")]
    top: usize,

    /// Extra aggregation: group field for --metric specs
    #[arg(long)]
    group_by: Option<String>,

    /// Extra aggregation metric, e.g. avg_rating=mean(rating) (repeatable)
    #[arg(long = "metric")]
    metrics: Vec<String>,

    /// Write the filtered subset to this CSV file
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Write headline metrics for the filtered subset to this JSON file
    #[arg(long)]
    export_json: Option<PathBuf>,
}

fn build_filter(args: &Args) -> Filter {
    let mut filter = Filter::new();
    let clauses = [
        ("city", &args.cities),
        ("gender", &args.genders),
        ("age", &args.ages),
        ("payment_method", &args.payments),
        ("delivery_status", &args.statuses),
    ];
    for (field, values) in clauses {
        if !values.is_empty() {
            filter = filter.include(field, values.iter().cloned());
        }
    }
    filter
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let dataset = load_orders(&args.input)?;
    let filter = build_filter(&args);
    let filtered = filter.apply(&dataset)?;

    println!("\n{}", "█".repeat(80));
    println!("{}  ORDERS DASHBOARD  {}", "█".repeat(29), "█".repeat(30));
    println!("{}\n", "█".repeat(80));

    if !filter.is_unrestricted() {
        println!(
            "  Filter active: {} of {} orders selected",
            filtered.len(),
            dataset.len()
        );
    }

    if filtered.is_empty() {
        println!("\n  No data matches the selected filters. Adjust the filters and retry.");
        return Ok(());
    }

    run_metrics_section(&filtered)?;
    run_rankings_section(&filtered, args.top)?;
    run_cancellation_section(&filtered)?;

    if let Some(group_by) = &args.group_by {
        run_custom_section(&filtered, group_by, &args.metrics);
    }

    if let Some(path) = &args.export_csv {
        let file = File::create(path)?;
        filtered.write_csv(file)?;
        println!("\n  Filtered subset written to {:?}", path);
    }
    if let Some(path) = &args.export_json {
        let metrics = headline_metrics(&filtered)?;
        serde_json::to_writer_pretty(File::create(path)?, &metrics)?;
        println!("  Headline metrics written to {:?}", path);
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_metrics_section(filtered: &Dataset) -> Result<()> {
    print_section_header("HEADLINE METRICS");

    let m = headline_metrics(filtered)?;
    println!("  Total Orders:    {:>12}", m.total_orders);
    println!("  Cities:          {:>12}", m.unique_cities);
    println!("  Restaurants:     {:>12}", m.unique_restaurants);
    println!("  Dishes:          {:>12}", m.unique_dishes);
    println!("  Categories:      {:>12}", m.unique_categories);
    match m.avg_rating {
        Some(r) => println!("  Avg Rating:      {:>12.2}", r),
        None => println!("  Avg Rating:      {:>12}", "no data"),
    }
    println!("  Total Revenue:   {:>12.2}", m.total_revenue);
    match m.avg_order_value {
        Some(v) => println!("  Avg Order Value: {:>12.2}", v),
        None => println!("  Avg Order Value: {:>12}", "no data"),
    }

    print_subsection("Payment method distribution");
    let payments = value_counts(filtered, "payment_method")?;
    let total = filtered.len() as u64;
    for (method, count) in &payments {
        let pct = rate(*count, total).unwrap_or(0.0) * 100.0;
        println!("  {:16} {:>6} ({:>5.1}%) {}", method, count, pct, bar(pct));
    }

    print_subsection("Active vs inactive customers");
    for (status, count) in value_counts(filtered, "churned")? {
        let pct = rate(count, total).unwrap_or(0.0) * 100.0;
        println!("  {:16} {:>6} ({:>5.1}%) {}", status, count, pct, bar(pct));
    }
    Ok(())
}

fn run_rankings_section(filtered: &Dataset, top: usize) -> Result<()> {
    print_section_header("RANKINGS AND TOP PERFORMERS");
    let fmt = FormatOptions::default();

    print_subsection("Top categories by volume");
    for (category, count) in value_counts(filtered, "category")?.into_iter().take(top) {
        println!("  {:24} {:>6}", category, count);
    }

    print_subsection("Top cities by volume");
    for (city, count) in value_counts(filtered, "city")?.into_iter().take(top) {
        println!("  {:24} {:>6}", city, count);
    }

    print_subsection("Top dishes by volume");
    for (dish, count) in value_counts(filtered, "dish_name")?.into_iter().take(top * 2) {
        println!("  {:24} {:>6}", dish, count);
    }

    print_subsection("Top cities by revenue");
    let city_revenue = aggregate(
        filtered,
        &["city"],
        &[MetricSpec::new("revenue", "price", Reducer::Sum)],
    )?
    .sort_by_metric("revenue", false)
    .top(top);
    print!("{}", render_grouped(&city_revenue, "City", &fmt));

    print_subsection("Top restaurants by revenue");
    let restaurant_revenue = aggregate(
        filtered,
        &["restaurant_name"],
        &[MetricSpec::new("revenue", "price", Reducer::Sum)],
    )?
    .sort_by_metric("revenue", false)
    .top(top * 2);
    print!("{}", render_grouped(&restaurant_revenue, "Restaurant", &fmt));

    print_subsection("Top months by orders");
    for (month, count) in value_counts(filtered, "order_month")?.into_iter().take(top) {
        println!("  {:24} {:>6}", month, count);
    }
    Ok(())
}

fn run_cancellation_section(filtered: &Dataset) -> Result<()> {
    print_section_header("CANCELLATION ANALYSIS");

    print_subsection("Cancellation rate by age range");
    let by_age = aggregate(
        filtered,
        &["age"],
        &[MetricSpec::new("orders", "order_id", Reducer::Count)],
    )?
    .sort_by_key();
    let cancelled = Filter::new()
        .include("delivery_status", ["Cancelled"])
        .apply(filtered)?;
    let cancelled_by_age = aggregate(
        &cancelled,
        &["age"],
        &[MetricSpec::new("cancelled", "order_id", Reducer::Count)],
    )?;
    for group in &by_age.groups {
        let age = group.key_label();
        let total = group.values[0].as_f64().unwrap_or(0.0) as u64;
        let cancelled_count = cancelled_by_age
            .value(&[age.as_str()], "cancelled")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as u64;
        match rate(cancelled_count, total) {
            Some(r) => {
                let pct = r * 100.0;
                println!("  {:12} {:>6.2}% {}", age, pct, bar(pct));
            }
            None => println!("  {:12} undefined", age),
        }
    }

    print_subsection("Delivery status vs churn (column %)");
    let status_churn = cross_tab(
        filtered,
        "delivery_status",
        "churned",
        CrossTabOptions {
            normalize: Normalize::Cols,
            ..Default::default()
        },
    )?;
    let pct_fmt = FormatOptions {
        percent: true,
        ..FormatOptions::default()
    };
    print!("{}", render_contingency(&status_churn, &pct_fmt));
    Ok(())
}

/// User-supplied aggregation. A bad metric spec or field name skips
/// this section with a warning instead of failing the whole dashboard.
fn run_custom_section(filtered: &Dataset, group_by: &str, specs: &[String]) {
    print_section_header("CUSTOM AGGREGATION");

    let mut metrics = Vec::new();
    for spec in specs {
        match MetricSpec::parse(spec) {
            Ok(m) => metrics.push(m),
            Err(e) => {
                warn!("Ignoring metric '{}': {}", spec, e);
                return;
            }
        }
    }
    if metrics.is_empty() {
        metrics.push(MetricSpec::new("orders", "order_id", Reducer::Count));
    }

    match aggregate(filtered, &[group_by], &metrics) {
        Ok(grouped) => {
            let grouped = grouped.sort_by_key();
            print!(
                "{}",
                render_grouped(&grouped, group_by, &FormatOptions::default())
            );
        }
        Err(e) => warn!("Skipping custom aggregation: {}", e),
    }
}
