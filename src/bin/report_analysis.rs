//! Correlational analysis report - patterns and trends across fields.
//! Run: ./target/release/report_analysis [--input PATH] [section]
//! Sections: all, overview, city, temporal, spend, age, churn

use anyhow::Result;
use clap::Parser;
use order_insights::aggregate::{aggregate, value_counts, AggValue, MetricSpec, Reducer};
use order_insights::crosstab::{cross_tab, CrossTabOptions, MarginStyle, Normalize};
use order_insights::dataset::{Dataset, FIELDS};
use order_insights::filter::Filter;
use order_insights::loader::load_orders;
use order_insights::profile::{describe, headline_metrics, nunique, rate};
use order_insights::report::{
    print_section_header, print_subsection, render_contingency, render_grouped, FormatOptions,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "report_analysis")]
#[command(about = "Correlational analysis across dataset fields")]
struct Args {
    /// Input CSV path
    #[arg(long, default_value = "data/orders.csv")]
    input: PathBuf,

    /// Report section to run
    #[arg(default_value = "all")]
    section: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let dataset = load_orders(&args.input)?;

    println!("\n{}", "█".repeat(80));
    println!("{}  ANALYTICAL OVERVIEW OF THE ORDERS DATASET  {}", "█".repeat(16), "█".repeat(17));
    println!("{}\n", "█".repeat(80));

    match args.section.as_str() {
        "all" => {
            run_overview_section(&dataset)?;
            run_city_section(&dataset)?;
            run_temporal_section(&dataset)?;
            run_spend_section(&dataset)?;
            run_age_section(&dataset)?;
            run_churn_section(&dataset)?;
        }
        "overview" => run_overview_section(&dataset)?,
        "city" => run_city_section(&dataset)?,
        "temporal" => run_temporal_section(&dataset)?,
        "spend" => run_spend_section(&dataset)?,
        "age" => run_age_section(&dataset)?,
        "churn" => run_churn_section(&dataset)?,
        other => {
            println!("Unknown section: {}", other);
            println!("Available: all, overview, city, temporal, spend, age, churn");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_overview_section(dataset: &Dataset) -> Result<()> {
    print_section_header("1. DATASET OVERVIEW");

    let metrics = headline_metrics(dataset)?;
    println!("  Rows:           {:>10}", metrics.total_orders);
    println!("  Missing cells:  {:>10}", dataset.missing_cells());

    print_subsection("Unique values per column");
    for field in FIELDS {
        println!("  {:20} {:>8}", field, nunique(dataset, field)?);
    }

    print_subsection("Statistical summary");
    for field in ["quantity", "price", "order_frequency"] {
        if let Some(s) = describe(dataset, field)? {
            println!(
                "  {:16} count={:<6} mean={:<10.2} std={:<10.2} min={:<8.2} max={:<8.2}",
                s.field, s.count, s.mean, s.std, s.min, s.max
            );
        }
    }
    Ok(())
}

fn run_city_section(dataset: &Dataset) -> Result<()> {
    print_section_header("2. CONSOLIDATED STATISTICAL ANALYSIS BY CITY");

    let city_summary = aggregate(
        dataset,
        &["city"],
        &[
            MetricSpec::new("avg_rating", "rating", Reducer::Mean),
            MetricSpec::new("avg_order_freq", "order_frequency", Reducer::Mean),
            MetricSpec::new("total_spent", "price", Reducer::Sum),
            MetricSpec::new("avg_price", "price", Reducer::Mean),
            MetricSpec::new("top_restaurant", "restaurant_name", Reducer::Mode),
            MetricSpec::new("top_category", "category", Reducer::Mode),
            MetricSpec::new("top_dish", "dish_name", Reducer::Mode),
            MetricSpec::new("top_payment", "payment_method", Reducer::Mode),
        ],
    )?
    .sort_by_key();
    print!(
        "{}",
        render_grouped(&city_summary, "City", &FormatOptions::default())
    );
    Ok(())
}

fn run_temporal_section(dataset: &Dataset) -> Result<()> {
    print_section_header("3. ORDER PATTERN BY MONTH");

    let monthly = value_counts(dataset, "order_month")?;
    for (month, count) in &monthly {
        println!("  {:12} {:>8}", month, count);
    }

    if let (Some((busiest, most)), Some((slowest, least))) = (
        monthly.iter().max_by_key(|(_, c)| *c),
        monthly.iter().min_by_key(|(_, c)| *c),
    ) {
        print_subsection("Peak Performance");
        println!("  Busiest Month: {} ({} orders)", busiest, most);
        println!("  Slowest Month: {} ({} orders)", slowest, least);
        println!("  Difference:    {} orders", most - least);
    }
    Ok(())
}

fn run_spend_section(dataset: &Dataset) -> Result<()> {
    print_section_header("4. AVERAGE SPEND BREAKDOWNS");

    print_subsection("Average amount spent by payment method");
    let by_payment = aggregate(
        dataset,
        &["payment_method"],
        &[MetricSpec::new("avg_spent", "price", Reducer::Mean)],
    )?
    .sort_by_metric("avg_spent", false);
    print!(
        "{}",
        render_grouped(&by_payment, "Payment Method", &FormatOptions::default())
    );

    print_subsection("Average amount spent by gender");
    let by_gender = aggregate(
        dataset,
        &["gender"],
        &[MetricSpec::new("avg_spent", "price", Reducer::Mean)],
    )?
    .sort_by_metric("avg_spent", false);
    print!(
        "{}",
        render_grouped(&by_gender, "Gender", &FormatOptions::default())
    );
    Ok(())
}

fn run_age_section(dataset: &Dataset) -> Result<()> {
    print_section_header("5. ANALYSIS BY AGE RANGE");

    let ages = aggregate(
        dataset,
        &["age"],
        &[
            MetricSpec::new("customers", "order_id", Reducer::Count),
            MetricSpec::new("dishes", "dish_name", Reducer::CountDistinct),
            MetricSpec::new("categories", "category", Reducer::CountDistinct),
            MetricSpec::new("avg_rating", "rating", Reducer::Mean),
            MetricSpec::new("avg_order_freq", "order_frequency", Reducer::Mean),
            MetricSpec::new("total_orders", "order_frequency", Reducer::Sum),
            MetricSpec::new("total_spent", "price", Reducer::Sum),
            MetricSpec::new("avg_price", "price", Reducer::Mean),
            MetricSpec::new("top_payment", "payment_method", Reducer::Mode),
            MetricSpec::new("top_restaurant", "restaurant_name", Reducer::Mode),
            MetricSpec::new("top_category", "category", Reducer::Mode),
            MetricSpec::new("top_dish", "dish_name", Reducer::Mode),
        ],
    )?
    .sort_by_key();

    for group in &ages.groups {
        let col = |name: &str| -> String {
            ages.metrics
                .iter()
                .position(|m| m == name)
                .map(|i| group.values[i].to_string())
                .unwrap_or_default()
        };
        let age_subset = Filter::new()
            .include("age", [group.key_label()])
            .apply(dataset)?;
        let inactive = Filter::new()
            .include("churned", ["Inactive"])
            .apply(&age_subset)?
            .len();
        let active = Filter::new()
            .include("churned", ["Active"])
            .apply(&age_subset)?
            .len();
        let cancellations = Filter::new()
            .include("delivery_status", ["Cancelled"])
            .apply(&age_subset)?
            .len();

        println!("\n  Age: {}", group.key_label());
        println!("  Number of Customers:          {}", col("customers"));
        println!("  Number of Inactive Customers: {}", inactive);
        println!("  Number of Active Customers:   {}", active);
        println!("  Average Rating:               {}", col("avg_rating"));
        println!("  Average Order Frequency:      {}", col("avg_order_freq"));
        println!("  Total Amount Spent:           {}", col("total_spent"));
        println!("  Average Price per Order:      {}", col("avg_price"));
        println!("  Principal Payment Method:     {}", col("top_payment"));
        println!("  Most Popular Restaurant:      {}", col("top_restaurant"));
        println!("  Most Popular Category:        {}", col("top_category"));
        println!("  Most Popular Dish:            {}", col("top_dish"));
        println!("  Total Number of Orders:       {}", col("total_orders"));
        println!("  Number of Cancellations:      {}", cancellations);
        println!("  {}", "-".repeat(30));
    }
    Ok(())
}

fn run_churn_section(dataset: &Dataset) -> Result<()> {
    print_section_header("6. CANCELLED ORDERS AND INACTIVE CUSTOMERS");

    let counts = cross_tab(
        dataset,
        "delivery_status",
        "churned",
        CrossTabOptions {
            include_margins: true,
            margin_style: MarginStyle::Counts,
            ..Default::default()
        },
    )?;
    print_subsection("Cross-tabulation (with margins)");
    print!(
        "{}",
        render_contingency(&counts, &FormatOptions::default())
    );

    let pct = cross_tab(
        dataset,
        "delivery_status",
        "churned",
        CrossTabOptions {
            normalize: Normalize::Rows,
            ..Default::default()
        },
    )?;
    print_subsection("Percentages by delivery status");
    let pct_fmt = FormatOptions {
        percent: true,
        precision: 0,
        ..FormatOptions::default()
    };
    print!("{}", render_contingency(&pct, &pct_fmt));

    print_subsection("Cancellations by age range");
    let by_age = aggregate(
        dataset,
        &["age"],
        &[MetricSpec::new("orders", "order_id", Reducer::Count)],
    )?
    .sort_by_key();
    let cancelled = Filter::new()
        .include("delivery_status", ["Cancelled"])
        .apply(dataset)?;
    let cancelled_by_age = aggregate(
        &cancelled,
        &["age"],
        &[MetricSpec::new("cancelled", "order_id", Reducer::Count)],
    )?;

    let mut best: Option<(String, u64)> = None;
    let mut worst: Option<(String, u64)> = None;
    for group in &by_age.groups {
        let age = group.key_label();
        let total = match group.values[0] {
            AggValue::Count(c) => c,
            _ => 0,
        };
        let cancelled_count = match cancelled_by_age.value(&[age.as_str()], "cancelled") {
            Some(AggValue::Count(c)) => *c,
            _ => 0,
        };
        match rate(cancelled_count, total) {
            Some(r) => println!(
                "  {:12} total {:>6}, cancelled {:>5} ({:>5.2}%)",
                age,
                total,
                cancelled_count,
                r * 100.0
            ),
            None => println!("  {:12} total {:>6}, cancelled {:>5}", age, total, cancelled_count),
        }
        if worst.as_ref().map(|(_, c)| cancelled_count > *c).unwrap_or(true) {
            worst = Some((age.clone(), cancelled_count));
        }
        if best.as_ref().map(|(_, c)| cancelled_count < *c).unwrap_or(true) {
            best = Some((age, cancelled_count));
        }
    }
    if let (Some((hi_age, hi)), Some((lo_age, lo))) = (worst, best) {
        print_subsection("Age Range Performance");
        println!("  Highest cancellations: {} ({} orders)", hi_age, hi);
        println!("  Lowest cancellations:  {} ({} orders)", lo_age, lo);
    }
    Ok(())
}
