//! Exploratory overview of the orders dataset.
//! Run: ./target/release/eda [--input PATH]

use anyhow::Result;
use clap::Parser;
use order_insights::aggregate::{aggregate, value_counts, MetricSpec, Reducer};
use order_insights::loader::load_orders;
use order_insights::profile::headline_metrics;
use order_insights::report::{render_grouped, FormatOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eda")]
#[command(about = "Overall and per-city statistics for the orders dataset")]
struct Args {
    /// Input CSV path
    #[arg(long, default_value = "data/orders.csv")]
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let dataset = load_orders(&args.input)?;

    println!("\n{}", "=".repeat(60));
    println!("              OVERALL DATASET STATS");
    println!("{}\n", "=".repeat(60));

    let metrics = headline_metrics(&dataset)?;
    println!("  Total Orders:        {:>10}", metrics.total_orders);
    println!("  Unique Cities:       {:>10}", metrics.unique_cities);
    println!("  Unique Restaurants:  {:>10}", metrics.unique_restaurants);
    println!("  Unique Dishes:       {:>10}", metrics.unique_dishes);
    println!("  Unique Categories:   {:>10}", metrics.unique_categories);
    match metrics.avg_rating {
        Some(r) => println!("  Avg Rating (0-5):    {:>10.2}", r),
        None => println!("  Avg Rating (0-5):    {:>10}", "no data"),
    }
    match metrics.avg_order_frequency {
        Some(f) => println!("  Avg Order Frequency: {:>10.1}", f),
        None => println!("  Avg Order Frequency: {:>10}", "no data"),
    }

    println!("\nMOST USED PAYMENT METHODS");
    println!("{}", "-".repeat(40));
    let payments = value_counts(&dataset, "payment_method")?;
    let total = dataset.len() as f64;
    for (method, count) in &payments {
        let pct = if total > 0.0 {
            *count as f64 / total * 100.0
        } else {
            0.0
        };
        println!("  {:16} {:>6} ({:>5.1}%)", method, count, pct);
    }

    println!("\n{}", "=".repeat(60));
    println!("              STATS BY CITY");
    println!("{}\n", "=".repeat(60));

    let city_summary = aggregate(
        &dataset,
        &["city"],
        &[
            MetricSpec::new("restaurants", "restaurant_name", Reducer::CountDistinct),
            MetricSpec::new("dishes", "dish_name", Reducer::CountDistinct),
            MetricSpec::new("categories", "category", Reducer::CountDistinct),
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

    println!("\n{}", "=".repeat(60));
    Ok(())
}
