//! Consolidated descriptive statistics report.
//! Run: ./target/release/report_stats [--input PATH]
//!
//! Sections: describe-style numeric summary, city summary, dish price
//! ranking, price tiers over average order value, payment and churn
//! frequencies, delivery-status x churn crosstab, orders by weekday,
//! cancellations by age range.

use anyhow::Result;
use clap::Parser;
use order_insights::aggregate::{aggregate, value_counts, AggValue, MetricSpec, Reducer};
use order_insights::crosstab::{cross_tab, CrossTabOptions, MarginStyle, Normalize};
use order_insights::dataset::Dataset;
use order_insights::filter::Filter;
use order_insights::loader::load_orders;
use order_insights::models::weekday_name;
use order_insights::profile::{describe, orders_by_weekday, rate};
use order_insights::report::{
    print_section_header, print_subsection, render_contingency, render_grouped, FormatOptions,
};
use order_insights::tiers::{average_order_value, classify, PriceTier};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "report_stats")]
#[command(about = "Descriptive statistics over the orders dataset")]
struct Args {
    /// Input CSV path
    #[arg(long, default_value = "data/orders.csv")]
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let dataset = load_orders(&args.input)?;
    let fmt = FormatOptions::default();

    print_section_header("GENERAL DESCRIPTIVE STATISTICS");
    for field in ["quantity", "price", "order_frequency", "rating"] {
        match describe(&dataset, field)? {
            Some(s) => {
                print_subsection(field);
                println!("  count  {:>12}", s.count);
                println!("  mean   {:>12.2}", s.mean);
                println!("  std    {:>12.2}", s.std);
                println!("  min    {:>12.2}", s.min);
                println!("  25%    {:>12.2}", s.q1);
                println!("  50%    {:>12.2}", s.median);
                println!("  75%    {:>12.2}", s.q3);
                println!("  max    {:>12.2}", s.max);
            }
            None => {
                print_subsection(field);
                println!("  (no numeric data)");
            }
        }
    }

    print_section_header("CONSOLIDATED STATISTICAL ANALYSIS BY CITY");
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
    print!("{}", render_grouped(&city_summary, "City", &fmt));

    print_section_header("MEAN PRICE PER DISH");
    let dish_prices = aggregate(
        &dataset,
        &["dish_name"],
        &[MetricSpec::new("avg_price", "price", Reducer::Mean)],
    )?
    .sort_by_metric("avg_price", false);
    print!("{}", render_grouped(&dish_prices, "Dish", &fmt));

    print_section_header("AVERAGE ORDER VALUE BY PRICE TIER");
    run_price_tier_section(&dataset)?;

    print_section_header("AVERAGE SPEND BY AGE RANGE");
    let age_spend = aggregate(
        &dataset,
        &["age"],
        &[MetricSpec::new("avg_spend", "price", Reducer::Mean)],
    )?
    .sort_by_metric("avg_spend", false);
    print!("{}", render_grouped(&age_spend, "Age Range", &fmt));

    print_section_header("PAYMENT METHOD FREQUENCY");
    for (method, count) in value_counts(&dataset, "payment_method")? {
        println!("  {:16} {:>6}", method, count);
    }

    print_section_header("ACTIVE VS INACTIVE CUSTOMERS");
    for (status, count) in value_counts(&dataset, "churned")? {
        println!("  {:16} {:>6}", status, count);
    }

    print_section_header("CANCELLED ORDERS VS INACTIVE CUSTOMERS");
    let counts = cross_tab(
        &dataset,
        "delivery_status",
        "churned",
        CrossTabOptions::default(),
    )?;
    print_subsection("Contingency Table");
    print!("{}", render_contingency(&counts, &fmt));

    let proportions = cross_tab(
        &dataset,
        "delivery_status",
        "churned",
        CrossTabOptions {
            normalize: Normalize::Rows,
            ..Default::default()
        },
    )?;
    print_subsection("Proportions by delivery status");
    let prop_fmt = FormatOptions {
        precision: 4,
        ..fmt
    };
    print!("{}", render_contingency(&proportions, &prop_fmt));

    print_subsection("Key Metrics");
    let cancelled_inactive = Filter::new()
        .include("delivery_status", ["Cancelled"])
        .include("churned", ["Inactive"])
        .apply(&dataset)?
        .len() as u64;
    let total_cancelled = Filter::new()
        .include("delivery_status", ["Cancelled"])
        .apply(&dataset)?
        .len() as u64;
    let total_inactive = Filter::new()
        .include("churned", ["Inactive"])
        .apply(&dataset)?
        .len() as u64;
    println!("  Total cancelled orders:                   {:>6}", total_cancelled);
    println!("  Cancelled orders with inactive customers: {:>6}", cancelled_inactive);
    match rate(cancelled_inactive, total_cancelled) {
        Some(r) => println!("  % of cancelled orders that are inactive:  {:>5.2}%", r * 100.0),
        None => println!("  % of cancelled orders that are inactive:  undefined"),
    }
    match rate(cancelled_inactive, total_inactive) {
        Some(r) => println!("  % of inactive customers with cancellations: {:>5.2}%", r * 100.0),
        None => println!("  % of inactive customers with cancellations: undefined"),
    }

    print_section_header("ORDERS BY DAY OF WEEK");
    run_weekday_section(&dataset)?;

    print_section_header("CANCELLATIONS BY AGE RANGE");
    run_cancellation_section(&dataset)?;

    println!("\n{}", "═".repeat(80));
    Ok(())
}

fn run_price_tier_section(dataset: &Dataset) -> Result<()> {
    let per_order = average_order_value(dataset)?;
    let Some((q, assigned)) = classify(&per_order, None) else {
        println!("  (no data)");
        return Ok(());
    };

    println!("  Low:      orders with average value <= {:.2}", q.q1);
    println!("  Mid-Low:  between {:.2} and {:.2}", q.q1, q.q2);
    println!("  Mid-High: between {:.2} and {:.2}", q.q2, q.q3);
    println!("  High:     above {:.2}", q.q3);

    // Per-tier mean and sum over the per-order averages.
    let mut by_tier: HashMap<PriceTier, Vec<f64>> = HashMap::new();
    let values: HashMap<&str, f64> = per_order.iter().map(|(id, v)| (id.as_str(), *v)).collect();
    for (id, tier) in &assigned {
        if let Some(v) = values.get(id.as_str()) {
            by_tier.entry(*tier).or_default().push(*v);
        }
    }

    print_subsection("Orders per price tier");
    println!("  {:10} {:>8} {:>12} {:>12}", "Tier", "Orders", "Mean", "Sum");
    println!("  {}", "─".repeat(46));
    for tier in PriceTier::ALL {
        let tier_values = by_tier.get(&tier).map(Vec::as_slice).unwrap_or(&[]);
        if tier_values.is_empty() {
            println!("  {:10} {:>8} {:>12} {:>12}", tier.to_string(), 0, "-", "-");
        } else {
            let sum: f64 = tier_values.iter().sum();
            let mean = sum / tier_values.len() as f64;
            println!(
                "  {:10} {:>8} {:>12.2} {:>12.2}",
                tier.to_string(),
                tier_values.len(),
                mean,
                sum
            );
        }
    }
    Ok(())
}

fn run_weekday_section(dataset: &Dataset) -> Result<()> {
    let days = orders_by_weekday(dataset)?;
    let total: u64 = days.iter().map(|(_, c)| c).sum();

    for (day, count) in &days {
        match rate(*count, total) {
            Some(r) => println!(
                "  {:10} {:>6} orders ({:>5.2}%)",
                weekday_name(*day),
                count,
                r * 100.0
            ),
            None => println!("  {:10} {:>6} orders", weekday_name(*day), count),
        }
    }

    let weekday_total: u64 = days.iter().take(5).map(|(_, c)| c).sum();
    let weekend_total: u64 = days.iter().skip(5).map(|(_, c)| c).sum();
    print_subsection("Weekday vs Weekend");
    println!("  Weekday orders (Mon-Fri): {:>8}", weekday_total);
    println!("  Weekend orders (Sat-Sun): {:>8}", weekend_total);
    println!("  Weekday average per day:  {:>10.1}", weekday_total as f64 / 5.0);
    println!("  Weekend average per day:  {:>10.1}", weekend_total as f64 / 2.0);

    let busiest = days.iter().max_by_key(|(_, c)| *c);
    let slowest = days.iter().min_by_key(|(_, c)| *c);
    if let (Some((busiest, most)), Some((slowest, least))) = (busiest, slowest) {
        print_subsection("Peak Performance");
        println!("  Busiest day: {} ({} orders)", weekday_name(*busiest), most);
        println!("  Slowest day: {} ({} orders)", weekday_name(*slowest), least);
        println!("  Difference:  {} orders", most - least);
    }

    let by_status = cross_tab(
        dataset,
        "order_day_of_week",
        "delivery_status",
        CrossTabOptions {
            include_margins: true,
            margin_style: MarginStyle::Counts,
            ..Default::default()
        },
    )?;
    print_subsection("Orders by day and delivery status");
    print!(
        "{}",
        render_contingency(&by_status, &FormatOptions::default())
    );
    Ok(())
}

fn run_cancellation_section(dataset: &Dataset) -> Result<()> {
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

    let overall_rate = rate(cancelled.len() as u64, dataset.len() as u64);

    println!(
        "  {:12} {:>8} {:>10} {:>8} {:>12}",
        "Age Range", "Orders", "Cancelled", "Rate", "vs Overall"
    );
    println!("  {}", "─".repeat(56));
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
        match (rate(cancelled_count, total), overall_rate) {
            (Some(r), Some(overall)) => {
                let delta = (r - overall) * 100.0;
                println!(
                    "  {:12} {:>8} {:>10} {:>7.2}% {:>+11.2}%",
                    age,
                    total,
                    cancelled_count,
                    r * 100.0,
                    delta
                );
            }
            _ => println!(
                "  {:12} {:>8} {:>10} {:>8} {:>12}",
                age, total, cancelled_count, "undef", "-"
            ),
        }
    }
    if let Some(overall) = overall_rate {
        println!("\n  Overall cancellation rate: {:.2}%", overall * 100.0);
    }

    let age_status = cross_tab(
        dataset,
        "age",
        "delivery_status",
        CrossTabOptions {
            include_margins: true,
            margin_style: MarginStyle::Counts,
            ..Default::default()
        },
    )?;
    print_subsection("Complete analysis by age and delivery status");
    print!(
        "{}",
        render_contingency(&age_status, &FormatOptions::default())
    );

    let age_status_pct = cross_tab(
        dataset,
        "age",
        "delivery_status",
        CrossTabOptions {
            normalize: Normalize::Rows,
            ..Default::default()
        },
    )?;
    print_subsection("Percentage distribution within each age range");
    let pct_fmt = FormatOptions {
        percent: true,
        ..FormatOptions::default()
    };
    print!("{}", render_contingency(&age_status_pct, &pct_fmt));
    Ok(())
}
