//! Synthetic orders generator.
//!
//! Emits a schema-complete orders CSV with controlled randomness so
//! every report binary is runnable without the proprietary source
//! file. A small fraction of cells is left empty to exercise the
//! missing-value paths.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]

use anyhow::Result;
use clap::Parser;
use csv::WriterBuilder;
use order_insights::models::CsvOrder;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic orders CSV")]
struct Args {
    /// Number of rows to generate
    #[arg(long, default_value = "5000")]
    rows: usize,

    /// Probability of blanking an optional cell
    #[arg(long, default_value = "0.02")]
    missing_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/orders.csv")]
    output: PathBuf,
}

const CITIES: &[&str] = &["Lahore", "Karachi", "Islamabad", "Multan", "Faisalabad"];
const RESTAURANTS: &[&str] = &[
    "Spice Hub",
    "Crust Bros",
    "Karahi Point",
    "Wok This Way",
    "Burger Basket",
    "Daal House",
    "Green Bowl",
    "Shinwari Express",
];
const DISHES: &[(&str, &str, f64)] = &[
    ("Chicken Biryani", "Desi", 8.0),
    ("Beef Karahi", "Desi", 14.0),
    ("Margherita", "Pizza", 10.0),
    ("Pepperoni", "Pizza", 12.0),
    ("Zinger Burger", "Fast Food", 6.0),
    ("Club Sandwich", "Fast Food", 5.0),
    ("Chow Mein", "Chinese", 7.0),
    ("Spring Rolls", "Chinese", 4.0),
    ("Caesar Salad", "Healthy", 9.0),
    ("Fruit Bowl", "Healthy", 6.5),
];
const PAYMENT_METHODS: &[&str] = &["Card", "Cash on Delivery", "Wallet", "Bank Transfer"];
const STATUSES: &[(&str, f64)] = &[("Delivered", 0.82), ("Cancelled", 0.12), ("In Process", 0.06)];
const GENDERS: &[&str] = &["Female", "Male"];
const AGES: &[&str] = &["18-24", "25-34", "35-44", "45-54", "55+"];
const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const DAYS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

fn pick<'a, R: Rng>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn pick_status<R: Rng>(rng: &mut R) -> &'static str {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (status, weight) in STATUSES {
        cumulative += weight;
        if roll < cumulative {
            return status;
        }
    }
    STATUSES[0].0
}

fn maybe<R: Rng, T>(rng: &mut R, missing_rate: f64, value: T) -> Option<T> {
    if rng.gen::<f64>() < missing_rate {
        None
    } else {
        Some(value)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().from_path(&args.output)?;

    for i in 0..args.rows {
        let (dish, category, base_price) = DISHES[rng.gen_range(0..DISHES.len())];
        let quantity = rng.gen_range(1..=4u32);
        let price = base_price * quantity as f64 * rng.gen_range(0.85..1.25);
        let rating = (rng.gen_range(2.0..=5.0f64) * 2.0).round() / 2.0;
        let month_idx = rng.gen_range(0..MONTHS.len());
        let day = rng.gen_range(1..=28u32);
        let churned = if rng.gen::<f64>() < 0.25 { "Inactive" } else { "Active" };
        let city = pick(&mut rng, CITIES).to_string();
        let gender = pick(&mut rng, GENDERS).to_string();

        let record = CsvOrder {
            order_id: format!("ORD-{:06}", i + 1),
            city: maybe(&mut rng, args.missing_rate, city),
            restaurant_name: Some(pick(&mut rng, RESTAURANTS).to_string()),
            dish_name: Some(dish.to_string()),
            category: Some(category.to_string()),
            price: maybe(&mut rng, args.missing_rate, (price * 100.0).round() / 100.0),
            quantity: Some(quantity),
            rating: maybe(&mut rng, args.missing_rate, rating),
            order_frequency: Some(rng.gen_range(1..=30u32)),
            payment_method: Some(pick(&mut rng, PAYMENT_METHODS).to_string()),
            delivery_status: Some(pick_status(&mut rng).to_string()),
            gender: maybe(&mut rng, args.missing_rate, gender),
            age: Some(pick(&mut rng, AGES).to_string()),
            churned: Some(churned.to_string()),
            order_month: Some(MONTHS[month_idx].to_string()),
            order_day_of_week: Some(pick(&mut rng, DAYS).to_string()),
            rating_date: Some(format!("2024-{:02}-{:02}", month_idx + 1, day)),
        };
        writer.serialize(&record)?;
    }
    writer.flush()?;

    info!("Wrote {} synthetic orders to {:?}", args.rows, args.output);
    Ok(())
}
