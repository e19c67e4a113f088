//! CSV loading for the orders dataset.
//!
//! The whole file is read into memory once; malformed rows are skipped
//! with a warning and counted rather than aborting the load.

use crate::dataset::Dataset;
use crate::error::AnalyticsError;
use crate::models::CsvOrder;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Reads the orders CSV at `path` fully into memory.
pub fn load_orders<P: AsRef<Path>>(path: P) -> Result<Dataset, AnalyticsError> {
    let path = path.as_ref();
    info!("Reading orders CSV from {:?}", path);
    let reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    read_orders(reader)
}

/// Reads orders from any CSV reader; used by tests with in-line data.
pub fn load_orders_from<R: Read>(reader: R) -> Result<Dataset, AnalyticsError> {
    let reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    read_orders(reader)
}

fn read_orders<R: Read>(mut reader: csv::Reader<R>) -> Result<Dataset, AnalyticsError> {
    let mut orders = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.deserialize::<CsvOrder>().enumerate() {
        match result {
            Ok(raw) => orders.push(raw.to_order()),
            Err(e) => {
                if skipped < 5 {
                    warn!("Skipping malformed row {}: {}", i + 1, e);
                }
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed rows", skipped);
    }
    let dataset = Dataset::new(orders);
    info!(
        "Loaded {} orders ({} missing cells)",
        dataset.len(),
        dataset.missing_cells()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Churn, DeliveryStatus};

    const HEADER: &str = "order_id,city,restaurant_name,dish_name,category,price,quantity,rating,order_frequency,payment_method,delivery_status,gender,age,churned,order_month,order_day_of_week,rating_date";

    #[test]
    fn loads_typed_rows() {
        let csv = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "ORD-1,Lahore,Spice Hub,Chicken Biryani,Desi,12.50,2,4.5,12,Card,Delivered,Female,18-24,Active,January,Monday,2024-01-08",
            "ORD-2,Karachi,Crust Bros,Margherita,Pizza,9.00,1,,8,Cash,Cancelled,Male,25-34,Inactive,January,Saturday,2024-01-13",
        );
        let ds = load_orders_from(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.orders()[0];
        assert_eq!(first.city.as_deref(), Some("Lahore"));
        assert_eq!(first.price, Some(12.5));
        assert_eq!(first.delivery_status, Some(DeliveryStatus::Delivered));
        assert_eq!(first.churned, Some(Churn::Active));
        let second = &ds.orders()[1];
        assert!(second.rating.is_none());
        assert_eq!(second.delivery_status, Some(DeliveryStatus::Cancelled));
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let csv = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "ORD-1,Lahore,Spice Hub,Chicken Biryani,Desi,not-a-price,2,4.5,12,Card,Delivered,Female,18-24,Active,January,Monday,2024-01-08",
            "ORD-2,Karachi,Crust Bros,Margherita,Pizza,9.00,1,4.0,8,Cash,Delivered,Male,25-34,Active,January,Saturday,2024-01-13",
        );
        let ds = load_orders_from(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.orders()[0].order_id, "ORD-2");
    }

    #[test]
    fn empty_file_yields_empty_dataset() {
        let ds = load_orders_from(format!("{}\n", HEADER).as_bytes()).unwrap();
        assert!(ds.is_empty());
    }
}
