//! In-memory dataset of order records.
//!
//! The [`Dataset`] is the shared substrate every computation reads: an
//! ordered sequence of [`Order`]s loaded once and never mutated. Field
//! access is by name so aggregation requests can be assembled at
//! runtime; an unknown name is a [`AnalyticsError::MissingField`].

use crate::error::AnalyticsError;
use crate::models::{weekday_name, Order};
use std::io::Write;

/// All field names in the order schema, in column order.
pub const FIELDS: &[&str] = &[
    "order_id",
    "city",
    "restaurant_name",
    "dish_name",
    "category",
    "price",
    "quantity",
    "rating",
    "order_frequency",
    "payment_method",
    "delivery_status",
    "gender",
    "age",
    "churned",
    "order_month",
    "order_day_of_week",
    "rating_date",
];

/// Label used when a missing value forms its own category.
pub const MISSING_LABEL: &str = "(missing)";

/// A single cell value pulled out of an order by field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Missing,
}

impl FieldValue {
    /// Numeric view; text and missing cells have none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Categorical key for grouping and cross-tabulation. Missing
    /// values get their own label rather than being dropped silently.
    pub fn key(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Missing => MISSING_LABEL.to_string(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

fn text(opt: &Option<String>) -> FieldValue {
    match opt {
        Some(s) => FieldValue::Text(s.clone()),
        None => FieldValue::Missing,
    }
}

impl Order {
    /// Looks up a field by name, returning its value for this row.
    pub fn field(&self, name: &str) -> Result<FieldValue, AnalyticsError> {
        let value = match name {
            "order_id" => FieldValue::Text(self.order_id.clone()),
            "city" => text(&self.city),
            "restaurant_name" => text(&self.restaurant_name),
            "dish_name" => text(&self.dish_name),
            "category" => text(&self.category),
            "price" => self.price.map_or(FieldValue::Missing, FieldValue::Number),
            "quantity" => self
                .quantity
                .map_or(FieldValue::Missing, |q| FieldValue::Number(q as f64)),
            "rating" => self.rating.map_or(FieldValue::Missing, FieldValue::Number),
            "order_frequency" => self
                .order_frequency
                .map_or(FieldValue::Missing, |q| FieldValue::Number(q as f64)),
            "payment_method" => text(&self.payment_method),
            "delivery_status" => self
                .delivery_status
                .as_ref()
                .map_or(FieldValue::Missing, |s| FieldValue::Text(s.to_string())),
            "gender" => text(&self.gender),
            "age" => text(&self.age),
            "churned" => self
                .churned
                .map_or(FieldValue::Missing, |c| FieldValue::Text(c.to_string())),
            "order_month" => text(&self.order_month),
            "order_day_of_week" => self
                .order_day_of_week
                .map_or(FieldValue::Missing, |d| {
                    FieldValue::Text(weekday_name(d).to_string())
                }),
            "rating_date" => self
                .rating_date
                .map_or(FieldValue::Missing, |d| FieldValue::Text(d.to_string())),
            _ => {
                return Err(AnalyticsError::MissingField {
                    name: name.to_string(),
                })
            }
        };
        Ok(value)
    }
}

/// An ordered, read-only collection of orders.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    orders: Vec<Order>,
}

impl Dataset {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    /// Validates that `name` is part of the schema.
    pub fn check_field(&self, name: &str) -> Result<(), AnalyticsError> {
        if FIELDS.contains(&name) {
            Ok(())
        } else {
            Err(AnalyticsError::MissingField {
                name: name.to_string(),
            })
        }
    }

    /// Total count of missing cells across all fields and rows.
    pub fn missing_cells(&self) -> usize {
        self.orders
            .iter()
            .map(|o| {
                FIELDS
                    .iter()
                    .filter(|f| o.field(f).map(|v| v.is_missing()).unwrap_or(false))
                    .count()
            })
            .sum()
    }

    /// Writes the dataset as CSV, one row per order, missing cells empty.
    ///
    /// Used for the raw-data export of a filtered subset.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AnalyticsError> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(FIELDS)?;
        for order in &self.orders {
            let mut row = Vec::with_capacity(FIELDS.len());
            for field in FIELDS {
                let value = order.field(field)?;
                row.push(match value {
                    FieldValue::Missing => String::new(),
                    other => other.key(),
                });
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Churn, DeliveryStatus};

    fn order(city: &str, price: f64) -> Order {
        Order {
            order_id: "ORD-1".to_string(),
            city: Some(city.to_string()),
            price: Some(price),
            ..Default::default()
        }
    }

    #[test]
    fn field_access_by_name() {
        let o = Order {
            delivery_status: Some(DeliveryStatus::Cancelled),
            churned: Some(Churn::Active),
            rating: Some(4.5),
            ..order("Karachi", 10.0)
        };
        assert_eq!(o.field("city").unwrap().key(), "Karachi");
        assert_eq!(o.field("price").unwrap().as_number(), Some(10.0));
        assert_eq!(o.field("delivery_status").unwrap().key(), "Cancelled");
        assert_eq!(o.field("churned").unwrap().key(), "Active");
        assert!(o.field("dish_name").unwrap().is_missing());
    }

    #[test]
    fn unknown_field_is_an_error() {
        let o = order("Lahore", 5.0);
        let err = o.field("tip_amount").unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingField { name } if name == "tip_amount"));
    }

    #[test]
    fn missing_cells_counts_every_gap() {
        let ds = Dataset::new(vec![order("Lahore", 5.0)]);
        // 17 fields, 3 populated (order_id, city, price).
        assert_eq!(ds.missing_cells(), 14);
    }

    #[test]
    fn csv_export_round_trips_labels() {
        let ds = Dataset::new(vec![Order {
            delivery_status: Some(DeliveryStatus::Delivered),
            ..order("Multan", 7.25)
        }]);
        let mut buf = Vec::new();
        ds.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("order_id,city,"));
        assert!(text.contains("Multan"));
        assert!(text.contains("Delivered"));
    }
}
