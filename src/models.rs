use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Raw record from CSV ingestion.
///
/// Every field except the order id is optional so that rows with
/// missing cells survive deserialization; the loader tracks the gaps
/// instead of imputing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvOrder {
    pub order_id: String,
    pub city: Option<String>,
    pub restaurant_name: Option<String>,
    pub dish_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub rating: Option<f64>,
    pub order_frequency: Option<u32>,
    pub payment_method: Option<String>,
    pub delivery_status: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub churned: Option<String>,
    pub order_month: Option<String>,
    pub order_day_of_week: Option<String>,
    pub rating_date: Option<String>,
}

/// Delivery outcome of an order.
///
/// Unknown labels are carried through as [`DeliveryStatus::Other`] so a
/// new status value in the source file shows up in breakdowns instead
/// of being collapsed into a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DeliveryStatus {
    Delivered,
    Cancelled,
    InProcess,
    Other(String),
}

impl From<&str> for DeliveryStatus {
    fn from(s: &str) -> Self {
        match s {
            "Delivered" => DeliveryStatus::Delivered,
            "Cancelled" => DeliveryStatus::Cancelled,
            "In Process" | "InProcess" | "Pending" => DeliveryStatus::InProcess,
            other => DeliveryStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Delivered => write!(f, "Delivered"),
            DeliveryStatus::Cancelled => write!(f, "Cancelled"),
            DeliveryStatus::InProcess => write!(f, "In Process"),
            DeliveryStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Customer churn flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Churn {
    Active,
    Inactive,
}

impl Churn {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(Churn::Active),
            "Inactive" => Some(Churn::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Churn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Churn::Active => write!(f, "Active"),
            Churn::Inactive => write!(f, "Inactive"),
        }
    }
}

/// One order row, typed and immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Order {
    pub order_id: String,
    pub city: Option<String>,
    pub restaurant_name: Option<String>,
    pub dish_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub rating: Option<f64>,
    pub order_frequency: Option<u32>,
    pub payment_method: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub churned: Option<Churn>,
    pub order_month: Option<String>,
    pub order_day_of_week: Option<Weekday>,
    pub rating_date: Option<NaiveDate>,
}

/// Full English name for a weekday, matching the labels in the source data.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl CsvOrder {
    pub fn to_order(&self) -> Order {
        Order {
            order_id: self.order_id.clone(),
            city: self.city.clone(),
            restaurant_name: self.restaurant_name.clone(),
            dish_name: self.dish_name.clone(),
            category: self.category.clone(),
            price: self.price,
            quantity: self.quantity,
            rating: self.rating,
            order_frequency: self.order_frequency,
            payment_method: self.payment_method.clone(),
            delivery_status: self
                .delivery_status
                .as_deref()
                .map(DeliveryStatus::from),
            gender: self.gender.clone(),
            age: self.age.clone(),
            churned: self.churned.as_deref().and_then(Churn::parse),
            order_month: self.order_month.clone(),
            order_day_of_week: self
                .order_day_of_week
                .as_deref()
                .and_then(|d| d.parse::<Weekday>().ok()),
            rating_date: self
                .rating_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        }
    }
}
