//! Descriptive analytics over a food-delivery orders dataset.
//!
//! The crate loads one flat CSV of orders into an immutable in-memory
//! [`dataset::Dataset`] and computes group-wise aggregates, two-way
//! contingency tables, and quartile-based price tiers over it. The
//! report binaries consume the plain data structures this library
//! returns; all formatting lives in [`report`].

pub mod aggregate;
pub mod crosstab;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod profile;
pub mod report;
pub mod tiers;

// Re-exports for library users
pub use aggregate::{aggregate, value_counts, AggValue, Grouped, MetricSpec, Reducer};
pub use crosstab::{cross_tab, ContingencyTable, CrossTabOptions, MarginStyle, Normalize};
pub use dataset::{Dataset, FieldValue, FIELDS, MISSING_LABEL};
pub use error::AnalyticsError;
pub use filter::Filter;
pub use loader::load_orders;
pub use models::{Churn, CsvOrder, DeliveryStatus, Order};
pub use tiers::{classify, quartiles, PriceTier, Quartiles};
