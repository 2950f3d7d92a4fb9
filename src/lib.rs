//! Apparel Dash - inventory, sales and category analytics for a product catalogue
//!
//! Loads the product CSV, validates each row, and derives the dashboard view
//! models: summary cards, category and colour rankings, the monthly collection
//! series and a filterable product table.

pub mod charts;
pub mod config;
pub mod data;
pub mod stats;
pub mod view;

pub use config::DashboardConfig;
pub use data::{DatasetLoader, DatasetStatus, LoadReport, Product};
pub use view::{Dashboard, ProductTable};
