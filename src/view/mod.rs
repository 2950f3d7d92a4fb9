//! View module - immutable view models over a product snapshot

mod dashboard;
mod table;

pub use dashboard::{Dashboard, RevenueCard, TopCategoryCard, TopProductCard};
pub use table::{
    ProductTable, SortColumn, SortDirection, SortState, TableRow, PAGE_SIZE_OPTIONS,
};
