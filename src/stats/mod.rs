//! Stats module - aggregations over the product snapshot

mod aggregate;
mod monthly;
mod sales;

pub use aggregate::{
    available_categories, average_price_by_color, category_metrics, rank_category_metrics,
    sales_by_category, top_products_by_stock, total_revenue, CategoryMetrics, CategoryStock,
    ColorPrice, Metric, RevenueTier, StockStatus, Thresholds, TopProduct,
};
pub use monthly::{
    daily_release_split, monthly_series, CollectionTotals, DailySplit, MonthlyBucket, TimeRange,
    MAIN_CATEGORIES,
};
pub use sales::{synthesize_sales, MonthlySales, HISTORY_MONTHS};
