//! Dashboard View Model
//! Summary cards, rankings and chart series derived from one product snapshot.

use crate::config::DashboardConfig;
use crate::data::Product;
use crate::stats::{
    average_price_by_color, category_metrics, monthly_series, sales_by_category,
    top_products_by_stock, total_revenue, CategoryMetrics, CategoryStock, ColorPrice,
    MonthlyBucket, RevenueTier, StockStatus, TopProduct,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueCard {
    pub total: f64,
    pub tier: RevenueTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProductCard {
    pub product: TopProduct,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCategoryCard {
    pub category: CategoryStock,
    pub status: StockStatus,
}

/// Everything the dashboard shows, computed once from an owned snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub product_count: usize,
    pub revenue: RevenueCard,
    pub top_product: Option<TopProductCard>,
    pub top_category: Option<TopCategoryCard>,
    pub top_color: Option<ColorPrice>,
    pub top_products: Vec<TopProduct>,
    pub sales_by_category: Vec<CategoryStock>,
    pub price_by_color: Vec<ColorPrice>,
    pub category_metrics: Vec<CategoryMetrics>,
    pub monthly: Vec<MonthlyBucket>,
}

impl Dashboard {
    pub fn build(products: &[Product], config: &DashboardConfig) -> Self {
        let thresholds = &config.thresholds;
        let top_n = config.dashboard.top_n;

        // Independent passes over the same snapshot.
        let ((revenue, top_products), ((by_category, by_color), (metrics, monthly))) =
            rayon::join(
                || (total_revenue(products), top_products_by_stock(products, top_n)),
                || {
                    rayon::join(
                        || (sales_by_category(products), average_price_by_color(products)),
                        || (category_metrics(products), monthly_series(products)),
                    )
                },
            );

        let top_product = top_products.first().cloned().map(|product| TopProductCard {
            status: StockStatus::classify(u64::from(product.stock), thresholds),
            product,
        });
        let top_category = by_category.first().cloned().map(|category| TopCategoryCard {
            status: StockStatus::classify(category.stock, thresholds),
            category,
        });

        tracing::debug!(
            products = products.len(),
            categories = by_category.len(),
            months = monthly.len(),
            "built dashboard"
        );

        Self {
            product_count: products.len(),
            revenue: RevenueCard {
                total: revenue,
                tier: RevenueTier::classify(revenue, thresholds),
            },
            top_product,
            top_category,
            top_color: by_color.first().cloned(),
            top_products,
            sales_by_category: by_category,
            price_by_color: by_color,
            category_metrics: metrics,
            monthly,
        }
    }
}
