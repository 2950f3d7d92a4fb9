//! Aggregation Module
//! Revenue totals, rankings and group summaries over a product snapshot.
//!
//! Every function here is a pure pass over `&[Product]`: nothing is cached and
//! calling one twice on the same slice returns the same result.

use crate::data::{format_thousands, Product};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Top-N entry projected from a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub name: String,
    pub category: String,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStock {
    pub category: String,
    pub stock: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorPrice {
    pub color: String,
    pub average_price: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub stock: u64,
    pub revenue: f64,
    pub count: usize,
}

/// Quantity a chart or ranking is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Stock,
    Revenue,
    Count,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Stock => "stock",
            Metric::Revenue => "revenue",
            Metric::Count => "count",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Stock => "Inventory Level",
            Metric::Revenue => "Revenue Potential",
            Metric::Count => "Product Count",
        }
    }

    /// Tooltip-style formatting: revenue in dollars, everything else as a count.
    pub fn format_value(self, value: f64) -> String {
        match self {
            Metric::Revenue => format!("${}", format_thousands(value, 0)),
            Metric::Stock | Metric::Count => format_thousands(value, 0),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(Metric::Stock),
            "revenue" => Ok(Metric::Revenue),
            "count" => Ok(Metric::Count),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// Badge thresholds for stock levels and revenue totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub stock_healthy: u64,
    pub stock_moderate: u64,
    pub revenue_strong: f64,
    pub revenue_moderate: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stock_healthy: 100,
            stock_moderate: 50,
            revenue_strong: 10_000.0,
            revenue_moderate: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    Healthy,
    Moderate,
    Low,
}

impl StockStatus {
    pub fn classify(stock: u64, thresholds: &Thresholds) -> Self {
        if stock >= thresholds.stock_healthy {
            StockStatus::Healthy
        } else if stock >= thresholds.stock_moderate {
            StockStatus::Moderate
        } else {
            StockStatus::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevenueTier {
    Strong,
    Moderate,
    Weak,
}

impl RevenueTier {
    pub fn classify(revenue: f64, thresholds: &Thresholds) -> Self {
        if revenue >= thresholds.revenue_strong {
            RevenueTier::Strong
        } else if revenue >= thresholds.revenue_moderate {
            RevenueTier::Moderate
        } else {
            RevenueTier::Weak
        }
    }
}

/// Group products by a string key, folding each member into `A`.
/// Groups come back in the order their key was first seen.
fn group_by<A, K, F>(products: &[Product], key: K, mut fold: F) -> Vec<(String, A)>
where
    A: Default,
    K: Fn(&Product) -> &str,
    F: FnMut(&mut A, &Product),
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, A)> = Vec::new();

    for product in products {
        let k = key(product);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k.to_string(), A::default()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, product);
    }

    groups
}

/// Sum of `price × stock` over every product.
pub fn total_revenue(products: &[Product]) -> f64 {
    products.iter().map(Product::revenue).sum()
}

/// The `limit` products with the most stock. Ties keep input order.
pub fn top_products_by_stock(products: &[Product], limit: usize) -> Vec<TopProduct> {
    let mut ranked: Vec<&Product> = products.iter().collect();
    ranked.sort_by(|a, b| b.stock.cmp(&a.stock));

    ranked
        .into_iter()
        .take(limit)
        .map(|p| TopProduct {
            name: p.name.clone(),
            category: p.category.clone(),
            stock: p.stock,
        })
        .collect()
}

/// Total stock per category, largest first.
pub fn sales_by_category(products: &[Product]) -> Vec<CategoryStock> {
    let mut result: Vec<CategoryStock> = group_by(
        products,
        |p| p.category.as_str(),
        |stock: &mut u64, p| *stock += u64::from(p.stock),
    )
    .into_iter()
    .map(|(category, stock)| CategoryStock { category, stock })
    .collect();

    result.sort_by(|a, b| b.stock.cmp(&a.stock));
    result
}

/// Unweighted mean price per colour, most common colour first.
pub fn average_price_by_color(products: &[Product]) -> Vec<ColorPrice> {
    let mut result: Vec<ColorPrice> = group_by(
        products,
        |p| p.color.as_str(),
        |prices: &mut Vec<f64>, p| prices.push(p.unit_price()),
    )
    .into_iter()
    .map(|(color, prices)| ColorPrice {
        color,
        count: prices.len(),
        average_price: prices.iter().mean(),
    })
    .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

#[derive(Default)]
struct MetricsAccumulator {
    stock: u64,
    revenue: f64,
    count: usize,
}

/// Stock, revenue and product count per category, in first-seen order.
pub fn category_metrics(products: &[Product]) -> Vec<CategoryMetrics> {
    group_by(
        products,
        |p| p.category.as_str(),
        |acc: &mut MetricsAccumulator, p| {
            acc.stock += u64::from(p.stock);
            acc.revenue += p.revenue();
            acc.count += 1;
        },
    )
    .into_iter()
    .map(|(category, acc)| CategoryMetrics {
        category,
        stock: acc.stock,
        revenue: acc.revenue,
        count: acc.count,
    })
    .collect()
}

impl CategoryMetrics {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Stock => self.stock as f64,
            Metric::Revenue => self.revenue,
            Metric::Count => self.count as f64,
        }
    }
}

/// Sort category metrics by `metric`, largest first. Ties keep their order.
pub fn rank_category_metrics(mut metrics: Vec<CategoryMetrics>, metric: Metric) -> Vec<CategoryMetrics> {
    metrics.sort_by(|a, b| b.value(metric).total_cmp(&a.value(metric)));
    metrics
}

/// Distinct categories, alphabetically.
pub fn available_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}
