//! Monthly Series Module
//! Buckets products by release month and collection for the trend chart.

use crate::data::{Collection, Product};
use crate::stats::Metric;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Categories plotted as the primary series of the daily release chart.
pub const MAIN_CATEGORIES: [&str; 3] = ["Sweatshirts", "Hoodies", "Jackets"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CollectionTotals {
    pub stock: u64,
    pub revenue: f64,
    pub count: usize,
}

impl CollectionTotals {
    fn add(&mut self, product: &Product) {
        self.stock += u64::from(product.stock);
        self.revenue += product.revenue();
        self.count += 1;
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Stock => self.stock as f64,
            Metric::Revenue => self.revenue,
            Metric::Count => self.count as f64,
        }
    }
}

/// Per-collection totals for one release month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    /// `Jan 2024`
    pub display: String,
    #[serde(skip)]
    pub start: NaiveDate,
    pub oversized: CollectionTotals,
    pub fitted: CollectionTotals,
    pub classic: CollectionTotals,
}

impl MonthlyBucket {
    fn new(start: NaiveDate) -> Self {
        Self {
            month: start.format("%Y-%m").to_string(),
            display: start.format("%b %Y").to_string(),
            start,
            oversized: CollectionTotals::default(),
            fitted: CollectionTotals::default(),
            classic: CollectionTotals::default(),
        }
    }

    pub fn totals(&self, collection: Collection) -> &CollectionTotals {
        match collection {
            Collection::Oversized => &self.oversized,
            Collection::Fitted => &self.fitted,
            Collection::Classic => &self.classic,
        }
    }

    fn totals_mut(&mut self, collection: Collection) -> &mut CollectionTotals {
        match collection {
            Collection::Oversized => &mut self.oversized,
            Collection::Fitted => &mut self.fitted,
            Collection::Classic => &mut self.classic,
        }
    }

    /// Chart values in `Collection::ALL` order.
    pub fn values(&self, metric: Metric) -> [f64; 3] {
        Collection::ALL.map(|c| self.totals(c).value(metric))
    }
}

/// Group products into `YYYY-MM` buckets, oldest first.
///
/// A product whose name matches no collection still opens its month's bucket
/// but adds nothing to it.
pub fn monthly_series(products: &[Product]) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<NaiveDate, MonthlyBucket> = BTreeMap::new();

    for product in products {
        let released = product.released();
        let start = released.with_day(1).unwrap_or(released);
        let bucket = buckets
            .entry(start)
            .or_insert_with(|| MonthlyBucket::new(start));

        if let Some(collection) = product.collection() {
            bucket.totals_mut(collection).add(product);
        }
    }

    buckets.into_values().collect()
}

/// How far back from the newest bucket the chart looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1m")]
    OneMonth,
}

impl TimeRange {
    pub fn months(self) -> Option<u32> {
        match self {
            TimeRange::All => None,
            TimeRange::SixMonths => Some(6),
            TimeRange::ThreeMonths => Some(3),
            TimeRange::OneMonth => Some(1),
        }
    }

    /// Keep buckets starting on or after the newest bucket minus the range.
    pub fn apply<'a>(self, buckets: &'a [MonthlyBucket]) -> &'a [MonthlyBucket] {
        let (Some(months), Some(last)) = (self.months(), buckets.last()) else {
            return buckets;
        };
        let Some(cutoff) = last.start.checked_sub_months(Months::new(months)) else {
            return buckets;
        };

        let first = buckets
            .iter()
            .position(|b| b.start >= cutoff)
            .unwrap_or(buckets.len());
        &buckets[first..]
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::All => "all",
            TimeRange::SixMonths => "6m",
            TimeRange::ThreeMonths => "3m",
            TimeRange::OneMonth => "1m",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeRange::All),
            "6m" => Ok(TimeRange::SixMonths),
            "3m" => Ok(TimeRange::ThreeMonths),
            "1m" => Ok(TimeRange::OneMonth),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

/// Stock released on one day, split into main and other categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySplit {
    pub date: NaiveDate,
    pub main: u64,
    pub other: u64,
}

pub fn daily_release_split(products: &[Product]) -> Vec<DailySplit> {
    let mut days: BTreeMap<NaiveDate, DailySplit> = BTreeMap::new();

    for product in products {
        let date = product.released();
        let entry = days.entry(date).or_insert(DailySplit {
            date,
            main: 0,
            other: 0,
        });
        if MAIN_CATEGORIES.contains(&product.category.as_str()) {
            entry.main += u64::from(product.stock);
        } else {
            entry.other += u64::from(product.stock);
        }
    }

    days.into_values().collect()
}
