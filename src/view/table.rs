//! Product Table View Model
//! Filter, search, sort, paginate, select and reorder an owned product snapshot.

use crate::data::{Collection, Product};
use crate::stats::{StockStatus, Thresholds};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Page sizes offered by the page-size picker.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortColumn {
    Id,
    Name,
    Category,
    Color,
    Price,
    Stock,
    ReleaseDate,
}

impl SortColumn {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortColumn::Id => a.product_id.cmp(&b.product_id),
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Category => a.category.cmp(&b.category),
            SortColumn::Color => a.color.cmp(&b.color),
            SortColumn::Price => a.unit_price().total_cmp(&b.unit_price()),
            SortColumn::Stock => a.stock.cmp(&b.stock),
            SortColumn::ReleaseDate => a.released().cmp(&b.released()),
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" | "product_id" => Ok(SortColumn::Id),
            "name" => Ok(SortColumn::Name),
            "category" => Ok(SortColumn::Category),
            "color" => Ok(SortColumn::Color),
            "price" => Ok(SortColumn::Price),
            "stock" => Ok(SortColumn::Stock),
            "release_date" | "released" | "date" => Ok(SortColumn::ReleaseDate),
            other => Err(format!("unknown sort column: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

/// One rendered table row.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    pub status: StockStatus,
    pub formatted_price: String,
    pub color_hex: &'static str,
    pub upcoming: bool,
}

/// Table state over a snapshot the table owns. Reordering only touches the
/// snapshot and is never written back.
#[derive(Debug, Clone)]
pub struct ProductTable {
    products: Vec<Product>,
    collection: Option<Collection>,
    category: Option<String>,
    search: String,
    sort: Option<SortState>,
    page_size: usize,
    page_index: usize,
    selected: BTreeSet<i64>,
    thresholds: Thresholds,
}

impl ProductTable {
    pub fn new(products: Vec<Product>, page_size: usize, thresholds: Thresholds) -> Self {
        Self {
            products,
            collection: None,
            category: None,
            search: String::new(),
            sort: None,
            page_size: page_size.max(1),
            page_index: 0,
            selected: BTreeSet::new(),
            thresholds,
        }
    }

    /// Snapshot in its current (possibly reordered) order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn set_collection(&mut self, collection: Option<Collection>) {
        tracing::debug!(?collection, "collection filter changed");
        self.collection = collection;
        self.page_index = 0;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        tracing::debug!(?category, "category filter changed");
        self.category = category;
        self.page_index = 0;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        tracing::debug!(query = %self.search, "global search changed");
        self.page_index = 0;
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn matches(&self, product: &Product, query: &str) -> bool {
        if let Some(collection) = self.collection {
            if !collection.matches_prefix(&product.name) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        query.is_empty()
            || product.name.to_lowercase().contains(query)
            || product.category.to_lowercase().contains(query)
            || product.color.to_lowercase().contains(query)
            || product.product_id.to_string().contains(query)
    }

    /// Filtered and sorted rows, before pagination.
    pub fn filtered(&self) -> Vec<&Product> {
        let query = self.search.trim().to_lowercase();
        let mut rows: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| self.matches(p, &query))
            .collect();

        if let Some(sort) = self.sort {
            rows.sort_by(|a, b| {
                let ord = sort.column.compare(a, b);
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        tracing::debug!(
            total = self.products.len(),
            remaining = rows.len(),
            "filtered product table"
        );
        rows
    }

    pub fn row_count(&self) -> usize {
        self.filtered().len()
    }

    /// At least one page, even when nothing matches.
    pub fn page_count(&self) -> usize {
        self.row_count().div_ceil(self.page_size).max(1)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn go_to_page(&mut self, index: usize) {
        self.page_index = index.min(self.page_count() - 1);
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    pub fn previous_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page_index + 1);
    }

    pub fn last_page(&mut self) {
        self.page_index = self.page_count() - 1;
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    fn page(&self) -> Vec<&Product> {
        self.filtered()
            .into_iter()
            .skip(self.page_index * self.page_size)
            .take(self.page_size)
            .collect()
    }

    /// The current page, decorated for display.
    pub fn visible_rows(&self, today: NaiveDate) -> Vec<TableRow<'_>> {
        self.page()
            .into_iter()
            .map(|product| TableRow {
                product,
                status: StockStatus::classify(u64::from(product.stock), &self.thresholds),
                formatted_price: product.formatted_price(),
                color_hex: product.color_hex(),
                upcoming: product.is_upcoming(today),
            })
            .collect()
    }

    pub fn select(&mut self, product_id: i64) {
        if self.products.iter().any(|p| p.product_id == product_id) {
            self.selected.insert(product_id);
        }
    }

    pub fn deselect(&mut self, product_id: i64) {
        self.selected.remove(&product_id);
    }

    pub fn toggle(&mut self, product_id: i64) {
        if !self.selected.remove(&product_id) {
            self.select(product_id);
        }
    }

    /// Select every row on the current page.
    pub fn select_page(&mut self) {
        let ids: Vec<i64> = self.page().iter().map(|p| p.product_id).collect();
        self.selected.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, product_id: i64) -> bool {
        self.selected.contains(&product_id)
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    /// Drag-and-drop: move `active_id` to where `over_id` sits in the snapshot.
    /// Returns false when nothing moved.
    pub fn move_row(&mut self, active_id: i64, over_id: i64) -> bool {
        if active_id == over_id {
            return false;
        }
        let position = |id: i64| self.products.iter().position(|p| p.product_id == id);
        let (Some(from), Some(to)) = (position(active_id), position(over_id)) else {
            return false;
        };

        let product = self.products.remove(from);
        self.products.insert(to, product);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawProduct;

    fn product(id: i64, name: &str, category: &str, price: &str, stock: u32, date: &str) -> Product {
        let id = id.to_string();
        let stock = stock.to_string();
        Product::parse(
            &RawProduct {
                product_id: &id,
                name,
                category,
                color: "Emerald",
                size_available: "['M']",
                price,
                currency: None,
                stock: &stock,
                release_date: date,
            },
            "AUD",
        )
        .unwrap()
    }

    fn table(page_size: usize) -> ProductTable {
        let products = vec![
            product(1, "Oversized Hoodie", "Hoodies", "$60", 120, "01/10/2024"),
            product(2, "Fitted Jacket", "Jackets", "$150", 30, "02/10/2024"),
            product(3, "classic Crew", "Sweatshirts", "$45", 75, "03/10/2024"),
            product(4, "Oversized Tee", "T-Shirts", "$25", 10, "04/10/2024"),
            product(5, "Fitted Hoodie", "Hoodies", "$70", 55, "05/10/2024"),
        ];
        ProductTable::new(products, page_size, Thresholds::default())
    }

    fn ids(rows: &[&Product]) -> Vec<i64> {
        rows.iter().map(|p| p.product_id).collect()
    }

    #[test]
    fn test_collection_and_category_filters_combine() {
        let mut t = table(10);
        t.set_collection(Some(Collection::Oversized));
        assert_eq!(ids(&t.filtered()), vec![1, 4]);
        t.set_category(Some("Hoodies".into()));
        assert_eq!(ids(&t.filtered()), vec![1]);
        t.set_collection(None);
        assert_eq!(ids(&t.filtered()), vec![1, 5]);
    }

    #[test]
    fn test_collection_prefix_ignores_case() {
        let mut t = table(10);
        t.set_collection(Some(Collection::Classic));
        assert_eq!(ids(&t.filtered()), vec![3]);
    }

    #[test]
    fn test_global_search() {
        let mut t = table(10);
        t.set_search("HOODIE");
        assert_eq!(ids(&t.filtered()), vec![1, 5]);
        t.set_search("jackets");
        assert_eq!(ids(&t.filtered()), vec![2]);
        t.set_search("  ");
        assert_eq!(t.row_count(), 5);
    }

    #[test]
    fn test_sorting_is_stable() {
        let mut t = table(10);
        t.set_sort(Some(SortState {
            column: SortColumn::Category,
            direction: SortDirection::Ascending,
        }));
        assert_eq!(ids(&t.filtered()), vec![1, 5, 2, 3, 4]);
        t.set_sort(Some(SortState {
            column: SortColumn::Price,
            direction: SortDirection::Descending,
        }));
        assert_eq!(ids(&t.filtered()), vec![2, 5, 1, 3, 4]);
        t.set_sort(None);
        assert_eq!(ids(&t.filtered()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_pagination_bounds() {
        let mut t = table(2);
        assert_eq!(t.page_count(), 3);
        t.next_page();
        t.next_page();
        t.next_page();
        assert_eq!(t.page_index(), 2);
        assert!(!t.can_next_page());
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(t.visible_rows(today).len(), 1);
        t.previous_page();
        assert_eq!(t.page_index(), 1);
        t.first_page();
        t.previous_page();
        assert_eq!(t.page_index(), 0);
        t.last_page();
        assert_eq!(t.page_index(), 2);
        t.set_search("fitted");
        assert_eq!(t.page_index(), 0);
        assert_eq!(t.page_count(), 1);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let t = ProductTable::new(Vec::new(), 0, Thresholds::default());
        assert_eq!(t.page_size(), 1);
        assert_eq!(t.page_count(), 1);
        assert!(t.visible_rows(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_empty());
    }

    #[test]
    fn test_visible_rows_are_decorated() {
        let t = table(10);
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rows = t.visible_rows(today);
        assert_eq!(rows[0].status, StockStatus::Healthy);
        assert_eq!(rows[1].status, StockStatus::Low);
        assert_eq!(rows[4].status, StockStatus::Moderate);
        assert_eq!(rows[0].formatted_price, "A$60.00");
        assert_eq!(rows[0].color_hex, "#50C878");
        assert!(!rows[0].upcoming);
        assert!(rows[2].upcoming);
    }

    #[test]
    fn test_selection_survives_filtering() {
        let mut t = table(2);
        t.select_page();
        assert_eq!(t.selected_ids(), vec![1, 2]);
        t.set_category(Some("Sweatshirts".into()));
        assert!(t.is_selected(2));
        t.toggle(2);
        t.toggle(3);
        assert_eq!(t.selected_ids(), vec![1, 3]);
        t.select(99);
        assert!(!t.is_selected(99));
        t.clear_selection();
        assert!(t.selected_ids().is_empty());
    }

    #[test]
    fn test_move_row_array_semantics() {
        let mut t = table(10);
        assert!(t.move_row(1, 4));
        assert_eq!(ids(&t.filtered()), vec![2, 3, 4, 1, 5]);
        assert!(t.move_row(5, 2));
        assert_eq!(ids(&t.filtered()), vec![5, 2, 3, 4, 1]);
        assert!(!t.move_row(3, 3));
        assert!(!t.move_row(3, 42));
        assert_eq!(t.products().len(), 5);
    }
}
