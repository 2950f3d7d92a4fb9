//! Dataset Loader Module
//! Reads the product CSV with Polars and validates every row on its own.

use crate::data::product::{FieldError, Product, RawProduct, DEFAULT_CURRENCY};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns every dataset must carry. `Currency` is optional.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "product_id",
    "name",
    "category",
    "color",
    "size_available",
    "price",
    "stock",
    "release_date",
];

pub const CURRENCY_COLUMN: &str = "Currency";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to read CSV records: {0}")]
    Records(#[from] csv::Error),
    #[error("Dataset not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
}

/// A row that was skipped during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRejection {
    /// Data row number, 1-indexed, header excluded.
    pub row: usize,
    pub product_id: Option<String>,
    pub reason: String,
}

/// How much of the dataset made it through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatasetStatus {
    /// Every row validated.
    Complete,
    /// Some rows were rejected, the rest are usable.
    Partial,
    /// The file had a header and no rows.
    Empty,
    /// Nothing usable: the read failed or every row was rejected.
    Failed,
}

/// Accepted products plus the rows that were dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub products: Vec<Product>,
    pub rejected: Vec<RowRejection>,
    #[serde(skip)]
    failed: bool,
}

impl LoadReport {
    /// Degraded result returned when the dataset could not be read at all.
    pub fn failed() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }

    pub fn status(&self) -> DatasetStatus {
        if self.failed {
            return DatasetStatus::Failed;
        }
        match (self.products.is_empty(), self.rejected.is_empty()) {
            (true, true) => DatasetStatus::Empty,
            (true, false) => DatasetStatus::Failed,
            (false, true) => DatasetStatus::Complete,
            (false, false) => DatasetStatus::Partial,
        }
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

/// Loads the product catalogue from CSV.
pub struct DatasetLoader {
    default_currency: String,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Load a CSV file. Every column is read as text; typing happens per row.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadReport, LoaderError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let report = self.load_bytes(&bytes)?;
        tracing::info!(
            path = %path.display(),
            accepted = report.products.len(),
            rejected = report.rejected.len(),
            "loaded product dataset"
        );
        Ok(report)
    }

    /// Load CSV text already held in memory.
    pub fn load_from_str(&self, text: &str) -> Result<LoadReport, LoaderError> {
        self.load_bytes(text.as_bytes())
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<LoadReport, LoaderError> {
        let screened = screen_records(bytes)?;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(screened.csv))
            .finish()?;

        let report = LoadReport {
            rejected: screened.rejected,
            ..LoadReport::default()
        };
        self.validate_frame(&df, &screened.rows, report)
    }

    /// Load a CSV file, degrading to an empty `Failed` report on any error.
    pub fn load_or_empty(&self, path: impl AsRef<Path>) -> LoadReport {
        let path = path.as_ref();
        match self.load(path) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "error loading product dataset");
                LoadReport::failed()
            }
        }
    }

    /// Convert an all-text DataFrame into validated products.
    pub fn products_from_frame(&self, df: &DataFrame) -> Result<LoadReport, LoaderError> {
        let rows: Vec<usize> = (1..=df.height()).collect();
        self.validate_frame(df, &rows, LoadReport::default())
    }

    /// `rows[i]` is the source row number of frame row `i`.
    fn validate_frame(
        &self,
        df: &DataFrame,
        rows: &[usize],
        mut report: LoadReport,
    ) -> Result<LoadReport, LoaderError> {
        let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let column = df
                .column(name)
                .map_err(|_| LoaderError::MissingColumn(name))?;
            columns.push(column.as_materialized_series().str()?);
        }
        let currency = match df.column(CURRENCY_COLUMN) {
            Ok(column) => Some(column.as_materialized_series().str()?),
            Err(_) => None,
        };

        let mut seen_ids: HashSet<i64> = HashSet::new();

        for i in 0..df.height() {
            let cells: Vec<Option<&str>> = columns.iter().map(|c| c.get(i)).collect();
            if cells.iter().all(|c| c.map_or(true, |v| v.trim().is_empty())) {
                continue;
            }

            let row = rows.get(i).copied().unwrap_or(i + 1);
            let raw_id = cells[0].map(|s| s.to_string());

            let parsed = Self::raw_row(&cells, currency.and_then(|c| c.get(i)))
                .and_then(|raw| Product::parse(&raw, &self.default_currency));

            let reason = match parsed {
                Ok(product) if !seen_ids.insert(product.product_id) => {
                    format!("duplicate product_id {}", product.product_id)
                }
                Ok(product) => {
                    report.products.push(product);
                    continue;
                }
                Err(e) => e.to_string(),
            };

            tracing::warn!(row, product_id = ?raw_id, %reason, "skipping malformed product row");
            report.rejected.push(RowRejection {
                row,
                product_id: raw_id,
                reason,
            });
        }

        report.rejected.sort_by_key(|r| r.row);
        tracing::debug!(
            rows = df.height(),
            accepted = report.products.len(),
            "validated product rows"
        );
        Ok(report)
    }

    fn raw_row<'a>(
        cells: &[Option<&'a str>],
        currency: Option<&'a str>,
    ) -> Result<RawProduct<'a>, FieldError> {
        let cell = |idx: usize| cells[idx].ok_or(FieldError::Missing(REQUIRED_COLUMNS[idx]));

        Ok(RawProduct {
            product_id: cell(0)?,
            name: cells[1].unwrap_or_default(),
            category: cells[2].unwrap_or_default(),
            color: cells[3].unwrap_or_default(),
            size_available: cells[4].unwrap_or_default(),
            price: cell(5)?,
            currency,
            stock: cell(6)?,
            release_date: cell(7)?,
        })
    }
}

/// Records whose field count matches the header, re-encoded for Polars.
struct ScreenedCsv {
    csv: Vec<u8>,
    rows: Vec<usize>,
    rejected: Vec<RowRejection>,
}

/// Splits off ragged or unreadable records so one bad line cannot fail the
/// whole read. Blank records are dropped without a rejection.
fn screen_records(bytes: &[u8]) -> Result<ScreenedCsv, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoaderError::MissingColumn(REQUIRED_COLUMNS[0]));
    }
    let id_column = headers.iter().position(|h| h == REQUIRED_COLUMNS[0]);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let (product_id, reason) = match result {
            Ok(record) if record.iter().all(|field| field.trim().is_empty()) => continue,
            Ok(record) if record.len() == headers.len() => {
                writer.write_record(&record)?;
                rows.push(row);
                continue;
            }
            Ok(record) => (
                id_column.and_then(|c| record.get(c)).map(str::to_string),
                format!("expected {} fields, found {}", headers.len(), record.len()),
            ),
            Err(e) => (None, e.to_string()),
        };

        tracing::warn!(row, product_id = ?product_id, %reason, "skipping malformed product row");
        rejected.push(RowRejection {
            row,
            product_id,
            reason,
        });
    }

    let csv = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(ScreenedCsv { csv, rows, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "product_id,name,category,color,size_available,price,Currency,stock,release_date\n";

    fn load(body: &str) -> LoadReport {
        DatasetLoader::new()
            .load_from_str(&format!("{HEADER}{body}"))
            .unwrap()
    }

    #[test]
    fn test_valid_rows_load_complete() {
        let report = load(
            "1,Oversized Hoodie,Hoodies,Black,\"['S', 'M']\",$59.99,AUD,120,01/15/2024\n\
             2,Fitted Tee,T-Shirts,Beige,\"['M']\",\"$1,234.50\",USD,4,02/20/2024\n",
        );
        assert_eq!(report.status(), DatasetStatus::Complete);
        assert_eq!(report.products.len(), 2);
        assert_eq!(report.products[1].unit_price(), 1234.5);
        assert_eq!(report.products[1].currency, "USD");
        assert_eq!(report.products[0].sizes(), vec!["S", "M"]);
    }

    #[test]
    fn test_malformed_rows_are_skipped_and_reported() {
        let report = load(
            "1,Oversized Hoodie,Hoodies,Black,['S'],$59.99,AUD,120,01/15/2024\n\
             2,Fitted Tee,T-Shirts,Beige,['M'],free,AUD,4,02/20/2024\n\
             3,Classic Crew,Sweatshirts,Emerald,['L'],$30,AUD,7,2024-03-01\n",
        );
        assert_eq!(report.status(), DatasetStatus::Partial);
        assert_eq!(report.products.len(), 1);
        let rows: Vec<usize> = report.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3]);
        assert_eq!(report.rejected[0].product_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_ragged_row_is_rejected_on_its_own() {
        let report = load(
            "1,Oversized Hoodie,Hoodies,Black,['S'],$59.99,AUD,120,01/15/2024\n\
             2,Fitted Tee,T-Shirts,Beige,['M'],$1,234.50,AUD,4,02/20/2024\n\
             3,Classic Crew,Sweatshirts,Emerald,['L'],$30,AUD,7,03/01/2024\n\
             4,Classic Tee,T-Shirts,White,['S'],free,AUD,2,03/05/2024\n",
        );
        assert_eq!(report.status(), DatasetStatus::Partial);
        let ids: Vec<i64> = report.products.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![1, 3]);

        let rows: Vec<usize> = report.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 4]);
        assert_eq!(report.rejected[0].product_id.as_deref(), Some("2"));
        assert!(report.rejected[0].reason.contains("expected 9 fields, found 10"));
        assert!(report.rejected[1].reason.contains("price"));
    }

    #[test]
    fn test_short_row_keeps_neighbours() {
        let report = load(
            "1,Oversized Hoodie,Hoodies,Black,['S'],$59.99,AUD,120,01/15/2024\n\
             2,Fitted Tee,T-Shirts\n\
             3,Classic Crew,Sweatshirts,Emerald,['L'],$30,AUD,7,03/01/2024\n",
        );
        assert_eq!(report.status(), DatasetStatus::Partial);
        assert_eq!(report.products.len(), 2);
        assert_eq!(report.rejected[0].row, 2);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let report = load(
            "1,Oversized Hoodie,Hoodies,Black,['S'],$10,AUD,1,01/15/2024\n\
             1,Fitted Tee,T-Shirts,Beige,['M'],$20,AUD,2,02/20/2024\n",
        );
        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].name, "Oversized Hoodie");
        assert!(report.rejected[0].reason.contains("duplicate"));
    }

    #[test]
    fn test_blank_currency_defaults() {
        let report = load("1,Classic Crew,Sweatshirts,Black,['S'],$10,,1,01/15/2024\n");
        assert_eq!(report.products[0].currency, "AUD");
    }

    #[test]
    fn test_currency_column_is_optional() {
        let text = "product_id,name,category,color,size_available,price,stock,release_date\n\
                    9,Classic Crew,Sweatshirts,Black,['S'],$10,1,01/15/2024\n";
        let report = DatasetLoader::new()
            .with_default_currency("USD")
            .load_from_str(text)
            .unwrap();
        assert_eq!(report.products[0].currency, "USD");
    }

    #[test]
    fn test_missing_required_column_fails() {
        let text = "product_id,name,category,color,price,stock,release_date\n\
                    1,Tee,T-Shirts,Black,$1,1,01/01/2024\n";
        let result = DatasetLoader::new().load_from_str(text);
        assert!(matches!(result, Err(LoaderError::MissingColumn("size_available"))));
    }

    #[test]
    fn test_header_only_is_empty() {
        let report = load("");
        assert_eq!(report.status(), DatasetStatus::Empty);
        assert!(report.products.is_empty());
    }

    #[test]
    fn test_all_rows_rejected_is_failed() {
        let report = load("1,Tee,T-Shirts,Black,['S'],oops,AUD,1,01/15/2024\n");
        assert_eq!(report.status(), DatasetStatus::Failed);
    }

    #[test]
    fn test_missing_file_collapses_to_empty() {
        let loader = DatasetLoader::new();
        assert!(matches!(
            loader.load("does/not/exist.csv"),
            Err(LoaderError::FileNotFound(_))
        ));
        let report = loader.load_or_empty("does/not/exist.csv");
        assert!(report.products.is_empty());
        assert_eq!(report.status(), DatasetStatus::Failed);
    }
}
