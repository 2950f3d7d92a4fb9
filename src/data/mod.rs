//! Data module - CSV loading and product records

mod loader;
mod product;

pub use loader::{DatasetLoader, DatasetStatus, LoadReport, LoaderError, RowRejection};
pub use product::{
    color_hex, format_price, format_thousands, parse_price, parse_release_date, parse_sizes,
    Collection, FieldError, Product, RawProduct, DEFAULT_CURRENCY, RELEASE_DATE_FORMAT,
    UNKNOWN_COLOR_HEX,
};

#[cfg(test)]
pub(crate) use product::tests::raw;
