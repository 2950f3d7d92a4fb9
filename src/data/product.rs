//! Product Record Module
//! The catalogue row type plus the field parsers used to validate it.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Release dates in the dataset are US-style month/day/year.
pub const RELEASE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Currency assumed when a row leaves `Currency` blank.
pub const DEFAULT_CURRENCY: &str = "AUD";

/// Swatch used for colour names missing from the lookup table.
pub const UNKNOWN_COLOR_HEX: &str = "#CCCCCC";

const COLOR_TABLE: [(&str, &str); 6] = [
    ("Persian Pink", "#F77FBE"),
    ("Beige", "#F5F5DC"),
    ("Medium Slate Blue", "#7B68EE"),
    ("Pale Azure", "#77C3EC"),
    ("Emerald", "#50C878"),
    ("Black", "#000000"),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{0} is empty")]
    Missing(&'static str),
    #[error("{field} is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("stock cannot be negative: {0}")]
    NegativeStock(i64),
    #[error("price is not a non-negative amount: {0:?}")]
    InvalidPrice(String),
    #[error("release_date is not MM/DD/YYYY: {0:?}")]
    InvalidDate(String),
}

/// Marketing line a product belongs to, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Collection {
    Oversized,
    Fitted,
    Classic,
}

impl Collection {
    /// Precedence order used when a name mentions several collections.
    pub const ALL: [Collection; 3] = [Collection::Oversized, Collection::Fitted, Collection::Classic];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Oversized => "Oversized",
            Collection::Fitted => "Fitted",
            Collection::Classic => "Classic",
        }
    }

    /// Legend label used by charts.
    pub fn label(self) -> &'static str {
        match self {
            Collection::Oversized => "Oversized Collection",
            Collection::Fitted => "Fitted Collection",
            Collection::Classic => "Classic Collection",
        }
    }

    /// First collection whose name occurs anywhere in `name` (case-sensitive).
    pub fn infer(name: &str) -> Option<Collection> {
        Self::ALL.into_iter().find(|c| name.contains(c.as_str()))
    }

    /// Table tab semantics: the name starts with the collection, ignoring case.
    pub fn matches_prefix(self, name: &str) -> bool {
        name.to_lowercase()
            .starts_with(&self.as_str().to_lowercase())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown collection: {s}"))
    }
}

/// One CSV row as text, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawProduct<'a> {
    pub product_id: &'a str,
    pub name: &'a str,
    pub category: &'a str,
    pub color: &'a str,
    pub size_available: &'a str,
    pub price: &'a str,
    pub currency: Option<&'a str>,
    pub stock: &'a str,
    pub release_date: &'a str,
}

/// A validated catalogue row.
///
/// Text fields keep their source form; price and release date are also kept
/// parsed so aggregations never re-parse or see malformed values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub category: String,
    pub color: String,
    pub size_available: String,
    pub price: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    pub stock: u32,
    pub release_date: String,
    #[serde(skip)]
    unit_price: f64,
    #[serde(skip)]
    released: NaiveDate,
}

impl Product {
    /// Validate a raw row. Blank currency falls back to `default_currency`.
    pub fn parse(raw: &RawProduct<'_>, default_currency: &str) -> Result<Self, FieldError> {
        let product_id = parse_integer("product_id", raw.product_id)?;
        let stock = parse_integer("stock", raw.stock)?;
        let stock = u32::try_from(stock).map_err(|_| {
            if stock < 0 {
                FieldError::NegativeStock(stock)
            } else {
                FieldError::InvalidInteger {
                    field: "stock",
                    value: raw.stock.to_string(),
                }
            }
        })?;
        let unit_price = parse_price(raw.price)?;
        let released = parse_release_date(raw.release_date)?;

        let currency = raw
            .currency
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(default_currency);

        Ok(Self {
            product_id,
            name: raw.name.to_string(),
            category: raw.category.to_string(),
            color: raw.color.to_string(),
            size_available: raw.size_available.to_string(),
            price: raw.price.to_string(),
            currency: currency.to_string(),
            stock,
            release_date: raw.release_date.to_string(),
            unit_price,
            released,
        })
    }

    /// Numeric price with currency symbols and separators removed.
    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// Potential revenue of the units on hand.
    pub fn revenue(&self) -> f64 {
        self.unit_price * f64::from(self.stock)
    }

    pub fn released(&self) -> NaiveDate {
        self.released
    }

    pub fn collection(&self) -> Option<Collection> {
        Collection::infer(&self.name)
    }

    pub fn sizes(&self) -> Vec<String> {
        parse_sizes(&self.size_available)
    }

    pub fn color_hex(&self) -> &'static str {
        color_hex(&self.color)
    }

    pub fn formatted_price(&self) -> String {
        format_price(self.unit_price, &self.currency)
    }

    /// Released strictly after `today`.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.released > today
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, FieldError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| FieldError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

/// Parse currency text such as `"$1,234.50"` into `1234.5`.
///
/// Every character other than digits, `.` and `-` is dropped first. The
/// remainder must be a finite, non-negative number.
pub fn parse_price(text: &str) -> Result<f64, FieldError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(FieldError::InvalidPrice(text.to_string())),
    }
}

/// Parse the serialized size list, e.g. `"['S', 'M', 'L']"`.
pub fn parse_sizes(text: &str) -> Vec<String> {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\''))
        .collect();

    if stripped.trim().is_empty() {
        return Vec::new();
    }

    stripped.split(", ").map(|s| s.to_string()).collect()
}

pub fn parse_release_date(text: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(text.trim(), RELEASE_DATE_FORMAT)
        .map_err(|_| FieldError::InvalidDate(text.to_string()))
}

/// Display swatch for a colour name.
pub fn color_hex(name: &str) -> &'static str {
    COLOR_TABLE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, hex)| *hex)
        .unwrap_or(UNKNOWN_COLOR_HEX)
}

/// Format an amount with its currency symbol, e.g. `A$1,234.50`.
pub fn format_price(amount: f64, currency: &str) -> String {
    let code = if currency.trim().is_empty() {
        DEFAULT_CURRENCY
    } else {
        currency.trim()
    };

    let prefix = match code {
        "AUD" => "A$".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{other} "),
    };

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{prefix}{}", format_thousands(amount.abs(), 2))
}

/// Fixed-point formatting with `,` between thousands groups.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw<'a>(id: &'a str, name: &'a str, price: &'a str, stock: &'a str, date: &'a str) -> RawProduct<'a> {
        RawProduct {
            product_id: id,
            name,
            category: "Hoodies",
            color: "Black",
            size_available: "['S', 'M', 'L']",
            price,
            currency: None,
            stock,
            release_date: date,
        }
    }

    #[test]
    fn test_parse_price_strips_symbols() {
        assert_eq!(parse_price("$1,234.50"), Ok(1234.5));
        assert_eq!(parse_price("$ 49.99 "), Ok(49.99));
        assert_eq!(parse_price("0"), Ok(0.0));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("").is_err());
        assert!(parse_price("free").is_err());
        assert!(parse_price("$-5.00").is_err());
        assert!(parse_price("1.2.3").is_err());
    }

    #[test]
    fn test_parse_sizes() {
        assert_eq!(parse_sizes("['S', 'M', 'L']"), vec!["S", "M", "L"]);
        assert_eq!(parse_sizes("['XL']"), vec!["XL"]);
        assert!(parse_sizes("[]").is_empty());
        assert!(parse_sizes("").is_empty());
    }

    #[test]
    fn test_parse_release_date() {
        let date = parse_release_date("01/15/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(parse_release_date("2024-01-15").is_err());
        assert!(parse_release_date("02/30/2024").is_err());
    }

    #[test]
    fn test_collection_precedence() {
        assert_eq!(Collection::infer("Oversized Fitted Tee"), Some(Collection::Oversized));
        assert_eq!(Collection::infer("Classic Fitted Hoodie"), Some(Collection::Fitted));
        assert_eq!(Collection::infer("Classic Crew"), Some(Collection::Classic));
        assert_eq!(Collection::infer("oversized tee"), None);
        assert_eq!(Collection::infer("Cargo Pants"), None);
    }

    #[test]
    fn test_collection_prefix_ignores_case() {
        assert!(Collection::Fitted.matches_prefix("fitted Jacket"));
        assert!(!Collection::Fitted.matches_prefix("Classic Fitted Jacket"));
        assert_eq!("classic".parse::<Collection>(), Ok(Collection::Classic));
        assert!("baggy".parse::<Collection>().is_err());
    }

    #[test]
    fn test_color_lookup_defaults_to_gray() {
        assert_eq!(color_hex("Emerald"), "#50C878");
        assert_eq!(color_hex("emerald"), UNKNOWN_COLOR_HEX);
        assert_eq!(color_hex("Chartreuse"), UNKNOWN_COLOR_HEX);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1234.5, "AUD"), "A$1,234.50");
        assert_eq!(format_price(49.99, ""), "A$49.99");
        assert_eq!(format_price(1_000_000.0, "USD"), "$1,000,000.00");
        assert_eq!(format_price(12.0, "NZD"), "NZD 12.00");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(-1234567.891, 2), "-1,234,567.89");
    }

    #[test]
    fn test_product_parse_valid_row() {
        let product = Product::parse(&raw("7", "Oversized Hoodie", "$59.90", "12", "03/01/2024"), "AUD").unwrap();
        assert_eq!(product.product_id, 7);
        assert_eq!(product.stock, 12);
        assert_eq!(product.currency, "AUD");
        assert!((product.revenue() - 718.8).abs() < 1e-9);
        assert_eq!(product.collection(), Some(Collection::Oversized));
        assert_eq!(product.sizes(), vec!["S", "M", "L"]);
    }

    #[test]
    fn test_product_parse_rejects_bad_fields() {
        assert!(matches!(
            Product::parse(&raw("x", "Tee", "$1", "1", "01/01/2024"), "AUD"),
            Err(FieldError::InvalidInteger { field: "product_id", .. })
        ));
        assert_eq!(
            Product::parse(&raw("1", "Tee", "$1", "-3", "01/01/2024"), "AUD"),
            Err(FieldError::NegativeStock(-3))
        );
        assert!(matches!(
            Product::parse(&raw("1", "Tee", "n/a", "3", "01/01/2024"), "AUD"),
            Err(FieldError::InvalidPrice(_))
        ));
        assert!(matches!(
            Product::parse(&raw("1", "Tee", "$1", "3", "13/01/2024"), "AUD"),
            Err(FieldError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_is_upcoming() {
        let product = Product::parse(&raw("1", "Tee", "$1", "3", "06/01/2024"), "AUD").unwrap();
        assert!(product.is_upcoming(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()));
        assert!(!product.is_upcoming(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    }
}
