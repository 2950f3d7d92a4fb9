//! Dashboard configuration, read from TOML with an embedded fallback.

use crate::stats::Thresholds;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
    pub dashboard: SummaryConfig,
    pub table: TableConfig,
    pub thresholds: Thresholds,
    pub chart: ChartConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub default_currency: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SummaryConfig {
    pub top_n: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

/// Default configuration embedded in the binary
pub const DEFAULT_CONFIG: &str = r#"
[dataset]
path = "data/Dataset(Products).csv"
default_currency = "AUD"

[dashboard]
top_n = 3

[table]
page_size = 10

[thresholds]
stock_healthy = 100
stock_moderate = 50
revenue_strong = 10000.0
revenue_moderate = 5000.0

[chart]
width = 1000
height = 500
"#;

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/Dataset(Products).csv"),
            default_currency: "AUD".to_string(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { top_n: 3 }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            dashboard: SummaryConfig::default(),
            table: TableConfig::default(),
            thresholds: Thresholds::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&contents)
            }
            None => {
                tracing::debug!("Using default embedded configuration");
                Self::from_toml(DEFAULT_CONFIG)
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table.page_size == 0 {
            return Err(ConfigError::Invalid("table.page_size must be at least 1".into()));
        }
        if self.thresholds.stock_moderate > self.thresholds.stock_healthy {
            return Err(ConfigError::Invalid(
                "thresholds.stock_moderate exceeds thresholds.stock_healthy".into(),
            ));
        }
        if self.thresholds.revenue_moderate > self.thresholds.revenue_strong {
            return Err(ConfigError::Invalid(
                "thresholds.revenue_moderate exceeds thresholds.revenue_strong".into(),
            ));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid("chart dimensions must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = DashboardConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.dataset.path, PathBuf::from("data/Dataset(Products).csv"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DashboardConfig::from_toml("[table]\npage_size = 25\n").unwrap();
        assert_eq!(config.table.page_size, 25);
        assert_eq!(config.dashboard.top_n, 3);
        assert_eq!(config.thresholds.stock_healthy, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            DashboardConfig::from_toml("[table]\npage_size = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[thresholds]\nstock_moderate = 500\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[table\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = DashboardConfig::load(Some(Path::new("no/such/config.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
