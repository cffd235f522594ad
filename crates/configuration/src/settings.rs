use crate::error::ConfigError;
use core_types::{CurrencyPair, RowAlignment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub report: ReportSettings,
    pub provider: ProviderSettings,
    pub delivery: DeliverySettings,
    pub logging: LoggingSettings,
}

/// What goes into the monthly report and where it is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// The two pairs to report, in column order. The ratio column is `first / second`.
    pub currencies: Vec<CurrencyPair>,
    /// Directory holding the spreadsheets and their manifests.
    pub reports_dir: PathBuf,
    /// Fixings published before this hour are dropped.
    pub evening_clearing_hour: u32,
    pub alignment: RowAlignment,
}

/// Connection parameters for the rate provider's export endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub language: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// Controls when the report is emailed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub enabled: bool,
    /// Email an already-generated report again on every run.
    pub resend_cached: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currencies: ["USD/RUB", "JPY/RUB"]
                .into_iter()
                .filter_map(|code| code.parse().ok())
                .collect(),
            reports_dir: PathBuf::from("."),
            evening_clearing_hour: 18,
            alignment: RowAlignment::Positional,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.moex.com/export/derivatives/currency-rate.aspx".to_string(),
            language: "ru".to_string(),
            user_agent:
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/109.0"
                    .to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            resend_cached: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl ReportSettings {
    /// The configured pairs as an ordered two-element array.
    pub fn currency_pairs(&self) -> Result<[CurrencyPair; 2], ConfigError> {
        match self.currencies.as_slice() {
            [first, second] if first != second => Ok([first.clone(), second.clone()]),
            [first, _] => Err(ConfigError::ValidationError(format!(
                "report.currencies must name two different pairs, got {first} twice"
            ))),
            other => Err(ConfigError::ValidationError(format!(
                "report.currencies must contain exactly two pairs, got {}",
                other.len()
            ))),
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Checks the cross-field constraints `serde` cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.report.currency_pairs()?;

        if self.report.evening_clearing_hour > 23 {
            return Err(ConfigError::ValidationError(format!(
                "report.evening_clearing_hour must be between 0 and 23, got {}",
                self.report.evening_clearing_hour
            )));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
