use std::path::Path;

use serde::Deserialize;

use crate::error::{CampaignError, CampaignResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_KPI__` and an optional TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatConfig {
    /// ISO 4217 code used by currency formatting.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fixed percentage precision. `None` keeps the adaptive precision.
    #[serde(default)]
    pub percentage_decimals: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_group_by")]
    pub default_group_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Relative half-width of forecast ranges (0.15 = ±15%).
    #[serde(default = "default_range_spread")]
    pub range_spread: f64,
}

// Default functions
fn default_currency() -> String {
    "USD".to_string()
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_throttle_ms() -> u64 {
    100
}
fn default_page_size() -> usize {
    25
}
fn default_group_by() -> String {
    "channel".to_string()
}
fn default_confidence() -> f64 {
    0.85
}
fn default_range_spread() -> f64 {
    0.15
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            percentage_decimals: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_group_by: default_group_by(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            confidence: default_confidence(),
            range_spread: default_range_spread(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> CampaignResult<Self> {
        Self::build(None)
    }

    /// Load configuration from a TOML file, with environment variables
    /// layered on top.
    pub fn load_from(path: &Path) -> CampaignResult<Self> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> CampaignResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_KPI")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CampaignResult<()> {
        if self.reporting.page_size == 0 {
            return Err(CampaignError::Config(
                "reporting.page_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.forecast.confidence) {
            return Err(CampaignError::Config(format!(
                "forecast.confidence must be within [0, 1], got {}",
                self.forecast.confidence
            )));
        }
        if !(0.0..1.0).contains(&self.forecast.range_spread) {
            return Err(CampaignError::Config(format!(
                "forecast.range_spread must be within [0, 1), got {}",
                self.forecast.range_spread
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.format.currency, "USD");
        assert_eq!(config.timing.debounce_ms, 300);
        assert_eq!(config.reporting.page_size, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = AppConfig::default();
        config.reporting.page_size = 0;
        assert!(matches!(config.validate(), Err(CampaignError::Config(_))));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.forecast.confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("campaign-kpi-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[timing]\ndebounce_ms = 50\n\n[format]\ncurrency = \"EUR\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.timing.debounce_ms, 50);
        assert_eq!(config.timing.throttle_ms, 100);
        assert_eq!(config.format.currency, "EUR");
    }
}
