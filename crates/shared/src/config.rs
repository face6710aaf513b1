//! Engine configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration.
///
/// Every field has a sensible default, so embedders can run with no config
/// files at all and override selectively via `SALDO__*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Posting and rounding configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Policy applied to companies registered without explicit settings.
    #[serde(default)]
    pub company_defaults: CompanyDefaultsConfig,
}

/// Posting and rounding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Decimal places of base-currency amounts (2 = cents).
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

fn default_decimal_places() -> u32 {
    2
}

/// Initial settings for companies registered without explicit settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyDefaultsConfig {
    /// Whether posted journal entries may be edited or deleted.
    #[serde(default)]
    pub allow_edit_posted: bool,
    /// Whether documents carry VAT by default.
    #[serde(default = "default_vat_enabled")]
    pub vat_enabled: bool,
    /// Default VAT rate as a fraction (0.15 = 15%).
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
}

fn default_vat_enabled() -> bool {
    true
}

fn default_vat_rate() -> Decimal {
    Decimal::new(15, 2)
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
        }
    }
}

impl Default for CompanyDefaultsConfig {
    fn default() -> Self {
        Self {
            allow_edit_posted: false,
            vat_enabled: default_vat_enabled(),
            vat_rate: default_vat_rate(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            posting: PostingConfig::default(),
            company_defaults: CompanyDefaultsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SALDO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
