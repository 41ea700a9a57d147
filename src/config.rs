use chrono::{NaiveTime, Weekday};
use config::{Config, ConfigError, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid pricing configuration: {0}")]
    InvalidPricing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Pricing parameters for the fee pipeline. Amounts are in cents, distances in meters.
///
/// Item-count thresholds are exclusive: a count equal to the threshold is not
/// surcharged. The rush window is inclusive at both ends and evaluated in UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Pricing {
    pub free_delivery_cart_value: u64,
    pub cart_value_surcharge_threshold: u64,
    pub item_surcharge_threshold: u64,
    pub item_surcharge: u64,
    pub bulk_item_threshold: u64,
    pub bulk_surcharge: u64,
    pub base_distance: u64,
    pub start_fee: u64,
    pub additional_distance_block: u64,
    pub additional_distance_fee: u64,
    pub rush_weekday: Weekday,
    pub rush_start: NaiveTime,
    pub rush_end: NaiveTime,
    pub rush_multiplier: Decimal,
    pub max_fee: u64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            free_delivery_cart_value: 20000,
            cart_value_surcharge_threshold: 1000,
            item_surcharge_threshold: 4,
            item_surcharge: 50,
            bulk_item_threshold: 12,
            bulk_surcharge: 120,
            base_distance: 1000,
            start_fee: 200,
            additional_distance_block: 500,
            additional_distance_fee: 100,
            rush_weekday: Weekday::Fri,
            rush_start: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            rush_end: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default(),
            rush_multiplier: dec!(1.2),
            max_fee: 1500,
        }
    }
}

impl Pricing {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.additional_distance_block == 0 {
            return Err(SettingsError::InvalidPricing(
                "additional_distance_block must be greater than 0".to_string(),
            ));
        }
        if self.rush_start > self.rush_end {
            return Err(SettingsError::InvalidPricing(format!(
                "rush_start {} is after rush_end {}",
                self.rush_start, self.rush_end
            )));
        }
        if self.rush_multiplier.is_sign_negative() {
            return Err(SettingsError::InvalidPricing(format!(
                "rush_multiplier {} must not be negative",
                self.rush_multiplier
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub pricing: Pricing,
}

impl Settings {
    pub fn load(config_path: &Option<String>) -> Result<Self, SettingsError> {
        let default = Self::default();

        let settings = match Self::load_from_file(config_path) {
            Ok(settings) => settings,
            Err(err) if config_path.is_none() => {
                warn!("Could not read config file: {err}. Using default configuration.",);
                default
            }
            Err(err) => return Err(err),
        };

        settings.pricing.validate()?;

        Ok(settings)
    }

    fn load_from_file(config_path: &Option<String>) -> Result<Self, SettingsError> {
        let path = config_path.as_deref().unwrap_or("config.toml");

        let config = Config::builder()
            .add_source(File::with_name(path).required(config_path.is_some()))
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(config)
    }
}
