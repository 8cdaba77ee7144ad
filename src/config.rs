use crate::error::{EngineError, Result};
use chrono::format::{Item, StrftimeItems};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

/// Tunables of a merge batch.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_files: usize,
    pub max_files: usize,
    pub min_payment: Decimal,
    pub max_payment: Decimal,
    pub currency_code: String,
    pub output_base_name: String,
    pub output_extension: String,
    /// chrono format appended to the base name of the artifact.
    pub output_timestamp_format: String,
    pub max_output_bytes: u64,
    pub document_date_format: String,
    pub message_timestamp_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_files: 10,
            max_files: 10,
            min_payment: dec!(10.00),
            max_payment: dec!(100000.00),
            currency_code: "810".to_string(),
            output_base_name: "Total".to_string(),
            output_extension: ".xml".to_string(),
            output_timestamp_format: "_%Y-%m-%d_%H-%M-%S".to_string(),
            max_output_bytes: 512_000,
            document_date_format: "%d.%m.%Y".to_string(),
            message_timestamp_format: "%Y-%m-%dT%H:%M:%S".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads a JSON config file and validates it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_files == 0 {
            return Err(EngineError::ConfigError(
                "min_files must be at least 1".to_string(),
            ));
        }
        if self.min_files > self.max_files {
            return Err(EngineError::ConfigError(format!(
                "min_files ({}) is greater than max_files ({})",
                self.min_files, self.max_files
            )));
        }
        if self.min_payment > self.max_payment {
            return Err(EngineError::ConfigError(format!(
                "min_payment ({}) is greater than max_payment ({})",
                self.min_payment, self.max_payment
            )));
        }
        if self.max_output_bytes == 0 {
            return Err(EngineError::ConfigError(
                "max_output_bytes must be positive".to_string(),
            ));
        }
        if self.output_base_name.is_empty() {
            return Err(EngineError::ConfigError(
                "output_base_name must not be empty".to_string(),
            ));
        }
        for (key, format) in [
            ("output_timestamp_format", &self.output_timestamp_format),
            ("document_date_format", &self.document_date_format),
            ("message_timestamp_format", &self.message_timestamp_format),
        ] {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(EngineError::ConfigError(format!(
                    "{key} '{format}' is not a valid date format"
                )));
            }
        }
        Ok(())
    }
}
