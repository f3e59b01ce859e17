//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! rate tables from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::PayPeriod;

use super::types::{RegimeMetadata, StatutoryConfig, StatutoryRates};

/// Loads and provides access to statutory rate configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and resolves which rate table is in force on a given date.
///
/// # Directory Structure
///
/// ```text
/// config/id_2024/
/// ├── regime.yaml          # Regime metadata
/// └── rates/
///     ├── 2023-01-01.yaml  # Rates effective from this date
///     └── 2024-01-01.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/id_2024").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
/// let rates = loader.rates_for(date).unwrap();
/// println!("JP salary cap: {}", rates.bpjs.pension.salary_cap);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: StatutoryConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `regime.yaml` or the `rates` directory is missing
    /// - Any file contains invalid YAML
    /// - Any rate table violates the invariants checked by
    ///   [`StatutoryRates::validate`]
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let regime_path = path.join("regime.yaml");
        let metadata = Self::load_yaml::<RegimeMetadata>(&regime_path)?;

        let rates_dir = path.join("rates");
        let rates = Self::load_rates(&rates_dir)?;

        Ok(Self::from_config(StatutoryConfig::new(metadata, rates)))
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: StatutoryConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads and validates all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<StatutoryRates>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let table = Self::load_yaml::<StatutoryRates>(&path)?;
                table
                    .validate()
                    .map_err(|message| EngineError::ConfigParseError {
                        path: path.display().to_string(),
                        message,
                    })?;
                rates.push(table);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying statutory configuration.
    pub fn config(&self) -> &StatutoryConfig {
        &self.config
    }

    /// Returns the regime metadata.
    pub fn regime(&self) -> &RegimeMetadata {
        self.config.regime()
    }

    /// Gets the rate table in force on a given date.
    ///
    /// Finds the most recent rate table whose effective date is on or
    /// before `date`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/id_2024")?;
    /// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    /// let rates = loader.rates_for(date)?;
    /// assert_eq!(rates.ptkp.max_dependents, 3);
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn rates_for(&self, date: NaiveDate) -> EngineResult<&StatutoryRates> {
        self.config
            .rates()
            .iter()
            .rev()
            .find(|table| table.effective_date <= date)
            .ok_or(EngineError::RatesNotFound { date })
    }

    /// Gets the rate table in force on the first day of a pay period.
    pub fn rates_for_period(&self, period: &PayPeriod) -> EngineResult<&StatutoryRates> {
        self.rates_for(period.first_day())
    }
}
