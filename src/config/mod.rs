//! Configuration loading and management for the Statutory Payroll Engine.
//!
//! This module loads versioned statutory rate tables (BPJS contribution
//! rates and caps, PTKP thresholds, PPh 21 brackets, overtime tiers and THR
//! rules) from YAML files. Tables are immutable once loaded and are shared
//! read-only by every computation.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/id_2024").unwrap();
//! println!("Loaded regime: {}", config.regime().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BpjsRates, CappedContribution, ContributionShare, HolidayBonusRules, IncomeTaxRates,
    OvertimeRules, OvertimeTier, PtkpRates, RegimeMetadata, StatutoryConfig, StatutoryRates,
    TaxBracket,
};
