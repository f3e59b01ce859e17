//! Configuration types for statutory payroll rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every regulatory constant
//! the calculators use lives here so that a change in regulation is a data
//! change, not a code change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metadata about the statutory regime.
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeMetadata {
    /// Short identifier of the regime (e.g., "ID-PAYROLL").
    pub code: String,
    /// The human-readable name of the regime.
    pub name: String,
    /// The version of the regime configuration.
    pub version: String,
    /// URL to the governing regulation.
    pub source_url: String,
}

/// Employee/employer split of a contribution expressed as fractions of salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionShare {
    /// Fraction paid by the employee (e.g., 0.02 for 2%).
    pub employee_rate: Decimal,
    /// Fraction paid by the employer.
    pub employer_rate: Decimal,
}

/// A contribution whose salary basis is capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CappedContribution {
    /// Maximum salary used as the contribution basis.
    pub salary_cap: Decimal,
    /// Fraction paid by the employee.
    pub employee_rate: Decimal,
    /// Fraction paid by the employer.
    pub employer_rate: Decimal,
}

/// BPJS Kesehatan and BPJS Ketenagakerjaan contribution rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpjsRates {
    /// BPJS Kesehatan (health insurance).
    pub health: CappedContribution,
    /// Jaminan Hari Tua (old-age savings, JHT). Uncapped.
    pub old_age_savings: ContributionShare,
    /// Jaminan Kecelakaan Kerja (work accident, JKK), employer-paid.
    pub work_accident_rate: Decimal,
    /// Jaminan Kematian (death benefit, JKM), employer-paid.
    pub death_benefit_rate: Decimal,
    /// Jaminan Pensiun (pension, JP).
    pub pension: CappedContribution,
}

/// PTKP (Penghasilan Tidak Kena Pajak) annual thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtkpRates {
    /// Threshold for unmarried taxpayers (TK/0).
    pub single: Decimal,
    /// Threshold for married taxpayers (K/0).
    pub married: Decimal,
    /// Addition per dependent.
    pub per_dependent: Decimal,
    /// Maximum number of dependents that increase the threshold.
    pub max_dependents: u32,
}

/// A single progressive tax bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Cumulative upper limit of taxable income for this bracket.
    /// `None` marks the open-ended top bracket.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Marginal rate applied inside the bracket.
    pub rate: Decimal,
}

/// PPh 21 progressive bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxRates {
    /// Brackets in ascending order; the last one must be open-ended.
    pub brackets: Vec<TaxBracket>,
}

/// One tier of an overtime premium schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeTier {
    /// Number of hours this tier consumes. `None` consumes all remaining hours.
    #[serde(default)]
    pub hours: Option<Decimal>,
    /// Multiplier applied to the hourly rate.
    pub multiplier: Decimal,
}

/// Overtime premium rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRules {
    /// Divisor turning a monthly salary into an hourly rate (1/173).
    pub hourly_divisor: Decimal,
    /// Tiers for overtime on a working day.
    pub weekday: Vec<OvertimeTier>,
    /// Tiers for overtime on a rest day or public holiday.
    pub holiday: Vec<OvertimeTier>,
}

/// THR (Tunjangan Hari Raya) entitlement rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayBonusRules {
    /// Months of service after which the full monthly salary is due.
    pub full_entitlement_months: u32,
}

/// A complete set of statutory rates effective from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryRates {
    /// The date from which these rates apply.
    pub effective_date: NaiveDate,
    /// BPJS contribution rates.
    pub bpjs: BpjsRates,
    /// PTKP thresholds.
    pub ptkp: PtkpRates,
    /// Income tax brackets.
    pub income_tax: IncomeTaxRates,
    /// Overtime premium rules.
    pub overtime: OvertimeRules,
    /// Holiday bonus rules.
    pub holiday_bonus: HolidayBonusRules,
}

impl StatutoryRates {
    /// Checks the structural invariants the calculators rely on.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let fractions = [
            ("bpjs.health.employee_rate", self.bpjs.health.employee_rate),
            ("bpjs.health.employer_rate", self.bpjs.health.employer_rate),
            (
                "bpjs.old_age_savings.employee_rate",
                self.bpjs.old_age_savings.employee_rate,
            ),
            (
                "bpjs.old_age_savings.employer_rate",
                self.bpjs.old_age_savings.employer_rate,
            ),
            ("bpjs.work_accident_rate", self.bpjs.work_accident_rate),
            ("bpjs.death_benefit_rate", self.bpjs.death_benefit_rate),
            ("bpjs.pension.employee_rate", self.bpjs.pension.employee_rate),
            ("bpjs.pension.employer_rate", self.bpjs.pension.employer_rate),
        ];
        for (name, rate) in fractions {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(format!("{} must be between 0 and 1, got {}", name, rate));
            }
        }

        validate_brackets(&self.income_tax.brackets)?;

        if self.overtime.hourly_divisor <= Decimal::ZERO {
            return Err("overtime.hourly_divisor must be positive".to_string());
        }
        validate_tiers("overtime.weekday", &self.overtime.weekday)?;
        validate_tiers("overtime.holiday", &self.overtime.holiday)?;

        Ok(())
    }
}

fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), String> {
    let Some((last, bounded)) = brackets.split_last() else {
        return Err("income_tax.brackets must not be empty".to_string());
    };
    if last.up_to.is_some() {
        return Err("the last income tax bracket must be open-ended".to_string());
    }

    let mut previous = Decimal::ZERO;
    for bracket in bounded {
        match bracket.up_to {
            Some(limit) if limit > previous => previous = limit,
            Some(limit) => {
                return Err(format!(
                    "income tax bracket limits must ascend, {} follows {}",
                    limit, previous
                ));
            }
            None => return Err("only the last income tax bracket may be open-ended".to_string()),
        }
    }
    Ok(())
}

fn validate_tiers(name: &str, tiers: &[OvertimeTier]) -> Result<(), String> {
    let Some((last, bounded)) = tiers.split_last() else {
        return Err(format!("{} must not be empty", name));
    };
    if last.hours.is_some() {
        return Err(format!("the last tier of {} must be open-ended", name));
    }
    if bounded
        .iter()
        .any(|tier| tier.hours.is_none_or(|hours| hours <= Decimal::ZERO))
    {
        return Err(format!(
            "all but the last tier of {} need a positive hour bound",
            name
        ));
    }
    Ok(())
}

/// The complete statutory configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct StatutoryConfig {
    /// Regime metadata.
    metadata: RegimeMetadata,
    /// Rate tables by effective date (sorted oldest first).
    rates: Vec<StatutoryRates>,
}

impl StatutoryConfig {
    /// Creates a new StatutoryConfig from its component parts.
    pub fn new(metadata: RegimeMetadata, rates: Vec<StatutoryRates>) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            rates: sorted_rates,
        }
    }

    /// Returns the regime metadata.
    pub fn regime(&self) -> &RegimeMetadata {
        &self.metadata
    }

    /// Returns all rate tables, oldest first.
    pub fn rates(&self) -> &[StatutoryRates] {
        &self.rates
    }
}
