//! PPh 21 income tax withholding.
//!
//! This module provides PTKP resolution and the progressive bracket
//! calculation applied to annualized gross income.
//!
//! ## Bracket Structure
//!
//! Taxable income (annual gross - PTKP) is split across ascending brackets;
//! each bracket taxes only the slice of income that falls inside it:
//!
//! | Cumulative limit | Rate |
//! |------------------|------|
//! | 60,000,000       | 5%   |
//! | 250,000,000      | 15%  |
//! | 500,000,000      | 25%  |
//! | 5,000,000,000    | 30%  |
//! | above            | 35%  |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_currency;
use crate::config::{IncomeTaxRates, PtkpRates};
use crate::models::{AuditStep, MaritalStatus};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Tax levied inside one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTax {
    /// Lower bound of the bracket (exclusive of income below it).
    pub lower: Decimal,
    /// Upper bound of the bracket, `None` for the top bracket.
    pub upper: Option<Decimal>,
    /// Marginal rate of the bracket.
    pub rate: Decimal,
    /// Portion of taxable income that fell inside the bracket.
    pub taxable_amount: Decimal,
    /// Tax on that portion.
    pub tax: Decimal,
}

/// The result of a monthly PPh 21 calculation.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Annualized gross income.
    pub annual_gross: Decimal,
    /// PTKP threshold applied.
    pub ptkp: Decimal,
    /// Annual gross - PTKP, floored at zero.
    pub taxable_income: Decimal,
    /// Unrounded annual tax.
    pub annual_tax: Decimal,
    /// Annual tax / 12, rounded to whole currency units.
    pub monthly_tax: Decimal,
    /// Per-bracket breakdown; empty when nothing is taxable.
    pub brackets: Vec<BracketTax>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Resolves the annual PTKP threshold.
///
/// Married taxpayers start from the married base; every dependent up to
/// `max_dependents` adds `per_dependent`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_ptkp;
/// use payroll_engine::config::PtkpRates;
/// use payroll_engine::models::MaritalStatus;
/// use rust_decimal::Decimal;
///
/// let rates = PtkpRates {
///     single: Decimal::from(54_000_000),
///     married: Decimal::from(58_500_000),
///     per_dependent: Decimal::from(4_500_000),
///     max_dependents: 3,
/// };
///
/// assert_eq!(resolve_ptkp(MaritalStatus::Single, 0, &rates), Decimal::from(54_000_000));
/// assert_eq!(resolve_ptkp(MaritalStatus::Married, 5, &rates), Decimal::from(72_000_000));
/// ```
pub fn resolve_ptkp(status: MaritalStatus, dependents: u32, rates: &PtkpRates) -> Decimal {
    let base = match status {
        MaritalStatus::Single => rates.single,
        MaritalStatus::Married => rates.married,
    };
    base + rates.per_dependent * Decimal::from(dependents.min(rates.max_dependents))
}

/// Calculates the monthly PPh 21 withholding for an annualized gross income.
///
/// When annual gross does not exceed PTKP the tax is zero and the bracket
/// breakdown is empty.
///
/// # Arguments
///
/// * `annual_gross` - Monthly gross salary multiplied by 12
/// * `ptkp` - Annual non-taxable threshold from [`resolve_ptkp`]
/// * `rates` - The bracket table; the last bracket must be open-ended
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_monthly_tax;
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/id_2024").unwrap();
/// let rates = loader.rates_for(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
///
/// let result = calculate_monthly_tax(
///     Decimal::from(240_000_000),
///     Decimal::from(54_000_000),
///     &rates.income_tax,
///     1,
/// );
/// assert_eq!(result.taxable_income, Decimal::from(186_000_000));
/// assert_eq!(result.monthly_tax, Decimal::from(1_825_000));
/// ```
pub fn calculate_monthly_tax(
    annual_gross: Decimal,
    ptkp: Decimal,
    rates: &IncomeTaxRates,
    step_number: u32,
) -> IncomeTaxResult {
    let taxable_income = (annual_gross - ptkp).max(Decimal::ZERO);

    let mut brackets = Vec::new();
    let mut annual_tax = Decimal::ZERO;
    let mut remaining = taxable_income;
    let mut lower = Decimal::ZERO;

    for bracket in &rates.brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let taxable_amount = match bracket.up_to {
            Some(upper) => remaining.min(upper - lower),
            None => remaining,
        };
        let tax = taxable_amount * bracket.rate;

        brackets.push(BracketTax {
            lower,
            upper: bracket.up_to,
            rate: bracket.rate,
            taxable_amount,
            tax,
        });

        annual_tax += tax;
        remaining -= taxable_amount;
        if let Some(upper) = bracket.up_to {
            lower = upper;
        }
    }

    let monthly_tax = round_currency(annual_tax / MONTHS_PER_YEAR);

    let reasoning = if brackets.is_empty() {
        format!(
            "Annual gross {} does not exceed PTKP {}; no tax withheld",
            annual_gross.normalize(),
            ptkp.normalize()
        )
    } else {
        let slices: Vec<String> = brackets
            .iter()
            .map(|b| {
                format!(
                    "{} x {}% = {}",
                    b.taxable_amount.normalize(),
                    (b.rate * Decimal::ONE_HUNDRED).normalize(),
                    b.tax.normalize()
                )
            })
            .collect();
        format!(
            "Taxable {} = {} - PTKP {}; {}; annual tax {} / 12 = {}",
            taxable_income.normalize(),
            annual_gross.normalize(),
            ptkp.normalize(),
            slices.join(", "),
            annual_tax.normalize(),
            monthly_tax.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "pph21_progressive".to_string(),
        rule_name: "PPh 21 Progressive Withholding".to_string(),
        regulation_ref: "UU 7/2021 art. 17".to_string(),
        input: serde_json::json!({
            "annual_gross": annual_gross.normalize().to_string(),
            "ptkp": ptkp.normalize().to_string()
        }),
        output: serde_json::json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "annual_tax": annual_tax.normalize().to_string(),
            "monthly_tax": monthly_tax.normalize().to_string(),
            "brackets_used": brackets.len()
        }),
        reasoning,
    };

    IncomeTaxResult {
        annual_gross,
        ptkp,
        taxable_income,
        annual_tax,
        monthly_tax,
        brackets,
        audit_step,
    }
}
