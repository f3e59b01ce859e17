//! Overtime premium calculation.
//!
//! Overtime is paid per hour at a multiple of the hourly rate, where the
//! hourly rate is the monthly salary divided by 173. Hours are consumed tier
//! by tier until exhausted:
//!
//! - **Working day:** first hour at 1.5x, every further hour at 2x
//! - **Rest day / public holiday:** hours 1-7 at 2x, hour 8 at 3x, beyond at 4x
//!
//! The tiers themselves are data in [`OvertimeRules`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_currency;
use crate::config::{OvertimeRules, OvertimeTier};
use crate::models::AuditStep;

/// Pay earned inside one overtime tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeTierPay {
    /// Hours paid in this tier.
    pub hours: Decimal,
    /// Multiplier applied to the hourly rate.
    pub multiplier: Decimal,
    /// Unrounded amount for the tier.
    pub amount: Decimal,
}

/// The result of an overtime calculation.
#[derive(Debug, Clone)]
pub struct OvertimeResult {
    /// Monthly salary / hourly divisor.
    pub hourly_rate: Decimal,
    /// Per-tier breakdown; empty when no hours were worked.
    pub tiers: Vec<OvertimeTierPay>,
    /// Total overtime pay, rounded to whole currency units.
    pub overtime_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates overtime pay for a number of hours.
///
/// Zero or negative hours yield zero pay.
///
/// # Arguments
///
/// * `monthly_salary` - The salary the hourly rate is derived from
/// * `hours` - Total overtime hours
/// * `is_holiday` - Selects the rest day / holiday schedule instead of the working day one
/// * `rules` - Divisor and tier tables
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_overtime_pay;
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/id_2024").unwrap();
/// let rates = loader.rates_for(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
///
/// // hourly rate 100,000: 1h x 1.5 + 1.5h x 2
/// let result = calculate_overtime_pay(
///     Decimal::from(17_300_000),
///     Decimal::new(25, 1),
///     false,
///     &rates.overtime,
///     1,
/// );
/// assert_eq!(result.overtime_pay, Decimal::from(450_000));
/// ```
pub fn calculate_overtime_pay(
    monthly_salary: Decimal,
    hours: Decimal,
    is_holiday: bool,
    rules: &OvertimeRules,
    step_number: u32,
) -> OvertimeResult {
    let hourly_rate = monthly_salary / rules.hourly_divisor;
    let schedule = if is_holiday {
        &rules.holiday
    } else {
        &rules.weekday
    };
    let day_type = if is_holiday { "holiday" } else { "weekday" };

    let tiers = split_into_tiers(hours, schedule, hourly_rate);
    let total: Decimal = tiers.iter().map(|tier| tier.amount).sum();
    let overtime_pay = round_currency(total);

    let reasoning = if tiers.is_empty() {
        "No overtime hours recorded".to_string()
    } else {
        let parts: Vec<String> = tiers
            .iter()
            .map(|tier| {
                format!(
                    "{}h x {} x {}",
                    tier.hours.normalize(),
                    tier.multiplier.normalize(),
                    hourly_rate.round_dp(2).normalize()
                )
            })
            .collect();
        format!(
            "{} {} overtime hours: {} = {}",
            hours.normalize(),
            day_type,
            parts.join(" + "),
            overtime_pay.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_premium".to_string(),
        rule_name: "Overtime Premium".to_string(),
        regulation_ref: "PP 35/2021 art. 31".to_string(),
        input: serde_json::json!({
            "monthly_salary": monthly_salary.normalize().to_string(),
            "hours": hours.normalize().to_string(),
            "day_type": day_type
        }),
        output: serde_json::json!({
            "hourly_rate": hourly_rate.round_dp(2).normalize().to_string(),
            "overtime_pay": overtime_pay.normalize().to_string()
        }),
        reasoning,
    };

    OvertimeResult {
        hourly_rate,
        tiers,
        overtime_pay,
        audit_step,
    }
}

fn split_into_tiers(
    hours: Decimal,
    schedule: &[OvertimeTier],
    hourly_rate: Decimal,
) -> Vec<OvertimeTierPay> {
    let mut remaining = hours;
    let mut paid = Vec::new();

    for tier in schedule {
        if remaining <= Decimal::ZERO {
            break;
        }
        let tier_hours = match tier.hours {
            Some(bound) => remaining.min(bound),
            None => remaining,
        };
        paid.push(OvertimeTierPay {
            hours: tier_hours,
            multiplier: tier.multiplier,
            amount: tier_hours * tier.multiplier * hourly_rate,
        });
        remaining -= tier_hours;
    }

    paid
}
