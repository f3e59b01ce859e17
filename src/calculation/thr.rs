//! THR (Tunjangan Hari Raya) holiday bonus.
//!
//! Employees with a full year of service receive one monthly salary.
//! Shorter service is pro-rated by whole months.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::round_currency;
use crate::config::HolidayBonusRules;
use crate::models::AuditStep;

/// The result of a THR calculation.
#[derive(Debug, Clone)]
pub struct HolidayBonusResult {
    /// Whole months of service used.
    pub months_of_service: u32,
    /// Whether the full entitlement applied.
    pub full_entitlement: bool,
    /// The bonus amount.
    pub thr: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Whole calendar months between `join_date` and `as_of`, floored at zero.
///
/// Only the year and month of each date are compared, so joining on any day
/// of January and measuring on any day of March counts as 2 months.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::months_of_service;
/// use chrono::NaiveDate;
///
/// let join = NaiveDate::from_ymd_opt(2023, 10, 16).unwrap();
/// assert_eq!(months_of_service(join, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()), 6);
/// assert_eq!(months_of_service(join, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()), 0);
/// ```
pub fn months_of_service(join_date: NaiveDate, as_of: NaiveDate) -> u32 {
    let months = (as_of.year() - join_date.year()) * 12 + as_of.month() as i32
        - join_date.month() as i32;
    u32::try_from(months).unwrap_or(0)
}

/// Calculates the THR entitlement for a monthly salary.
///
/// - `months >= full_entitlement_months`: one monthly salary
/// - `months == 0`: nothing
/// - otherwise: `months / full_entitlement_months x salary`, rounded
pub fn calculate_holiday_bonus(
    monthly_salary: Decimal,
    months: u32,
    rules: &HolidayBonusRules,
    step_number: u32,
) -> HolidayBonusResult {
    let full_entitlement = months >= rules.full_entitlement_months;

    let (thr, reasoning) = if full_entitlement {
        (
            monthly_salary,
            format!(
                "{} months of service reaches {}; full monthly salary {}",
                months,
                rules.full_entitlement_months,
                monthly_salary.normalize()
            ),
        )
    } else if months == 0 {
        (
            Decimal::ZERO,
            "Less than one month of service; no THR".to_string(),
        )
    } else {
        let thr = round_currency(
            Decimal::from(months) / Decimal::from(rules.full_entitlement_months) * monthly_salary,
        );
        (
            thr,
            format!(
                "{}/{} x {} = {}",
                months,
                rules.full_entitlement_months,
                monthly_salary.normalize(),
                thr.normalize()
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "thr_entitlement".to_string(),
        rule_name: "THR Entitlement".to_string(),
        regulation_ref: "Permenaker 6/2016 art. 3".to_string(),
        input: serde_json::json!({
            "monthly_salary": monthly_salary.normalize().to_string(),
            "months_of_service": months
        }),
        output: serde_json::json!({
            "thr": thr.normalize().to_string(),
            "full_entitlement": full_entitlement
        }),
        reasoning,
    };

    HolidayBonusResult {
        months_of_service: months,
        full_entitlement,
        thr,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn rules() -> HolidayBonusRules {
        HolidayBonusRules {
            full_entitlement_months: 12,
        }
    }

    #[test]
    fn test_months_of_service_across_years() {
        assert_eq!(months_of_service(date(2022, 11, 30), date(2024, 3, 1)), 16);
        assert_eq!(months_of_service(date(2024, 3, 31), date(2024, 3, 1)), 0);
    }

    #[test]
    fn test_months_of_service_floored_at_zero() {
        assert_eq!(months_of_service(date(2025, 1, 1), date(2024, 12, 31)), 0);
    }

    #[test]
    fn test_full_year_gets_monthly_salary() {
        let result = calculate_holiday_bonus(dec("20000000"), 12, &rules(), 1);
        assert!(result.full_entitlement);
        assert_eq!(result.thr, dec("20000000"));

        let veteran = calculate_holiday_bonus(dec("20000000"), 40, &rules(), 1);
        assert_eq!(veteran.thr, dec("20000000"));
    }

    #[test]
    fn test_six_months_gets_half() {
        let result = calculate_holiday_bonus(dec("20000000"), 6, &rules(), 1);
        assert!(!result.full_entitlement);
        assert_eq!(result.thr, dec("10000000"));
        assert_eq!(result.audit_step.reasoning, "6/12 x 20000000 = 10000000");
    }

    #[test]
    fn test_no_service_gets_nothing() {
        let result = calculate_holiday_bonus(dec("20000000"), 0, &rules(), 1);
        assert_eq!(result.thr, Decimal::ZERO);
    }

    #[test]
    fn test_pro_rata_rounded() {
        // 5/12 x 7,000,000 = 2,916,666.67
        let result = calculate_holiday_bonus(dec("7000000"), 5, &rules(), 1);
        assert_eq!(result.thr, dec("2916667"));
    }
}
