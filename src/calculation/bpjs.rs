//! BPJS contribution calculation.
//!
//! Computes the eight monthly BPJS Kesehatan and BPJS Ketenagakerjaan
//! amounts from a basic salary:
//!
//! | Program | Basis                 | Employee | Employer |
//! |---------|-----------------------|----------|----------|
//! | Health  | salary, capped        | 1%       | 4%       |
//! | JHT     | salary                | 2%       | 3.7%     |
//! | JKK     | salary                | -        | 0.24%    |
//! | JKM     | salary                | -        | 0.3%     |
//! | JP      | salary, capped        | 1%       | 2%       |
//!
//! The percentages and caps come from [`BpjsRates`]. JKK uses the flat
//! lowest-risk class rate; risk tiering is not modelled.

use rust_decimal::Decimal;

use super::round_currency;
use crate::config::BpjsRates;
use crate::models::{AuditStep, ContributionSnapshot};

/// The result of a BPJS contribution calculation.
#[derive(Debug, Clone)]
pub struct BpjsResult {
    /// Salary basis used for BPJS Kesehatan after applying the cap.
    pub health_basis: Decimal,
    /// Salary basis used for JP after applying the cap.
    pub pension_basis: Decimal,
    /// The eight rounded contribution amounts.
    pub contributions: ContributionSnapshot,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates BPJS contributions for a monthly basic salary.
///
/// Every amount is rounded to the nearest whole currency unit on its own.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_bpjs;
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/id_2024").unwrap();
/// let rates = loader.rates_for(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
///
/// let result = calculate_bpjs(Decimal::from(20_000_000), &rates.bpjs, 1);
/// assert_eq!(result.contributions.health_employee, Decimal::from(120_000));
/// assert_eq!(result.contributions.jp_employee, Decimal::from(100_423));
/// ```
pub fn calculate_bpjs(basic_salary: Decimal, rates: &BpjsRates, step_number: u32) -> BpjsResult {
    let health_basis = basic_salary.min(rates.health.salary_cap);
    let pension_basis = basic_salary.min(rates.pension.salary_cap);

    let contributions = ContributionSnapshot {
        health_employee: round_currency(health_basis * rates.health.employee_rate),
        health_employer: round_currency(health_basis * rates.health.employer_rate),
        jht_employee: round_currency(basic_salary * rates.old_age_savings.employee_rate),
        jht_employer: round_currency(basic_salary * rates.old_age_savings.employer_rate),
        jkk: round_currency(basic_salary * rates.work_accident_rate),
        jkm: round_currency(basic_salary * rates.death_benefit_rate),
        jp_employee: round_currency(pension_basis * rates.pension.employee_rate),
        jp_employer: round_currency(pension_basis * rates.pension.employer_rate),
    };

    let capped: Vec<&str> = [
        ("health", basic_salary > rates.health.salary_cap),
        ("pension", basic_salary > rates.pension.salary_cap),
    ]
    .into_iter()
    .filter_map(|(name, over)| over.then_some(name))
    .collect();

    let reasoning = if capped.is_empty() {
        format!(
            "All programs use basic salary {} as basis; employee pays {}, employer pays {}",
            basic_salary.normalize(),
            contributions.employee_total().normalize(),
            contributions.employer_total().normalize()
        )
    } else {
        format!(
            "Basic salary {} exceeds the {} cap; employee pays {}, employer pays {}",
            basic_salary.normalize(),
            capped.join(" and "),
            contributions.employee_total().normalize(),
            contributions.employer_total().normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "bpjs_contributions".to_string(),
        rule_name: "BPJS Contributions".to_string(),
        regulation_ref: "Perpres 82/2018 art. 30; PP 44/2015; PP 45/2015; PP 46/2015".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.normalize().to_string(),
            "health_cap": rates.health.salary_cap.normalize().to_string(),
            "pension_cap": rates.pension.salary_cap.normalize().to_string()
        }),
        output: serde_json::json!({
            "health_basis": health_basis.normalize().to_string(),
            "pension_basis": pension_basis.normalize().to_string(),
            "health_employee": contributions.health_employee.normalize().to_string(),
            "health_employer": contributions.health_employer.normalize().to_string(),
            "jht_employee": contributions.jht_employee.normalize().to_string(),
            "jht_employer": contributions.jht_employer.normalize().to_string(),
            "jkk": contributions.jkk.normalize().to_string(),
            "jkm": contributions.jkm.normalize().to_string(),
            "jp_employee": contributions.jp_employee.normalize().to_string(),
            "jp_employer": contributions.jp_employer.normalize().to_string()
        }),
        reasoning,
    };

    BpjsResult {
        health_basis,
        pension_basis,
        contributions,
        audit_step,
    }
}
