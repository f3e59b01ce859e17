//! Attendance aggregation for a pay period.
//!
//! Reduces an employee's attendance rows to the three figures payroll needs:
//! working days in the period, days present and total overtime hours.

use chrono::{Datelike, Weekday};
use rust_decimal::Decimal;

use crate::models::{AttendanceRecord, AuditStep, PayPeriod};

/// Attendance figures for one employee and period.
#[derive(Debug, Clone)]
pub struct AttendanceSummary {
    /// Monday-Friday days in the period.
    pub working_days: u32,
    /// Rows whose status is present or late.
    pub present_days: u32,
    /// Overtime hours summed over every row, whatever its status.
    pub total_overtime_hours: Decimal,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Counts the Monday-Friday dates in a period.
///
/// Public holidays are not subtracted.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::count_working_days;
/// use payroll_engine::models::PayPeriod;
///
/// assert_eq!(count_working_days(&PayPeriod::new(3, 2024).unwrap()), 21);
/// assert_eq!(count_working_days(&PayPeriod::new(2, 2024).unwrap()), 21);
/// ```
pub fn count_working_days(period: &PayPeriod) -> u32 {
    let count = period
        .days()
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count();
    // A month has at most 23 weekdays.
    count as u32
}

/// Aggregates attendance rows for a period.
///
/// Rows dated outside the period are ignored.
pub fn aggregate_attendance(
    period: &PayPeriod,
    records: &[AttendanceRecord],
    step_number: u32,
) -> AttendanceSummary {
    let working_days = count_working_days(period);

    let in_period: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|record| period.contains_date(record.date))
        .collect();

    let present_days = in_period
        .iter()
        .filter(|record| record.status.counts_as_present())
        .count() as u32;
    let total_overtime_hours: Decimal = in_period
        .iter()
        .map(|record| record.overtime_hours)
        .sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_aggregation".to_string(),
        rule_name: "Attendance Aggregation".to_string(),
        regulation_ref: "UU 13/2003 art. 77".to_string(),
        input: serde_json::json!({
            "period": period.to_string(),
            "rows": in_period.len()
        }),
        output: serde_json::json!({
            "working_days": working_days,
            "present_days": present_days,
            "total_overtime_hours": total_overtime_hours.normalize().to_string()
        }),
        reasoning: format!(
            "{} of {} working days present, {} overtime hours across {} rows",
            present_days,
            working_days,
            total_overtime_hours.normalize(),
            in_period.len()
        ),
    };

    AttendanceSummary {
        working_days,
        present_days,
        total_overtime_hours,
        audit_step,
    }
}
