//! Calculation logic for the payroll engine.
//!
//! Every calculator is a pure function over explicit inputs and a rate table
//! from [`crate::config`]. Each returns its result together with an
//! [`AuditStep`](crate::models::AuditStep) explaining the figure, which the
//! payroll service collects into the record's audit trace.

mod attendance;
mod bpjs;
mod income_tax;
mod overtime;
mod rounding;
mod thr;

pub use attendance::{AttendanceSummary, aggregate_attendance, count_working_days};
pub use bpjs::{BpjsResult, calculate_bpjs};
pub use income_tax::{BracketTax, IncomeTaxResult, calculate_monthly_tax, resolve_ptkp};
pub use overtime::{OvertimeResult, OvertimeTierPay, calculate_overtime_pay};
pub use rounding::round_currency;
pub use thr::{HolidayBonusResult, calculate_holiday_bonus, months_of_service};
