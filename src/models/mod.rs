//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod compensation;
mod employee;
mod pay_period;
mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use audit::AuditStep;
pub use compensation::{Allowances, CompensationStructure, ContributionSnapshot};
pub use employee::{Employee, MaritalStatus};
pub use pay_period::PayPeriod;
pub use payroll::{
    Adjustments, LockedFacts, PayrollRecord, PayrollStatus, PayrollTotals, PayrollUpdate,
};
