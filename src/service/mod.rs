//! Orchestration over the calculators and stores.
//!
//! - [`CompensationService`] creates and revises compensation structures and
//!   takes their statutory contribution snapshot.
//! - [`PayrollService`] generates payroll records and drives their lifecycle.
//!
//! Both are cheap to clone and safe to share across threads.

mod compensation;
mod payroll;

pub use compensation::{
    CompensationRevision, CompensationService, NewCompensation, resolve_compensation,
};
pub use payroll::PayrollService;
