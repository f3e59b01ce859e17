//! Statutory Payroll Engine for Indonesian payroll
//!
//! This crate derives monthly payroll records (gross pay, BPJS contributions,
//! PPh 21 withholding and net pay) from an employee's compensation structure,
//! their attendance for the period and a versioned set of statutory rate tables.
//! It also enforces the Draft → Processed → Paid lifecycle of those records.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
