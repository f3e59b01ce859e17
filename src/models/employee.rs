//! Employee model and related types.
//!
//! The engine only consumes a narrow view of an employee from the employee
//! directory: existence, marital status (for PTKP) and join date (for THR).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marital status as recorded for PTKP resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    /// Unmarried (TK).
    Single,
    /// Married (K).
    Married,
}

/// Represents an employee as seen by the payroll engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employee's full name.
    pub full_name: String,
    /// Marital status used to pick the PTKP threshold.
    pub marital_status: MaritalStatus,
    /// The date the employee joined the company.
    pub join_date: NaiveDate,
}

impl Employee {
    /// Returns true if the employee is married for tax purposes.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, MaritalStatus};
    /// use chrono::NaiveDate;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     full_name: "Siti Rahayu".to_string(),
    ///     marital_status: MaritalStatus::Married,
    ///     join_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
    /// };
    /// assert!(employee.is_married());
    /// ```
    pub fn is_married(&self) -> bool {
        self.marital_status == MaritalStatus::Married
    }
}
