//! Compensation structure model.
//!
//! A [`CompensationStructure`] holds an employee's basic salary, fixed
//! allowances and a snapshot of the statutory contributions computed from
//! that salary when the structure was created or revised.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed monthly allowances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowances {
    /// Transport allowance.
    #[serde(default)]
    pub transport: Decimal,
    /// Meal allowance.
    #[serde(default)]
    pub meal: Decimal,
    /// Housing allowance.
    #[serde(default)]
    pub housing: Decimal,
    /// Position allowance.
    #[serde(default)]
    pub position: Decimal,
}

impl Allowances {
    /// Sum of the four allowances.
    pub fn total(&self) -> Decimal {
        self.transport + self.meal + self.housing + self.position
    }
}

/// BPJS contributions computed from a basic salary, in whole currency units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSnapshot {
    /// BPJS Kesehatan, employee share.
    pub health_employee: Decimal,
    /// BPJS Kesehatan, employer share.
    pub health_employer: Decimal,
    /// JHT, employee share.
    pub jht_employee: Decimal,
    /// JHT, employer share.
    pub jht_employer: Decimal,
    /// JKK, employer-paid.
    pub jkk: Decimal,
    /// JKM, employer-paid.
    pub jkm: Decimal,
    /// JP, employee share.
    pub jp_employee: Decimal,
    /// JP, employer share.
    pub jp_employer: Decimal,
}

impl ContributionSnapshot {
    /// The BPJS Ketenagakerjaan amount withheld from the employee (JHT + JP).
    pub fn social_insurance_employee(&self) -> Decimal {
        self.jht_employee + self.jp_employee
    }

    /// Everything withheld from the employee's pay.
    pub fn employee_total(&self) -> Decimal {
        self.health_employee + self.social_insurance_employee()
    }

    /// Everything the employer pays on top of salary.
    pub fn employer_total(&self) -> Decimal {
        self.health_employer + self.jht_employer + self.jkk + self.jkm + self.jp_employer
    }
}

/// An employee's compensation as of an effective date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationStructure {
    /// Unique identifier for the structure.
    pub id: Uuid,
    /// The employee the structure belongs to.
    pub employee_id: String,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Fixed monthly allowances.
    pub allowances: Allowances,
    /// Contributions snapshotted from `basic_salary`.
    pub contributions: ContributionSnapshot,
    /// The date from which this structure applies.
    pub effective_date: NaiveDate,
    /// When the structure was created.
    pub created_at: DateTime<Utc>,
    /// When the structure was last changed.
    pub updated_at: DateTime<Utc>,
}
