//! Compensation structures: creation, revision and resolution.
//!
//! Statutory contributions are computed once, when a structure is created or
//! its basic salary is revised, and stored on the structure as a
//! [`ContributionSnapshot`](crate::models::ContributionSnapshot). Payroll
//! generation copies the snapshot instead of recomputing it.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_bpjs;
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{Allowances, CompensationStructure, ContributionSnapshot};
use crate::store::{CompensationDirectory, EmployeeDirectory};

/// Returns the structure the engine should use for an employee.
///
/// This is the structure with the most recent effective date, whatever the
/// pay period being computed.
pub fn resolve_compensation(
    directory: &dyn CompensationDirectory,
    employee_id: &str,
) -> EngineResult<CompensationStructure> {
    directory
        .latest_for_employee(employee_id)?
        .ok_or_else(|| EngineError::CompensationNotFound {
            employee_id: employee_id.to_string(),
        })
}

/// Input for a new compensation structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompensation {
    /// The employee the structure belongs to.
    pub employee_id: String,
    /// Monthly basic salary; must be positive.
    pub basic_salary: Decimal,
    /// Fixed monthly allowances.
    #[serde(default)]
    pub allowances: Allowances,
    /// The date from which the structure applies.
    pub effective_date: NaiveDate,
}

/// A partial revision of a compensation structure.
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompensationRevision {
    /// New basic salary.
    #[serde(default)]
    pub basic_salary: Option<Decimal>,
    /// New transport allowance.
    #[serde(default)]
    pub transport: Option<Decimal>,
    /// New meal allowance.
    #[serde(default)]
    pub meal: Option<Decimal>,
    /// New housing allowance.
    #[serde(default)]
    pub housing: Option<Decimal>,
    /// New position allowance.
    #[serde(default)]
    pub position: Option<Decimal>,
    /// New effective date.
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
}

/// Manages compensation structures.
#[derive(Clone)]
pub struct CompensationService {
    config: Arc<ConfigLoader>,
    employees: Arc<dyn EmployeeDirectory>,
    compensation: Arc<dyn CompensationDirectory>,
}

impl CompensationService {
    /// Creates a service over the given configuration and stores.
    pub fn new(
        config: Arc<ConfigLoader>,
        employees: Arc<dyn EmployeeDirectory>,
        compensation: Arc<dyn CompensationDirectory>,
    ) -> Self {
        Self {
            config,
            employees,
            compensation,
        }
    }

    /// Creates a structure and snapshots its statutory contributions.
    ///
    /// The contributions use the rates effective on the structure's
    /// effective date.
    pub fn create(&self, request: NewCompensation) -> EngineResult<CompensationStructure> {
        let result = self.create_structure(request);
        if let Err(err) = &result {
            warn!(error = %err, "Compensation structure rejected");
        }
        result
    }

    fn create_structure(&self, request: NewCompensation) -> EngineResult<CompensationStructure> {
        if request.employee_id.trim().is_empty() {
            return Err(EngineError::invalid_field("employee_id", "must not be empty"));
        }
        validate_salary(request.basic_salary)?;
        validate_allowances(&request.allowances)?;

        if self.employees.find_employee(&request.employee_id)?.is_none() {
            return Err(EngineError::EmployeeNotFound {
                employee_id: request.employee_id,
            });
        }

        let contributions = self.snapshot(request.basic_salary, request.effective_date)?;
        let now = Utc::now();
        let structure = CompensationStructure {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            basic_salary: request.basic_salary,
            allowances: request.allowances,
            contributions,
            effective_date: request.effective_date,
            created_at: now,
            updated_at: now,
        };
        self.compensation.save_structure(structure.clone())?;

        info!(
            structure_id = %structure.id,
            employee_id = %structure.employee_id,
            basic_salary = %structure.basic_salary,
            effective_date = %structure.effective_date,
            "Compensation structure created"
        );
        Ok(structure)
    }

    /// Applies a revision to a stored structure.
    ///
    /// The contribution snapshot is recomputed only when the basic salary
    /// changes; allowance or effective date revisions keep it.
    pub fn revise(&self, id: Uuid, revision: &CompensationRevision) -> EngineResult<CompensationStructure> {
        let result = self.revise_structure(id, revision);
        if let Err(err) = &result {
            warn!(structure_id = %id, error = %err, "Compensation revision rejected");
        }
        result
    }

    fn revise_structure(
        &self,
        id: Uuid,
        revision: &CompensationRevision,
    ) -> EngineResult<CompensationStructure> {
        let mut structure = self
            .compensation
            .find_structure(id)?
            .ok_or(EngineError::CompensationStructureNotFound { id })?;

        let allowances = &mut structure.allowances;
        for (field, value, target) in [
            ("transport", revision.transport, &mut allowances.transport),
            ("meal", revision.meal, &mut allowances.meal),
            ("housing", revision.housing, &mut allowances.housing),
            ("position", revision.position, &mut allowances.position),
        ] {
            if let Some(amount) = value {
                if amount < Decimal::ZERO {
                    return Err(EngineError::invalid_field(field, "must not be negative"));
                }
                *target = amount;
            }
        }

        if let Some(effective_date) = revision.effective_date {
            structure.effective_date = effective_date;
        }

        let salary_changed = match revision.basic_salary {
            Some(salary) => {
                validate_salary(salary)?;
                let changed = salary != structure.basic_salary;
                structure.basic_salary = salary;
                changed
            }
            None => false,
        };
        if salary_changed {
            structure.contributions = self.snapshot(structure.basic_salary, structure.effective_date)?;
        }

        structure.updated_at = Utc::now();
        self.compensation.save_structure(structure.clone())?;

        info!(
            structure_id = %structure.id,
            employee_id = %structure.employee_id,
            contributions_recomputed = salary_changed,
            "Compensation structure revised"
        );
        Ok(structure)
    }

    /// All structures of an employee, most recent effective date first.
    pub fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<CompensationStructure>> {
        self.compensation.list_for_employee(employee_id)
    }

    /// The structure currently in force for an employee.
    pub fn current_for_employee(&self, employee_id: &str) -> EngineResult<CompensationStructure> {
        resolve_compensation(self.compensation.as_ref(), employee_id)
    }

    fn snapshot(
        &self,
        basic_salary: Decimal,
        effective_date: NaiveDate,
    ) -> EngineResult<ContributionSnapshot> {
        let rates = self.config.rates_for(effective_date)?;
        Ok(calculate_bpjs(basic_salary, &rates.bpjs, 1).contributions)
    }
}

fn validate_salary(basic_salary: Decimal) -> EngineResult<()> {
    if basic_salary <= Decimal::ZERO {
        return Err(EngineError::invalid_field("basic_salary", "must be positive"));
    }
    Ok(())
}

fn validate_allowances(allowances: &Allowances) -> EngineResult<()> {
    let fields = [
        ("transport", allowances.transport),
        ("meal", allowances.meal),
        ("housing", allowances.housing),
        ("position", allowances.position),
    ];
    match fields.into_iter().find(|(_, amount)| *amount < Decimal::ZERO) {
        Some((field, _)) => Err(EngineError::invalid_field(field, "must not be negative")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Employee, MaritalStatus};
    use crate::store::{InMemoryCompensation, InMemoryEmployees};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn service() -> CompensationService {
        let config = Arc::new(ConfigLoader::load("./config/id_2024").unwrap());
        let employees = InMemoryEmployees::new();
        employees
            .insert(Employee {
                id: "emp_001".to_string(),
                full_name: "Agus Pratama".to_string(),
                marital_status: MaritalStatus::Married,
                join_date: date(2021, 2, 1),
            })
            .unwrap();
        CompensationService::new(
            config,
            Arc::new(employees),
            Arc::new(InMemoryCompensation::new()),
        )
    }

    fn request(salary: &str, effective_date: NaiveDate) -> NewCompensation {
        NewCompensation {
            employee_id: "emp_001".to_string(),
            basic_salary: dec(salary),
            allowances: Allowances {
                transport: dec("500000"),
                meal: dec("750000"),
                ..Default::default()
            },
            effective_date,
        }
    }

    #[test]
    fn test_create_snapshots_contributions() {
        let service = service();
        let structure = service.create(request("20000000", date(2024, 1, 1))).unwrap();

        assert_eq!(structure.contributions.health_employee, dec("120000"));
        assert_eq!(structure.contributions.jp_employee, dec("100423"));
        assert_eq!(structure.contributions.social_insurance_employee(), dec("500423"));
    }

    #[test]
    fn test_snapshot_uses_rates_effective_on_structure_date() {
        let service = service();
        let structure = service.create(request("20000000", date(2023, 6, 1))).unwrap();

        // 2023 pension cap 9,559,600
        assert_eq!(structure.contributions.jp_employee, dec("95596"));
    }

    #[test]
    fn test_create_rejects_unknown_employee() {
        let service = service();
        let mut req = request("20000000", date(2024, 1, 1));
        req.employee_id = "emp_404".to_string();

        let err = service.create(req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_create_rejects_non_positive_salary() {
        let service = service();
        let err = service.create(request("0", date(2024, 1, 1))).unwrap_err();
        match err {
            EngineError::InvalidField { field, .. } => assert_eq!(field, "basic_salary"),
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_negative_allowance() {
        let service = service();
        let mut req = request("20000000", date(2024, 1, 1));
        req.allowances.housing = dec("-1");

        let err = service.create(req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_revise_salary_recomputes_snapshot() {
        let service = service();
        let created = service.create(request("5000000", date(2024, 1, 1))).unwrap();

        let revised = service
            .revise(
                created.id,
                &CompensationRevision {
                    basic_salary: Some(dec("20000000")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(revised.contributions.health_employee, dec("120000"));
        assert_eq!(revised.allowances, created.allowances);
    }

    #[test]
    fn test_revise_allowances_keeps_snapshot() {
        let service = service();
        let created = service.create(request("5000000", date(2024, 1, 1))).unwrap();

        let revised = service
            .revise(
                created.id,
                &CompensationRevision {
                    position: Some(dec("1000000")),
                    effective_date: Some(date(2023, 1, 1)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(revised.allowances.position, dec("1000000"));
        assert_eq!(revised.allowances.total(), dec("2250000"));
        assert_eq!(revised.contributions, created.contributions);
    }

    #[test]
    fn test_revise_unknown_structure() {
        let service = service();
        let err = service
            .revise(Uuid::new_v4(), &CompensationRevision::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::CompensationStructureNotFound { .. }));
    }

    #[test]
    fn test_current_is_latest_effective_date() {
        let service = service();
        service.create(request("8000000", date(2023, 1, 1))).unwrap();
        service.create(request("9000000", date(2024, 7, 1))).unwrap();

        let current = service.current_for_employee("emp_001").unwrap();
        assert_eq!(current.basic_salary, dec("9000000"));
        assert_eq!(service.list_for_employee("emp_001").unwrap().len(), 2);
    }

    #[test]
    fn test_resolve_without_structure() {
        let err = service().current_for_employee("emp_001").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Salary not found for employee 'emp_001', please set salary first"
        );
    }
}
