//! Payroll generation and lifecycle.
//!
//! [`PayrollService::generate`] turns an employee's compensation structure
//! and attendance for a month into a draft [`PayrollRecord`]. The remaining
//! operations read records and move them through
//! `Draft -> Processed -> Paid`.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::compensation::resolve_compensation;
use crate::calculation::{
    aggregate_attendance, calculate_holiday_bonus, calculate_monthly_tax, calculate_overtime_pay,
    months_of_service, resolve_ptkp,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Adjustments, AuditStep, CompensationStructure, LockedFacts, PayPeriod, PayrollRecord,
    PayrollStatus, PayrollUpdate,
};
use crate::store::{AttendanceSource, CompensationDirectory, EmployeeDirectory, PayrollStore};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Dependents counted for PTKP during generation.
const PTKP_DEPENDENTS: u32 = 0;

/// Computes payroll records and enforces their lifecycle.
#[derive(Clone)]
pub struct PayrollService {
    config: Arc<ConfigLoader>,
    employees: Arc<dyn EmployeeDirectory>,
    compensation: Arc<dyn CompensationDirectory>,
    attendance: Arc<dyn AttendanceSource>,
    payrolls: Arc<dyn PayrollStore>,
}

impl PayrollService {
    /// Creates a service over the given configuration and stores.
    pub fn new(
        config: Arc<ConfigLoader>,
        employees: Arc<dyn EmployeeDirectory>,
        compensation: Arc<dyn CompensationDirectory>,
        attendance: Arc<dyn AttendanceSource>,
        payrolls: Arc<dyn PayrollStore>,
    ) -> Self {
        Self {
            config,
            employees,
            compensation,
            attendance,
            payrolls,
        }
    }

    /// Generates the draft payroll of an employee for `month`/`year`.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` / `InvalidField` for a bad month, year or empty employee ID
    /// - `EmployeeNotFound` when the employee is unknown
    /// - `DuplicatePayroll` when a record already exists for the period,
    ///   including one stored concurrently while this one was computed
    /// - `CompensationNotFound` when the employee has no salary set
    /// - `RatesNotFound` when no rate table covers the period; the host must
    ///   ship a rate version effective on or before the first day of every
    ///   period it generates, even when employee and salary data exist
    ///
    /// Nothing is written unless every step succeeds.
    pub fn generate(&self, employee_id: &str, month: u32, year: i32) -> EngineResult<PayrollRecord> {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            employee_id = %employee_id,
            month,
            year,
            "Generating payroll"
        );

        let start_time = Instant::now();
        match self.build_and_store(employee_id, month, year) {
            Ok(record) => {
                info!(
                    correlation_id = %correlation_id,
                    payroll_id = %record.id,
                    employee_id = %record.employee_id,
                    period = %record.period,
                    gross_salary = %record.totals().gross_salary,
                    net_salary = %record.totals().net_salary,
                    duration_us = start_time.elapsed().as_micros(),
                    "Payroll generated"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    employee_id = %employee_id,
                    error = %err,
                    "Payroll generation rejected"
                );
                Err(err)
            }
        }
    }

    fn build_and_store(&self, employee_id: &str, month: u32, year: i32) -> EngineResult<PayrollRecord> {
        let period = PayPeriod::new(month, year)?;
        if employee_id.trim().is_empty() {
            return Err(EngineError::invalid_field("employee_id", "must not be empty"));
        }

        let employee = self
            .employees
            .find_employee(employee_id)?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;

        if self.payrolls.find_for_period(employee_id, &period)?.is_some() {
            return Err(EngineError::DuplicatePayroll {
                employee_id: employee_id.to_string(),
                month,
                year,
            });
        }

        let structure = resolve_compensation(self.compensation.as_ref(), employee_id)?;
        let rates = self.config.rates_for_period(&period)?;
        let rows = self.attendance.attendance_for_period(employee_id, &period)?;
        debug!(
            employee_id = %employee_id,
            period = %period,
            structure_id = %structure.id,
            rates_effective = %rates.effective_date,
            attendance_rows = rows.len(),
            "Resolved payroll inputs"
        );

        let attendance = aggregate_attendance(&period, &rows, 1);
        let basic_salary = structure.basic_salary;
        let total_allowances = structure.allowances.total();
        let overtime = calculate_overtime_pay(
            basic_salary,
            attendance.total_overtime_hours,
            false,
            &rates.overtime,
            2,
        );
        let gross_salary = basic_salary + total_allowances + overtime.overtime_pay;

        let snapshot_step = contribution_snapshot_step(&structure, 3);
        let ptkp = resolve_ptkp(employee.marital_status, PTKP_DEPENDENTS, &rates.ptkp);
        let tax = calculate_monthly_tax(gross_salary * MONTHS_PER_YEAR, ptkp, &rates.income_tax, 4);

        let facts = LockedFacts {
            working_days: attendance.working_days,
            present_days: attendance.present_days,
            basic_salary,
            total_allowances,
            health_deduction: structure.contributions.health_employee,
            social_insurance_deduction: structure.contributions.social_insurance_employee(),
            income_tax: tax.monthly_tax,
        };
        let adjustments = Adjustments {
            overtime_pay: overtime.overtime_pay,
            ..Default::default()
        };
        let audit_trace = vec![
            attendance.audit_step,
            overtime.audit_step,
            snapshot_step,
            tax.audit_step,
        ];

        let mut record = PayrollRecord::new_draft(
            employee_id,
            period,
            facts,
            adjustments,
            audit_trace,
            Utc::now(),
        );
        let totals_step = totals_step(&record, 5);
        record.record_step(totals_step);

        self.payrolls.insert_if_absent(record)
    }

    /// Fetches a record by ID.
    pub fn get(&self, id: Uuid) -> EngineResult<PayrollRecord> {
        self.payrolls
            .find(id)?
            .ok_or(EngineError::PayrollNotFound { id })
    }

    /// Records of an employee, newest period first.
    pub fn list_by_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        self.payrolls.list_for_employee(employee_id)
    }

    /// Records of a period, newest first.
    pub fn list_by_period(&self, month: u32, year: i32) -> EngineResult<Vec<PayrollRecord>> {
        let period = PayPeriod::new(month, year)?;
        self.payrolls.list_for_period(&period)
    }

    /// Every record, newest period first.
    pub fn list_all(&self) -> EngineResult<Vec<PayrollRecord>> {
        self.payrolls.list_all()
    }

    /// Paid records of an employee, newest period first.
    pub fn list_paid_by_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let mut records = self.payrolls.list_for_employee(employee_id)?;
        records.retain(|record| record.status() == PayrollStatus::Paid);
        Ok(records)
    }

    /// Changes adjustments and notes of a record that is not yet paid.
    ///
    /// Locked facts are kept; totals are re-derived.
    pub fn update(&self, id: Uuid, changes: &PayrollUpdate) -> EngineResult<PayrollRecord> {
        let now = Utc::now();
        let record = self
            .payrolls
            .update(id, &mut |record| record.apply_update(changes, now))
            .map_err(|err| rejected("update", id, err))?;

        info!(
            payroll_id = %id,
            gross_salary = %record.totals().gross_salary,
            net_salary = %record.totals().net_salary,
            "Payroll updated"
        );
        Ok(record)
    }

    /// Replaces the notes of a record in any status.
    pub fn annotate(&self, id: Uuid, notes: &str) -> EngineResult<PayrollRecord> {
        let now = Utc::now();
        self.payrolls
            .update(id, &mut |record| {
                record.annotate(notes, now);
                Ok(())
            })
            .map_err(|err| rejected("annotate", id, err))
    }

    /// Sets the THR of a record from the employee's service up to `as_of`.
    ///
    /// Uses the record's basic salary and the THR rules effective on
    /// `as_of`. Fails like [`update`](Self::update) once the record is paid.
    pub fn apply_holiday_bonus(&self, id: Uuid, as_of: NaiveDate) -> EngineResult<PayrollRecord> {
        self.apply_bonus(id, as_of)
            .map_err(|err| rejected("apply_holiday_bonus", id, err))
    }

    fn apply_bonus(&self, id: Uuid, as_of: NaiveDate) -> EngineResult<PayrollRecord> {
        let current = self.get(id)?;
        let employee = self
            .employees
            .find_employee(&current.employee_id)?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: current.employee_id.clone(),
            })?;
        let rates = self.config.rates_for(as_of)?;

        let months = months_of_service(employee.join_date, as_of);
        let bonus = calculate_holiday_bonus(
            current.facts().basic_salary,
            months,
            &rates.holiday_bonus,
            0,
        );
        let changes = PayrollUpdate {
            thr: Some(bonus.thr),
            ..Default::default()
        };

        let now = Utc::now();
        let record = self.payrolls.update(id, &mut |record| {
            let mut step = bonus.audit_step.clone();
            step.step_number = record.next_step_number();
            record.record_step(step);
            record.apply_update(&changes, now)
        })?;

        info!(
            payroll_id = %id,
            months_of_service = months,
            thr = %bonus.thr,
            "Holiday bonus applied"
        );
        Ok(record)
    }

    /// Moves a record to `next` following the allowed-transitions table.
    pub fn transition(&self, id: Uuid, next: PayrollStatus) -> EngineResult<PayrollRecord> {
        let now = Utc::now();
        let record = self
            .payrolls
            .update(id, &mut |record| record.transition_to(next, now))
            .map_err(|err| rejected("transition", id, err))?;

        info!(payroll_id = %id, status = %record.status(), "Payroll status changed");
        Ok(record)
    }

    /// Deletes a draft record.
    pub fn delete(&self, id: Uuid) -> EngineResult<()> {
        let removed = self
            .payrolls
            .delete(id, &|record| record.ensure_deletable())
            .map_err(|err| rejected("delete", id, err))?;

        info!(
            payroll_id = %id,
            employee_id = %removed.employee_id,
            period = %removed.period,
            "Payroll deleted"
        );
        Ok(())
    }
}

fn rejected(operation: &str, id: Uuid, err: EngineError) -> EngineError {
    warn!(operation, payroll_id = %id, error = %err, "Payroll operation rejected");
    err
}

fn contribution_snapshot_step(structure: &CompensationStructure, step_number: u32) -> AuditStep {
    let contributions = &structure.contributions;
    AuditStep {
        step_number,
        rule_id: "bpjs_snapshot".to_string(),
        rule_name: "BPJS Employee Deductions".to_string(),
        regulation_ref: "Perpres 82/2018 art. 30; PP 46/2015; PP 45/2015".to_string(),
        input: serde_json::json!({
            "structure_id": structure.id.to_string(),
            "effective_date": structure.effective_date.to_string()
        }),
        output: serde_json::json!({
            "health_deduction": contributions.health_employee.normalize().to_string(),
            "social_insurance_deduction": contributions.social_insurance_employee().normalize().to_string()
        }),
        reasoning: format!(
            "Employee shares copied from the structure effective {}: health {}, JHT {} + JP {}",
            structure.effective_date,
            contributions.health_employee.normalize(),
            contributions.jht_employee.normalize(),
            contributions.jp_employee.normalize()
        ),
    }
}

fn totals_step(record: &PayrollRecord, step_number: u32) -> AuditStep {
    let facts = record.facts();
    let totals = record.totals();
    AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        regulation_ref: "UU 13/2003 art. 88".to_string(),
        input: serde_json::json!({
            "basic_salary": facts.basic_salary.normalize().to_string(),
            "total_allowances": facts.total_allowances.normalize().to_string(),
            "overtime_pay": record.adjustments().overtime_pay.normalize().to_string(),
            "health_deduction": facts.health_deduction.normalize().to_string(),
            "social_insurance_deduction": facts.social_insurance_deduction.normalize().to_string(),
            "income_tax": facts.income_tax.normalize().to_string()
        }),
        output: serde_json::json!({
            "gross_salary": totals.gross_salary.normalize().to_string(),
            "total_deductions": totals.total_deductions.normalize().to_string(),
            "net_salary": totals.net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Net {} = gross {} - deductions {}",
            totals.net_salary.normalize(),
            totals.gross_salary.normalize(),
            totals.total_deductions.normalize()
        ),
    }
}
