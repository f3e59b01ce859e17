//! In-memory store implementations.
//!
//! Each store keeps its data behind a [`std::sync::RwLock`]. A poisoned lock
//! is reported as [`EngineError::Storage`].

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use super::{
    AttendanceSource, CompensationDirectory, EmployeeDirectory, PayrollChange, PayrollStore,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, CompensationStructure, Employee, PayPeriod, PayrollRecord};

fn poisoned<T>(_: PoisonError<T>) -> EngineError {
    EngineError::Storage {
        message: "lock poisoned".to_string(),
    }
}

/// In-memory employee directory.
#[derive(Debug, Default)]
pub struct InMemoryEmployees {
    employees: RwLock<HashMap<String, Employee>>,
}

impl InMemoryEmployees {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn insert(&self, employee: Employee) -> EngineResult<()> {
        let mut employees = self.employees.write().map_err(poisoned)?;
        employees.insert(employee.id.clone(), employee);
        Ok(())
    }
}

impl EmployeeDirectory for InMemoryEmployees {
    fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        let employees = self.employees.read().map_err(poisoned)?;
        Ok(employees.get(employee_id).cloned())
    }
}

/// In-memory compensation directory.
#[derive(Debug, Default)]
pub struct InMemoryCompensation {
    structures: RwLock<HashMap<Uuid, CompensationStructure>>,
}

impl InMemoryCompensation {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompensationDirectory for InMemoryCompensation {
    fn latest_for_employee(&self, employee_id: &str) -> EngineResult<Option<CompensationStructure>> {
        let structures = self.structures.read().map_err(poisoned)?;
        Ok(structures
            .values()
            .filter(|s| s.employee_id == employee_id)
            .max_by_key(|s| (s.effective_date, s.created_at))
            .cloned())
    }

    fn find_structure(&self, id: Uuid) -> EngineResult<Option<CompensationStructure>> {
        let structures = self.structures.read().map_err(poisoned)?;
        Ok(structures.get(&id).cloned())
    }

    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<CompensationStructure>> {
        let structures = self.structures.read().map_err(poisoned)?;
        let mut list: Vec<CompensationStructure> = structures
            .values()
            .filter(|s| s.employee_id == employee_id)
            .cloned()
            .collect();
        list.sort_by_key(|s| Reverse((s.effective_date, s.created_at)));
        Ok(list)
    }

    fn save_structure(&self, structure: CompensationStructure) -> EngineResult<()> {
        let mut structures = self.structures.write().map_err(poisoned)?;
        structures.insert(structure.id, structure);
        Ok(())
    }
}

/// In-memory attendance rows.
#[derive(Debug, Default)]
pub struct InMemoryAttendance {
    rows: RwLock<Vec<AttendanceRecord>>,
}

impl InMemoryAttendance {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn record(&self, row: AttendanceRecord) -> EngineResult<()> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.push(row);
        Ok(())
    }
}

impl AttendanceSource for InMemoryAttendance {
    fn attendance_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut matching: Vec<AttendanceRecord> = rows
            .iter()
            .filter(|row| row.employee_id == employee_id && period.contains_date(row.date))
            .cloned()
            .collect();
        matching.sort_by_key(|row| row.date);
        Ok(matching)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PeriodKey {
    employee_id: String,
    period: PayPeriod,
}

impl PeriodKey {
    fn of(record: &PayrollRecord) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            period: record.period,
        }
    }
}

#[derive(Debug, Default)]
struct PayrollTables {
    records: HashMap<Uuid, PayrollRecord>,
    by_period: HashMap<PeriodKey, Uuid>,
}

/// In-memory payroll store.
///
/// Records are indexed by ID and by (employee, period); both indexes change
/// under one write lock, so the uniqueness check in
/// [`PayrollStore::insert_if_absent`] cannot race.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    tables: RwLock<PayrollTables>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.tables.read().map_err(poisoned)?.records.len())
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    fn newest_period_first(records: &mut [PayrollRecord]) {
        records.sort_by_key(|r| Reverse((r.period, r.created_at())));
    }
}

impl PayrollStore for InMemoryPayrollStore {
    fn find(&self, id: Uuid) -> EngineResult<Option<PayrollRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.records.get(&id).cloned())
    }

    fn find_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Option<PayrollRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let key = PeriodKey {
            employee_id: employee_id.to_string(),
            period: *period,
        };
        Ok(tables
            .by_period
            .get(&key)
            .and_then(|id| tables.records.get(id))
            .cloned())
    }

    fn insert_if_absent(&self, record: PayrollRecord) -> EngineResult<PayrollRecord> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let key = PeriodKey::of(&record);

        if tables.by_period.contains_key(&key) {
            return Err(EngineError::DuplicatePayroll {
                employee_id: record.employee_id,
                month: record.period.month(),
                year: record.period.year(),
            });
        }

        tables.by_period.insert(key, record.id);
        tables.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, id: Uuid, change: PayrollChange<'_>) -> EngineResult<PayrollRecord> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let stored = tables
            .records
            .get_mut(&id)
            .ok_or(EngineError::PayrollNotFound { id })?;

        let mut draft = stored.clone();
        change(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }

    fn delete(
        &self,
        id: Uuid,
        guard: &dyn Fn(&PayrollRecord) -> EngineResult<()>,
    ) -> EngineResult<PayrollRecord> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let record = tables
            .records
            .get(&id)
            .ok_or(EngineError::PayrollNotFound { id })?;
        guard(record)?;

        let key = PeriodKey::of(record);
        tables.by_period.remove(&key);
        tables
            .records
            .remove(&id)
            .ok_or(EngineError::PayrollNotFound { id })
    }

    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut records: Vec<PayrollRecord> = tables
            .records
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        Self::newest_period_first(&mut records);
        Ok(records)
    }

    fn list_for_period(&self, period: &PayPeriod) -> EngineResult<Vec<PayrollRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut records: Vec<PayrollRecord> = tables
            .records
            .values()
            .filter(|r| r.period == *period)
            .cloned()
            .collect();
        records.sort_by_key(|r| Reverse(r.created_at()));
        Ok(records)
    }

    fn list_all(&self) -> EngineResult<Vec<PayrollRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut records: Vec<PayrollRecord> = tables.records.values().cloned().collect();
        Self::newest_period_first(&mut records);
        Ok(records)
    }
}
