//! Storage collaborators consumed by the payroll engine.
//!
//! The engine owns no persistence of its own. Employees, compensation
//! structures, attendance rows and payroll records are reached through the
//! traits in this module; [`memory`] provides thread-safe in-memory
//! implementations used by tests and embedders that keep data in process.
//!
//! All methods take `&self` so a single store can be shared behind an `Arc`
//! by many concurrent callers.

pub mod memory;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, CompensationStructure, Employee, PayPeriod, PayrollRecord};

pub use memory::{InMemoryAttendance, InMemoryCompensation, InMemoryEmployees, InMemoryPayrollStore};

/// Read access to the employee directory.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by ID.
    fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>>;
}

/// Storage for compensation structures.
pub trait CompensationDirectory: Send + Sync {
    /// The structure with the most recent effective date for an employee.
    fn latest_for_employee(&self, employee_id: &str) -> EngineResult<Option<CompensationStructure>>;

    /// Looks up a structure by ID.
    fn find_structure(&self, id: Uuid) -> EngineResult<Option<CompensationStructure>>;

    /// All structures of an employee, most recent effective date first.
    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<CompensationStructure>>;

    /// Inserts or replaces a structure.
    fn save_structure(&self, structure: CompensationStructure) -> EngineResult<()>;
}

/// Read access to attendance rows.
pub trait AttendanceSource: Send + Sync {
    /// Rows of an employee dated inside the period.
    fn attendance_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>>;
}

/// A change applied to a stored payroll record.
///
/// Returning an error aborts the change and leaves the stored record as it
/// was.
pub type PayrollChange<'a> = &'a mut dyn FnMut(&mut PayrollRecord) -> EngineResult<()>;

/// Storage for payroll records.
///
/// Implementations must keep at most one record per (employee, period).
pub trait PayrollStore: Send + Sync {
    /// Looks up a record by ID.
    fn find(&self, id: Uuid) -> EngineResult<Option<PayrollRecord>>;

    /// Looks up the record of an employee for a period.
    fn find_for_period(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Option<PayrollRecord>>;

    /// Stores a record unless one already exists for its (employee, period).
    ///
    /// The check and the insert are atomic. Fails with
    /// [`EngineError::DuplicatePayroll`](crate::error::EngineError::DuplicatePayroll)
    /// when the key is taken.
    fn insert_if_absent(&self, record: PayrollRecord) -> EngineResult<PayrollRecord>;

    /// Applies `change` to a stored record and persists the result atomically.
    ///
    /// Fails with `PayrollNotFound` when the ID is unknown.
    fn update(&self, id: Uuid, change: PayrollChange<'_>) -> EngineResult<PayrollRecord>;

    /// Removes a record if `guard` accepts it, atomically.
    ///
    /// Fails with `PayrollNotFound` when the ID is unknown.
    fn delete(
        &self,
        id: Uuid,
        guard: &dyn Fn(&PayrollRecord) -> EngineResult<()>,
    ) -> EngineResult<PayrollRecord>;

    /// Records of an employee, newest period first.
    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>>;

    /// Records of a period, newest creation first.
    fn list_for_period(&self, period: &PayPeriod) -> EngineResult<Vec<PayrollRecord>>;

    /// Every record, newest period first.
    fn list_all(&self) -> EngineResult<Vec<PayrollRecord>>;
}
