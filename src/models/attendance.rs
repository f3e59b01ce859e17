//! Attendance model.
//!
//! Attendance rows are owned by the attendance subsystem; the payroll engine
//! only reads the date, status and overtime hours of each row.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The attendance status recorded for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present and on time.
    Present,
    /// Absent without leave.
    Absent,
    /// Present but late.
    Late,
    /// Excused absence (izin).
    Excused,
    /// Sick leave.
    Sick,
    /// Approved annual leave (cuti).
    ApprovedLeave,
}

impl AttendanceStatus {
    /// Whether a day with this status counts as a present day.
    pub fn counts_as_present(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// One attendance row for an employee on a calendar date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = AttendanceRecord::new(
///     "emp_001",
///     NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///     AttendanceStatus::Late,
/// )
/// .with_overtime(Decimal::new(15, 1));
///
/// assert!(record.status.counts_as_present());
/// assert_eq!(record.overtime_hours, Decimal::new(15, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the row.
    pub id: Uuid,
    /// The employee the row belongs to.
    pub employee_id: String,
    /// The calendar date of the row.
    pub date: NaiveDate,
    /// The attendance status.
    pub status: AttendanceStatus,
    /// Clock-in time, if recorded.
    #[serde(default)]
    pub clock_in: Option<NaiveDateTime>,
    /// Clock-out time, if recorded.
    #[serde(default)]
    pub clock_out: Option<NaiveDateTime>,
    /// Approved overtime hours for the day.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Free-text note.
    #[serde(default)]
    pub notes: String,
}

impl AttendanceRecord {
    /// Creates a row without clock times or overtime.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            status,
            clock_in: None,
            clock_out: None,
            overtime_hours: Decimal::ZERO,
            notes: String::new(),
        }
    }

    /// Sets the overtime hours for the row.
    pub fn with_overtime(mut self, hours: Decimal) -> Self {
        self.overtime_hours = hours;
        self
    }

    /// Sets the clock-in and clock-out times for the row.
    pub fn with_clock(mut self, clock_in: NaiveDateTime, clock_out: NaiveDateTime) -> Self {
        self.clock_in = Some(clock_in);
        self.clock_out = Some(clock_out);
        self
    }
}
