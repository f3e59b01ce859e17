//! Error types for the Statutory Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing and managing
//! payroll records.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PayrollStatus;

/// Broad category of an [`EngineError`].
///
/// Callers that map engine failures onto their own transport (HTTP status
/// codes, CLI exit codes) should match on the kind rather than on individual
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The operation clashes with existing state.
    Conflict,
    /// The caller supplied malformed input.
    Validation,
    /// The statutory configuration is missing or malformed.
    Config,
    /// The storage backend failed.
    Storage,
}

/// The main error type for the Statutory Payroll Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_404");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No statutory rate table is effective on the given date.
    #[error("No statutory rates effective on {date}")]
    RatesNotFound {
        /// The date for which rates were requested.
        date: NaiveDate,
    },

    /// The employee does not exist in the employee directory.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The requested employee ID.
        employee_id: String,
    },

    /// The employee has no compensation structure.
    #[error("Salary not found for employee '{employee_id}', please set salary first")]
    CompensationNotFound {
        /// The employee without a compensation structure.
        employee_id: String,
    },

    /// A compensation structure with the given ID does not exist.
    #[error("Compensation structure not found: {id}")]
    CompensationStructureNotFound {
        /// The requested structure ID.
        id: Uuid,
    },

    /// A payroll record with the given ID does not exist.
    #[error("Payroll not found: {id}")]
    PayrollNotFound {
        /// The requested payroll ID.
        id: Uuid,
    },

    /// A payroll record already exists for the employee and period.
    #[error("Payroll already exists for employee '{employee_id}' in period {month:02}/{year}")]
    DuplicatePayroll {
        /// The employee the record belongs to.
        employee_id: String,
        /// The period month (1-12).
        month: u32,
        /// The period year.
        year: i32,
    },

    /// The requested status change is not in the allowed-transitions table.
    #[error("Invalid payroll status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PayrollStatus,
        /// The requested status.
        to: PayrollStatus,
    },

    /// A financial mutation was attempted on a paid payroll record.
    #[error("Payroll '{id}' is paid and can no longer be changed")]
    PayrollPaid {
        /// The payroll ID.
        id: Uuid,
    },

    /// Deletion was attempted on a payroll record that is not a draft.
    #[error("Payroll '{id}' is {status}; only draft payroll can be deleted")]
    DeleteNotAllowed {
        /// The payroll ID.
        id: Uuid,
        /// The current status.
        status: PayrollStatus,
    },

    /// The month/year pair does not denote a valid pay period.
    #[error("Invalid pay period: month {month}, year {year}")]
    InvalidPeriod {
        /// The supplied month.
        month: u32,
        /// The supplied year.
        year: i32,
    },

    /// A request field was missing or malformed.
    #[error("Invalid field '{field}': {message}")]
    InvalidField {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } => ErrorKind::Config,
            Self::RatesNotFound { .. }
            | Self::EmployeeNotFound { .. }
            | Self::CompensationNotFound { .. }
            | Self::CompensationStructureNotFound { .. }
            | Self::PayrollNotFound { .. } => ErrorKind::NotFound,
            Self::DuplicatePayroll { .. }
            | Self::InvalidTransition { .. }
            | Self::PayrollPaid { .. }
            | Self::DeleteNotAllowed { .. } => ErrorKind::Conflict,
            Self::InvalidPeriod { .. } | Self::InvalidField { .. } => ErrorKind::Validation,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/regime.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/regime.yaml"
        );
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_compensation_not_found_asks_for_salary() {
        let error = EngineError::CompensationNotFound {
            employee_id: "emp_001".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Salary not found for employee 'emp_001', please set salary first"
        );
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_duplicate_payroll_displays_padded_period() {
        let error = EngineError::DuplicatePayroll {
            employee_id: "emp_001".to_string(),
            month: 3,
            year: 2024,
        };
        assert_eq!(
            error.to_string(),
            "Payroll already exists for employee 'emp_001' in period 03/2024"
        );
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_invalid_transition_displays_statuses() {
        let error = EngineError::InvalidTransition {
            from: PayrollStatus::Draft,
            to: PayrollStatus::Paid,
        };
        assert_eq!(
            error.to_string(),
            "Invalid payroll status transition from draft to paid"
        );
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_delete_not_allowed_is_conflict() {
        let error = EngineError::DeleteNotAllowed {
            id: Uuid::nil(),
            status: PayrollStatus::Processed,
        };
        assert!(error.to_string().contains("processed"));
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_validation_kinds() {
        let period = EngineError::InvalidPeriod {
            month: 13,
            year: 2024,
        };
        assert_eq!(period.to_string(), "Invalid pay period: month 13, year 2024");
        assert_eq!(period.kind(), ErrorKind::Validation);

        let field = EngineError::invalid_field("employee_id", "must not be empty");
        assert_eq!(
            field.to_string(),
            "Invalid field 'employee_id': must not be empty"
        );
        assert_eq!(field.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rates_not_found_displays_date() {
        let error = EngineError::RatesNotFound {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(error.to_string(), "No statutory rates effective on 2020-01-01");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_storage_error() -> EngineResult<()> {
            Err(EngineError::Storage {
                message: "lock poisoned".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_storage_error()?;
            Ok(())
        }

        let err = propagates_error().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
