//! Pay period model.
//!
//! A [`PayPeriod`] is the (month, year) pair identifying one pay cycle per
//! employee. It can only be built through validation, so every period in the
//! engine denotes a real calendar month.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Wire form of a pay period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PeriodParts {
    month: u32,
    year: i32,
}

/// A calendar month for which payroll is computed.
///
/// Periods order chronologically.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(2, 2024).unwrap();
/// assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(period.days().count(), 29);
///
/// assert!(PayPeriod::new(13, 2024).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PeriodParts", into = "PeriodParts")]
pub struct PayPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl PayPeriod {
    /// Builds the period for `month` (1-12) of `year`.
    ///
    /// Fails with [`EngineError::InvalidPeriod`] when the month is outside
    /// 1-12 or the month cannot be represented as a calendar date range.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriod { month, year };

        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    /// Returns the period containing `date`.
    pub fn containing(date: NaiveDate) -> EngineResult<Self> {
        Self::new(date.month(), date.year())
    }

    /// The month of the period (1-12).
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// The year of the period.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// The first calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// The last calendar day of the period.
    pub fn last_day(&self) -> NaiveDate {
        self.end
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterates over every calendar day of the period in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl std::fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month(), self.year())
    }
}

impl TryFrom<PeriodParts> for PayPeriod {
    type Error = EngineError;

    fn try_from(parts: PeriodParts) -> Result<Self, Self::Error> {
        Self::new(parts.month, parts.year)
    }
}

impl From<PayPeriod> for PeriodParts {
    fn from(period: PayPeriod) -> Self {
        Self {
            month: period.month(),
            year: period.year(),
        }
    }
}
