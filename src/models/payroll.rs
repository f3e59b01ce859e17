//! Payroll record model and lifecycle.
//!
//! A [`PayrollRecord`] separates three kinds of data:
//!
//! - [`LockedFacts`]: figures fixed when the record is generated (attendance
//!   counts, basic salary, allowances and the three statutory deductions).
//!   Nothing after generation changes them, even if the employee's
//!   compensation is revised later.
//! - [`Adjustments`]: overtime pay, THR and other deductions, editable until
//!   the record is paid.
//! - [`PayrollTotals`]: gross, total deductions and net, always derived from
//!   the two above and rounded to whole currency units.
//!
//! Status changes follow the table in [`PayrollStatus::allowed_transitions`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditStep, PayPeriod};
use crate::calculation::round_currency;
use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payroll record.
///
/// ```text
/// Draft ──► Processed ──► Paid
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Generated, may be adjusted or deleted.
    Draft,
    /// Approved for payment, may still be adjusted.
    Processed,
    /// Paid out. Terminal.
    Paid,
}

impl PayrollStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processed => "processed",
            Self::Paid => "paid",
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Valid target statuses from this status.
    pub fn allowed_transitions(&self) -> &'static [PayrollStatus] {
        match self {
            Self::Draft => &[Self::Processed],
            Self::Processed => &[Self::Paid],
            Self::Paid => &[],
        }
    }

    /// Whether moving to `next` is allowed.
    pub fn can_transition_to(&self, next: PayrollStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl std::fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Figures fixed at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedFacts {
    /// Monday-Friday days in the period.
    pub working_days: u32,
    /// Days the employee was present or late.
    pub present_days: u32,
    /// Basic salary from the compensation structure.
    pub basic_salary: Decimal,
    /// Sum of the fixed allowances.
    pub total_allowances: Decimal,
    /// BPJS Kesehatan employee share.
    pub health_deduction: Decimal,
    /// BPJS Ketenagakerjaan employee share (JHT + JP).
    pub social_insurance_deduction: Decimal,
    /// PPh 21 monthly withholding.
    pub income_tax: Decimal,
}

/// Editable components of a payroll record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustments {
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Holiday bonus (Tunjangan Hari Raya).
    pub thr: Decimal,
    /// Deductions outside the statutory ones (loans, penalties).
    pub other_deductions: Decimal,
}

/// Derived totals, always whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Basic salary + allowances + overtime pay + THR.
    pub gross_salary: Decimal,
    /// Statutory deductions + other deductions.
    pub total_deductions: Decimal,
    /// Gross salary - total deductions, rounded from the unrounded figures.
    pub net_salary: Decimal,
}

impl PayrollTotals {
    /// Derives totals from locked facts and adjustments.
    ///
    /// Gross, total deductions and net are each rounded half away from zero
    /// from the unrounded figures, so with fractional adjustments net may
    /// differ by one unit from `gross_salary - total_deductions`.
    pub fn derive(facts: &LockedFacts, adjustments: &Adjustments) -> Self {
        let gross = facts.basic_salary
            + facts.total_allowances
            + adjustments.overtime_pay
            + adjustments.thr;
        let deductions = facts.health_deduction
            + facts.social_insurance_deduction
            + facts.income_tax
            + adjustments.other_deductions;

        Self {
            gross_salary: round_currency(gross),
            total_deductions: round_currency(deductions),
            net_salary: round_currency(gross - deductions),
        }
    }
}

/// A partial change to a payroll record's adjustments and notes.
///
/// Fields left as `None` are not touched. An empty `notes` string is treated
/// as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollUpdate {
    /// New overtime pay.
    #[serde(default)]
    pub overtime_pay: Option<Decimal>,
    /// New THR amount.
    #[serde(default)]
    pub thr: Option<Decimal>,
    /// New other deductions.
    #[serde(default)]
    pub other_deductions: Option<Decimal>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl PayrollUpdate {
    fn validate(&self) -> EngineResult<()> {
        let amounts = [
            ("overtime_pay", self.overtime_pay),
            ("thr", self.thr),
            ("other_deductions", self.other_deductions),
        ];
        for (field, amount) in amounts {
            if amount.is_some_and(|value| value < Decimal::ZERO) {
                return Err(EngineError::invalid_field(field, "must not be negative"));
            }
        }
        Ok(())
    }
}

/// The payroll of one employee for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The pay period.
    pub period: PayPeriod,
    facts: LockedFacts,
    adjustments: Adjustments,
    totals: PayrollTotals,
    status: PayrollStatus,
    paid_at: Option<DateTime<Utc>>,
    notes: String,
    audit_trace: Vec<AuditStep>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Creates a new draft record with derived totals.
    pub fn new_draft(
        employee_id: impl Into<String>,
        period: PayPeriod,
        facts: LockedFacts,
        adjustments: Adjustments,
        audit_trace: Vec<AuditStep>,
        now: DateTime<Utc>,
    ) -> Self {
        let totals = PayrollTotals::derive(&facts, &adjustments);
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            period,
            facts,
            adjustments,
            totals,
            status: PayrollStatus::Draft,
            paid_at: None,
            notes: String::new(),
            audit_trace,
            created_at: now,
            updated_at: now,
        }
    }

    /// Figures fixed at generation time.
    pub fn facts(&self) -> &LockedFacts {
        &self.facts
    }

    /// Editable components.
    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    /// Derived totals.
    pub fn totals(&self) -> &PayrollTotals {
        &self.totals
    }

    /// Current lifecycle status.
    pub fn status(&self) -> PayrollStatus {
        self.status
    }

    /// When the record was paid, if it has been.
    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// Free-text notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Ordered explanation of how the figures were reached.
    pub fn audit_trace(&self) -> &[AuditStep] {
        &self.audit_trace
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Step number the next audit step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.audit_trace
            .last()
            .map(|step| step.step_number + 1)
            .unwrap_or(1)
    }

    /// Applies a partial update and re-derives the totals.
    ///
    /// Locked facts are left untouched. Fails with
    /// [`EngineError::PayrollPaid`] once the record is paid, and with
    /// [`EngineError::InvalidField`] for negative amounts; in both cases the
    /// record is unchanged.
    pub fn apply_update(&mut self, changes: &PayrollUpdate, now: DateTime<Utc>) -> EngineResult<()> {
        if self.status == PayrollStatus::Paid {
            return Err(EngineError::PayrollPaid { id: self.id });
        }
        changes.validate()?;

        if let Some(overtime_pay) = changes.overtime_pay {
            self.adjustments.overtime_pay = overtime_pay;
        }
        if let Some(thr) = changes.thr {
            self.adjustments.thr = thr;
        }
        if let Some(other_deductions) = changes.other_deductions {
            self.adjustments.other_deductions = other_deductions;
        }
        if let Some(notes) = changes.notes.as_deref().filter(|notes| !notes.is_empty()) {
            self.notes = notes.to_string();
        }

        self.totals = PayrollTotals::derive(&self.facts, &self.adjustments);

        let step = AuditStep {
            step_number: self.next_step_number(),
            rule_id: "payroll_adjustment".to_string(),
            rule_name: "Payroll Adjustment".to_string(),
            regulation_ref: "Payroll lifecycle".to_string(),
            input: serde_json::json!({
                "overtime_pay": changes.overtime_pay.map(|v| v.normalize().to_string()),
                "thr": changes.thr.map(|v| v.normalize().to_string()),
                "other_deductions": changes.other_deductions.map(|v| v.normalize().to_string())
            }),
            output: serde_json::json!({
                "gross_salary": self.totals.gross_salary.normalize().to_string(),
                "total_deductions": self.totals.total_deductions.normalize().to_string(),
                "net_salary": self.totals.net_salary.normalize().to_string()
            }),
            reasoning: format!(
                "Adjustments applied while {}; statutory deductions kept from generation",
                self.status
            ),
        };
        self.audit_trace.push(step);
        self.updated_at = now;

        Ok(())
    }

    /// Moves the record to `next` if the transition table allows it.
    ///
    /// Entering [`PayrollStatus::Paid`] stamps `paid_at`.
    pub fn transition_to(&mut self, next: PayrollStatus, now: DateTime<Utc>) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        if next == PayrollStatus::Paid {
            self.paid_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the notes. Allowed in every status.
    pub fn annotate(&mut self, notes: impl Into<String>, now: DateTime<Utc>) {
        self.notes = notes.into();
        self.updated_at = now;
    }

    /// Fails unless the record is still a draft.
    pub fn ensure_deletable(&self) -> EngineResult<()> {
        if self.status != PayrollStatus::Draft {
            return Err(EngineError::DeleteNotAllowed {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    pub(crate) fn record_step(&mut self, step: AuditStep) {
        self.audit_trace.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn facts() -> LockedFacts {
        LockedFacts {
            working_days: 21,
            present_days: 20,
            basic_salary: dec("20000000"),
            total_allowances: dec("1500000"),
            health_deduction: dec("120000"),
            social_insurance_deduction: dec("500423"),
            income_tax: dec("1825000"),
        }
    }

    fn draft() -> PayrollRecord {
        PayrollRecord::new_draft(
            "emp_001",
            PayPeriod::new(3, 2024).unwrap(),
            facts(),
            Adjustments::default(),
            vec![],
            Utc::now(),
        )
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(
            PayrollStatus::Draft.allowed_transitions(),
            &[PayrollStatus::Processed]
        );
        assert_eq!(
            PayrollStatus::Processed.allowed_transitions(),
            &[PayrollStatus::Paid]
        );
        assert!(PayrollStatus::Paid.allowed_transitions().is_empty());
        assert!(PayrollStatus::Paid.is_terminal());
        assert!(!PayrollStatus::Draft.is_terminal());
    }

    #[test]
    fn test_no_reverse_or_skip_transitions() {
        assert!(!PayrollStatus::Draft.can_transition_to(PayrollStatus::Paid));
        assert!(!PayrollStatus::Draft.can_transition_to(PayrollStatus::Draft));
        assert!(!PayrollStatus::Processed.can_transition_to(PayrollStatus::Draft));
        assert!(!PayrollStatus::Paid.can_transition_to(PayrollStatus::Processed));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PayrollStatus::Processed).unwrap(),
            "\"processed\""
        );
        assert_eq!(PayrollStatus::Paid.to_string(), "paid");
    }

    #[test]
    fn test_new_draft_derives_totals() {
        let record = draft();
        assert_eq!(record.status(), PayrollStatus::Draft);
        assert_eq!(record.totals().gross_salary, dec("21500000"));
        assert_eq!(record.totals().total_deductions, dec("2445423"));
        assert_eq!(record.totals().net_salary, dec("19054577"));
        assert!(record.paid_at().is_none());
        assert_eq!(record.next_step_number(), 1);
    }

    #[test]
    fn test_totals_round_half_away_from_zero() {
        let mut facts = facts();
        facts.basic_salary = dec("20000000.50");
        let totals = PayrollTotals::derive(&facts, &Adjustments::default());
        assert_eq!(totals.gross_salary, dec("21500001"));
    }

    #[test]
    fn test_net_rounded_from_unrounded_gross_and_deductions() {
        let facts = LockedFacts {
            working_days: 21,
            present_days: 21,
            basic_salary: dec("10000000"),
            total_allowances: Decimal::ZERO,
            health_deduction: dec("100000"),
            social_insurance_deduction: dec("300000"),
            income_tax: Decimal::ZERO,
        };
        let mut record = PayrollRecord::new_draft(
            "emp_002",
            PayPeriod::new(3, 2024).unwrap(),
            facts,
            Adjustments::default(),
            vec![],
            Utc::now(),
        );
        let changes = PayrollUpdate {
            overtime_pay: Some(dec("0.5")),
            other_deductions: Some(dec("0.4")),
            ..Default::default()
        };

        record.apply_update(&changes, Utc::now()).unwrap();

        // 10,000,000.5 - 400,000.4 = 9,600,000.1
        assert_eq!(record.totals().gross_salary, dec("10000001"));
        assert_eq!(record.totals().total_deductions, dec("400000"));
        assert_eq!(record.totals().net_salary, dec("9600000"));
    }

    #[test]
    fn test_update_recomputes_with_thr_and_other_deductions() {
        let mut record = draft();
        let changes = PayrollUpdate {
            thr: Some(dec("20000000")),
            other_deductions: Some(dec("250000")),
            ..Default::default()
        };

        record.apply_update(&changes, Utc::now()).unwrap();

        assert_eq!(record.adjustments().thr, dec("20000000"));
        assert_eq!(record.totals().gross_salary, dec("41500000"));
        assert_eq!(record.totals().total_deductions, dec("2695423"));
        assert_eq!(record.totals().net_salary, dec("38804577"));
        // Statutory deductions are not recomputed for the higher gross.
        assert_eq!(record.facts().income_tax, dec("1825000"));
        assert_eq!(record.audit_trace().len(), 1);
        assert_eq!(record.audit_trace()[0].rule_id, "payroll_adjustment");
    }

    #[test]
    fn test_update_only_touches_supplied_fields() {
        let mut record = draft();
        record
            .apply_update(
                &PayrollUpdate {
                    overtime_pay: Some(dec("450000")),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        record
            .apply_update(
                &PayrollUpdate {
                    notes: Some("bonus pending".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(record.adjustments().overtime_pay, dec("450000"));
        assert_eq!(record.adjustments().thr, Decimal::ZERO);
        assert_eq!(record.notes(), "bonus pending");
    }

    #[test]
    fn test_empty_notes_are_ignored() {
        let mut record = draft();
        record.annotate("keep me", Utc::now());
        record
            .apply_update(
                &PayrollUpdate {
                    notes: Some(String::new()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(record.notes(), "keep me");
    }

    #[test]
    fn test_negative_adjustment_rejected_without_change() {
        let mut record = draft();
        let before = record.clone();

        let result = record.apply_update(
            &PayrollUpdate {
                other_deductions: Some(dec("-1")),
                ..Default::default()
            },
            Utc::now(),
        );

        match result {
            Err(EngineError::InvalidField { field, .. }) => assert_eq!(field, "other_deductions"),
            other => panic!("Expected InvalidField, got {:?}", other),
        }
        assert_eq!(record, before);
    }

    #[test]
    fn test_paid_record_rejects_update() {
        let mut record = draft();
        record.transition_to(PayrollStatus::Processed, Utc::now()).unwrap();
        record.transition_to(PayrollStatus::Paid, Utc::now()).unwrap();

        let result = record.apply_update(
            &PayrollUpdate {
                thr: Some(dec("1")),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::PayrollPaid { .. })));
    }

    #[test]
    fn test_paid_record_can_still_be_annotated() {
        let mut record = draft();
        record.transition_to(PayrollStatus::Processed, Utc::now()).unwrap();
        record.transition_to(PayrollStatus::Paid, Utc::now()).unwrap();

        record.annotate("transferred via BCA", Utc::now());
        assert_eq!(record.notes(), "transferred via BCA");
    }

    #[test]
    fn test_paid_transition_stamps_paid_at() {
        let mut record = draft();
        record.transition_to(PayrollStatus::Processed, Utc::now()).unwrap();
        assert!(record.paid_at().is_none());

        let paid_at = Utc::now();
        record.transition_to(PayrollStatus::Paid, paid_at).unwrap();
        assert_eq!(record.paid_at(), Some(paid_at));
        assert_eq!(record.status(), PayrollStatus::Paid);
    }

    #[test]
    fn test_skip_transition_rejected() {
        let mut record = draft();
        match record.transition_to(PayrollStatus::Paid, Utc::now()) {
            Err(EngineError::InvalidTransition { from, to }) => {
                assert_eq!(from, PayrollStatus::Draft);
                assert_eq!(to, PayrollStatus::Paid);
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
        assert_eq!(record.status(), PayrollStatus::Draft);
    }

    #[test]
    fn test_only_draft_is_deletable() {
        let mut record = draft();
        assert!(record.ensure_deletable().is_ok());

        record.transition_to(PayrollStatus::Processed, Utc::now()).unwrap();
        assert!(matches!(
            record.ensure_deletable(),
            Err(EngineError::DeleteNotAllowed {
                status: PayrollStatus::Processed,
                ..
            })
        ));
    }

    #[test]
    fn test_serialization_keeps_decimal_strings() {
        let record = draft();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "draft");
        assert_eq!(json["period"]["month"], 3);
        assert_eq!(json["totals"]["gross_salary"], "21500000");

        let parsed: PayrollRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    proptest! {
        #[test]
        fn prop_totals_are_whole_and_consistent(
            basic in 0i64..100_000_000_000,
            allowances in 0i64..10_000_000_000,
            overtime in 0i64..10_000_000_000,
            thr in 0i64..10_000_000_000,
            other in 0i64..10_000_000_000,
        ) {
            let mut facts = facts();
            facts.basic_salary = Decimal::new(basic, 2);
            facts.total_allowances = Decimal::new(allowances, 2);
            let adjustments = Adjustments {
                overtime_pay: Decimal::new(overtime, 2),
                thr: Decimal::new(thr, 2),
                other_deductions: Decimal::new(other, 2),
            };

            let totals = PayrollTotals::derive(&facts, &adjustments);

            prop_assert!(totals.gross_salary.fract().is_zero());
            prop_assert!(totals.total_deductions.fract().is_zero());
            prop_assert!(totals.net_salary.fract().is_zero());
            let drift = (totals.gross_salary - totals.total_deductions - totals.net_salary).abs();
            prop_assert!(drift <= Decimal::ONE);
        }
    }
}
