//! Audit trail model.
//!
//! Every calculator records one [`AuditStep`] describing the rule it applied,
//! its inputs and outputs, so a payroll record can explain how each figure
//! was reached.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "pph21_progressive".to_string(),
///     rule_name: "PPh 21 Progressive Withholding".to_string(),
///     regulation_ref: "UU 7/2021 art. 17".to_string(),
///     input: serde_json::json!({"annual_gross": "240000000"}),
///     output: serde_json::json!({"monthly_tax": "1825000"}),
///     reasoning: "Taxable income 186000000 spans two brackets".to_string(),
/// };
/// assert_eq!(step.step_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the regulation behind the rule.
    pub regulation_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 3,
            rule_id: "overtime_premium".to_string(),
            rule_name: "Overtime Premium".to_string(),
            regulation_ref: "Kepmenakertrans 102/MEN/VI/2004 art. 11".to_string(),
            input: serde_json::json!({"hours": "2.5"}),
            output: serde_json::json!({"overtime_pay": "450000"}),
            reasoning: "2.5 weekday hours".to_string(),
        };

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step_number"], 3);
        assert_eq!(json["rule_id"], "overtime_premium");
        assert_eq!(json["output"]["overtime_pay"], "450000");

        let parsed: AuditStep = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, step);
    }
}
