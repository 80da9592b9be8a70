use serde::Serialize;

use super::domain::{LoanAction, LoanError, LoanStatus};

/// Approval state of one loan application.
///
/// Records open as [`LoanStatus::Inactive`] and only change through [`LoanRecord::suggest`],
/// [`LoanRecord::approve`] and [`LoanRecord::reject`]. Each transition returns a new record and
/// leaves the receiver untouched, so a failed call never mutates anything. The suggested amount
/// is present exactly when the loan has left `Inactive`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanRecord {
    status: LoanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_amount: Option<f64>,
}

impl Default for LoanRecord {
    fn default() -> Self {
        Self::open()
    }
}

impl LoanRecord {
    pub const fn open() -> Self {
        Self {
            status: LoanStatus::Inactive,
            suggested_amount: None,
        }
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn suggested_amount(&self) -> Option<f64> {
        self.suggested_amount
    }

    pub fn suggest(&self, amount: Option<f64>) -> Result<Self, LoanError> {
        self.require(LoanStatus::Inactive, LoanAction::Suggest)?;

        let amount = amount
            .filter(|value| value.is_finite() && *value > 0.0)
            .ok_or(LoanError::InvalidAmount)?;

        Ok(Self {
            status: LoanStatus::Suggested,
            suggested_amount: Some(amount),
        })
    }

    pub fn approve(&self) -> Result<Self, LoanError> {
        self.decide(LoanStatus::Approved, LoanAction::Approve)
    }

    pub fn reject(&self) -> Result<Self, LoanError> {
        self.decide(LoanStatus::Rejected, LoanAction::Reject)
    }

    /// Apply `action` by name, used by callers that receive the action as data.
    pub fn apply(&self, action: LoanAction, amount: Option<f64>) -> Result<Self, LoanError> {
        match action {
            LoanAction::Suggest => self.suggest(amount),
            LoanAction::Approve => self.approve(),
            LoanAction::Reject => self.reject(),
        }
    }

    fn decide(&self, outcome: LoanStatus, action: LoanAction) -> Result<Self, LoanError> {
        self.require(LoanStatus::Suggested, action)?;
        Ok(Self {
            status: outcome,
            suggested_amount: self.suggested_amount,
        })
    }

    fn require(&self, expected: LoanStatus, action: LoanAction) -> Result<(), LoanError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(LoanError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}
