use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for loan records held by the approval service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(pub String);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Approval status of a single loan.
///
/// `Approved` and `Rejected` are terminal and both branch from `Suggested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Inactive,
    Suggested,
    Approved,
    Rejected,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Suggested => "suggested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Actions the approval screen may offer from this status.
    pub const fn available_actions(self) -> &'static [LoanAction] {
        match self {
            Self::Inactive => &[LoanAction::Suggest],
            Self::Suggested => &[LoanAction::Approve, LoanAction::Reject],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Banner text shown once a decision has been made.
    pub const fn outcome_label(self) -> Option<&'static str> {
        match self {
            Self::Approved => Some("Loan Approved"),
            Self::Rejected => Some("Loan Rejected"),
            Self::Inactive | Self::Suggested => None,
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transition requested against a loan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanAction {
    Suggest,
    Approve,
    Reject,
}

impl LoanAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Suggest => "suggest",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for LoanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named stage rendered in the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Inactive,
    Suggested,
    Approved,
}

impl Milestone {
    pub const fn ordered() -> [Self; 3] {
        [Self::Inactive, Self::Suggested, Self::Approved]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Inactive => 0,
            Self::Suggested => 1,
            Self::Approved => 2,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Suggested => "Suggested",
            Self::Approved => "Approved",
        }
    }
}

/// Rendered state of one milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepView {
    Wait,
    Process,
    Finish,
    Error,
}

/// Errors raised by loan status transitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoanError {
    #[error("cannot {action} a loan that is {from}")]
    InvalidTransition { from: LoanStatus, action: LoanAction },
    #[error("suggested amount must be a positive number")]
    InvalidAmount,
}
