use serde::Serialize;

use super::domain::{LoanAction, LoanId, LoanStatus};
use super::progress::{MilestoneStep, RejectionDisplay};
use super::record::LoanRecord;

/// Repository entry pairing a loan identifier with its approval state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanEntry {
    pub loan_id: LoanId,
    pub record: LoanRecord,
}

impl LoanEntry {
    pub fn status_view(&self, display: RejectionDisplay) -> LoanStatusView {
        let status = self.record.status();
        LoanStatusView {
            loan_id: self.loan_id.clone(),
            status: status.label(),
            suggested_amount: self.record.suggested_amount(),
            steps: display.steps(status),
            actions: status.available_actions().to_vec(),
            outcome: status.outcome_label(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait LoanRepository: Send + Sync {
    fn insert(&self, entry: LoanEntry) -> Result<LoanEntry, RepositoryError>;
    /// Replace the stored entry only while its status is still `expected`.
    ///
    /// The status check and the write are atomic; a mismatch yields
    /// [`RepositoryError::StatusChanged`].
    fn update(&self, entry: LoanEntry, expected: LoanStatus) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LoanId) -> Result<Option<LoanEntry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("loan already exists")]
    Conflict,
    #[error("loan not found")]
    NotFound,
    #[error("loan is now {found}")]
    StatusChanged { found: LoanStatus },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// What the approval screen renders for one loan.
#[derive(Debug, Clone, Serialize)]
pub struct LoanStatusView {
    pub loan_id: LoanId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_amount: Option<f64>,
    pub steps: Vec<MilestoneStep>,
    pub actions: Vec<LoanAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
}
