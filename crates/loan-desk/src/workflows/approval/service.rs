use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{LoanAction, LoanError, LoanId};
use super::progress::RejectionDisplay;
use super::record::LoanRecord;
use super::repository::{LoanEntry, LoanRepository, LoanStatusView, RepositoryError};

/// Service driving loan records through the approval workflow.
pub struct LoanApprovalService<R> {
    repository: Arc<R>,
    display: RejectionDisplay,
}

static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_loan_id() -> LoanId {
    let id = LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LoanId(format!("loan-{id:06}"))
}

impl<R> LoanApprovalService<R>
where
    R: LoanRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_display(repository, RejectionDisplay::default())
    }

    pub fn with_display(repository: Arc<R>, display: RejectionDisplay) -> Self {
        Self {
            repository,
            display,
        }
    }

    pub fn display(&self) -> RejectionDisplay {
        self.display
    }

    /// Open a new loan application in the `Inactive` state.
    pub fn open(&self) -> Result<LoanEntry, LoanServiceError> {
        let entry = LoanEntry {
            loan_id: next_loan_id(),
            record: LoanRecord::open(),
        };

        let stored = self.repository.insert(entry)?;
        info!(loan_id = %stored.loan_id, "loan application opened");
        Ok(stored)
    }

    pub fn suggest(
        &self,
        loan_id: &LoanId,
        amount: Option<f64>,
    ) -> Result<LoanEntry, LoanServiceError> {
        self.transition(loan_id, LoanAction::Suggest, amount)
    }

    pub fn approve(&self, loan_id: &LoanId) -> Result<LoanEntry, LoanServiceError> {
        self.transition(loan_id, LoanAction::Approve, None)
    }

    pub fn reject(&self, loan_id: &LoanId) -> Result<LoanEntry, LoanServiceError> {
        self.transition(loan_id, LoanAction::Reject, None)
    }

    pub fn get(&self, loan_id: &LoanId) -> Result<LoanEntry, LoanServiceError> {
        let entry = self
            .repository
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(entry)
    }

    /// Render the stored loan with this service's rejection display.
    pub fn view(&self, entry: &LoanEntry) -> LoanStatusView {
        entry.status_view(self.display)
    }

    fn transition(
        &self,
        loan_id: &LoanId,
        action: LoanAction,
        amount: Option<f64>,
    ) -> Result<LoanEntry, LoanServiceError> {
        let mut entry = self.get(loan_id)?;
        let from = entry.record.status();

        let next = entry.record.apply(action, amount).map_err(|err| {
            warn!(loan_id = %loan_id, %action, status = %from, error = %err, "loan transition refused");
            err
        })?;

        entry.record = next;
        match self.repository.update(entry.clone(), from) {
            Ok(()) => {}
            Err(RepositoryError::StatusChanged { found }) => {
                warn!(loan_id = %loan_id, %action, status = %found, "loan changed while deciding");
                return Err(LoanError::InvalidTransition {
                    from: found,
                    action,
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            loan_id = %loan_id,
            %action,
            from = %from,
            to = %entry.record.status(),
            suggested_amount = ?entry.record.suggested_amount(),
            "loan status changed"
        );
        Ok(entry)
    }
}

/// Error raised by the approval service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Loan(#[from] LoanError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
