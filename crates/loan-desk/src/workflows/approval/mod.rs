//! Loan approval workflow: the status state machine, the progress indicator derived from it,
//! and a repository-backed service with an HTTP router for the approval screen.

pub mod domain;
pub mod progress;
pub mod record;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{LoanAction, LoanError, LoanId, LoanStatus, Milestone, StepView};
pub use progress::{step_view, steps, MilestoneStep, RejectionDisplay};
pub use record::LoanRecord;
pub use repository::{LoanEntry, LoanRepository, LoanStatusView, RepositoryError};
pub use router::{approval_router, SuggestRequest};
pub use service::{LoanApprovalService, LoanServiceError};
