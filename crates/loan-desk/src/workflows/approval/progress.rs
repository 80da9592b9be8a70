use serde::{Deserialize, Serialize};

use super::domain::{LoanStatus, Milestone, StepView};
use super::record::LoanRecord;

/// Decides which milestone a rejected loan is drawn against.
///
/// Rejection branches from `Suggested` and is not a milestone of its own, so the progress
/// indicator needs a rule for where to place it. `FlagSuggested` is the house rule: the loan
/// stays at the `Suggested` position and that milestone renders as an error. `FlagApproved`
/// draws the loan at the final position and marks `Approved` as the failed step instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionDisplay {
    #[default]
    FlagSuggested,
    FlagApproved,
}

impl RejectionDisplay {
    /// Milestone that renders as [`StepView::Error`] for a rejected loan.
    pub const fn flagged(self) -> Milestone {
        match self {
            Self::FlagSuggested => Milestone::Suggested,
            Self::FlagApproved => Milestone::Approved,
        }
    }

    /// Position of `status` along [`Milestone::ordered`].
    pub const fn position(self, status: LoanStatus) -> usize {
        match status {
            LoanStatus::Inactive => Milestone::Inactive.index(),
            LoanStatus::Suggested => Milestone::Suggested.index(),
            LoanStatus::Approved => Milestone::Approved.index(),
            LoanStatus::Rejected => self.flagged().index(),
        }
    }

    pub fn step_view(self, status: LoanStatus, milestone: Milestone) -> StepView {
        if status == LoanStatus::Rejected && milestone == self.flagged() {
            return StepView::Error;
        }

        let current = self.position(status);
        let index = milestone.index();
        if index < current {
            StepView::Finish
        } else if index == current {
            StepView::Process
        } else {
            StepView::Wait
        }
    }

    pub fn steps(self, status: LoanStatus) -> Vec<MilestoneStep> {
        Milestone::ordered()
            .into_iter()
            .map(|milestone| MilestoneStep {
                milestone,
                title: milestone.title(),
                state: self.step_view(status, milestone),
            })
            .collect()
    }
}

/// One rendered entry of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneStep {
    pub milestone: Milestone,
    pub title: &'static str,
    pub state: StepView,
}

/// Render `milestone` for `record` using the default rejection display.
pub fn step_view(record: &LoanRecord, milestone: Milestone) -> StepView {
    RejectionDisplay::default().step_view(record.status(), milestone)
}

/// Render every milestone for `record`, in display order.
pub fn steps(record: &LoanRecord) -> Vec<MilestoneStep> {
    RejectionDisplay::default().steps(record.status())
}
