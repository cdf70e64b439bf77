use crate::domain::model::EnrollmentRecord;
use crate::utils::error::{LedgerError, Rejection, Result};

/// Lifecycle of one submission attempt.
///
/// `Draft → Validating → Rejected | Accepted`, then `Accepted → Appended | WriteFailed`.
/// A resubmission always starts a new attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Draft,
    Validating,
    Rejected(Rejection),
    Accepted(EnrollmentRecord),
    Appended(EnrollmentRecord),
    WriteFailed { record: EnrollmentRecord, reason: String },
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Draft => "draft",
            SubmissionState::Validating => "validating",
            SubmissionState::Rejected(_) => "rejected",
            SubmissionState::Accepted(_) => "accepted",
            SubmissionState::Appended(_) => "appended",
            SubmissionState::WriteFailed { .. } => "write_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Rejected(_)
                | SubmissionState::Appended(_)
                | SubmissionState::WriteFailed { .. }
        )
    }

    fn can_move_to(&self, next: &SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Draft, Validating)
                | (Validating, Rejected(_))
                | (Validating, Accepted(_))
                | (Accepted(_), Appended(_))
                | (Accepted(_), WriteFailed { .. })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAttempt {
    state: SubmissionState,
}

impl SubmissionAttempt {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Draft,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn advance(&mut self, next: SubmissionState) -> Result<()> {
        if !self.state.can_move_to(&next) {
            return Err(LedgerError::InvalidTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }
        tracing::debug!("submission {} -> {}", self.state.name(), next.name());
        self.state = next;
        Ok(())
    }

    /// 記錄（若已通過驗證）
    pub fn record(&self) -> Option<&EnrollmentRecord> {
        match &self.state {
            SubmissionState::Accepted(record)
            | SubmissionState::Appended(record)
            | SubmissionState::WriteFailed { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Collapses the attempt into the record that was accepted, or the error the
    /// submitter has to act on.
    pub fn into_result(self) -> Result<EnrollmentRecord> {
        match self.state {
            SubmissionState::Accepted(record) | SubmissionState::Appended(record) => Ok(record),
            SubmissionState::Rejected(rejection) => Err(LedgerError::Rejected(rejection)),
            SubmissionState::WriteFailed { reason, .. } => {
                Err(LedgerError::WriteFailed { reason })
            }
            state => Err(LedgerError::InvalidTransition {
                from: state.name(),
                to: "result",
            }),
        }
    }
}

impl Default for SubmissionAttempt {
    fn default() -> Self {
        Self::new()
    }
}
