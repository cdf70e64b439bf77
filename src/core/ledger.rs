use crate::core::admission;
use crate::core::submission::{SubmissionAttempt, SubmissionState};
use crate::domain::catalog::Catalog;
use crate::domain::model::{Candidate, EnrollmentRecord};
use crate::domain::ports::{ConfigProvider, TabularStore};
use crate::domain::snapshot::{overbookings, Overbooking, SeatBoard, Snapshot};
use crate::utils::error::{LedgerError, Rejection, Result};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Seat accounting over a shared tabular store.
///
/// Holds no enrollment state of its own: every decision re-reads the store.
/// When `serialize_writes` is on, the reload → validate → append sequence runs
/// under one lock, so submissions going through the same ledger cannot
/// overbook. Writers in other processes are not covered; use [`audit`] to
/// detect overbooking after the fact.
///
/// [`audit`]: AllocationLedger::audit
pub struct AllocationLedger<S: TabularStore, C: ConfigProvider> {
    store: S,
    config: C,
    write_gate: Mutex<()>,
}

impl<S: TabularStore, C: ConfigProvider> AllocationLedger<S, C> {
    pub fn new(store: S, config: C) -> Self {
        Self {
            store,
            config,
            write_gate: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.config.catalog()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load_snapshot(&self) -> Result<Snapshot> {
        let limit = self.config.request_timeout();
        let rows = match timeout(limit, self.store.read_all_rows()).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                tracing::error!("❌ Failed to read enrollment rows: {}", e);
                return Err(match e {
                    e @ LedgerError::SourceUnavailable { .. } => e,
                    other => LedgerError::SourceUnavailable {
                        reason: other.to_string(),
                    },
                });
            }
            Err(_) => {
                tracing::error!("❌ Enrollment source did not answer within {:?}", limit);
                return Err(LedgerError::SourceUnavailable {
                    reason: format!("no response within {:?}", limit),
                });
            }
        };

        let snapshot = Snapshot::from_rows(&rows);
        tracing::debug!(
            "Loaded snapshot: {} records, {} electives in use",
            snapshot.len(),
            snapshot.usage_map().len()
        );
        Ok(snapshot)
    }

    pub fn available_electives(&self, snapshot: &Snapshot) -> SeatBoard {
        SeatBoard::build(snapshot, self.catalog())
    }

    pub fn validate_submission(
        &self,
        candidate: &Candidate,
        snapshot: &Snapshot,
    ) -> std::result::Result<EnrollmentRecord, Rejection> {
        admission::validate_submission(candidate, snapshot, self.catalog())
    }

    pub async fn append_submission(&self, record: &EnrollmentRecord) -> Result<()> {
        let limit = self.config.request_timeout();
        match timeout(limit, self.store.append_row(record)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(match e {
                e @ LedgerError::WriteFailed { .. } => e,
                other => LedgerError::WriteFailed {
                    reason: other.to_string(),
                },
            }),
            Err(_) => Err(LedgerError::WriteFailed {
                reason: format!("no response within {:?}", limit),
            }),
        }
    }

    /// Runs one submission attempt to a terminal state.
    ///
    /// Only `SourceUnavailable` comes back as `Err`; every outcome the
    /// submitter can act on is carried by the returned attempt.
    pub async fn submit(&self, candidate: &Candidate) -> Result<SubmissionAttempt> {
        let _gate = if self.config.serialize_writes() {
            Some(self.write_gate.lock().await)
        } else {
            None
        };

        let mut attempt = SubmissionAttempt::new();
        attempt.advance(SubmissionState::Validating)?;

        // 格式錯誤不需要重新讀取表格
        if let Err(rejection) = admission::validate_fields(candidate, self.catalog()) {
            tracing::info!("Submission rejected: {}", rejection);
            attempt.advance(SubmissionState::Rejected(rejection))?;
            return Ok(attempt);
        }

        // 送出前重新讀取，顯示的名額可能已經過期
        let snapshot = self.load_snapshot().await?;
        let record = match self.validate_submission(candidate, &snapshot) {
            Ok(record) => record,
            Err(rejection) => {
                if rejection.is_warning() {
                    tracing::warn!("⚠️ {}", rejection);
                } else {
                    tracing::info!("Submission rejected: {}", rejection);
                }
                attempt.advance(SubmissionState::Rejected(rejection))?;
                return Ok(attempt);
            }
        };

        attempt.advance(SubmissionState::Accepted(record.clone()))?;

        if self.config.read_only() {
            tracing::info!(
                "ℹ️ Read-only mode: submission for PRN {} validated but not saved",
                record.prn
            );
            return Ok(attempt);
        }

        match self.append_submission(&record).await {
            Ok(()) => {
                tracing::info!(
                    "✅ Recorded PRN {}: {} + {}",
                    record.prn,
                    record.elective1,
                    record.elective2
                );
                attempt.advance(SubmissionState::Appended(record))?;
            }
            Err(e) => {
                tracing::error!("❌ Failed to append submission for PRN {}: {}", record.prn, e);
                attempt.advance(SubmissionState::WriteFailed {
                    record,
                    reason: e.to_string(),
                })?;
            }
        }

        Ok(attempt)
    }

    /// Electives whose usage is above capacity, in catalog order.
    pub async fn audit(&self) -> Result<Vec<Overbooking>> {
        let snapshot = self.load_snapshot().await?;
        let report = overbookings(&snapshot, self.catalog());
        for over in &report {
            tracing::warn!(
                "⚠️ {} is overbooked: {}/{} (+{})",
                over.elective,
                over.usage,
                over.capacity,
                over.excess()
            );
        }
        Ok(report)
    }
}
