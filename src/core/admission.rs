//! Admission rules for a single submission.
//!
//! Checks run in a fixed order and stop at the first failure, because the
//! first failing rule decides the message the submitter sees.

use crate::domain::catalog::Catalog;
use crate::domain::model::{Candidate, EnrollmentRecord};
use crate::domain::snapshot::Snapshot;
use crate::utils::error::Rejection;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern compiles"));
static PRN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{9,10}$").expect("PRN pattern compiles"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

pub const REQUIRED_SELECTIONS: usize = 2;

/// Snapshot-independent checks (fields and selection shape).
///
/// Returns the trimmed record on success; the record still has to pass the
/// duplicate and capacity checks in [`validate_submission`].
pub fn validate_fields(
    candidate: &Candidate,
    catalog: &Catalog,
) -> Result<EnrollmentRecord, Rejection> {
    let name = candidate.name.trim();
    let prn = candidate.prn.trim();
    let email = candidate.email.trim();

    if name.is_empty() || prn.is_empty() || email.is_empty() {
        return Err(Rejection::MissingField);
    }
    if !NAME_RE.is_match(name) {
        return Err(Rejection::InvalidName);
    }
    // \d 在 Rust regex 中包含 Unicode 數字，這裡只接受 ASCII
    if !PRN_RE.is_match(prn) || !prn.chars().all(|c| c.is_ascii_digit()) {
        return Err(Rejection::InvalidPrn);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(Rejection::InvalidEmail);
    }

    let selected = &candidate.electives;
    let distinct: HashSet<&str> = selected.iter().map(String::as_str).collect();
    if selected.len() != REQUIRED_SELECTIONS || distinct.len() != REQUIRED_SELECTIONS {
        return Err(Rejection::WrongSelectionCount {
            count: distinct.len(),
        });
    }
    if let Some(unknown) = selected.iter().find(|e| catalog.find(e).is_none()) {
        return Err(Rejection::UnknownElective {
            elective: unknown.clone(),
        });
    }

    Ok(EnrollmentRecord {
        name: name.to_string(),
        prn: prn.to_string(),
        email: email.to_string(),
        elective1: selected[0].clone(),
        elective2: selected[1].clone(),
    })
}

/// Full admission check against `snapshot`.
///
/// For the capacity rule to be meaningful, `snapshot` must be reloaded right
/// before the call rather than reused from the seat listing render.
pub fn validate_submission(
    candidate: &Candidate,
    snapshot: &Snapshot,
    catalog: &Catalog,
) -> Result<EnrollmentRecord, Rejection> {
    let record = validate_fields(candidate, catalog)?;

    if snapshot.contains_prn(&record.prn) {
        return Err(Rejection::DuplicatePrn { prn: record.prn });
    }

    for elective in record.electives() {
        let capacity = catalog.capacity_of(elective).unwrap_or(0);
        if snapshot.usage(elective) >= capacity {
            return Err(Rejection::ElectiveFull {
                elective: elective.to_string(),
            });
        }
    }

    Ok(record)
}
