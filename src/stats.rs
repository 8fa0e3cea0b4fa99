//! Reviewer dashboard figures.
//!
//! Terminal counts come from the audit trail rather than the `cases` table:
//! approved cases are deleted on approval, so the live table cannot answer
//! "how many did I settle today".

use chrono::Utc;
use rusqlite::Connection;

use crate::db::repository::{audit, case};
use crate::db::DatabaseError;
use crate::models::enums::{CaseStatus, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerStats {
    /// Cases still waiting in the queue (all reviewers).
    pub pending_reviews: i64,
    /// Cases this reviewer verified or corrected today.
    pub verified_today: i64,
    /// Pending cases flagged CV.
    pub critical_cases: i64,
    /// Integer percentage of settled cases that were verified or corrected
    /// rather than rejected.
    pub accuracy_rate: i64,
    /// All cases this reviewer has ever settled, any verdict.
    pub total_reviewed: i64,
    /// All cases this reviewer has rejected.
    pub rejected: i64,
}

pub fn reviewer_stats(
    conn: &Connection,
    reviewer_email: &str,
) -> Result<ReviewerStats, DatabaseError> {
    let pending_reviews = case::count_by_status(conn, CaseStatus::Pending)?;
    let critical_cases = case::count_pending_by_severity(conn, Severity::Cv)?;

    let trail = audit::list_for_reviewer(conn, reviewer_email)?;
    let today = Utc::now().date_naive();
    let verified_today = trail
        .iter()
        .filter(|r| {
            r.recorded_at.date_naive() == today
                && matches!(
                    r.final_status,
                    CaseStatus::Verified | CaseStatus::Corrected
                )
        })
        .count() as i64;
    let total_reviewed = trail.len() as i64;
    let accepted = trail
        .iter()
        .filter(|r| {
            matches!(
                r.final_status,
                CaseStatus::Verified | CaseStatus::Corrected
            )
        })
        .count() as i64;
    let rejected = trail
        .iter()
        .filter(|r| r.final_status == CaseStatus::Rejected)
        .count() as i64;

    let accuracy_rate = if total_reviewed == 0 {
        0
    } else {
        (accepted as f64 / total_reviewed as f64 * 100.0).round() as i64
    };

    Ok(ReviewerStats {
        pending_reviews,
        verified_today,
        critical_cases,
        accuracy_rate,
        total_reviewed,
        rejected,
    })
}
