use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::CaseStatus;

/// Terminal audit projection of a case, written in the same transaction as
/// the transition it records. Approved cases are deleted from `cases`, so
/// this is the only durable record that the approval happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseAuditRecord {
    pub id: Uuid,
    pub case_id: Uuid,
    pub patient_name: String,
    pub final_status: CaseStatus,
    pub verified_by: String,
    pub recorded_at: DateTime<Utc>,
}
