use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CaseStatus, Severity};

/// A triage case moving through clinical review.
///
/// Created by a triage submission with status `pending`; mutated only by
/// review actions; deleted on final approval (the terminal snapshot survives
/// in `case_audit` and as an `approved` notification).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub patient_name: String,
    pub age: i64,
    pub gender: String,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub temperature: Option<String>,
    pub symptoms: Vec<String>,
    pub medical_history: Option<String>,
    pub platelet_count: Option<f64>,
    pub wbc_count: Option<f64>,
    pub rbc_count: Option<f64>,
    pub diagnosis: String,
    /// Prediction confidence as an integer percentage.
    pub confidence: i64,
    pub severity: Severity,
    pub all_probabilities: Vec<DiseaseProbability>,
    pub status: CaseStatus,
    pub doctor_notes: Option<String>,
    /// Set if and only if the case has left `pending` via a reviewer action.
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of the prediction's probability distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProbability {
    pub label: String,
    pub probability: f64,
}
