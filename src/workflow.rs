//! Case triage workflow: intake, review, approval, and follow-up.
//!
//! Every state change runs inside a single immediate transaction so that a
//! case transition, its audit record, and its patient notification land
//! atomically. Cases leave the review queue exactly once.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use uuid::Uuid;

use crate::config::PREDICTION_TIMEOUT;
use crate::db::repository::{audit, case, followup, notification};
use crate::db::DatabaseError;
use crate::models::enums::{ApprovalType, CaseStatus, NotificationType, Severity};
use crate::models::{Case, CaseAuditRecord, FollowUp, Notification};
use crate::predict::{predict_with_timeout, ClinicalInput, Predictor};

pub const MIN_PATIENT_AGE: i64 = 1;
pub const MAX_PATIENT_AGE: i64 = 150;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid fields: {0:?}")]
    Validation(Vec<String>),
    #[error("case not found: {0}")]
    NotFound(Uuid),
    #[error("case is already {current}, cannot transition to {requested}")]
    InvalidTransition {
        current: CaseStatus,
        requested: CaseStatus,
    },
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Structured symptom checkboxes, used when no free-form symptom list is
/// given.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymptomFlags {
    pub headache: bool,
    pub joint_pain: bool,
    pub leg_pain: bool,
    pub muscle_pain: bool,
    pub rash: bool,
    pub nausea_vomiting: bool,
    pub vomiting: bool,
    pub bleeding: bool,
    pub fatigue: bool,
    pub cough: bool,
    pub chills: bool,
    pub sweating: bool,
    pub loss_of_appetite: bool,
}

impl SymptomFlags {
    fn to_names(self) -> Vec<String> {
        let pairs: [(bool, &str); 13] = [
            (self.headache, "Headache"),
            (self.joint_pain, "Joint Pain"),
            (self.leg_pain, "Leg Pain"),
            (self.muscle_pain, "Muscle Pain"),
            (self.rash, "Rash"),
            (self.nausea_vomiting, "Nausea/Vomiting"),
            (self.vomiting, "Vomiting"),
            (self.bleeding, "Bleeding"),
            (self.fatigue, "Fatigue"),
            (self.cough, "Cough"),
            (self.chills, "Chills"),
            (self.sweating, "Sweating"),
            (self.loss_of_appetite, "Loss of Appetite"),
        ];
        pairs
            .into_iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

/// Resolves the symptom set for a submission. An explicit list wins over the
/// flags, even when it is empty: a caller that sends `Some(vec![])` is
/// asserting "no symptoms", not "no opinion".
pub fn normalize_symptoms(explicit: Option<&[String]>, flags: &SymptomFlags) -> Vec<String> {
    match explicit {
        Some(list) => list
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => flags.to_names(),
    }
}

#[derive(Debug, Clone)]
pub struct CaseSubmission {
    pub patient_name: String,
    pub age: i64,
    pub gender: String,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub temperature: Option<String>,
    pub symptoms: Option<Vec<String>>,
    pub flags: SymptomFlags,
    pub medical_history: Option<String>,
    pub platelet_count: Option<f64>,
    pub wbc_count: Option<f64>,
    pub rbc_count: Option<f64>,
}

/// A reviewing clinician. `email` is the stable identity recorded against
/// cases and audit rows; `name` is what the patient sees.
#[derive(Debug, Clone)]
pub struct Reviewer {
    pub name: String,
    pub email: String,
}

/// A reviewer's verdict on a pending case. Diagnosis fields are only
/// consulted for corrections.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub doctor_notes: Option<String>,
    pub diagnosis: Option<String>,
    pub confidence: Option<i64>,
    pub severity: Option<Severity>,
}

fn validate_submission(submission: &CaseSubmission) -> Result<(), WorkflowError> {
    let mut bad = Vec::new();
    if submission.patient_name.trim().is_empty() {
        bad.push("patient_name".to_string());
    }
    if !(MIN_PATIENT_AGE..=MAX_PATIENT_AGE).contains(&submission.age) {
        bad.push("age".to_string());
    }
    if submission.gender.trim().is_empty() {
        bad.push("gender".to_string());
    }
    if bad.is_empty() {
        Ok(())
    } else {
        Err(WorkflowError::Validation(bad))
    }
}

fn check_deadline(deadline: Option<Instant>) -> Result<(), WorkflowError> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(WorkflowError::DeadlineExceeded),
        _ => Ok(()),
    }
}

/// Validates a submission, predicts a provisional diagnosis, and stores the
/// case as `pending`. The prediction runs before the write transaction so a
/// slow model never holds the database lock.
pub fn submit(
    conn: &mut Connection,
    predictor: Arc<dyn Predictor>,
    submission: CaseSubmission,
    deadline: Option<Instant>,
) -> Result<Case, WorkflowError> {
    check_deadline(deadline)?;
    validate_submission(&submission)?;

    let symptoms = normalize_symptoms(submission.symptoms.as_deref(), &submission.flags);

    let budget = match deadline {
        Some(d) => PREDICTION_TIMEOUT.min(d.saturating_duration_since(Instant::now())),
        None => PREDICTION_TIMEOUT,
    };
    let input = ClinicalInput {
        temperature: submission.temperature.clone(),
        duration: submission.duration.clone(),
        symptoms: symptoms.clone(),
        platelet_count: submission.platelet_count,
        wbc_count: submission.wbc_count,
        rbc_count: submission.rbc_count,
    };
    let prediction = predict_with_timeout(predictor, input, budget);
    check_deadline(deadline)?;

    let now = Utc::now();
    let new_case = Case {
        id: Uuid::new_v4(),
        patient_name: submission.patient_name.trim().to_string(),
        age: submission.age,
        gender: submission.gender.trim().to_string(),
        location: submission.location,
        duration: submission.duration,
        temperature: submission.temperature,
        symptoms,
        medical_history: submission.medical_history,
        platelet_count: submission.platelet_count,
        wbc_count: submission.wbc_count,
        rbc_count: submission.rbc_count,
        diagnosis: prediction.label,
        confidence: (f64::from(prediction.confidence) * 100.0).round() as i64,
        severity: prediction.severity,
        all_probabilities: prediction.probabilities,
        status: CaseStatus::Pending,
        doctor_notes: None,
        verified_by: None,
        created_at: now,
        updated_at: now,
    };

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;
    case::insert_case(&tx, &new_case)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        "case {} submitted for {} (diagnosis {}, severity {})",
        new_case.id,
        new_case.patient_name,
        new_case.diagnosis,
        new_case.severity.as_str()
    );
    Ok(new_case)
}

fn notification_message(
    notification_type: NotificationType,
    approval_type: Option<ApprovalType>,
    doctor_name: &str,
) -> String {
    match (notification_type, approval_type) {
        (NotificationType::Rejected, _) => format!(
            "Your diagnosis has been reviewed by {doctor_name}. Please consult with a \
             healthcare provider for further evaluation."
        ),
        (NotificationType::Corrected, _) => format!(
            "Dr. {doctor_name} has reviewed and updated your diagnosis. Please review the \
             updated information."
        ),
        (NotificationType::Approved, Some(ApprovalType::Offline)) => format!(
            "Your diagnosis has been approved by {doctor_name} for offline consultation. \
             Please visit the healthcare facility for in-person treatment. Your health \
             records have been verified and you are ready for treatment."
        ),
        (NotificationType::Approved, _) => format!(
            "Your diagnosis has been approved by {doctor_name} for online consultation. \
             Your health records have been verified and you are ready for treatment. \
             Please follow up with your healthcare provider remotely."
        ),
    }
}

fn emit_patient_notification(
    conn: &Connection,
    case_ref: &Case,
    notification_type: NotificationType,
    approval_type: Option<ApprovalType>,
    doctor_name: &str,
    at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let message = notification_message(notification_type, approval_type, doctor_name);
    notification::emit(
        conn,
        &Notification {
            id: Uuid::new_v4(),
            case_id: case_ref.id,
            patient_name: case_ref.patient_name.clone(),
            message,
            notification_type,
            approval_type,
            doctor_name: Some(doctor_name.to_string()),
            read: false,
            created_at: at,
        },
    )
}

fn record_transition(
    conn: &Connection,
    case_ref: &Case,
    reviewer: &Reviewer,
    at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    audit::insert_record(
        conn,
        &CaseAuditRecord {
            id: Uuid::new_v4(),
            case_id: case_ref.id,
            patient_name: case_ref.patient_name.clone(),
            final_status: case_ref.status,
            verified_by: reviewer.email.clone(),
            recorded_at: at,
        },
    )
}

/// Rejects or corrects a pending case. Replaying the same verdict on an
/// already-settled case is a no-op; a conflicting verdict is refused.
pub fn review(
    conn: &mut Connection,
    case_id: Uuid,
    verdict: CaseStatus,
    patch: ReviewPatch,
    reviewer: &Reviewer,
    deadline: Option<Instant>,
) -> Result<Case, WorkflowError> {
    check_deadline(deadline)?;
    if !matches!(verdict, CaseStatus::Rejected | CaseStatus::Corrected) {
        return Err(WorkflowError::InvalidTransition {
            current: CaseStatus::Pending,
            requested: verdict,
        });
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;
    let Some(mut found) = case::get_case(&tx, case_id)? else {
        return Err(WorkflowError::NotFound(case_id));
    };

    if found.status.is_terminal() {
        if found.status == verdict {
            // Retry of a verdict that already landed; nothing more to do.
            return Ok(found);
        }
        return Err(WorkflowError::InvalidTransition {
            current: found.status,
            requested: verdict,
        });
    }

    let now = Utc::now();
    found.status = verdict;
    found.verified_by = Some(reviewer.email.clone());
    found.updated_at = now;
    if let Some(notes) = patch.doctor_notes {
        found.doctor_notes = Some(notes);
    }
    if verdict == CaseStatus::Corrected {
        if let Some(diagnosis) = patch.diagnosis {
            found.diagnosis = diagnosis;
        }
        if let Some(confidence) = patch.confidence {
            found.confidence = confidence;
        }
        if let Some(severity) = patch.severity {
            found.severity = severity;
        }
    }

    case::update_review_fields(&tx, &found)?;
    record_transition(&tx, &found, reviewer, now)?;
    let notification_type = match verdict {
        CaseStatus::Corrected => NotificationType::Corrected,
        _ => NotificationType::Rejected,
    };
    emit_patient_notification(&tx, &found, notification_type, None, &reviewer.name, now)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        "case {} reviewed as {} by {}",
        found.id,
        found.status.as_str(),
        reviewer.email
    );
    Ok(found)
}

/// Approves a pending case for treatment and removes it from the queue. The
/// audit row and the patient notification are the durable trace; the case
/// row itself is deleted.
pub fn approve(
    conn: &mut Connection,
    case_id: Uuid,
    approval_type: ApprovalType,
    reviewer: &Reviewer,
) -> Result<Case, WorkflowError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;
    let Some(mut found) = case::get_case(&tx, case_id)? else {
        return Err(WorkflowError::NotFound(case_id));
    };
    if found.status.is_terminal() {
        return Err(WorkflowError::InvalidTransition {
            current: found.status,
            requested: CaseStatus::Verified,
        });
    }

    let now = Utc::now();
    found.status = CaseStatus::Verified;
    found.verified_by = Some(reviewer.email.clone());
    found.updated_at = now;
    if found.doctor_notes.is_none() {
        found.doctor_notes = Some("Case approved and removed from system".to_string());
    }

    record_transition(&tx, &found, reviewer, now)?;
    emit_patient_notification(
        &tx,
        &found,
        NotificationType::Approved,
        Some(approval_type),
        &reviewer.name,
        now,
    )?;
    case::delete_case(&tx, case_id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        "case {} approved ({}) by {}",
        found.id,
        approval_type.as_str(),
        reviewer.email
    );
    Ok(found)
}

/// Books a follow-up visit against an existing case.
pub fn schedule_follow_up(
    conn: &mut Connection,
    case_id: Uuid,
    scheduled_date: DateTime<Utc>,
    notes: Option<String>,
) -> Result<FollowUp, WorkflowError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;
    let Some(found) = case::get_case(&tx, case_id)? else {
        return Err(WorkflowError::NotFound(case_id));
    };
    let follow_up = FollowUp {
        id: Uuid::new_v4(),
        case_id,
        patient_name: found.patient_name,
        scheduled_date,
        notes,
        created_at: Utc::now(),
    };
    followup::insert_follow_up(&tx, &follow_up)?;
    tx.commit().map_err(DatabaseError::from)?;
    Ok(follow_up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::DiseaseProbability;
    use crate::predict::{Prediction, PredictionError};
    use std::time::Duration;

    struct DenguePredictor;

    impl Predictor for DenguePredictor {
        fn predict(&self, _input: &ClinicalInput) -> Result<Prediction, PredictionError> {
            Ok(Prediction {
                label: "Dengue".into(),
                severity: Severity::Critical,
                confidence: 0.91,
                probabilities: vec![
                    DiseaseProbability {
                        label: "Dengue".into(),
                        probability: 0.91,
                    },
                    DiseaseProbability {
                        label: "Malaria".into(),
                        probability: 0.06,
                    },
                ],
            })
        }
    }

    struct BrokenPredictor;

    impl Predictor for BrokenPredictor {
        fn predict(&self, _input: &ClinicalInput) -> Result<Prediction, PredictionError> {
            Err(PredictionError::Unavailable("no model".into()))
        }
    }

    fn submission() -> CaseSubmission {
        CaseSubmission {
            patient_name: "Ravi Kumar".into(),
            age: 34,
            gender: "male".into(),
            location: Some("Chennai".into()),
            duration: Some("4 days".into()),
            temperature: Some("103F".into()),
            symptoms: None,
            flags: SymptomFlags {
                headache: true,
                rash: true,
                ..SymptomFlags::default()
            },
            medical_history: None,
            platelet_count: Some(85_000.0),
            wbc_count: None,
            rbc_count: None,
        }
    }

    fn reviewer() -> Reviewer {
        Reviewer {
            name: "Asha Patel".into(),
            email: "asha@clinic.example".into(),
        }
    }

    #[test]
    fn submit_lands_pending_with_prediction() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();

        assert_eq!(stored.status, CaseStatus::Pending);
        assert_eq!(stored.diagnosis, "Dengue");
        assert_eq!(stored.confidence, 91);
        assert_eq!(stored.severity, Severity::Critical);
        assert_eq!(stored.symptoms, vec!["Headache", "Rash"]);

        let reloaded = case::get_case(&conn, stored.id).unwrap().unwrap();
        assert_eq!(reloaded.all_probabilities.len(), 2);
    }

    #[test]
    fn submit_rejects_invalid_fields() {
        let mut conn = open_memory_database().unwrap();
        let mut bad = submission();
        bad.patient_name = "  ".into();
        bad.age = 0;
        let err = submit(&mut conn, Arc::new(DenguePredictor), bad, None).unwrap_err();
        match err {
            WorkflowError::Validation(fields) => {
                assert!(fields.contains(&"patient_name".to_string()));
                assert!(fields.contains(&"age".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn explicit_empty_symptom_list_overrides_flags() {
        let mut conn = open_memory_database().unwrap();
        let mut sub = submission();
        sub.symptoms = Some(vec![]);
        let stored = submit(&mut conn, Arc::new(DenguePredictor), sub, None).unwrap();
        assert!(stored.symptoms.is_empty());
    }

    #[test]
    fn explicit_symptom_list_is_trimmed() {
        let flags = SymptomFlags {
            cough: true,
            ..SymptomFlags::default()
        };
        let explicit = vec!["  Fever ".to_string(), "".to_string(), "Rash".to_string()];
        let symptoms = normalize_symptoms(Some(explicit.as_slice()), &flags);
        assert_eq!(symptoms, vec!["Fever", "Rash"]);
    }

    #[test]
    fn broken_predictor_falls_back() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(BrokenPredictor), submission(), None).unwrap();
        assert_eq!(stored.diagnosis, "Viral fever");
        assert_eq!(stored.confidence, 75);
        assert_eq!(stored.severity, Severity::Moderate);
        assert!(stored.all_probabilities.is_empty());
    }

    #[test]
    fn reject_emits_notification_and_audit() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();

        let reviewed = review(
            &mut conn,
            stored.id,
            CaseStatus::Rejected,
            ReviewPatch {
                doctor_notes: Some("Inconsistent labs".into()),
                ..ReviewPatch::default()
            },
            &reviewer(),
            None,
        )
        .unwrap();
        assert_eq!(reviewed.status, CaseStatus::Rejected);
        assert_eq!(reviewed.verified_by.as_deref(), Some("asha@clinic.example"));

        let notes = notification::list_for_patient(&conn, "Ravi Kumar").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].notification_type, NotificationType::Rejected);
        assert!(notes[0].message.contains("reviewed by Asha Patel"));

        let trail = audit::list_for_reviewer(&conn, "asha@clinic.example").unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].final_status, CaseStatus::Rejected);
    }

    #[test]
    fn correction_applies_patch() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();

        let reviewed = review(
            &mut conn,
            stored.id,
            CaseStatus::Corrected,
            ReviewPatch {
                diagnosis: Some("Chikungunya".into()),
                confidence: Some(88),
                severity: Some(Severity::Moderate),
                doctor_notes: Some("Joint involvement dominates".into()),
            },
            &reviewer(),
            None,
        )
        .unwrap();
        assert_eq!(reviewed.diagnosis, "Chikungunya");
        assert_eq!(reviewed.confidence, 88);
        assert_eq!(reviewed.severity, Severity::Moderate);

        let notes = notification::list_for_patient(&conn, "Ravi Kumar").unwrap();
        assert_eq!(notes[0].notification_type, NotificationType::Corrected);
        assert!(notes[0].message.starts_with("Dr. Asha Patel"));
    }

    #[test]
    fn replayed_verdict_is_a_no_op() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();

        let patch = ReviewPatch {
            doctor_notes: Some("Inconsistent labs".into()),
            ..ReviewPatch::default()
        };
        review(
            &mut conn,
            stored.id,
            CaseStatus::Rejected,
            patch.clone(),
            &reviewer(),
            None,
        )
        .unwrap();
        let replay = review(
            &mut conn,
            stored.id,
            CaseStatus::Rejected,
            patch,
            &reviewer(),
            None,
        )
        .unwrap();
        assert_eq!(replay.status, CaseStatus::Rejected);

        // No second notification, no second audit row.
        let notes = notification::list_for_patient(&conn, "Ravi Kumar").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(audit::count_for_case(&conn, stored.id).unwrap(), 1);
    }

    #[test]
    fn conflicting_verdict_is_refused() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();
        review(
            &mut conn,
            stored.id,
            CaseStatus::Rejected,
            ReviewPatch::default(),
            &reviewer(),
            None,
        )
        .unwrap();

        let err = review(
            &mut conn,
            stored.id,
            CaseStatus::Corrected,
            ReviewPatch::default(),
            &reviewer(),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                current: CaseStatus::Rejected,
                requested: CaseStatus::Corrected,
            }
        ));
    }

    #[test]
    fn verdict_must_be_terminal_review_status() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();
        let err = review(
            &mut conn,
            stored.id,
            CaseStatus::Pending,
            ReviewPatch::default(),
            &reviewer(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn approve_notifies_and_removes_the_case() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();

        let approved = approve(&mut conn, stored.id, ApprovalType::Offline, &reviewer()).unwrap();
        assert_eq!(approved.status, CaseStatus::Verified);
        assert_eq!(
            approved.doctor_notes.as_deref(),
            Some("Case approved and removed from system")
        );

        // The case row is gone; the notification and audit trail survive.
        assert!(case::get_case(&conn, stored.id).unwrap().is_none());
        let notes = notification::list_for_patient(&conn, "Ravi Kumar").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].notification_type, NotificationType::Approved);
        assert_eq!(notes[0].approval_type, Some(ApprovalType::Offline));
        assert!(notes[0].message.contains("offline consultation"));
        assert!(notes[0].message.contains("visit the healthcare facility"));

        let trail = audit::list_for_reviewer(&conn, "asha@clinic.example").unwrap();
        assert_eq!(trail[0].final_status, CaseStatus::Verified);
    }

    #[test]
    fn online_approval_uses_remote_wording() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();
        approve(&mut conn, stored.id, ApprovalType::Online, &reviewer()).unwrap();

        let notes = notification::list_for_patient(&conn, "Ravi Kumar").unwrap();
        assert!(notes[0].message.contains("online consultation"));
        assert!(notes[0].message.contains("remotely"));
    }

    #[test]
    fn approve_after_reject_is_refused() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();
        review(
            &mut conn,
            stored.id,
            CaseStatus::Rejected,
            ReviewPatch::default(),
            &reviewer(),
            None,
        )
        .unwrap();

        let err = approve(&mut conn, stored.id, ApprovalType::Online, &reviewer()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        // Still only the rejection notification.
        let notes = notification::list_for_patient(&conn, "Ravi Kumar").unwrap();
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn review_after_approve_is_not_found() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();
        approve(&mut conn, stored.id, ApprovalType::Online, &reviewer()).unwrap();

        let err = review(
            &mut conn,
            stored.id,
            CaseStatus::Rejected,
            ReviewPatch::default(),
            &reviewer(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(id) if id == stored.id));
    }

    #[test]
    fn expired_deadline_is_refused_before_any_work() {
        let mut conn = open_memory_database().unwrap();
        let past = Instant::now() - Duration::from_secs(1);
        let err =
            submit(&mut conn, Arc::new(DenguePredictor), submission(), Some(past)).unwrap_err();
        assert!(matches!(err, WorkflowError::DeadlineExceeded));
    }

    #[test]
    fn follow_up_requires_an_existing_case() {
        let mut conn = open_memory_database().unwrap();
        let stored = submit(&mut conn, Arc::new(DenguePredictor), submission(), None).unwrap();

        let booked = schedule_follow_up(
            &mut conn,
            stored.id,
            Utc::now() + chrono::Duration::days(7),
            Some("Repeat platelet count".into()),
        )
        .unwrap();
        assert_eq!(booked.patient_name, "Ravi Kumar");
        assert_eq!(followup::list_for_case(&conn, stored.id).unwrap().len(), 1);

        let err = schedule_follow_up(&mut conn, Uuid::new_v4(), Utc::now(), None).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }
}
