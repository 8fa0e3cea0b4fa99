use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{CaseStatus, Severity};
use crate::models::{Case, DiseaseProbability};

const CASE_COLUMNS: &str = "id, patient_name, age, gender, location, duration, temperature, \
     symptoms, medical_history, platelet_count, wbc_count, rbc_count, diagnosis, confidence, \
     severity, all_probabilities, status, doctor_notes, verified_by, created_at, updated_at";

pub fn insert_case(conn: &Connection, case: &Case) -> Result<(), DatabaseError> {
    let symptoms = serde_json::to_string(&case.symptoms)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let probabilities = serde_json::to_string(&case.all_probabilities)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    conn.execute(
        "INSERT INTO cases (id, patient_name, age, gender, location, duration, temperature,
             symptoms, medical_history, platelet_count, wbc_count, rbc_count, diagnosis,
             confidence, severity, all_probabilities, status, doctor_notes, verified_by,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
             ?18, ?19, ?20, ?21)",
        params![
            case.id.to_string(),
            case.patient_name,
            case.age,
            case.gender,
            case.location,
            case.duration,
            case.temperature,
            symptoms,
            case.medical_history,
            case.platelet_count,
            case.wbc_count,
            case.rbc_count,
            case.diagnosis,
            case.confidence,
            case.severity.as_str(),
            probabilities,
            case.status.as_str(),
            case.doctor_notes,
            case.verified_by,
            case.created_at,
            case.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_case(conn: &Connection, id: Uuid) -> Result<Option<Case>, DatabaseError> {
    let raw = conn
        .query_row(
            &format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"),
            params![id.to_string()],
            map_case_row,
        )
        .optional()?;
    raw.map(raw_to_case).transpose()
}

pub fn list_by_status(conn: &Connection, status: CaseStatus) -> Result<Vec<Case>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CASE_COLUMNS} FROM cases WHERE status = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![status.as_str()], map_case_row)?;

    let mut cases = Vec::new();
    for row in rows {
        cases.push(raw_to_case(row?)?);
    }
    Ok(cases)
}

/// Write the review-mutable fields back to the row.
pub fn update_review_fields(conn: &Connection, case: &Case) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE cases SET diagnosis = ?2, confidence = ?3, severity = ?4, status = ?5,
             doctor_notes = ?6, verified_by = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            case.id.to_string(),
            case.diagnosis,
            case.confidence,
            case.severity.as_str(),
            case.status.as_str(),
            case.doctor_notes,
            case.verified_by,
            case.updated_at,
        ],
    )?;
    Ok(())
}

pub fn delete_case(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM cases WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

pub fn count_by_status(conn: &Connection, status: CaseStatus) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM cases WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_pending_by_severity(
    conn: &Connection,
    severity: Severity,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM cases WHERE status = 'pending' AND severity = ?1",
        params![severity.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Retained cases settled by a reviewer (rejected or corrected; approved
/// cases are deleted and live only in the audit trail).
pub fn list_reviewed_by(conn: &Connection, reviewer: &str) -> Result<Vec<Case>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CASE_COLUMNS} FROM cases WHERE verified_by = ?1 ORDER BY updated_at DESC"
    ))?;
    let rows = stmt.query_map(params![reviewer], map_case_row)?;

    let mut cases = Vec::new();
    for row in rows {
        cases.push(raw_to_case(row?)?);
    }
    Ok(cases)
}

struct RawCase {
    id: String,
    patient_name: String,
    age: i64,
    gender: String,
    location: Option<String>,
    duration: Option<String>,
    temperature: Option<String>,
    symptoms: String,
    medical_history: Option<String>,
    platelet_count: Option<f64>,
    wbc_count: Option<f64>,
    rbc_count: Option<f64>,
    diagnosis: String,
    confidence: i64,
    severity: String,
    all_probabilities: String,
    status: String,
    doctor_notes: Option<String>,
    verified_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn map_case_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCase> {
    Ok(RawCase {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        location: row.get(4)?,
        duration: row.get(5)?,
        temperature: row.get(6)?,
        symptoms: row.get(7)?,
        medical_history: row.get(8)?,
        platelet_count: row.get(9)?,
        wbc_count: row.get(10)?,
        rbc_count: row.get(11)?,
        diagnosis: row.get(12)?,
        confidence: row.get(13)?,
        severity: row.get(14)?,
        all_probabilities: row.get(15)?,
        status: row.get(16)?,
        doctor_notes: row.get(17)?,
        verified_by: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

fn raw_to_case(raw: RawCase) -> Result<Case, DatabaseError> {
    let symptoms: Vec<String> = serde_json::from_str(&raw.symptoms)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let all_probabilities: Vec<DiseaseProbability> = serde_json::from_str(&raw.all_probabilities)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    Ok(Case {
        id: Uuid::parse_str(&raw.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_name: raw.patient_name,
        age: raw.age,
        gender: raw.gender,
        location: raw.location,
        duration: raw.duration,
        temperature: raw.temperature,
        symptoms,
        medical_history: raw.medical_history,
        platelet_count: raw.platelet_count,
        wbc_count: raw.wbc_count,
        rbc_count: raw.rbc_count,
        diagnosis: raw.diagnosis,
        confidence: raw.confidence,
        severity: Severity::from_str(&raw.severity)?,
        all_probabilities,
        status: CaseStatus::from_str(&raw.status)?,
        doctor_notes: raw.doctor_notes,
        verified_by: raw.verified_by,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn sample(name: &str) -> Case {
        let now = Utc::now();
        Case {
            id: Uuid::new_v4(),
            patient_name: name.into(),
            age: 29,
            gender: "female".into(),
            location: Some("Pune".into()),
            duration: Some("2 days".into()),
            temperature: Some("101F".into()),
            symptoms: vec!["Headache".into(), "Chills".into()],
            medical_history: None,
            platelet_count: Some(120_000.0),
            wbc_count: None,
            rbc_count: None,
            diagnosis: "Malaria".into(),
            confidence: 82,
            severity: Severity::Moderate,
            all_probabilities: vec![DiseaseProbability {
                label: "Malaria".into(),
                probability: 0.82,
            }],
            status: CaseStatus::Pending,
            doctor_notes: None,
            verified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn round_trip_preserves_json_fields() {
        let conn = open_memory_database().unwrap();
        let case = sample("Meera Iyer");
        insert_case(&conn, &case).unwrap();

        let stored = get_case(&conn, case.id).unwrap().unwrap();
        assert_eq!(stored.symptoms, case.symptoms);
        assert_eq!(stored.all_probabilities, case.all_probabilities);
        assert_eq!(stored.severity, Severity::Moderate);
        assert_eq!(stored.status, CaseStatus::Pending);
    }

    #[test]
    fn get_unknown_case_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_case(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn pending_queue_is_newest_first() {
        let conn = open_memory_database().unwrap();
        let mut older = sample("A");
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        insert_case(&conn, &older).unwrap();
        let newer = sample("B");
        insert_case(&conn, &newer).unwrap();

        let queue = list_by_status(&conn, CaseStatus::Pending).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, newer.id);
        assert_eq!(queue[1].id, older.id);
    }

    #[test]
    fn review_update_and_delete() {
        let conn = open_memory_database().unwrap();
        let mut case = sample("Meera Iyer");
        insert_case(&conn, &case).unwrap();

        case.status = CaseStatus::Rejected;
        case.verified_by = Some("doc@clinic.example".into());
        case.doctor_notes = Some("Labs inconsistent".into());
        case.updated_at = Utc::now();
        update_review_fields(&conn, &case).unwrap();

        let stored = get_case(&conn, case.id).unwrap().unwrap();
        assert_eq!(stored.status, CaseStatus::Rejected);
        assert_eq!(stored.doctor_notes.as_deref(), Some("Labs inconsistent"));

        let reviewed = list_reviewed_by(&conn, "doc@clinic.example").unwrap();
        assert_eq!(reviewed.len(), 1);

        delete_case(&conn, case.id).unwrap();
        assert!(get_case(&conn, case.id).unwrap().is_none());
    }

    #[test]
    fn severity_counts_only_cover_pending() {
        let conn = open_memory_database().unwrap();
        let mut critical = sample("A");
        critical.severity = Severity::Critical;
        insert_case(&conn, &critical).unwrap();

        let mut settled = sample("B");
        settled.severity = Severity::Critical;
        settled.status = CaseStatus::Rejected;
        insert_case(&conn, &settled).unwrap();

        assert_eq!(count_by_status(&conn, CaseStatus::Pending).unwrap(), 1);
        assert_eq!(
            count_pending_by_severity(&conn, Severity::Critical).unwrap(),
            1
        );
        assert_eq!(count_pending_by_severity(&conn, Severity::Cv).unwrap(), 0);
    }
}
