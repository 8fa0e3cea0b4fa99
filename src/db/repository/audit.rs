//! Terminal case audit: one row per transition out of `pending`, written in
//! the same transaction as the transition itself.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::CaseStatus;
use crate::models::CaseAuditRecord;

pub fn insert_record(conn: &Connection, record: &CaseAuditRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO case_audit (id, case_id, patient_name, final_status, verified_by,
             recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.case_id.to_string(),
            record.patient_name,
            record.final_status.as_str(),
            record.verified_by,
            record.recorded_at,
        ],
    )?;
    Ok(())
}

pub fn list_for_reviewer(
    conn: &Connection,
    reviewer: &str,
) -> Result<Vec<CaseAuditRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, case_id, patient_name, final_status, verified_by, recorded_at
         FROM case_audit WHERE verified_by = ?1 ORDER BY recorded_at DESC",
    )?;
    let rows = stmt.query_map(params![reviewer], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, DateTime<Utc>>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, case_id, patient_name, status, verified_by, recorded_at) = row?;
        records.push(CaseAuditRecord {
            id: Uuid::from_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            case_id: Uuid::from_str(&case_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            patient_name,
            final_status: CaseStatus::from_str(&status)?,
            verified_by,
            recorded_at,
        });
    }
    Ok(records)
}

pub fn count_for_case(conn: &Connection, case_id: Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM case_audit WHERE case_id = ?1",
        params![case_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
