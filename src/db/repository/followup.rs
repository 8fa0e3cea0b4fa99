use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::FollowUp;

pub fn insert_follow_up(conn: &Connection, follow_up: &FollowUp) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO follow_ups (id, case_id, patient_name, scheduled_date, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            follow_up.id.to_string(),
            follow_up.case_id.to_string(),
            follow_up.patient_name,
            follow_up.scheduled_date,
            follow_up.notes,
            follow_up.created_at,
        ],
    )?;
    Ok(())
}

pub fn list_for_case(conn: &Connection, case_id: Uuid) -> Result<Vec<FollowUp>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, case_id, patient_name, scheduled_date, notes, created_at
         FROM follow_ups WHERE case_id = ?1 ORDER BY scheduled_date ASC",
    )?;
    let rows = stmt.query_map(params![case_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, DateTime<Utc>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, DateTime<Utc>>(5)?,
        ))
    })?;

    let mut follow_ups = Vec::new();
    for row in rows {
        let (id, case_id, patient_name, scheduled_date, notes, created_at) = row?;
        follow_ups.push(FollowUp {
            id: Uuid::from_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            case_id: Uuid::from_str(&case_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            patient_name,
            scheduled_date,
            notes,
            created_at,
        });
    }
    Ok(follow_ups)
}
