//! Notification ledger: append-only per-patient messages with a read flag.
//!
//! `emit` participates in the caller's transaction, so a workflow transition
//! and its notification commit or roll back together.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{ApprovalType, NotificationType};
use crate::models::Notification;

const NOTIFICATION_COLUMNS: &str = "id, case_id, patient_name, message, notification_type, \
     approval_type, doctor_name, read, created_at";

/// Append one notification. Pure insert; never updates.
pub fn emit(conn: &Connection, notification: &Notification) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, case_id, patient_name, message, notification_type,
             approval_type, doctor_name, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            notification.id.to_string(),
            notification.case_id.to_string(),
            notification.patient_name,
            notification.message,
            notification.notification_type.as_str(),
            notification.approval_type.as_ref().map(|a| a.as_str()),
            notification.doctor_name,
            notification.read,
            notification.created_at,
        ],
    )?;
    Ok(())
}

/// All notifications for a patient, newest first.
pub fn list_for_patient(
    conn: &Connection,
    patient_name: &str,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications
         WHERE patient_name = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_name], map_notification_row)?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(raw_to_notification(row?)?);
    }
    Ok(notifications)
}

pub fn get_notification(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<Notification>, DatabaseError> {
    let raw = conn
        .query_row(
            &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
            params![id.to_string()],
            map_notification_row,
        )
        .optional()?;
    raw.map(raw_to_notification).transpose()
}

/// Mark a notification read. Idempotent: re-marking an already-read
/// notification is a no-op, not an error. Unknown ids are `NotFound`.
pub fn mark_read(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "notification".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete all currently-read notifications for a patient; returns the count.
///
/// Single conditional DELETE, so rows emitted (unread) concurrently with the
/// prune are never touched — the predicate only ever matches rows that were
/// already read when the statement ran.
pub fn prune_read(conn: &Connection, patient_name: &str) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM notifications WHERE patient_name = ?1 AND read = 1",
        params![patient_name],
    )?;
    Ok(deleted)
}

type NotificationRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    bool,
    DateTime<Utc>,
);

fn map_notification_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn raw_to_notification(raw: NotificationRow) -> Result<Notification, DatabaseError> {
    let (id, case_id, patient_name, message, kind, approval, doctor_name, read, created_at) = raw;
    Ok(Notification {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        case_id: Uuid::parse_str(&case_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_name,
        message,
        notification_type: NotificationType::from_str(&kind)?,
        approval_type: approval.as_deref().map(ApprovalType::from_str).transpose()?,
        doctor_name,
        read,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn sample(patient: &str, read: bool) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            case_id: Uuid::new_v4(),
            patient_name: patient.into(),
            message: "Your diagnosis has been reviewed".into(),
            notification_type: NotificationType::Rejected,
            approval_type: None,
            doctor_name: Some("Dr. Arjun Mehta".into()),
            read,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn emit_and_list_newest_first() {
        let conn = open_memory_database().unwrap();
        let first = sample("Rahul Verma", false);
        emit(&conn, &first).unwrap();
        let mut second = sample("Rahul Verma", false);
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        emit(&conn, &second).unwrap();
        emit(&conn, &sample("Pooja Patel", false)).unwrap();

        let listed = list_for_patient(&conn, "Rahul Verma").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let n = sample("Rahul Verma", false);
        emit(&conn, &n).unwrap();

        mark_read(&conn, n.id).unwrap();
        mark_read(&conn, n.id).unwrap();

        let stored = get_notification(&conn, n.id).unwrap().unwrap();
        assert!(stored.read);
    }

    #[test]
    fn mark_read_unknown_id_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = mark_read(&conn, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn prune_read_only_removes_read_rows() {
        let conn = open_memory_database().unwrap();
        emit(&conn, &sample("Rahul Verma", true)).unwrap();
        emit(&conn, &sample("Rahul Verma", true)).unwrap();
        let unread = sample("Rahul Verma", false);
        emit(&conn, &unread).unwrap();
        emit(&conn, &sample("Pooja Patel", true)).unwrap();

        let deleted = prune_read(&conn, "Rahul Verma").unwrap();
        assert_eq!(deleted, 2);

        let remaining = list_for_patient(&conn, "Rahul Verma").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, unread.id);

        // The other patient's read notifications are untouched
        assert_eq!(list_for_patient(&conn, "Pooja Patel").unwrap().len(), 1);
    }

    #[test]
    fn approval_type_round_trips() {
        let conn = open_memory_database().unwrap();
        let mut n = sample("Rahul Verma", false);
        n.notification_type = NotificationType::Approved;
        n.approval_type = Some(ApprovalType::Offline);
        emit(&conn, &n).unwrap();

        let stored = get_notification(&conn, n.id).unwrap().unwrap();
        assert_eq!(stored.notification_type, NotificationType::Approved);
        assert_eq!(stored.approval_type, Some(ApprovalType::Offline));
    }
}
