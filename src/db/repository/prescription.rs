use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::{Prescription, PrescriptionItem};

/// Insert a prescription and its line items (in prescribed order).
pub fn insert_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, patient_name, instructions, status, dispensed_at,
             dispensed_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            prescription.id.to_string(),
            prescription.patient_name,
            prescription.instructions,
            prescription.status.as_str(),
            prescription.dispensed_at,
            prescription.dispensed_by,
            prescription.created_at,
        ],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO prescription_items (id, prescription_id, product_name, dosage, frequency,
             quantity, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, item) in prescription.items.iter().enumerate() {
        stmt.execute(params![
            item.id.to_string(),
            prescription.id.to_string(),
            item.product_name,
            item.dosage,
            item.frequency,
            item.quantity,
            position as i64,
        ])?;
    }
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let raw = conn
        .query_row(
            "SELECT id, patient_name, instructions, status, dispensed_at, dispensed_by, created_at
             FROM prescriptions WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<DateTime<Utc>>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, DateTime<Utc>>(6)?,
                ))
            },
        )
        .optional()?;

    let Some((raw_id, patient_name, instructions, status, dispensed_at, dispensed_by, created_at)) =
        raw
    else {
        return Ok(None);
    };

    Ok(Some(Prescription {
        id: Uuid::parse_str(&raw_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_name,
        instructions,
        status: PrescriptionStatus::from_str(&status)?,
        dispensed_at,
        dispensed_by,
        created_at,
        items: list_items(conn, id)?,
    }))
}

/// Stamp a prescription dispensed. The dispensation transaction is the sole
/// caller after creation.
pub fn mark_dispensed(
    conn: &Connection,
    id: Uuid,
    dispensed_by: &str,
    dispensed_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET status = 'dispensed', dispensed_by = ?2, dispensed_at = ?3
         WHERE id = ?1",
        params![id.to_string(), dispensed_by, dispensed_at],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn list_items(conn: &Connection, prescription_id: Uuid) -> Result<Vec<PrescriptionItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, product_name, dosage, frequency, quantity
         FROM prescription_items WHERE prescription_id = ?1 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map(params![prescription_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, i64>(4)?,
        ))
    })?;

    let mut items = Vec::new();
    for row in rows {
        let (id, product_name, dosage, frequency, quantity) = row?;
        items.push(PrescriptionItem {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            product_name,
            dosage,
            frequency,
            quantity,
        });
    }
    Ok(items)
}
