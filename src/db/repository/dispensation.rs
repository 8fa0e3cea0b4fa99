use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Dispensation;

pub fn insert_dispensation(
    conn: &Connection,
    dispensation: &Dispensation,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO dispensations (id, prescription_id, pharmacist_id, pharmacy_id, product_id,
             batch_number, lot_number, expiry_date, quantity_dispensed, price, dispensed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            dispensation.id.to_string(),
            dispensation.prescription_id.to_string(),
            dispensation.pharmacist_id.to_string(),
            dispensation.pharmacy_id.to_string(),
            dispensation.product_id.to_string(),
            dispensation.batch_number,
            dispensation.lot_number,
            dispensation.expiry_date,
            dispensation.quantity_dispensed,
            dispensation.price,
            dispensation.dispensed_at,
        ],
    )?;
    Ok(())
}

pub fn list_for_prescription(
    conn: &Connection,
    prescription_id: Uuid,
) -> Result<Vec<Dispensation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, pharmacist_id, pharmacy_id, product_id, batch_number,
             lot_number, expiry_date, quantity_dispensed, price, dispensed_at
         FROM dispensations WHERE prescription_id = ?1 ORDER BY dispensed_at ASC",
    )?;
    let rows = stmt.query_map(params![prescription_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<NaiveDate>>(7)?,
            row.get::<_, i64>(8)?,
            row.get::<_, Option<f64>>(9)?,
            row.get::<_, DateTime<Utc>>(10)?,
        ))
    })?;

    let mut dispensations = Vec::new();
    for row in rows {
        let (id, rx, pharmacist, pharmacy, product, batch, lot, expiry, qty, price, at) = row?;
        dispensations.push(Dispensation {
            id: parse_uuid(&id)?,
            prescription_id: parse_uuid(&rx)?,
            pharmacist_id: parse_uuid(&pharmacist)?,
            pharmacy_id: parse_uuid(&pharmacy)?,
            product_id: parse_uuid(&product)?,
            batch_number: batch,
            lot_number: lot,
            expiry_date: expiry,
            quantity_dispensed: qty,
            price,
            dispensed_at: at,
        });
    }
    Ok(dispensations)
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::from_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
