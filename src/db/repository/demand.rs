//! Demand telemetry: append-only facts consumed by downstream analytics.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::DemandSignal;

pub fn insert_signal(conn: &Connection, signal: &DemandSignal) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO demand_signals (id, product_id, region, demand_quantity, signal_date,
             signal_type, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            signal.id.to_string(),
            signal.product_id.to_string(),
            signal.region,
            signal.demand_quantity,
            signal.signal_date,
            signal.signal_type,
            signal.source,
            signal.created_at,
        ],
    )?;
    Ok(())
}

pub fn list_for_product(
    conn: &Connection,
    product_id: Uuid,
) -> Result<Vec<DemandSignal>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, product_id, region, demand_quantity, signal_date, signal_type, source,
             created_at
         FROM demand_signals WHERE product_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![product_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, NaiveDate>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, DateTime<Utc>>(7)?,
        ))
    })?;

    let mut signals = Vec::new();
    for row in rows {
        let (id, product, region, quantity, date, kind, source, created_at) = row?;
        signals.push(DemandSignal {
            id: Uuid::from_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            product_id: Uuid::from_str(&product)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            region,
            demand_quantity: quantity,
            signal_date: date,
            signal_type: kind,
            source,
            created_at,
        });
    }
    Ok(signals)
}
