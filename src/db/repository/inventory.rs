//! Inventory ledger: per-(pharmacy, product, batch) stock counters.
//!
//! All quantity mutation goes through [`try_decrement`], a single conditional
//! UPDATE. The storage layer serializes writers on the row, so two concurrent
//! decrements whose sum exceeds the available quantity resolve to exactly one
//! success — the losing caller sees `Insufficient`, never a negative counter.

use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::InventoryRow;

const INVENTORY_COLUMNS: &str = "id, pharmacy_id, product_id, batch_number, lot_number, \
     quantity, unit, price, expiry_date, received_date, min_stock_level, max_stock_level, \
     created_at, updated_at";

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// The decrement applied; `remaining` is the quantity left afterwards.
    Applied { remaining: i64 },
    /// The row exists but holds less than the requested amount. Nothing changed.
    Insufficient { available: i64 },
    /// No row for this (pharmacy, product, batch) key.
    NotFound,
}

/// Stock receipt entry point: register a new counter for a batch.
pub fn insert_row(conn: &Connection, row: &InventoryRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacy_inventory (id, pharmacy_id, product_id, batch_number, lot_number,
             quantity, unit, price, expiry_date, received_date, min_stock_level, max_stock_level,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            row.id.to_string(),
            row.pharmacy_id.to_string(),
            row.product_id.to_string(),
            row.batch_number,
            row.lot_number,
            row.quantity,
            row.unit,
            row.price,
            row.expiry_date,
            row.received_date,
            row.min_stock_level,
            row.max_stock_level,
            row.created_at,
            row.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_row(
    conn: &Connection,
    pharmacy_id: Uuid,
    product_id: Uuid,
    batch_number: &str,
) -> Result<Option<InventoryRow>, DatabaseError> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {INVENTORY_COLUMNS} FROM pharmacy_inventory
                 WHERE pharmacy_id = ?1 AND product_id = ?2 AND batch_number = ?3"
            ),
            params![pharmacy_id.to_string(), product_id.to_string(), batch_number],
            map_inventory_row,
        )
        .optional()?;
    raw.map(raw_to_inventory).transpose()
}

/// Current quantity for a key, or `None` if no row exists.
pub fn get_quantity(
    conn: &Connection,
    pharmacy_id: Uuid,
    product_id: Uuid,
    batch_number: &str,
) -> Result<Option<i64>, DatabaseError> {
    let quantity = conn
        .query_row(
            "SELECT quantity FROM pharmacy_inventory
             WHERE pharmacy_id = ?1 AND product_id = ?2 AND batch_number = ?3",
            params![pharmacy_id.to_string(), product_id.to_string(), batch_number],
            |row| row.get(0),
        )
        .optional()?;
    Ok(quantity)
}

/// Atomically decrement a stock counter if and only if it can satisfy `amount`.
///
/// The check and the write are one statement; there is no gap for a
/// concurrent caller to slip through, and the schema-level
/// `CHECK (quantity >= 0)` backs it up.
pub fn try_decrement(
    conn: &Connection,
    pharmacy_id: Uuid,
    product_id: Uuid,
    batch_number: &str,
    amount: i64,
) -> Result<DecrementOutcome, DatabaseError> {
    if amount <= 0 {
        return Err(DatabaseError::ConstraintViolation(format!(
            "decrement amount must be positive, got {amount}"
        )));
    }

    let changed = conn.execute(
        "UPDATE pharmacy_inventory
         SET quantity = quantity - ?4, updated_at = ?5
         WHERE pharmacy_id = ?1 AND product_id = ?2 AND batch_number = ?3 AND quantity >= ?4",
        params![
            pharmacy_id.to_string(),
            product_id.to_string(),
            batch_number,
            amount,
            Utc::now(),
        ],
    )?;

    if changed == 1 {
        let remaining = get_quantity(conn, pharmacy_id, product_id, batch_number)?.unwrap_or(0);
        return Ok(DecrementOutcome::Applied { remaining });
    }

    match get_quantity(conn, pharmacy_id, product_id, batch_number)? {
        Some(available) => Ok(DecrementOutcome::Insufficient { available }),
        None => Ok(DecrementOutcome::NotFound),
    }
}

/// Rows at or below their reorder threshold, zero-quantity rows included.
pub fn list_low_stock(
    conn: &Connection,
    pharmacy_id: Uuid,
) -> Result<Vec<InventoryRow>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVENTORY_COLUMNS} FROM pharmacy_inventory
         WHERE pharmacy_id = ?1 AND quantity <= min_stock_level
         ORDER BY quantity ASC"
    ))?;
    let rows = stmt.query_map(params![pharmacy_id.to_string()], map_inventory_row)?;

    let mut low = Vec::new();
    for row in rows {
        low.push(raw_to_inventory(row?)?);
    }
    Ok(low)
}

struct RawInventory {
    id: String,
    pharmacy_id: String,
    product_id: String,
    batch_number: String,
    lot_number: Option<String>,
    quantity: i64,
    unit: String,
    price: Option<f64>,
    expiry_date: Option<NaiveDate>,
    received_date: Option<NaiveDate>,
    min_stock_level: i64,
    max_stock_level: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn map_inventory_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawInventory> {
    Ok(RawInventory {
        id: row.get(0)?,
        pharmacy_id: row.get(1)?,
        product_id: row.get(2)?,
        batch_number: row.get(3)?,
        lot_number: row.get(4)?,
        quantity: row.get(5)?,
        unit: row.get(6)?,
        price: row.get(7)?,
        expiry_date: row.get(8)?,
        received_date: row.get(9)?,
        min_stock_level: row.get(10)?,
        max_stock_level: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn raw_to_inventory(raw: RawInventory) -> Result<InventoryRow, DatabaseError> {
    Ok(InventoryRow {
        id: parse_uuid(&raw.id)?,
        pharmacy_id: parse_uuid(&raw.pharmacy_id)?,
        product_id: parse_uuid(&raw.product_id)?,
        batch_number: raw.batch_number,
        lot_number: raw.lot_number,
        quantity: raw.quantity,
        unit: raw.unit,
        price: raw.price,
        expiry_date: raw.expiry_date,
        received_date: raw.received_date,
        min_stock_level: raw.min_stock_level,
        max_stock_level: raw.max_stock_level,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::from_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
