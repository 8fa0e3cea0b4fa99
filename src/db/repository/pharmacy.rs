use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Pharmacist, Pharmacy};

pub fn insert_pharmacy(conn: &Connection, pharmacy: &Pharmacy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacies (id, name, city, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            pharmacy.id.to_string(),
            pharmacy.name,
            pharmacy.city,
            pharmacy.is_active,
            pharmacy.created_at,
        ],
    )?;
    Ok(())
}

pub fn insert_pharmacist(conn: &Connection, pharmacist: &Pharmacist) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacists (id, name, license_number, pharmacy_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            pharmacist.id.to_string(),
            pharmacist.name,
            pharmacist.license_number,
            pharmacist.pharmacy_id.map(|id| id.to_string()),
            pharmacist.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_pharmacy(conn: &Connection, id: Uuid) -> Result<Option<Pharmacy>, DatabaseError> {
    let raw = conn
        .query_row(
            "SELECT id, name, city, is_active, created_at FROM pharmacies WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, DateTime<Utc>>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((raw_id, name, city, is_active, created_at)) = raw else {
        return Ok(None);
    };
    Ok(Some(Pharmacy {
        id: Uuid::parse_str(&raw_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        city,
        is_active,
        created_at,
    }))
}

pub fn get_pharmacist(conn: &Connection, id: Uuid) -> Result<Option<Pharmacist>, DatabaseError> {
    let raw = conn
        .query_row(
            "SELECT id, name, license_number, pharmacy_id, created_at
             FROM pharmacists WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, DateTime<Utc>>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((raw_id, name, license_number, pharmacy_id, created_at)) = raw else {
        return Ok(None);
    };
    Ok(Some(Pharmacist {
        id: Uuid::parse_str(&raw_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        license_number,
        pharmacy_id: pharmacy_id
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        created_at,
    }))
}
