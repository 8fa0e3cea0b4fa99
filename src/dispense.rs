//! Prescription dispensation.
//!
//! A dispensation is all-or-nothing: every requested item is deducted from
//! batch-level inventory, a dispensation record and a demand signal are
//! written per item, and the prescription flips to `dispensed`, all inside
//! one immediate transaction. Any shortfall rolls the whole thing back.

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{demand, dispensation, inventory, pharmacy, prescription};
use crate::db::repository::inventory::DecrementOutcome;
use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::{DemandSignal, Dispensation};

#[derive(Debug, Error)]
pub enum DispenseError {
    #[error("invalid dispense request: {0}")]
    InvalidInput(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("prescription is already {0}")]
    InvalidTransition(PrescriptionStatus),
    #[error(
        "insufficient stock for product {product_id} batch {batch_number}: \
         requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: Uuid,
        batch_number: String,
        requested: i64,
        available: i64,
    },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// One line of a dispense request, pinned to a specific inventory batch.
/// Price is not caller-supplied; it is read from the matched inventory row
/// at dispense time.
#[derive(Debug, Clone)]
pub struct DispenseItem {
    pub product_id: Uuid,
    pub batch_number: String,
    pub lot_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct DispenseRequest {
    pub prescription_id: Uuid,
    pub pharmacist_id: Uuid,
    pub items: Vec<DispenseItem>,
}

fn validate_request(request: &DispenseRequest) -> Result<(), DispenseError> {
    if request.items.is_empty() {
        return Err(DispenseError::InvalidInput(
            "dispense request has no items".to_string(),
        ));
    }
    for item in &request.items {
        if item.quantity <= 0 {
            return Err(DispenseError::InvalidInput(format!(
                "quantity for product {} must be positive, got {}",
                item.product_id, item.quantity
            )));
        }
        if item.batch_number.trim().is_empty() {
            return Err(DispenseError::InvalidInput(format!(
                "batch number for product {} is empty",
                item.product_id
            )));
        }
    }
    Ok(())
}

/// Dispenses a prescription at the pharmacist's pharmacy.
pub fn dispense(
    conn: &mut Connection,
    request: &DispenseRequest,
) -> Result<Vec<Dispensation>, DispenseError> {
    validate_request(request)?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let Some(rx) = prescription::get_prescription(&tx, request.prescription_id)? else {
        return Err(DispenseError::NotFound {
            entity: "prescription",
            id: request.prescription_id,
        });
    };
    if rx.status == PrescriptionStatus::Dispensed {
        return Err(DispenseError::InvalidTransition(rx.status));
    }

    let Some(pharmacist) = pharmacy::get_pharmacist(&tx, request.pharmacist_id)? else {
        return Err(DispenseError::NotFound {
            entity: "pharmacist",
            id: request.pharmacist_id,
        });
    };
    // A pharmacist with no pharmacy association has no stock to dispense from
    let Some(pharmacy_id) = pharmacist.pharmacy_id else {
        return Err(DispenseError::NotFound {
            entity: "pharmacy",
            id: pharmacist.id,
        });
    };
    let Some(home_pharmacy) = pharmacy::get_pharmacy(&tx, pharmacy_id)? else {
        return Err(DispenseError::NotFound {
            entity: "pharmacy",
            id: pharmacy_id,
        });
    };

    let now = Utc::now();
    let mut dispensed = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let outcome =
            inventory::try_decrement(&tx, pharmacy_id, item.product_id, &item.batch_number, item.quantity)?;
        let remaining = match outcome {
            DecrementOutcome::Applied { remaining } => remaining,
            DecrementOutcome::Insufficient { available } => {
                return Err(DispenseError::InsufficientStock {
                    product_id: item.product_id,
                    batch_number: item.batch_number.clone(),
                    requested: item.quantity,
                    available,
                });
            }
            // An unknown batch dispenses nothing, same as an empty one.
            DecrementOutcome::NotFound => {
                return Err(DispenseError::InsufficientStock {
                    product_id: item.product_id,
                    batch_number: item.batch_number.clone(),
                    requested: item.quantity,
                    available: 0,
                });
            }
        };

        // Price-at-time comes from the batch row, not the caller
        let price = inventory::get_row(&tx, pharmacy_id, item.product_id, &item.batch_number)?
            .and_then(|row| row.price);

        let record = Dispensation {
            id: Uuid::new_v4(),
            prescription_id: request.prescription_id,
            pharmacist_id: request.pharmacist_id,
            pharmacy_id,
            product_id: item.product_id,
            batch_number: item.batch_number.clone(),
            lot_number: item.lot_number.clone(),
            expiry_date: item.expiry_date,
            quantity_dispensed: item.quantity,
            price,
            dispensed_at: now,
        };
        dispensation::insert_dispensation(&tx, &record)?;
        demand::insert_signal(
            &tx,
            &DemandSignal {
                id: Uuid::new_v4(),
                product_id: item.product_id,
                region: home_pharmacy.city.clone(),
                demand_quantity: item.quantity,
                signal_date: now.date_naive(),
                signal_type: "dispensation".to_string(),
                source: "pharmacy".to_string(),
                created_at: now,
            },
        )?;
        dispensed.push(record);

        tracing::debug!(
            "dispensed {} of product {} batch {} ({} remaining)",
            item.quantity,
            item.product_id,
            item.batch_number,
            remaining
        );
    }

    prescription::mark_dispensed(&tx, request.prescription_id, &pharmacist.license_number, now)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        "prescription {} dispensed by {} at {}",
        request.prescription_id,
        pharmacist.license_number,
        home_pharmacy.name
    );
    Ok(dispensed)
}
