use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fact recording one line item physically released against a prescription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispensation {
    pub id: Uuid,
    pub prescription_id: Uuid,
    pub pharmacist_id: Uuid,
    pub pharmacy_id: Uuid,
    pub product_id: Uuid,
    pub batch_number: String,
    pub lot_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity_dispensed: i64,
    /// Unit price captured at dispensation time.
    pub price: Option<f64>,
    pub dispensed_at: DateTime<Utc>,
}

/// Append-only demand telemetry, one per successfully dispensed line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandSignal {
    pub id: Uuid,
    pub product_id: Uuid,
    pub region: Option<String>,
    pub demand_quantity: i64,
    pub signal_date: NaiveDate,
    pub signal_type: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}
