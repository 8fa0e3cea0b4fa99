use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One physical stock counter, keyed by (pharmacy, product, batch).
///
/// `quantity >= 0` always holds, including mid-transaction; only the
/// inventory ledger's conditional decrement mutates it. A zero-quantity row
/// stays in place so reorder alerting can see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub product_id: Uuid,
    pub batch_number: String,
    pub lot_number: Option<String>,
    pub quantity: i64,
    pub unit: String,
    pub price: Option<f64>,
    pub expiry_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub min_stock_level: i64,
    pub max_stock_level: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
