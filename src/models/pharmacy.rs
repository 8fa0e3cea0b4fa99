use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal pharmacy projection: the dispensation transaction needs its
/// identity and its city (the demand-signal region).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacist {
    pub id: Uuid,
    pub name: String,
    pub license_number: String,
    pub pharmacy_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
