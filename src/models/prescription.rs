use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrescriptionStatus;

/// A treatment order keyed to a patient name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_name: String,
    pub instructions: Option<String>,
    pub status: PrescriptionStatus,
    pub dispensed_at: Option<DateTime<Utc>>,
    pub dispensed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Line items in prescribed order.
    pub items: Vec<PrescriptionItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub id: Uuid,
    pub product_name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub quantity: i64,
}
