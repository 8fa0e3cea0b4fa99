use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ApprovalType, NotificationType};

/// An immutable patient-facing message emitted by a workflow transition.
///
/// `patient_name` is denormalized on purpose: the approved-case transition
/// deletes the case row, and notifications must remain queryable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub case_id: Uuid,
    pub patient_name: String,
    pub message: String,
    pub notification_type: NotificationType,
    /// Only set when `notification_type` is `Approved`.
    pub approval_type: Option<ApprovalType>,
    pub doctor_name: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
