use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only audit record of a collected payment.
///
/// Created only by the server-side extension procedure; the client never
/// edits or deletes one. Collector name and phone arrive denormalized
/// from the history procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPayment {
    pub id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub user_id: Uuid,
    pub amount: i64,
    pub payment_method: Option<String>,
    pub collected_by_name: Option<String>,
    pub collected_by_phone: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
