use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated human operator permitted to record payments on behalf
/// of subscribers. Returned by the PIN-verification call and persisted
/// locally as the session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub is_active: bool,
}
