use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A priced, fixed-duration subscription offering from the server-side
/// catalog. Immutable from the client's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    /// Localized display name, when the catalog carries one.
    pub name_bn: Option<String>,
    /// Price in whole currency units.
    pub price: i64,
    pub duration_days: i32,
    pub description: Option<String>,
    pub is_active: bool,
}

impl SubscriptionPlan {
    /// Localized name when present, otherwise the canonical one.
    pub fn display_name(&self) -> &str {
        self.name_bn.as_deref().unwrap_or(&self.name)
    }
}
