use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-computed lifecycle state of a subscriber's paid access.
///
/// Transitions happen entirely on the backend; the client only renders
/// labels and day counts derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    GracePeriod,
    Blocked,
    None,
}

impl SubscriptionStatus {
    /// Display label used by list and detail renderers.
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Expired => "Expired",
            SubscriptionStatus::GracePeriod => "Grace period",
            SubscriptionStatus::Blocked => "Blocked",
            SubscriptionStatus::None => "None",
        }
    }
}

/// Read-only projection of a subscriber and their current subscription,
/// one row per subscriber from the server-side aggregated view.
///
/// Never mutated locally: recording a payment goes through the extension
/// RPC and the list is re-fetched afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscription {
    pub user_id: Uuid,
    pub email: String,
    pub user_name: Option<String>,
    pub subscription_id: Option<Uuid>,
    pub status: Option<SubscriptionStatus>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub grace_period_ends_at: Option<DateTime<Utc>>,
    pub plan_name: Option<String>,
    pub plan_price: Option<i64>,
}

impl UserSubscription {
    /// Effective status: a subscriber without a subscription row reads as
    /// [`SubscriptionStatus::None`].
    pub fn effective_status(&self) -> SubscriptionStatus {
        self.status.unwrap_or(SubscriptionStatus::None)
    }

    /// Signed whole-day count until expiry, rounded up.
    ///
    /// Positive means days left, negative means days since expiry, zero
    /// means it expired within the last day. `None` when the subscriber
    /// has no expiry date.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let expires = self.expires_at?;
        let secs = (expires - now).num_seconds();
        Some((secs as f64 / 86_400.0).ceil() as i64)
    }

    /// Case-insensitive match against email and display name.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        if self.email.to_lowercase().contains(&q) {
            return true;
        }
        self.user_name
            .as_ref()
            .is_some_and(|name| name.to_lowercase().contains(&q))
    }
}

/// Filter a subscriber list the way the roster search box does: an empty
/// or whitespace-only query returns everything.
pub fn filter_subscriptions<'a>(
    subscriptions: &'a [UserSubscription],
    query: &str,
) -> Vec<&'a UserSubscription> {
    subscriptions
        .iter()
        .filter(|sub| sub.matches_query(query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subscriber(email: &str, name: Option<&str>) -> UserSubscription {
        UserSubscription {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            user_name: name.map(str::to_string),
            subscription_id: None,
            status: None,
            starts_at: None,
            expires_at: None,
            grace_period_ends_at: None,
            plan_name: None,
            plan_price: None,
        }
    }

    #[test]
    fn status_wire_format_is_snake_case() {
        let status: SubscriptionStatus = serde_json::from_str("\"grace_period\"").unwrap();
        assert_eq!(status, SubscriptionStatus::GracePeriod);

        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::None).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn missing_status_reads_as_none() {
        let sub = subscriber("a@example.com", None);
        assert_eq!(sub.effective_status(), SubscriptionStatus::None);

        let mut active = subscriber("b@example.com", None);
        active.status = Some(SubscriptionStatus::Active);
        assert_eq!(active.effective_status(), SubscriptionStatus::Active);
    }

    #[test]
    fn days_remaining_rounds_up() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let mut sub = subscriber("a@example.com", None);

        assert_eq!(sub.days_remaining(now), None);

        // 36 hours out counts as 2 days
        sub.expires_at = Some(now + chrono::Duration::hours(36));
        assert_eq!(sub.days_remaining(now), Some(2));

        sub.expires_at = Some(now + chrono::Duration::days(30));
        assert_eq!(sub.days_remaining(now), Some(30));
    }

    #[test]
    fn days_remaining_negative_after_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let mut sub = subscriber("a@example.com", None);

        // expired within the last day rounds to zero
        sub.expires_at = Some(now - chrono::Duration::hours(3));
        assert_eq!(sub.days_remaining(now), Some(0));

        sub.expires_at = Some(now - chrono::Duration::days(5));
        assert_eq!(sub.days_remaining(now), Some(-5));
    }

    #[test]
    fn search_matches_email_and_name() {
        let subs = vec![
            subscriber("rahim@example.com", Some("Rahim Uddin")),
            subscriber("karim@example.com", None),
            subscriber("salma@example.com", Some("Salma Akter")),
        ];

        let hits = filter_subscriptions(&subs, "RAHIM");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "rahim@example.com");

        let hits = filter_subscriptions(&subs, "akter");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "salma@example.com");

        assert!(filter_subscriptions(&subs, "nazrul").is_empty());
    }

    #[test]
    fn blank_search_returns_everything() {
        let subs = vec![
            subscriber("rahim@example.com", Some("Rahim Uddin")),
            subscriber("karim@example.com", None),
        ];

        assert_eq!(filter_subscriptions(&subs, "").len(), 2);
        assert_eq!(filter_subscriptions(&subs, "   ").len(), 2);
    }
}
