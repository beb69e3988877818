//! Non-throwing domain façade over the backend.
//!
//! Every operation collapses transport failures, server errors, and the
//! missing-agent precondition to a uniform negative value: an empty list
//! or `false`. The front end always receives something it can render;
//! failures are logged, not surfaced structurally.

use std::sync::Arc;

use khata_core::constants::TRIAL_PLAN_NAME;
use khata_core::models::{SubscriptionPayment, SubscriptionPlan, UserSubscription};
use khata_session::SessionStore;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{ApiClient, REST_PREFIX};

/// Data-access gateway for agent-facing surfaces.
///
/// Stateless across calls; the only shared state is the session store's
/// current agent, consulted by [`extend_subscription`](Gateway::extend_subscription).
#[derive(Clone)]
pub struct Gateway {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl Gateway {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Gateway { api, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// All subscribers with their current subscription state, from the
    /// server-side aggregated view.
    ///
    /// Empty on any failure; callers cannot tell "no subscribers" from
    /// "request failed".
    pub async fn fetch_subscriptions(&self) -> Vec<UserSubscription> {
        let query = [("select", "*".to_string())];

        match self
            .api
            .get(&format!("{}/user_subscriptions_view", REST_PREFIX), &query)
            .await
        {
            Ok(rows) => rows,
            Err(error) => {
                error!(%error, "failed to fetch subscriptions");
                Vec::new()
            }
        }
    }

    /// Active plans from the catalog, shortest duration first.
    ///
    /// The trial plan never appears here regardless of what the server
    /// returns. Empty on any failure.
    pub async fn fetch_plans(&self) -> Vec<SubscriptionPlan> {
        let query = [
            ("select", "*".to_string()),
            ("is_active", "eq.true".to_string()),
            ("order", "duration_days.asc".to_string()),
        ];

        let mut plans: Vec<SubscriptionPlan> = match self
            .api
            .get(&format!("{}/subscription_plans", REST_PREFIX), &query)
            .await
        {
            Ok(rows) => rows,
            Err(error) => {
                error!(%error, "failed to fetch plans");
                return Vec::new();
            }
        };

        plans.retain(|plan| plan.name != TRIAL_PLAN_NAME);
        plans.sort_by_key(|plan| plan.duration_days);
        plans
    }

    /// Record a payment and extend the target subscription.
    ///
    /// Fails closed when no agent is logged in: returns `false` without
    /// touching the network. The server computes the new expiry and writes
    /// the payment row in one transactional procedure; anything but an
    /// explicit `true` counts as failure.
    pub async fn extend_subscription(&self, user_id: Uuid, amount: i64, days: i32) -> bool {
        let Some(agent) = self.session.current_agent() else {
            warn!(%user_id, "extend_subscription called with no agent logged in");
            return false;
        };

        let args = serde_json::json!({
            "target_user_id": user_id,
            "payment_amount": amount,
            "agent_id_param": agent.id,
            "days_to_extend": days,
        });

        match self
            .api
            .rpc::<serde_json::Value, _>("extend_subscription", &args)
            .await
        {
            Ok(value) => value == serde_json::Value::Bool(true),
            Err(error) => {
                error!(%error, %user_id, "failed to extend subscription");
                false
            }
        }
    }

    /// Payment history for one subscriber, collector identity included.
    ///
    /// Empty on any failure.
    pub async fn fetch_payment_history(&self, user_id: Uuid) -> Vec<SubscriptionPayment> {
        let args = serde_json::json!({ "target_user_id": user_id });

        match self.api.rpc("get_subscription_payments", &args).await {
            Ok(rows) => rows,
            Err(error) => {
                error!(%error, %user_id, "failed to fetch payment history");
                Vec::new()
            }
        }
    }
}
