//! The session store: one current agent, durable across restarts, with
//! subscribe/notify semantics for front-end surfaces.

use std::sync::{Arc, Mutex, Weak};

use anyhow::Result;
use async_trait::async_trait;
use khata_core::models::Agent;
use tracing::{debug, warn};

use crate::storage::SessionStorage;

/// Checks an agent's phone + PIN against the backend.
///
/// Seam between the session store and the transport, so the store can be
/// tested without a network.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the matching agent, or `None` when the credentials are
    /// rejected.
    async fn verify_pin(&self, phone: &str, pin: &str) -> Result<Option<Agent>>;
}

type AuthCallback = Arc<dyn Fn(Option<&Agent>) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, AuthCallback)>,
}

/// Tracks the single authenticated agent.
///
/// Holds the identity in memory, mirrors it to durable storage, and
/// notifies subscribers on every login/logout. Constructed explicitly and
/// shared by reference; there is no process-wide instance.
///
/// Login and logout are expected to be single-flight user actions. Each
/// write is an atomic replace-then-notify; listeners run synchronously,
/// in registration order, outside the internal locks.
pub struct SessionStore {
    current: Mutex<Option<Agent>>,
    registry: Arc<Mutex<ListenerRegistry>>,
    storage: Arc<dyn SessionStorage>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        SessionStore {
            current: Mutex::new(None),
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
            storage,
            verifier,
        }
    }

    /// Verify credentials and establish the session.
    ///
    /// Returns the agent on success. Rejected credentials and transport
    /// errors both come back as `None` and leave existing state untouched.
    pub async fn login(&self, phone: &str, pin: &str) -> Option<Agent> {
        let agent = match self.verifier.verify_pin(phone, pin).await {
            Ok(Some(agent)) => agent,
            Ok(None) => {
                debug!("agent credentials rejected");
                return None;
            }
            Err(error) => {
                warn!(%error, "agent verification failed");
                return None;
            }
        };

        *self.current.lock().unwrap() = Some(agent.clone());
        if let Err(error) = self.storage.save(&agent).await {
            warn!(%error, "failed to persist session record");
        }
        self.notify();

        Some(agent)
    }

    /// Load the persisted identity on cold start.
    ///
    /// Trusts the locally cached record: no server round trip and no
    /// client-side expiry. Does not notify subscribers.
    pub async fn restore_session(&self) -> Option<Agent> {
        match self.storage.load().await {
            Ok(Some(agent)) => {
                *self.current.lock().unwrap() = Some(agent.clone());
                Some(agent)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "failed to restore session record");
                None
            }
        }
    }

    /// Clear the session, delete the durable record, notify subscribers.
    pub async fn logout(&self) {
        *self.current.lock().unwrap() = None;
        if let Err(error) = self.storage.clear().await {
            warn!(%error, "failed to delete session record");
        }
        self.notify();
    }

    /// Synchronous read of the in-memory identity.
    pub fn current_agent(&self) -> Option<Agent> {
        self.current.lock().unwrap().clone()
    }

    /// Register a listener for login/logout changes.
    ///
    /// The callback fires once immediately with the current identity, then
    /// after every subsequent login or logout.
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<&Agent>) + Send + Sync + 'static,
    ) -> AuthSubscription {
        let callback: AuthCallback = Arc::new(callback);

        let id = {
            let mut registry = self.registry.lock().unwrap();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, callback.clone()));
            id
        };

        let current = self.current_agent();
        callback(current.as_ref());

        AuthSubscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    fn notify(&self) {
        let current = self.current_agent();
        // Snapshot under the lock, invoke outside it: a listener may
        // subscribe or read the store from inside its callback.
        let callbacks: Vec<AuthCallback> = {
            let registry = self.registry.lock().unwrap();
            registry
                .listeners
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect()
        };

        for callback in callbacks {
            callback(current.as_ref());
        }
    }
}

/// Handle returned by [`SessionStore::subscribe`].
///
/// Dropping the handle does not detach the listener; call
/// [`unsubscribe`](AuthSubscription::unsubscribe). Unsubscribing twice,
/// or after the store itself is gone, is a no-op.
pub struct AuthSubscription {
    registry: Weak<Mutex<ListenerRegistry>>,
    id: u64,
}

impl AuthSubscription {
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileSessionStorage, MemorySessionStorage};
    use tempfile::tempdir;
    use uuid::Uuid;

    fn sample_agent() -> Agent {
        Agent {
            id: Uuid::new_v4(),
            name: "Rahim Uddin".to_string(),
            phone: "01712345678".to_string(),
            is_active: true,
        }
    }

    /// Accepts exactly one phone/PIN pair.
    struct StaticVerifier {
        phone: &'static str,
        pin: &'static str,
        agent: Agent,
    }

    #[async_trait]
    impl CredentialVerifier for StaticVerifier {
        async fn verify_pin(&self, phone: &str, pin: &str) -> Result<Option<Agent>> {
            if phone == self.phone && pin == self.pin {
                Ok(Some(self.agent.clone()))
            } else {
                Ok(None)
            }
        }
    }

    /// Simulates a transport failure on every call.
    struct FailingVerifier;

    #[async_trait]
    impl CredentialVerifier for FailingVerifier {
        async fn verify_pin(&self, _phone: &str, _pin: &str) -> Result<Option<Agent>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn store_with(agent: Agent) -> SessionStore {
        SessionStore::new(
            Arc::new(MemorySessionStorage::new()),
            Arc::new(StaticVerifier {
                phone: "01712345678",
                pin: "1234",
                agent,
            }),
        )
    }

    #[tokio::test]
    async fn login_accepted_sets_current_agent() {
        let agent = sample_agent();
        let store = store_with(agent.clone());

        let logged_in = store.login("01712345678", "1234").await;
        assert_eq!(logged_in, Some(agent.clone()));
        assert_eq!(store.current_agent(), Some(agent));
    }

    #[tokio::test]
    async fn login_rejected_leaves_state_unchanged() {
        let agent = sample_agent();
        let store = store_with(agent.clone());

        assert!(store.login("01712345678", "0000").await.is_none());
        assert!(store.current_agent().is_none());

        // an established session survives a later failed attempt
        store.login("01712345678", "1234").await.unwrap();
        assert!(store.login("01799999999", "1234").await.is_none());
        assert_eq!(store.current_agent(), Some(agent));
    }

    #[tokio::test]
    async fn transport_error_folds_into_failed_login() {
        let store = SessionStore::new(
            Arc::new(MemorySessionStorage::new()),
            Arc::new(FailingVerifier),
        );

        assert!(store.login("01712345678", "1234").await.is_none());
        assert!(store.current_agent().is_none());
    }

    #[tokio::test]
    async fn session_survives_restart_via_shared_storage() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FileSessionStorage::new(dir.path()).await.unwrap());
        let agent = sample_agent();

        let store = SessionStore::new(
            storage.clone(),
            Arc::new(StaticVerifier {
                phone: "01712345678",
                pin: "1234",
                agent: agent.clone(),
            }),
        );
        store.login("01712345678", "1234").await.unwrap();

        // fresh store over the same storage location
        let restarted = SessionStore::new(storage, Arc::new(FailingVerifier));
        assert_eq!(restarted.restore_session().await, Some(agent.clone()));
        assert_eq!(restarted.current_agent(), Some(agent));
    }

    #[tokio::test]
    async fn logout_then_restore_returns_none() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FileSessionStorage::new(dir.path()).await.unwrap());

        let store = SessionStore::new(
            storage.clone(),
            Arc::new(StaticVerifier {
                phone: "01712345678",
                pin: "1234",
                agent: sample_agent(),
            }),
        );
        store.login("01712345678", "1234").await.unwrap();
        store.logout().await;
        assert!(store.current_agent().is_none());

        let restarted = SessionStore::new(storage, Arc::new(FailingVerifier));
        assert!(restarted.restore_session().await.is_none());
    }

    #[tokio::test]
    async fn restore_tolerates_corrupted_record() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FileSessionStorage::new(dir.path()).await.unwrap());
        tokio::fs::write(storage.path(), b"{ truncated").await.unwrap();

        let store = SessionStore::new(storage, Arc::new(FailingVerifier));
        assert!(store.restore_session().await.is_none());
        assert!(store.current_agent().is_none());
    }

    #[tokio::test]
    async fn subscribe_fires_immediately_then_per_change() {
        let agent = sample_agent();
        let store = store_with(agent.clone());

        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(move |current| {
            sink.lock()
                .unwrap()
                .push(current.map(|a| a.name.clone()));
        });

        // immediate synchronous call with the pre-subscribe value
        assert_eq!(seen.lock().unwrap().as_slice(), &[None]);

        store.login("01712345678", "1234").await.unwrap();
        store.logout().await;
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[None, Some("Rahim Uddin".to_string()), None]
        );

        subscription.unsubscribe();
        store.login("01712345678", "1234").await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn listeners_run_in_registration_order() {
        let store = store_with(sample_agent());

        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();
        store.subscribe(move |_| first.lock().unwrap().push("first"));
        store.subscribe(move |_| second.lock().unwrap().push("second"));
        order.lock().unwrap().clear();

        store.login("01712345678", "1234").await.unwrap();
        assert_eq!(order.lock().unwrap().as_slice(), &["first", "second"]);
    }

    #[tokio::test]
    async fn failed_login_does_not_notify() {
        let store = store_with(sample_agent());

        let count = Arc::new(Mutex::new(0u32));
        let sink = count.clone();
        store.subscribe(move |_| *sink.lock().unwrap() += 1);
        assert_eq!(*count.lock().unwrap(), 1);

        store.login("01712345678", "0000").await;
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent_and_survives_store_drop() {
        let store = store_with(sample_agent());
        let subscription = store.subscribe(|_| {});

        subscription.unsubscribe();
        subscription.unsubscribe();

        drop(store);
        subscription.unsubscribe();
    }
}
