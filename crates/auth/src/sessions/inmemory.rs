//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use graphdesk_core::auth::{
    generate_session_id, AuthFlowState, Principal, Result, SessionId, SessionRepository,
};

/// In-memory session store.
///
/// Stores principals and auth flow state in HashMaps wrapped in `Arc<RwLock<_>>`.
/// Data is not persisted and will be lost when the process exits.
///
/// Sessions never expire. Auth flows are dropped once they are older than
/// [`AUTH_FLOW_TTL`](graphdesk_core::auth::AUTH_FLOW_TTL): every new flow
/// sweeps the stale ones, and a stale flow is never handed out.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Principal>>>,
    auth_flows: Arc<RwLock<HashMap<String, AuthFlowState>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            auth_flows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Number of sign-ins waiting for their callback.
    pub async fn pending_auth_flows(&self) -> usize {
        self.auth_flows.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn create_session(&self, principal: Principal) -> Result<SessionId> {
        let mut sessions = self.sessions.write().await;
        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }
        sessions.insert(id.clone(), principal);
        Ok(id)
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Principal>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }

    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let mut flows = self.auth_flows.write().await;

        let now = Utc::now();
        let before = flows.len();
        flows.retain(|_, pending| !pending.is_expired(now));
        let swept = before - flows.len();
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired auth flows");
        }

        flows.insert(state.to_string(), flow.clone());
        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        let mut flows = self.auth_flows.write().await;
        Ok(flows
            .remove(state)
            .filter(|flow| !flow.is_expired(Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphdesk_core::auth::{UserProfile, AUTH_FLOW_TTL};

    fn principal(name: &str) -> Principal {
        Principal {
            profile: UserProfile::new(name, format!("{name}@example.com")),
            access_token: format!("{name}-access"),
            refresh_token: Some(format!("{name}-refresh")),
        }
    }

    fn auth_flow(verifier: &str) -> AuthFlowState {
        AuthFlowState {
            pkce_verifier: verifier.to_string(),
            nonce: "nonce".to_string(),
            created_at: Utc::now(),
        }
    }

    // ==================== Session Tests ====================

    #[tokio::test]
    async fn test_session_create_and_get() {
        let store = SessionStore::new();
        let alice = principal("alice");

        let id = store.create_session(alice.clone()).await.unwrap();

        let retrieved = store.get_session(&id).await.unwrap();
        assert_eq!(retrieved, Some(alice));
    }

    #[tokio::test]
    async fn test_session_ids_are_distinct() {
        let store = SessionStore::new();

        let first = store.create_session(principal("alice")).await.unwrap();
        let second = store.create_session(principal("alice")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_session_get_nonexistent() {
        let store = SessionStore::new();

        let result = store
            .get_session(&SessionId::new("nonexistent".to_string()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_session_delete_is_idempotent() {
        let store = SessionStore::new();
        let id = store.create_session(principal("alice")).await.unwrap();

        store.delete_session(&id).await.unwrap();
        assert!(store.get_session(&id).await.unwrap().is_none());

        // Deleting again, or deleting an unknown ID, is a no-op
        assert!(store.delete_session(&id).await.is_ok());
        assert!(store
            .delete_session(&SessionId::new("nonexistent".to_string()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_leaves_other_sessions() {
        let store = SessionStore::new();
        let alice = store.create_session(principal("alice")).await.unwrap();
        let bob = store.create_session(principal("bob")).await.unwrap();

        store.delete_session(&alice).await.unwrap();

        assert_eq!(store.get_session(&bob).await.unwrap(), Some(principal("bob")));
    }

    // ==================== Auth Flow Tests ====================

    #[tokio::test]
    async fn test_auth_flow_store_and_take() {
        let store = SessionStore::new();

        store
            .store_auth_flow("state-abc", &auth_flow("test-verifier"))
            .await
            .unwrap();

        let retrieved = store.take_auth_flow("state-abc").await.unwrap().unwrap();
        assert_eq!(retrieved.pkce_verifier, "test-verifier");

        // Should be gone after taking
        assert!(store.take_auth_flow("state-abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_auth_flow_overwrite() {
        let store = SessionStore::new();

        store
            .store_auth_flow("same-state", &auth_flow("verifier-1"))
            .await
            .unwrap();
        store
            .store_auth_flow("same-state", &auth_flow("verifier-2"))
            .await
            .unwrap();

        let retrieved = store.take_auth_flow("same-state").await.unwrap().unwrap();
        assert_eq!(retrieved.pkce_verifier, "verifier-2");
    }

    #[tokio::test]
    async fn test_expired_auth_flow_is_not_returned() {
        let store = SessionStore::new();
        let mut stale = auth_flow("old-verifier");
        stale.created_at = Utc::now() - AUTH_FLOW_TTL - chrono::Duration::seconds(1);

        store.store_auth_flow("stale", &stale).await.unwrap();

        assert!(store.take_auth_flow("stale").await.unwrap().is_none());
        assert_eq!(store.pending_auth_flows().await, 0);
    }

    #[tokio::test]
    async fn test_new_auth_flow_sweeps_expired_ones() {
        let store = SessionStore::new();
        let mut stale = auth_flow("old-verifier");
        stale.created_at = Utc::now() - AUTH_FLOW_TTL - chrono::Duration::minutes(1);
        store.store_auth_flow("stale-1", &stale).await.unwrap();
        store.store_auth_flow("stale-2", &stale).await.unwrap();

        store
            .store_auth_flow("fresh", &auth_flow("new-verifier"))
            .await
            .unwrap();

        assert_eq!(store.pending_auth_flows().await, 1);
        let fresh = store.take_auth_flow("fresh").await.unwrap().unwrap();
        assert_eq!(fresh.pkce_verifier, "new-verifier");
    }

    // ==================== Clone Tests ====================

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = SessionStore::new();
        let clone = store.clone();

        let id = store.create_session(principal("alice")).await.unwrap();

        // Clone should see the same session
        assert!(clone.get_session(&id).await.unwrap().is_some());
    }
}
