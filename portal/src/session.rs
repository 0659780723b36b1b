// portal/src/session.rs
use std::sync::Arc;

use common::models::session::{Credentials, Identity, LoginResponse, SessionSnapshot};
use common::utils::extract_identity;

use crate::api::{AuthError, PortalApi};
use crate::store::SessionStore;

/// Process-wide session state for one portal tab.
///
/// Constructed once at startup and injected into consumers. Owns the
/// persisted snapshot and is the only writer of the API client's bearer
/// header, which always equals the current token.
pub struct SessionManager {
    api: Arc<dyn PortalApi>,
    store: SessionStore,
    token: Option<String>,
    identity: Option<Identity>,
    loading: bool,
}

impl SessionManager {
    pub fn new(api: Arc<dyn PortalApi>, store: SessionStore) -> Self {
        Self {
            api,
            store,
            token: None,
            identity: None,
            loading: true,
        }
    }

    /// Restore a persisted session before the first render. Synchronous so
    /// a reloaded tab never flashes the logged-out state while signed in.
    pub fn hydrate(&mut self) {
        let SessionSnapshot { token, identity } = self.store.read();
        if let Some(token) = token {
            // A snapshot can lose its identity key independently of the
            // token; re-derive it from the claims in that case.
            let identity = identity.unwrap_or_else(|| extract_identity(&token, None, ""));
            self.api.set_bearer(Some(&token));
            tracing::debug!("Restored persisted session for {}", identity.username);
            self.token = Some(token);
            self.identity = Some(identity);
        }
        self.loading = false;
    }

    pub fn user(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn api(&self) -> &Arc<dyn PortalApi> {
        &self.api
    }

    /// Authenticate against the backend and install the returned token.
    ///
    /// On success the persisted pair and the bearer header are updated as a
    /// single effect and the raw server payload is returned for flow
    /// sequencing. On any failure no part of the session changes hands: a
    /// rejected login leaves the previous state untouched, and a persist
    /// failure degrades the whole session to logged out.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let response = self.api.login(credentials).await?;

        let identity = extract_identity(
            &response.access_token,
            credentials.role.as_deref(),
            &credentials.username_or_email,
        );

        if let Err(e) = self.store.write(&response.access_token, &identity) {
            tracing::error!("Failed to persist session, dropping it: {}", e);
            self.token = None;
            self.identity = None;
            self.api.set_bearer(None);
            return Err(AuthError::Storage(e));
        }

        self.api.set_bearer(Some(&response.access_token));
        tracing::info!("Session established for {} ({})", identity.username, identity.role);
        self.token = Some(response.access_token.clone());
        self.identity = Some(identity);

        Ok(response)
    }

    /// Drop the session everywhere: memory, persisted store, bearer header.
    /// Safe to call when already logged out.
    pub fn logout(&mut self) {
        if self.token.is_some() {
            tracing::info!("Session cleared");
        }
        self.token = None;
        self.identity = None;
        self.store.clear();
        self.api.set_bearer(None);
    }
}
