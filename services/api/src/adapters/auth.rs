//! services/api/src/adapters/auth.rs
//!
//! Binds one request's session token to the `AuthProvider` port, so the
//! core's `SessionManager` can ask "who is signed in" without knowing about
//! cookies or the sessions table.

use std::sync::Arc;

use async_trait::async_trait;
use lumina_core::domain::User;
use lumina_core::ports::{AuthProvider, AuthStore, PortError, PortResult};

/// An `AuthProvider` backed by the auth-session store, scoped to one token.
pub struct TokenAuthProvider {
    store: Arc<dyn AuthStore>,
    token: String,
}

impl TokenAuthProvider {
    pub fn new(store: Arc<dyn AuthStore>, token: String) -> Self {
        Self { store, token }
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn current_user(&self) -> PortResult<Option<User>> {
        match self.store.validate_auth_session(&self.token).await {
            Ok(user) => Ok(Some(user)),
            // An unknown or expired token is simply "nobody signed in".
            Err(PortError::NotAuthenticated) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.store.delete_auth_session(&self.token).await
    }
}
