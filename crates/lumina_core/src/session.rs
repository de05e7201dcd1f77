//! crates/lumina_core/src/session.rs
//!
//! The session manager: one source of truth for the authenticated identity.
//!
//! Consumers pull the current user with [`SessionManager::current_user`] or
//! register for change notifications with [`SessionManager::subscribe`].
//! Identity always travels by explicit parameter passing from here; nothing
//! else in the crate holds session state.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::domain::User;
use crate::ports::{AuthProvider, PortResult};

type SessionCallback = Box<dyn Fn(Option<&User>) + Send + Sync>;

struct Listener {
    token: CancellationToken,
    callback: SessionCallback,
}

/// Tracks the authenticated identity by wrapping the auth provider's session
/// lifecycle and change notifications.
pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl SessionManager {
    /// Creates a new `SessionManager` over the given auth provider.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The currently signed-in user, or `None`.
    ///
    /// A transiently unavailable provider degrades to "signed out" instead of
    /// propagating a fault; the failure is logged.
    pub async fn current_user(&self) -> Option<User> {
        match self.provider.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "session lookup failed, treating as signed out");
                None
            }
        }
    }

    /// Registers `on_change` for session-change notifications (login, logout,
    /// token refresh).
    ///
    /// The returned [`Subscription`] is the teardown capability: once
    /// `unsubscribe` (or drop) returns, the handler will not be invoked
    /// again, even against a notification arriving concurrently.
    pub fn subscribe(
        &self,
        on_change: impl Fn(Option<&User>) + Send + Sync + 'static,
    ) -> Subscription {
        let token = CancellationToken::new();
        let listener = Listener {
            token: token.clone(),
            callback: Box::new(on_change),
        };
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
        Subscription {
            token,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers a session change to all live subscribers.
    ///
    /// Invoked on login and logout; the liveness token captured at subscribe
    /// time is re-checked immediately before each callback so a subscriber
    /// cancelled mid-delivery is skipped.
    pub fn notify(&self, user: Option<&User>) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|l| !l.token.is_cancelled());
        for listener in listeners.iter() {
            if listener.token.is_cancelled() {
                continue;
            }
            (listener.callback)(user);
        }
    }

    /// Requests session termination from the provider.
    ///
    /// The local view flips to "signed out" only after the provider confirms;
    /// a provider-side failure is logged and propagated with local state left
    /// untouched.
    pub async fn logout(&self) -> PortResult<()> {
        self.provider.sign_out().await.map_err(|e| {
            error!(error = %e, "sign-out failed, session state unchanged");
            e
        })?;
        self.notify(None);
        Ok(())
    }
}

/// The teardown capability returned by [`SessionManager::subscribe`].
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) cancels the
/// subscription. Teardown takes the listener lock, so it synchronizes with
/// any in-flight notification: when it returns, the callback cannot run.
pub struct Subscription {
    token: CancellationToken,
    listeners: Weak<Mutex<Vec<Listener>>>,
}

impl Subscription {
    /// True until the subscription is torn down.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Deterministically tears the subscription down.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|l| !l.token.is_cancelled());
        }
    }
}
