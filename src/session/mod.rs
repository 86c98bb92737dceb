//! Signed-in session for the console.
//!
//! The session is created once at start-up from the configured API token and
//! shared (as `Arc<dyn SessionProvider>`) with the HTTP client and the UI. It
//! holds the bearer token and the current user; nothing is written to disk.
//!
//! ## Usage
//!
//! ```ignore
//! use voxdesk::session::{Session, SessionProvider};
//!
//! let session = Session::new(Some(token));
//! let client = ApiClient::new(&config, session.clone())?;
//! client.refresh_current_user().await?;
//! println!("Signed in as {}", session.current_user().unwrap().email);
//! ```

use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::User;

/// Process-wide auth state, injected wherever it is needed.
pub trait SessionProvider: Send + Sync {
    /// Bearer token attached to outbound requests.
    fn access_token(&self) -> Option<String>;

    fn current_user(&self) -> Option<User>;

    fn set_current_user(&self, user: Option<User>);

    /// Forget the token and the user.
    fn logout(&self);

    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

/// In-memory [`SessionProvider`].
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// Create a session from an optional bearer token.
    pub fn new(token: Option<String>) -> Arc<Self> {
        let token = token.filter(|t| !t.trim().is_empty());
        Arc::new(Self {
            state: RwLock::new(SessionState { token, user: None }),
        })
    }

    /// Replace the bearer token (e.g. after signing in again).
    pub fn set_token(&self, token: Option<String>) {
        self.state.write().token = token;
    }

    /// Credit balance of the current user, if known.
    pub fn credits(&self) -> Option<f64> {
        self.state.read().user.as_ref().map(|u| u.credits)
    }
}

impl SessionProvider for Session {
    fn access_token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    fn current_user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    fn set_current_user(&self, user: Option<User>) {
        if let Some(user) = &user {
            tracing::debug!(user_id = %user.id, "Session user updated");
        }
        self.state.write().user = user;
    }

    fn logout(&self) {
        let mut state = self.state.write();
        state.token = None;
        state.user = None;
        tracing::info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "ops@example.com".to_string(),
            name: Some("Ops".to_string()),
            credits: 12.5,
            payment_method: None,
            onboarded: true,
        }
    }

    #[test]
    fn test_blank_token_is_unauthenticated() {
        let session = Session::new(Some("   ".to_string()));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_user_roundtrip_and_logout() {
        let session = Session::new(Some("tok".to_string()));
        assert!(session.is_authenticated());
        assert!(session.current_user().is_none());

        session.set_current_user(Some(user()));
        assert_eq!(session.credits(), Some(12.5));
        assert_eq!(session.current_user().unwrap().email, "ops@example.com");

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_usable_as_trait_object() {
        let session: Arc<dyn SessionProvider> = Session::new(Some("tok".to_string()));
        assert_eq!(session.access_token().as_deref(), Some("tok"));
    }
}
