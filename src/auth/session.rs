//! In-memory session context shared between the gateway and the auth flows.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// The subset of the user profile the client keeps around.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned user identifier.
    pub uid: String,
    /// Account email address.
    pub email: String,
    /// Display username.
    pub username: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account has a premium plan.
    pub is_premium: bool,
}

/// Access/refresh token pair returned by the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token, attached to every authenticated call.
    pub access: String,
    /// Long-lived refresh token, exchanged for a new access token.
    pub refresh: String,
}

/// Durable credential record, persisted across sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
    /// Last-known user profile, if it was fetched.
    pub user: Option<UserProfile>,
}

#[derive(Debug, Default)]
struct SessionState {
    access: Option<String>,
    refresh: Option<String>,
    user: Option<UserProfile>,
}

/// Mutable session cell.
///
/// The gateway reads the access token on every call; only the auth flows
/// write. The interior lock is never held across an await point.
#[derive(Debug, Default)]
pub struct SessionContext {
    state: RwLock<SessionState>,
}

impl SessionContext {
    /// Create an empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read().access.clone()
    }

    /// Current refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh.clone()
    }

    /// Last-known user profile, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    /// Check whether an access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().access.is_some()
    }

    /// Store a fresh token pair (login).
    pub fn set_tokens(&self, tokens: TokenPair) {
        let mut state = self.write();
        state.access = Some(tokens.access);
        state.refresh = Some(tokens.refresh);
    }

    /// Replace only the access token (refresh).
    pub fn set_access_token(&self, access: String) {
        self.write().access = Some(access);
    }

    /// Store the user profile.
    pub fn set_user(&self, user: UserProfile) {
        self.write().user = Some(user);
    }

    /// Load persisted credentials at session start.
    pub fn hydrate(&self, persisted: PersistedSession) {
        let mut state = self.write();
        state.access = Some(persisted.access);
        state.refresh = Some(persisted.refresh);
        state.user = persisted.user;
    }

    /// Drop all credentials (logout).
    pub fn clear(&self) {
        let mut state = self.write();
        state.access = None;
        state.refresh = None;
        state.user = None;
    }

    /// Snapshot the session for durable storage; `None` when unauthenticated.
    #[must_use]
    pub fn persisted(&self) -> Option<PersistedSession> {
        let state = self.read();
        match (&state.access, &state.refresh) {
            (Some(access), Some(refresh)) => Some(PersistedSession {
                access: access.clone(),
                refresh: refresh.clone(),
                user: state.user.clone(),
            }),
            _ => None,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserProfile {
        UserProfile {
            uid: "u1".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            is_active: true,
            is_premium: false,
        }
    }

    #[test]
    fn test_tokens_round_trip() {
        let session = SessionContext::new();
        assert!(!session.is_authenticated());
        session.set_tokens(TokenPair {
            access: "a".to_string(),
            refresh: "r".to_string(),
        });
        assert_eq!(session.access_token().as_deref(), Some("a"));
        assert_eq!(session.refresh_token().as_deref(), Some("r"));
        session.set_access_token("a2".to_string());
        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r"));
    }

    #[test]
    fn test_persisted_requires_both_tokens() {
        let session = SessionContext::new();
        assert!(session.persisted().is_none());
        session.set_access_token("a".to_string());
        assert!(session.persisted().is_none());
    }

    #[test]
    fn test_hydrate_and_clear() {
        let session = SessionContext::new();
        session.hydrate(PersistedSession {
            access: "a".to_string(),
            refresh: "r".to_string(),
            user: Some(sample_user()),
        });
        assert!(session.is_authenticated());
        assert_eq!(session.user().map(|u| u.username), Some("ada".to_string()));
        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.persisted().is_none());
    }
}
