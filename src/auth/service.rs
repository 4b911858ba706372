//! Authentication flows.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::rest::AuthApi;
use crate::auth::credentials::CredentialStore;
use crate::auth::session::{SessionContext, TokenPair, UserProfile};
use crate::error::{ClientError, ClientResult};

/// Minimum accepted password length, in characters.
const MIN_PASSWORD_CHARS: usize = 8;

/// Login, registration, token refresh, and credential persistence.
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: Arc<SessionContext>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthService {
    /// Create an auth service over the given API, session, and storage.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: Arc<SessionContext>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            api,
            session,
            credentials,
        }
    }

    /// Load persisted credentials into the session at startup.
    ///
    /// Storage failures degrade to an unauthenticated session.
    pub fn hydrate(&self) -> bool {
        match self.credentials.load() {
            Ok(Some(persisted)) => {
                self.session.hydrate(persisted);
                true
            }
            Ok(None) => false,
            Err(err) => {
                debug!("credential hydrate failed: {err}");
                false
            }
        }
    }

    /// Exchange credentials for a token pair and fetch the user profile.
    ///
    /// The profile fetch is best effort; the session is authenticated as
    /// soon as the tokens are stored.
    ///
    /// # Errors
    /// Returns `Validation` for empty input (no network call), `Auth` for
    /// rejected credentials, or the classified transport failure.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username and password must not be empty".to_string(),
            ));
        }

        let tokens: TokenPair = self.api.login(username, password).await?;
        self.session.set_tokens(tokens);
        self.persist();
        info!("logged in as {username}");

        match self.api.me().await {
            Ok(user) => {
                self.session.set_user(user);
                self.persist();
            }
            Err(err) => warn!("profile fetch after login failed: {err}"),
        }

        Ok(())
    }

    /// Register a new account.
    ///
    /// # Errors
    /// Returns `Validation` when a field is empty, the passwords differ, or
    /// the password violates the policy (all checked before any network
    /// call), or the classified server failure.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        re_password: &str,
    ) -> ClientResult<()> {
        validate_registration(email, username, password, re_password)?;
        self.api
            .register(email.trim(), username.trim(), password, re_password)
            .await?;
        info!("registered account {username}");
        Ok(())
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// This is an explicit operation; a 401 elsewhere never triggers it
    /// automatically.
    ///
    /// # Errors
    /// Returns `Auth` when no refresh token is held, or the classified
    /// failure.
    pub async fn refresh(&self) -> ClientResult<()> {
        let Some(refresh) = self.session.refresh_token() else {
            return Err(ClientError::Auth("no refresh token available".to_string()));
        };
        let access = self.api.refresh(&refresh).await?;
        self.session.set_access_token(access);
        self.persist();
        debug!("access token refreshed");
        Ok(())
    }

    /// Fetch and store the current user's profile.
    ///
    /// # Errors
    /// Returns the classified failure.
    pub async fn fetch_me(&self) -> ClientResult<UserProfile> {
        let user = self.api.me().await?;
        self.session.set_user(user.clone());
        self.persist();
        Ok(user)
    }

    /// Drop the session and the persisted credentials.
    ///
    /// # Errors
    /// Returns `Storage` when the durable record cannot be removed; the
    /// in-memory session is cleared regardless.
    pub fn logout(&self) -> ClientResult<()> {
        self.session.clear();
        self.credentials.clear()
    }

    fn persist(&self) {
        if let Some(persisted) = self.session.persisted()
            && let Err(err) = self.credentials.save(&persisted)
        {
            warn!("credential persist failed: {err}");
        }
    }
}

fn validate_registration(
    email: &str,
    username: &str,
    password: &str,
    re_password: &str,
) -> ClientResult<()> {
    if email.trim().is_empty() || username.trim().is_empty() {
        return Err(ClientError::Validation(
            "email and username must not be empty".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(ClientError::Validation(
            "email address is not valid".to_string(),
        ));
    }
    if password != re_password {
        return Err(ClientError::Validation("passwords do not match".to_string()));
    }
    validate_password(password)
}

/// Password policy: at least eight characters with a lowercase letter, an
/// uppercase letter, a digit, and a symbol.
fn validate_password(password: &str) -> ClientResult<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_CHARS;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| c.is_ascii_punctuation());

    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ClientError::Validation(
            "password must be at least 8 characters and include lowercase, uppercase, digit, and symbol".to_string(),
        ))
    }
}
