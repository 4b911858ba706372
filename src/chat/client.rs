//! Client wiring.
//!
//! [`ClientBackends`] gathers the injectable seams (endpoint traits,
//! credential storage, session); [`ChatClient`] validates the configuration
//! and assembles the store and the operation components around them.

use std::sync::Arc;

use crate::api::gateway::ApiGateway;
use crate::api::rest::{AuthApi, ChatApi, RestApi};
use crate::auth::credentials::{CredentialStore, FileCredentialStore};
use crate::auth::service::AuthService;
use crate::auth::session::SessionContext;
use crate::chat::coordinator::SendCoordinator;
use crate::chat::lifecycle::ConversationLifecycle;
use crate::chat::pager::HistoryPager;
use crate::chat::store::ConversationStore;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Backend dependencies for the client.
pub struct ClientBackends {
    /// Chat endpoint implementation.
    pub chat: Arc<dyn ChatApi>,
    /// Auth endpoint implementation.
    pub auth: Arc<dyn AuthApi>,
    /// Durable credential storage.
    pub credentials: Arc<dyn CredentialStore>,
    /// Session context shared with the gateway.
    pub session: Arc<SessionContext>,
}

impl ClientBackends {
    /// Build REST backends over a gateway configured from `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn rest(config: &ClientConfig) -> ClientResult<Self> {
        let session = Arc::new(SessionContext::new());
        let gateway = ApiGateway::new(config, session.clone())?;
        let api = Arc::new(RestApi::new(gateway));
        let credentials = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));

        Ok(Self {
            chat: api.clone(),
            auth: api,
            credentials,
            session,
        })
    }
}

/// The assembled client engine.
pub struct ChatClient {
    store: Arc<ConversationStore>,
    session: Arc<SessionContext>,
    auth: AuthService,
    pager: HistoryPager,
    coordinator: SendCoordinator,
    lifecycle: ConversationLifecycle,
}

impl ChatClient {
    /// Assemble a client from a validated configuration and backends.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ClientConfig, backends: ClientBackends) -> ClientResult<Self> {
        config.validate()?;

        let store = Arc::new(ConversationStore::new());
        let auth = AuthService::new(
            backends.auth,
            backends.session.clone(),
            backends.credentials,
        );
        let pager = HistoryPager::new(backends.chat.clone(), store.clone());
        let coordinator =
            SendCoordinator::new(backends.chat.clone(), store.clone(), config.clone());
        let lifecycle = ConversationLifecycle::new(backends.chat, store.clone(), config);

        Ok(Self {
            store,
            session: backends.session,
            auth,
            pager,
            coordinator,
            lifecycle,
        })
    }

    /// Assemble a client with REST backends.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let backends = ClientBackends::rest(&config)?;
        Self::new(config, backends)
    }

    /// The conversation store (the only state the presentation layer reads).
    #[must_use]
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// The shared session context.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Authentication flows.
    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// History pagination.
    #[must_use]
    pub const fn pager(&self) -> &HistoryPager {
        &self.pager
    }

    /// Message send coordination.
    #[must_use]
    pub const fn coordinator(&self) -> &SendCoordinator {
        &self.coordinator
    }

    /// Conversation lifecycle operations.
    #[must_use]
    pub const fn lifecycle(&self) -> &ConversationLifecycle {
        &self.lifecycle
    }
}
