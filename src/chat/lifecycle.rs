//! Conversation lifecycle operations: create, rename, delete, select.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::rest::ChatApi;
use crate::chat::store::ConversationStore;
use crate::chat::types::{Conversation, ConversationDetail, ConversationId};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Manages conversation lifecycle against the remote store.
pub struct ConversationLifecycle {
    api: Arc<dyn ChatApi>,
    store: Arc<ConversationStore>,
    config: ClientConfig,
}

impl ConversationLifecycle {
    /// Create a lifecycle manager over the given API and store.
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, store: Arc<ConversationStore>, config: ClientConfig) -> Self {
        Self { api, store, config }
    }

    /// Create a conversation with the placeholder title, prepend it to the
    /// history list and make it current with an empty message list.
    ///
    /// # Errors
    /// Returns the classified failure; local state is left unchanged.
    pub async fn create(&self) -> ClientResult<Conversation> {
        self.store.set_loading(true);
        self.store.set_last_error(None);

        match self
            .api
            .create_conversation(&self.config.default_title, &self.config.default_description)
            .await
        {
            Ok(created) => {
                info!("created conversation {}", created.id);
                self.store.upsert_conversation_meta(created.clone());
                self.store.set_current_conversation(created.id.clone());
                self.store.replace_conversation_detail(ConversationDetail {
                    conversation: created.clone(),
                    messages: Vec::new(),
                });
                self.store.set_loading(false);
                Ok(created)
            }
            Err(err) => {
                let err = ClientError::from(err);
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                Err(err)
            }
        }
    }

    /// Rename a conversation; it does not need to be the current one.
    ///
    /// # Errors
    /// Returns `Validation` for an empty title (no network call), or the
    /// classified failure.
    pub async fn rename(&self, id: &ConversationId, new_title: &str) -> ClientResult<Conversation> {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Err(ClientError::Validation(
                "conversation title must not be empty".to_string(),
            ));
        }

        self.store.set_loading(true);
        self.store.set_last_error(None);

        match self.api.rename_conversation(id, new_title).await {
            Ok(renamed) => {
                debug!("renamed conversation {id} to {new_title:?}");
                self.store.upsert_conversation_meta(renamed.clone());
                self.store.set_loading(false);
                Ok(renamed)
            }
            Err(err) => {
                let err = ClientError::from(err);
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                Err(err)
            }
        }
    }

    /// Delete a conversation and remove it from the history list.
    ///
    /// The current-conversation state is not reset here even when the
    /// deleted conversation was current; the caller decides what to show
    /// next (typically `reset_to_new_conversation`).
    ///
    /// # Errors
    /// Returns the classified failure; the list entry is kept on failure.
    pub async fn delete(&self, id: &ConversationId) -> ClientResult<()> {
        self.store.set_loading(true);
        self.store.set_last_error(None);

        match self.api.delete_conversation(id).await {
            Ok(()) => {
                info!("deleted conversation {id}");
                self.store.remove_conversation(id);
                self.store.set_loading(false);
                Ok(())
            }
            Err(err) => {
                let err = ClientError::from(err);
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                Err(err)
            }
        }
    }

    /// Make an existing conversation current and fetch its detail.
    ///
    /// On a fetch failure the conversation stays selected (with an empty
    /// placeholder detail) and `last_error` is populated, so the caller can
    /// render "selected but failed to load".
    ///
    /// # Errors
    /// Returns the classified fetch failure.
    pub async fn select_existing(&self, id: &ConversationId) -> ClientResult<()> {
        self.store.set_current_conversation(id.clone());
        self.store.set_loading(true);
        self.store.set_last_error(None);

        match self.api.conversation_detail(id).await {
            Ok(detail) => {
                self.store.replace_conversation_detail(detail);
                self.store.set_loading(false);
                Ok(())
            }
            Err(err) => {
                let err = ClientError::from(err);
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                Err(err)
            }
        }
    }
}
