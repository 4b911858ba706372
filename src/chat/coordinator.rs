//! Message send orchestration.
//!
//! One send runs through: ensure a conversation exists (creating it remotely
//! on demand), insert the user message optimistically, persist it, reconcile
//! with the assistant's reply, and route failures into the failed-message
//! queue. Conversation creation is single-flight: concurrent first sends
//! serialize behind one guard and land in the same conversation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::rest::ChatApi;
use crate::chat::store::ConversationStore;
use crate::chat::types::{
    ConversationDetail, ConversationId, ImageAttachment, Message, MessageId, MessageRole,
    truncate_chars,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Coordinates message sends against the remote store.
pub struct SendCoordinator {
    api: Arc<dyn ChatApi>,
    store: Arc<ConversationStore>,
    config: ClientConfig,
    /// Serializes conversation-creation-on-demand across concurrent sends.
    ensure_guard: Mutex<()>,
}

impl SendCoordinator {
    /// Create a coordinator over the given API and store.
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, store: Arc<ConversationStore>, config: ClientConfig) -> Self {
        Self {
            api,
            store,
            config,
            ensure_guard: Mutex::new(()),
        }
    }

    /// Send a message, creating a conversation first when none is current.
    ///
    /// The user message is appended to the store before the network call
    /// resolves; on success it stays and the assistant's reply is appended,
    /// on failure it moves to the failed queue. The loading flag is cleared
    /// on every outcome. Returns the assistant's reply.
    ///
    /// # Errors
    /// Returns `Validation` for empty input (no network call), the creation
    /// failure when a conversation could not be ensured (nothing appended),
    /// or the classified send failure.
    pub async fn send(
        &self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> ClientResult<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation(
                "message text must not be empty".to_string(),
            ));
        }

        self.store.set_last_error(None);
        self.store.set_loading(true);

        let conversation_id = match self.ensure_conversation().await {
            Ok(id) => id,
            Err(err) => {
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                return Err(err);
            }
        };

        let message = Message::user_local(
            conversation_id.clone(),
            text,
            image.as_ref().map(|i| i.file_name.clone()),
        );
        self.store.append_user_message(message.clone());

        match self
            .api
            .send_message(&conversation_id, text, image.as_ref())
            .await
        {
            Ok(reply) => {
                self.store.append_assistant_message(reply.clone());
                self.store.set_loading(false);
                self.maybe_auto_title(&conversation_id).await;
                Ok(reply)
            }
            Err(err) => {
                let err = ClientError::from(err);
                self.store
                    .enqueue_failed_message(message, format!("send failed: {err}"));
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                Err(err)
            }
        }
    }

    /// Retry a failed message against its original conversation.
    ///
    /// The retry is text-only: an image attached to the original send is not
    /// re-sent. On success the queue entry is removed, the user message is
    /// re-appended under its original identity and the assistant's reply
    /// follows it; on failure the entry stays queued and is not retried
    /// again automatically.
    ///
    /// # Errors
    /// Returns `Validation` when the id is not queued, or the classified
    /// send failure.
    pub async fn retry(&self, id: &MessageId) -> ClientResult<Message> {
        let Some(failed) = self
            .store
            .failed_messages()
            .into_iter()
            .find(|f| f.message.id == *id)
        else {
            return Err(ClientError::Validation(
                "message is not in the failed queue".to_string(),
            ));
        };

        self.store.set_last_error(None);
        self.store.set_loading(true);

        let conversation_id = failed.message.conversation_id.clone();
        match self
            .api
            .send_message(&conversation_id, &failed.message.text, None)
            .await
        {
            Ok(reply) => {
                if let Some(entry) = self.store.dequeue_failed_message(id) {
                    self.store.append_user_message(entry.message);
                }
                self.store.append_assistant_message(reply.clone());
                self.store.set_loading(false);
                info!("retried message {id} successfully");
                Ok(reply)
            }
            Err(err) => {
                let err = ClientError::from(err);
                self.store.set_last_error(Some(err.to_string()));
                self.store.set_loading(false);
                Err(err)
            }
        }
    }

    /// Resolve the current conversation id, creating one remotely on demand.
    ///
    /// The whole check-create-fetch sequence holds the ensure guard, so two
    /// concurrent sends on a fresh session issue exactly one create call.
    async fn ensure_conversation(&self) -> ClientResult<ConversationId> {
        let _guard = self.ensure_guard.lock().await;

        if let Some(id) = self.store.current_conversation_id() {
            return Ok(id);
        }

        let created = self
            .api
            .create_conversation(&self.config.default_title, &self.config.default_description)
            .await?;
        let id = created.id.clone();
        info!("created conversation {id} on demand");

        self.store.upsert_conversation_meta(created.clone());
        self.store.set_current_conversation(id.clone());
        self.store.replace_conversation_detail(ConversationDetail {
            conversation: created,
            messages: Vec::new(),
        });

        // Best effort: the created conversation is already usable; a failed
        // detail fetch must not abort the send.
        match self.api.conversation_detail(&id).await {
            Ok(detail) => self.store.replace_conversation_detail(detail),
            Err(err) => warn!("detail fetch after create failed: {err}"),
        }

        Ok(id)
    }

    /// Derive a title from the first user message once a conversation has
    /// enough content and still carries the placeholder title. Best effort:
    /// a rename failure never rolls back the send.
    async fn maybe_auto_title(&self, id: &ConversationId) {
        let Some(detail) = self.store.current_detail() else {
            return;
        };
        if detail.conversation.id != *id
            || detail.conversation.title != self.config.default_title
            || detail.messages.len() < self.config.auto_title_min_messages
        {
            return;
        }
        let Some(first_user) = detail
            .messages
            .iter()
            .find(|m| m.role == MessageRole::User)
        else {
            return;
        };

        let title = truncate_chars(first_user.text.trim(), self.config.auto_title_max_chars);
        match self.api.rename_conversation(id, &title).await {
            Ok(renamed) => {
                debug!("auto-titled conversation {id} as {title:?}");
                self.store.upsert_conversation_meta(renamed);
            }
            Err(err) => debug!("auto-title rename failed: {err}"),
        }
    }
}
