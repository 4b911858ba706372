//! Serde mirrors of the server payloads.
//!
//! The backend mixes snake_case and camelCase between endpoints (list entries
//! carry `created_at`, detail and message objects carry `createdAt`); these
//! structs preserve each endpoint's field names exactly and convert into the
//! domain types from [`crate::chat::types`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::chat::types::{
    Conversation, ConversationDetail, ConversationId, HistoryPage, Message, MessageId, MessageRole,
};

/// A conversation entry as returned by the list and mutation endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct ConversationPayload {
    /// Server-assigned identifier.
    pub uid: String,
    /// Optional URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Identifier of the owning user.
    pub registered_by: String,
    /// Display name of the owning user.
    pub registered_by_username: String,
}

/// Inner container of the paginated history response.
#[derive(Clone, Debug, Deserialize)]
pub struct HistoryResultsPayload {
    /// Conversation entries for this page.
    pub chats: Vec<ConversationPayload>,
}

/// Paginated history response.
#[derive(Clone, Debug, Deserialize)]
pub struct HistoryPagePayload {
    /// Total conversation count.
    pub count: u64,
    /// Absolute URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
    /// Page results.
    pub results: HistoryResultsPayload,
}

/// A message object as returned by the detail and send endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct MessagePayload {
    /// Server-assigned identifier.
    pub uid: String,
    /// Optional URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Identifier of the containing conversation.
    pub chat_room: String,
    /// Text content.
    pub text_message: String,
    /// Author role.
    pub rol: MessageRole,
    /// Optional image URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Inner conversation object of the detail response.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatPayload {
    /// Server-assigned identifier.
    pub uid: String,
    /// Optional URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Ordered messages of the conversation.
    pub chat_messages: Vec<MessagePayload>,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Identifier of the owning user.
    pub registered_by: String,
    /// Display name of the owning user.
    pub registered_by_username: String,
}

/// Detail response wrapper.
#[derive(Clone, Debug, Deserialize)]
pub struct ConversationDetailPayload {
    /// The conversation with its messages.
    pub chat: ChatPayload,
}

/// Send-message response wrapper; the payload carries the assistant's reply.
#[derive(Clone, Debug, Deserialize)]
pub struct SendMessageResponsePayload {
    /// The assistant's reply message.
    pub message: MessagePayload,
}

/// Token pair returned by the login endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenPairPayload {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
}

/// Response of the token refresh endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenPayload {
    /// The replacement access token.
    pub access: String,
}

impl From<ConversationPayload> for Conversation {
    fn from(payload: ConversationPayload) -> Self {
        Self {
            id: ConversationId::new(payload.uid),
            slug: payload.slug,
            title: payload.title,
            description: payload.description,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            owner_id: payload.registered_by,
            owner_name: payload.registered_by_username,
        }
    }
}

impl From<HistoryPagePayload> for HistoryPage {
    fn from(payload: HistoryPagePayload) -> Self {
        Self {
            total_count: payload.count,
            next: payload.next,
            previous: payload.previous,
            conversations: payload
                .results
                .chats
                .into_iter()
                .map(Conversation::from)
                .collect(),
        }
    }
}

impl From<MessagePayload> for Message {
    fn from(payload: MessagePayload) -> Self {
        Self {
            id: MessageId::confirmed(payload.uid),
            conversation_id: ConversationId::new(payload.chat_room),
            text: payload.text_message,
            role: payload.rol,
            image: payload.image,
            slug: payload.slug,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
        }
    }
}

impl From<ConversationDetailPayload> for ConversationDetail {
    fn from(payload: ConversationDetailPayload) -> Self {
        let chat = payload.chat;
        Self {
            conversation: Conversation {
                id: ConversationId::new(chat.uid),
                slug: chat.slug,
                title: chat.title,
                description: chat.description,
                created_at: chat.created_at,
                updated_at: chat.updated_at,
                owner_id: chat.registered_by,
                owner_name: chat.registered_by_username,
            },
            messages: chat.chat_messages.into_iter().map(Message::from).collect(),
        }
    }
}
