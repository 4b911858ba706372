//! Domain types for the conversation synchronization engine.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned conversation identifier, immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap an identifier received from the server.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as `&str`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Message identity, tagged by who assigned it.
///
/// User messages get a client-generated identifier at optimistic-insert time;
/// the server is never required to mirror it back. Assistant messages carry
/// the server-assigned identifier from the response payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Client-generated identifier, assigned before remote persistence.
    ClientProvisional(Uuid),
    /// Server-assigned identifier.
    ServerConfirmed(String),
}

impl MessageId {
    /// Generate a fresh client-provisional identifier.
    #[must_use]
    pub fn provisional() -> Self {
        Self::ClientProvisional(Uuid::new_v4())
    }

    /// Wrap a server-assigned identifier.
    #[must_use]
    pub fn confirmed(id: impl Into<String>) -> Self {
        Self::ServerConfirmed(id.into())
    }

    /// Check whether the identifier is still client-provisional.
    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        matches!(self, Self::ClientProvisional(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientProvisional(uuid) => write!(f, "{uuid}"),
            Self::ServerConfirmed(id) => f.write_str(id),
        }
    }
}

/// Author of a message turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Authored by the user.
    User,
    /// Authored by the assistant.
    Assistant,
}

/// A conversation as listed in the history sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation {
    /// Server-assigned identifier.
    pub id: ConversationId,
    /// Optional URL slug.
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
    pub owner_id: String,
    /// Display name of the owning user.
    pub owner_name: String,
}

/// One turn in a conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Tagged identity (client-provisional or server-confirmed).
    pub id: MessageId,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Text content.
    pub text: String,
    /// Author role.
    pub role: MessageRole,
    /// Optional image reference (URL or local preview name).
    pub image: Option<String>,
    /// Optional URL slug.
    pub slug: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Build a client-local user message for optimistic insertion.
    #[must_use]
    pub fn user_local(
        conversation_id: ConversationId,
        text: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: MessageId::provisional(),
            conversation_id,
            text: text.into(),
            role: MessageRole::User,
            image,
            slug: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The currently-resident conversation plus its ordered message list.
///
/// Within the list, insertion order == display order == chronological order.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationDetail {
    /// Conversation metadata.
    pub conversation: Conversation,
    /// Ordered messages, append-only except the failed-queue path.
    pub messages: Vec<Message>,
}

impl ConversationDetail {
    /// Build an empty placeholder detail for a conversation whose content has
    /// not been fetched yet.
    #[must_use]
    pub fn placeholder(id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            conversation: Conversation {
                id,
                slug: None,
                title: String::new(),
                description: String::new(),
                created_at: now,
                updated_at: now,
                owner_id: String::new(),
                owner_name: String::new(),
            },
            messages: Vec::new(),
        }
    }
}

/// One accumulated page window of conversation history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryPage {
    /// Server-reported total conversation count.
    pub total_count: u64,
    /// Opaque URL-shaped link to the next page, if any.
    pub next: Option<String>,
    /// Opaque URL-shaped link to the previous page, if any.
    pub previous: Option<String>,
    /// Accumulated conversations, in server order.
    pub conversations: Vec<Conversation>,
}

/// A message whose remote persistence failed, held for explicit retry.
#[derive(Clone, Debug, PartialEq)]
pub struct FailedMessage {
    /// The optimistically-inserted message, unchanged.
    pub message: Message,
    /// Why the send failed.
    pub reason: String,
}

/// An image to attach to an outgoing message.
#[derive(Clone, Debug)]
pub struct ImageAttachment {
    /// File name reported to the server.
    pub file_name: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// Truncate a string to at most `max_chars` characters, boundary-safe.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
