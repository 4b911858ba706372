//! Conversation/message synchronization engine.
//!
//! - `types`: domain model (conversations, messages, pages, failed queue)
//! - `store`: the single source of truth and its named transitions
//! - `pager`: cursor-driven history pagination
//! - `coordinator`: message send/retry orchestration
//! - `lifecycle`: create/rename/delete/select operations
//! - `client`: wiring facade

pub mod client;
pub mod coordinator;
pub mod lifecycle;
pub mod pager;
pub mod store;
pub mod types;

pub use client::{ChatClient, ClientBackends};
pub use coordinator::SendCoordinator;
pub use lifecycle::ConversationLifecycle;
pub use pager::{HistoryPager, PageLoad};
pub use store::{ConversationStore, StoreSnapshot};
pub use types::{
    Conversation, ConversationDetail, ConversationId, FailedMessage, HistoryPage, ImageAttachment,
    Message, MessageId, MessageRole,
};
