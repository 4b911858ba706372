//! Shared fakes and fixtures for the inline test modules.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::error::ApiError;
use crate::api::rest::{AuthApi, ChatApi};
use crate::auth::session::{TokenPair, UserProfile};
use crate::chat::types::{
    Conversation, ConversationDetail, ConversationId, HistoryPage, ImageAttachment, Message,
    MessageId, MessageRole,
};

/// Build a conversation fixture.
pub fn conversation(id: &str, title: &str) -> Conversation {
    let now = Utc::now();
    Conversation {
        id: ConversationId::from(id),
        slug: None,
        title: title.to_string(),
        description: String::new(),
        created_at: now,
        updated_at: now,
        owner_id: "u1".to_string(),
        owner_name: "ada".to_string(),
    }
}

/// Build a history page fixture from `(id, title)` pairs.
pub fn history_page(entries: &[(&str, &str)], next: Option<&str>) -> HistoryPage {
    HistoryPage {
        total_count: entries.len() as u64,
        next: next.map(str::to_string),
        previous: None,
        conversations: entries
            .iter()
            .map(|(id, title)| conversation(id, title))
            .collect(),
    }
}

/// Build a sample profile fixture.
pub fn profile() -> UserProfile {
    UserProfile {
        uid: "u1".to_string(),
        email: "ada@example.com".to_string(),
        username: "ada".to_string(),
        is_active: true,
        is_premium: false,
    }
}

fn network_error() -> ApiError {
    ApiError::NetworkFailure("connection refused".to_string())
}

/// Scriptable in-memory [`ChatApi`] implementation.
#[derive(Default)]
pub struct FakeChatApi {
    /// Number of `list_conversations` calls.
    pub list_calls: AtomicUsize,
    /// Number of `next_conversations` calls.
    pub next_calls: AtomicUsize,
    /// Number of `create_conversation` calls.
    pub create_calls: AtomicUsize,
    /// Number of `conversation_detail` calls.
    pub detail_calls: AtomicUsize,
    /// Number of `delete_conversation` calls.
    pub delete_calls: AtomicUsize,
    /// Number of `send_message` calls.
    pub send_calls: AtomicUsize,
    /// Recorded `(conversation id, new title)` rename pairs.
    pub renames: Mutex<Vec<(String, String)>>,
    /// Fail the next create calls.
    pub fail_create: AtomicBool,
    /// Fail the next send calls.
    pub fail_send: AtomicBool,
    /// Fail the next detail calls.
    pub fail_detail: AtomicBool,
    /// Fail the next rename calls.
    pub fail_rename: AtomicBool,
    /// Fail the next list calls.
    pub fail_list: AtomicBool,
    /// Fail the next next-page calls.
    pub fail_next: AtomicBool,
    /// Fail the next delete calls.
    pub fail_delete: AtomicBool,
    /// Artificial latency for create calls.
    pub create_delay: Mutex<Option<Duration>>,
    /// Artificial latency for next-page calls.
    pub next_delay: Mutex<Option<Duration>>,
    /// Page served by `list_conversations`.
    pub list_page: Mutex<HistoryPage>,
    /// Page served by `next_conversations`.
    pub next_page: Mutex<HistoryPage>,
    /// Details served by `conversation_detail`, keyed by id.
    pub details: Mutex<HashMap<String, ConversationDetail>>,
}

impl FakeChatApi {
    /// Create an empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    fn delay_of(slot: &Mutex<Option<Duration>>) -> Option<Duration> {
        *slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn list_conversations(&self) -> Result<HistoryPage, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        Ok(self.list_page.lock().unwrap().clone())
    }

    async fn next_conversations(&self, _cursor: &str) -> Result<HistoryPage, ApiError> {
        self.next_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = Self::delay_of(&self.next_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_next.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        Ok(self.next_page.lock().unwrap().clone())
    }

    async fn create_conversation(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Conversation, ApiError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = Self::delay_of(&self.create_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        let mut created = conversation(&format!("conv-{n}"), title);
        created.description = description.to_string();
        self.details.lock().unwrap().insert(
            created.id.as_str().to_string(),
            ConversationDetail {
                conversation: created.clone(),
                messages: Vec::new(),
            },
        );
        Ok(created)
    }

    async fn conversation_detail(
        &self,
        id: &ConversationId,
    ) -> Result<ConversationDetail, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detail.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        let details = self.details.lock().unwrap();
        Ok(details
            .get(id.as_str())
            .cloned()
            .unwrap_or_else(|| ConversationDetail::placeholder(id.clone())))
    }

    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<Conversation, ApiError> {
        if self.fail_rename.load(Ordering::SeqCst) {
            return Err(ApiError::HttpError {
                status: 400,
                detail: "title: invalid".to_string(),
            });
        }
        self.renames
            .lock()
            .unwrap()
            .push((id.as_str().to_string(), title.to_string()));
        Ok(conversation(id.as_str(), title))
    }

    async fn delete_conversation(&self, _id: &ConversationId) -> Result<(), ApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        Ok(())
    }

    async fn send_message(
        &self,
        id: &ConversationId,
        text: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<Message, ApiError> {
        let n = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(ApiError::NetworkFailure("connection reset".to_string()));
        }
        let now = Utc::now();
        Ok(Message {
            id: MessageId::confirmed(format!("msg-{n}")),
            conversation_id: id.clone(),
            text: format!("re: {text}"),
            role: MessageRole::Assistant,
            image: None,
            slug: None,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Scriptable in-memory [`AuthApi`] implementation.
#[derive(Default)]
pub struct FakeAuthApi {
    /// Number of `login` calls.
    pub login_calls: AtomicUsize,
    /// Number of `register` calls.
    pub register_calls: AtomicUsize,
    /// Number of `refresh` calls.
    pub refresh_calls: AtomicUsize,
    /// Number of `me` calls.
    pub me_calls: AtomicUsize,
    /// Fail the next login calls with a 401.
    pub fail_login: AtomicBool,
    /// Fail the next me calls.
    pub fail_me: AtomicBool,
}

impl FakeAuthApi {
    /// Create an empty fake.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, _username: &str, _password: &str) -> Result<TokenPair, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(ApiError::HttpError {
                status: 401,
                detail: "No active account found with the given credentials".to_string(),
            });
        }
        Ok(TokenPair {
            access: "access-1".to_string(),
            refresh: "refresh-1".to_string(),
        })
    }

    async fn register(
        &self,
        _email: &str,
        _username: &str,
        _password: &str,
        _re_password: &str,
    ) -> Result<(), ApiError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh(&self, _refresh: &str) -> Result<String, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok("access-2".to_string())
    }

    async fn me(&self) -> Result<UserProfile, ApiError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_me.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        Ok(profile())
    }
}
