//! Typed endpoint surface over the gateway.
//!
//! The two traits are the seam between the engine components and the network;
//! tests substitute in-memory fakes behind them.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::gateway::ApiGateway;
use crate::api::wire::{
    AccessTokenPayload, ConversationDetailPayload, ConversationPayload, HistoryPagePayload,
    SendMessageResponsePayload, TokenPairPayload,
};
use crate::auth::session::{TokenPair, UserProfile};
use crate::chat::types::{
    Conversation, ConversationDetail, ConversationId, HistoryPage, ImageAttachment, Message,
};

/// Conversation list endpoint.
const CHATS_PATH: &str = "/api/chats/";
/// Login endpoint; returns an access/refresh token pair.
const LOGIN_PATH: &str = "/auth/jwt/create/";
/// Token refresh endpoint.
const REFRESH_PATH: &str = "/auth/jwt/refresh/";
/// Account registration endpoint.
const REGISTER_PATH: &str = "/auth/users/";
/// Current-user endpoint.
const ME_PATH: &str = "/auth/users/me/";

/// Chat endpoints consumed by the engine components.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch the first page of conversation history.
    async fn list_conversations(&self) -> Result<HistoryPage, ApiError>;

    /// Fetch the next page of conversation history for an opaque cursor.
    async fn next_conversations(&self, cursor: &str) -> Result<HistoryPage, ApiError>;

    /// Create a conversation.
    async fn create_conversation(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Conversation, ApiError>;

    /// Fetch a conversation with its ordered messages.
    async fn conversation_detail(
        &self,
        id: &ConversationId,
    ) -> Result<ConversationDetail, ApiError>;

    /// Rename a conversation.
    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<Conversation, ApiError>;

    /// Delete a conversation.
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError>;

    /// Send a message; the response carries the assistant's reply.
    async fn send_message(
        &self,
        id: &ConversationId,
        text: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<Message, ApiError>;
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token pair.
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError>;

    /// Register a new account.
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        re_password: &str,
    ) -> Result<(), ApiError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh: &str) -> Result<String, ApiError>;

    /// Fetch the current user's profile.
    async fn me(&self) -> Result<UserProfile, ApiError>;
}

/// REST implementation of both endpoint traits.
pub struct RestApi {
    gateway: ApiGateway,
}

impl RestApi {
    /// Wrap a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }
}

fn required<T: DeserializeOwned>(value: Option<Value>) -> Result<T, ApiError> {
    let value = value.ok_or_else(|| ApiError::DecodeFailure("empty response body".to_string()))?;
    serde_json::from_value(value).map_err(|err| ApiError::DecodeFailure(err.to_string()))
}

fn chat_path(id: &ConversationId) -> String {
    format!("/api/chats/{id}/")
}

fn messages_path(id: &ConversationId) -> String {
    format!("/api/chats/{id}/messages/")
}

#[async_trait]
impl ChatApi for RestApi {
    async fn list_conversations(&self) -> Result<HistoryPage, ApiError> {
        let value = self.gateway.send_json(Method::GET, CHATS_PATH, None).await?;
        let payload: HistoryPagePayload = required(value)?;
        Ok(payload.into())
    }

    async fn next_conversations(&self, cursor: &str) -> Result<HistoryPage, ApiError> {
        // The cursor is opaque; it is resent exactly as extracted.
        let path = format!("{CHATS_PATH}?p={cursor}");
        let value = self.gateway.send_json(Method::GET, &path, None).await?;
        let payload: HistoryPagePayload = required(value)?;
        Ok(payload.into())
    }

    async fn create_conversation(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Conversation, ApiError> {
        let body = json!({ "title": title, "description": description });
        let value = self
            .gateway
            .send_json(Method::POST, CHATS_PATH, Some(body))
            .await?;
        let payload: ConversationPayload = required(value)?;
        Ok(payload.into())
    }

    async fn conversation_detail(
        &self,
        id: &ConversationId,
    ) -> Result<ConversationDetail, ApiError> {
        let value = self
            .gateway
            .send_json(Method::GET, &chat_path(id), None)
            .await?;
        let payload: ConversationDetailPayload = required(value)?;
        Ok(payload.into())
    }

    async fn rename_conversation(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<Conversation, ApiError> {
        let body = json!({ "title": title });
        let value = self
            .gateway
            .send_json(Method::PATCH, &chat_path(id), Some(body))
            .await?;
        let payload: ConversationPayload = required(value)?;
        Ok(payload.into())
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError> {
        // 204 expected; any residual body is ignored.
        let _ = self
            .gateway
            .send_json(Method::DELETE, &chat_path(id), None)
            .await?;
        Ok(())
    }

    async fn send_message(
        &self,
        id: &ConversationId,
        text: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<Message, ApiError> {
        let mut form = reqwest::multipart::Form::new().text("text_message", text.to_string());
        if let Some(image) = image {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone());
            form = form.part("image", part);
        }
        let value = self.gateway.send_multipart(&messages_path(id), form).await?;
        let payload: SendMessageResponsePayload = required(value)?;
        Ok(payload.message.into())
    }
}

#[async_trait]
impl AuthApi for RestApi {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = json!({ "username": username, "password": password });
        let value = self
            .gateway
            .send_json(Method::POST, LOGIN_PATH, Some(body))
            .await?;
        let payload: TokenPairPayload = required(value)?;
        Ok(TokenPair {
            access: payload.access,
            refresh: payload.refresh,
        })
    }

    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        re_password: &str,
    ) -> Result<(), ApiError> {
        let body = json!({
            "email": email,
            "username": username,
            "password": password,
            "re_password": re_password,
        });
        let _ = self
            .gateway
            .send_json(Method::POST, REGISTER_PATH, Some(body))
            .await?;
        Ok(())
    }

    async fn refresh(&self, refresh: &str) -> Result<String, ApiError> {
        let body = json!({ "refresh": refresh });
        let value = self
            .gateway
            .send_json(Method::POST, REFRESH_PATH, Some(body))
            .await?;
        let payload: AccessTokenPayload = required(value)?;
        Ok(payload.access)
    }

    async fn me(&self) -> Result<UserProfile, ApiError> {
        let value = self.gateway.send_json(Method::GET, ME_PATH, None).await?;
        required(value)
    }
}
