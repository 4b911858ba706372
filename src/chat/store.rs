//! Single source of truth for conversation/message state.
//!
//! Every mutation goes through one of the named transition operations below.
//! Transitions are synchronous and total: the interior lock is taken for the
//! duration of exactly one transition and is never held across an await
//! point, so no partial application is ever observable. No network calls
//! originate here.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use tracing::debug;

use crate::chat::types::{
    Conversation, ConversationDetail, ConversationId, FailedMessage, HistoryPage, Message,
    MessageId,
};

#[derive(Debug, Default)]
struct StoreState {
    /// The resident conversation; its id *is* the current conversation id.
    current: Option<ConversationDetail>,
    history: HistoryPage,
    failed: Vec<FailedMessage>,
    is_loading: bool,
    last_error: Option<String>,
}

/// Combined read snapshot of the store.
#[derive(Clone, Debug)]
pub struct StoreSnapshot {
    /// Current conversation id, if any.
    pub current_conversation_id: Option<ConversationId>,
    /// Resident conversation detail, if any.
    pub current_detail: Option<ConversationDetail>,
    /// Accumulated history page window.
    pub history_page: HistoryPage,
    /// Messages awaiting explicit retry.
    pub failed_messages: Vec<FailedMessage>,
    /// Whether an operation is in flight.
    pub is_loading: bool,
    /// Last operation failure, as a display string.
    pub last_error: Option<String>,
}

/// The conversation store.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: RwLock<StoreState>,
}

impl ConversationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Read surface ====================================================

    /// Combined snapshot of all readable state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read();
        StoreSnapshot {
            current_conversation_id: state.current.as_ref().map(|d| d.conversation.id.clone()),
            current_detail: state.current.clone(),
            history_page: state.history.clone(),
            failed_messages: state.failed.clone(),
            is_loading: state.is_loading,
            last_error: state.last_error.clone(),
        }
    }

    /// Current conversation id, if any.
    #[must_use]
    pub fn current_conversation_id(&self) -> Option<ConversationId> {
        self.read()
            .current
            .as_ref()
            .map(|d| d.conversation.id.clone())
    }

    /// Resident conversation detail, if any.
    #[must_use]
    pub fn current_detail(&self) -> Option<ConversationDetail> {
        self.read().current.clone()
    }

    /// Accumulated history page window.
    #[must_use]
    pub fn history_page(&self) -> HistoryPage {
        self.read().history.clone()
    }

    /// Messages awaiting explicit retry.
    #[must_use]
    pub fn failed_messages(&self) -> Vec<FailedMessage> {
        self.read().failed.clone()
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// Last operation failure, as a display string.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    // ===== Transitions =====================================================

    /// Make `id` the current conversation, resetting the detail to an empty
    /// placeholder pending a fetch. Selecting the already-current
    /// conversation keeps the resident detail.
    pub fn set_current_conversation(&self, id: ConversationId) {
        let mut state = self.write();
        if state
            .current
            .as_ref()
            .is_some_and(|d| d.conversation.id == id)
        {
            return;
        }
        state.current = Some(ConversationDetail::placeholder(id));
    }

    /// Drop the current conversation (fresh-session state).
    pub fn reset_to_new_conversation(&self) {
        self.write().current = None;
    }

    /// Append a user message to the resident detail.
    ///
    /// A message for a non-resident conversation is discarded; the detail
    /// list stays consistent with the current id.
    pub fn append_user_message(&self, message: Message) {
        self.append_message(message);
    }

    /// Append an assistant message to the resident detail.
    pub fn append_assistant_message(&self, message: Message) {
        self.append_message(message);
    }

    fn append_message(&self, message: Message) {
        let mut state = self.write();
        match state.current.as_mut() {
            Some(detail) if detail.conversation.id == message.conversation_id => {
                detail.messages.push(message);
            }
            _ => debug!(
                "discarding message for non-resident conversation {}",
                message.conversation_id
            ),
        }
    }

    /// Replace the resident detail with a freshly fetched one.
    ///
    /// A detail whose conversation is no longer current is discarded, so a
    /// stale fetch can never clobber the resident state.
    pub fn replace_conversation_detail(&self, detail: ConversationDetail) {
        let mut state = self.write();
        let is_current = state
            .current
            .as_ref()
            .is_some_and(|current| current.conversation.id == detail.conversation.id);
        if is_current {
            state.current = Some(detail);
        } else {
            debug!(
                "discarding stale detail for conversation {}",
                detail.conversation.id
            );
        }
    }

    /// Replace the whole history page window (first page load).
    pub fn replace_history_page(&self, page: HistoryPage) {
        self.write().history = page;
    }

    /// Merge a follow-up page: cursors and count are replaced, conversations
    /// are appended. Existing entries are never removed or reordered.
    pub fn append_history_page(&self, page: HistoryPage) {
        let mut state = self.write();
        state.history.total_count = page.total_count;
        state.history.next = page.next;
        state.history.previous = page.previous;
        state.history.conversations.extend(page.conversations);
    }

    /// Update a conversation's history entry in place, or prepend it when it
    /// is not listed yet. When the conversation is the resident one, its
    /// detail metadata is kept in sync (messages untouched).
    pub fn upsert_conversation_meta(&self, conversation: Conversation) {
        let mut state = self.write();
        if let Some(entry) = state
            .history
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
        {
            *entry = conversation.clone();
        } else {
            state.history.conversations.insert(0, conversation.clone());
        }

        if let Some(detail) = state.current.as_mut()
            && detail.conversation.id == conversation.id
        {
            detail.conversation = conversation;
        }
    }

    /// Remove a conversation from the history list. The current-conversation
    /// state is left alone; resetting it after a delete is the caller's
    /// responsibility.
    pub fn remove_conversation(&self, id: &ConversationId) {
        self.write().history.conversations.retain(|c| c.id != *id);
    }

    /// Move a message out of the resident detail into the failed queue.
    ///
    /// This is the only path that removes a message from the detail list, and
    /// both halves happen in one transition.
    pub fn enqueue_failed_message(&self, message: Message, reason: String) {
        let mut state = self.write();
        if let Some(detail) = state.current.as_mut() {
            detail.messages.retain(|m| m.id != message.id);
        }
        state.failed.push(FailedMessage { message, reason });
    }

    /// Remove and return a failed-queue entry.
    pub fn dequeue_failed_message(&self, id: &MessageId) -> Option<FailedMessage> {
        let mut state = self.write();
        let index = state.failed.iter().position(|f| f.message.id == *id)?;
        Some(state.failed.remove(index))
    }

    /// Set the in-flight indicator.
    pub fn set_loading(&self, loading: bool) {
        self.write().is_loading = loading;
    }

    /// Set or clear the last operation failure.
    pub fn set_last_error(&self, error: Option<String>) {
        self.write().last_error = error;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{conversation, history_page};
    use crate::chat::types::MessageRole;

    fn id(raw: &str) -> ConversationId {
        ConversationId::from(raw)
    }

    #[test]
    fn test_set_current_resets_to_placeholder() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        let detail = store.current_detail().unwrap();
        assert_eq!(detail.conversation.id, id("c1"));
        assert!(detail.messages.is_empty());
        assert_eq!(store.current_conversation_id(), Some(id("c1")));
    }

    #[test]
    fn test_reselecting_current_keeps_detail() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        store.append_user_message(Message::user_local(id("c1"), "hola", None));
        store.set_current_conversation(id("c1"));
        assert_eq!(store.current_detail().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_reset_to_new_conversation_clears_current() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        store.reset_to_new_conversation();
        assert!(store.current_conversation_id().is_none());
        assert!(store.current_detail().is_none());
    }

    #[test]
    fn test_messages_append_in_order() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        store.append_user_message(Message::user_local(id("c1"), "one", None));
        store.append_user_message(Message::user_local(id("c1"), "two", None));
        let texts: Vec<_> = store
            .current_detail()
            .unwrap()
            .messages
            .iter()
            .map(|m| m.text.clone())
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_message_for_other_conversation_discarded() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        store.append_user_message(Message::user_local(id("c2"), "stray", None));
        assert!(store.current_detail().unwrap().messages.is_empty());
    }

    #[test]
    fn test_stale_detail_discarded() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        let stale = ConversationDetail::placeholder(id("c2"));
        store.replace_conversation_detail(stale);
        assert_eq!(store.current_conversation_id(), Some(id("c1")));
    }

    #[test]
    fn test_append_history_page_is_monotonic() {
        let store = ConversationStore::new();
        store.replace_history_page(history_page(
            &[("c1", "First"), ("c2", "Second")],
            Some("http://x/api/chats/?p=2"),
        ));

        store.append_history_page(history_page(&[("c3", "Third")], None));

        let page = store.history_page();
        let ids: Vec<_> = page
            .conversations
            .iter()
            .map(|c| c.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_upsert_updates_listed_entry() {
        let store = ConversationStore::new();
        store.replace_history_page(history_page(&[("c1", "Old")], None));
        store.upsert_conversation_meta(conversation("c1", "New"));
        assert_eq!(store.history_page().conversations[0].title, "New");
        assert_eq!(store.history_page().conversations.len(), 1);
    }

    #[test]
    fn test_upsert_prepends_unknown_entry() {
        let store = ConversationStore::new();
        store.replace_history_page(history_page(&[("c1", "First")], None));
        store.upsert_conversation_meta(conversation("c9", "Fresh"));
        let ids: Vec<_> = store
            .history_page()
            .conversations
            .iter()
            .map(|c| c.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["c9", "c1"]);
    }

    #[test]
    fn test_upsert_syncs_resident_detail_metadata() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        store.append_user_message(Message::user_local(id("c1"), "hola", None));
        store.upsert_conversation_meta(conversation("c1", "Renamed"));
        let detail = store.current_detail().unwrap();
        assert_eq!(detail.conversation.title, "Renamed");
        assert_eq!(detail.messages.len(), 1);
    }

    #[test]
    fn test_upsert_other_conversation_leaves_detail_alone() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        store.upsert_conversation_meta(conversation("c2", "Elsewhere"));
        assert!(store.current_detail().unwrap().conversation.title.is_empty());
    }

    #[test]
    fn test_remove_conversation_keeps_current() {
        let store = ConversationStore::new();
        store.replace_history_page(history_page(&[("c1", "First"), ("c2", "Second")], None));
        store.set_current_conversation(id("c1"));
        store.remove_conversation(&id("c1"));
        assert_eq!(store.history_page().conversations.len(), 1);
        // Resetting current state after a delete is the caller's call.
        assert_eq!(store.current_conversation_id(), Some(id("c1")));
    }

    #[test]
    fn test_enqueue_moves_message_out_of_detail() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        let message = Message::user_local(id("c1"), "hola", None);
        store.append_user_message(message.clone());
        store.enqueue_failed_message(message.clone(), "send failed: network".to_string());

        assert!(store.current_detail().unwrap().messages.is_empty());
        let failed = store.failed_messages();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].message, message);
        assert_eq!(failed[0].reason, "send failed: network");
    }

    #[test]
    fn test_dequeue_returns_entry_once() {
        let store = ConversationStore::new();
        store.set_current_conversation(id("c1"));
        let message = Message::user_local(id("c1"), "hola", None);
        store.enqueue_failed_message(message.clone(), "boom".to_string());

        let entry = store.dequeue_failed_message(&message.id).unwrap();
        assert_eq!(entry.message.text, "hola");
        assert_eq!(entry.message.role, MessageRole::User);
        assert!(store.dequeue_failed_message(&message.id).is_none());
        assert!(store.failed_messages().is_empty());
    }

    #[test]
    fn test_loading_and_error_flags() {
        let store = ConversationStore::new();
        store.set_loading(true);
        store.set_last_error(Some("boom".to_string()));
        let snapshot = store.snapshot();
        assert!(snapshot.is_loading);
        assert_eq!(snapshot.last_error.as_deref(), Some("boom"));
        store.set_loading(false);
        store.set_last_error(None);
        assert!(!store.is_loading());
        assert!(store.last_error().is_none());
    }
}
