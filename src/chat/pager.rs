//! Cursor-driven pagination of conversation history.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use url::Url;

use crate::api::rest::ChatApi;
use crate::chat::store::ConversationStore;
use crate::error::{ClientError, ClientResult};

/// Outcome of a next-page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageLoad {
    /// A page was fetched and appended.
    Loaded,
    /// Nothing to do: no cursor known, or a load already in flight.
    Skipped,
}

/// Query parameter carrying the pagination cursor in server-supplied links.
const CURSOR_PARAM: &str = "p";

/// Extract the opaque cursor from a server-supplied next-page URL.
///
/// The link is only inspected far enough to pull out the `p` query parameter;
/// the cursor itself is resent as-is.
#[must_use]
pub fn extract_cursor(next_url: &str) -> Option<String> {
    let parsed = match Url::parse(next_url) {
        Ok(parsed) => parsed,
        // Server-relative links lack a base; any placeholder origin will do.
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost")
            .ok()?
            .join(next_url)
            .ok()?,
        Err(_) => return None,
    };
    parsed
        .query_pairs()
        .find(|(key, _)| key == CURSOR_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Drives incrementally-loaded conversation history.
pub struct HistoryPager {
    api: Arc<dyn ChatApi>,
    store: Arc<ConversationStore>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl HistoryPager {
    /// Create a pager over the given API and store.
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, store: Arc<ConversationStore>) -> Self {
        Self {
            api,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Load the first page, replacing the accumulated history window.
    ///
    /// # Errors
    /// Returns the failure after recording it as the store's `last_error`;
    /// the page list is left unchanged.
    pub async fn load_first_page(&self) -> ClientResult<()> {
        self.store.set_loading(true);
        self.store.set_last_error(None);

        match self.api.list_conversations().await {
            Ok(page) => {
                self.store.replace_history_page(page);
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

    /// Load the next page, if a cursor is known and no load is in flight.
    ///
    /// Duplicate concurrent calls collapse to a single network request; the
    /// losers return [`PageLoad::Skipped`].
    ///
    /// # Errors
    /// Returns the failure after recording it as the store's `last_error`;
    /// the accumulated page list is left unchanged.
    pub async fn load_next_page(&self) -> ClientResult<PageLoad> {
        let Some(next) = self.store.history_page().next else {
            return Ok(PageLoad::Skipped);
        };
        let Some(cursor) = extract_cursor(&next) else {
            debug!("next-page link carries no cursor: {next}");
            return Ok(PageLoad::Skipped);
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(PageLoad::Skipped);
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.store.set_loading(true);
        self.store.set_last_error(None);

        match self.api.next_conversations(&cursor).await {
            Ok(page) => {
                self.store.append_history_page(page);
                self.store.set_loading(false);
                Ok(PageLoad::Loaded)
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
