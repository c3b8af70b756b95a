//! Keystroke-driven incremental search
//!
//! Each keystroke restarts a quiescence timer. When it fires, queries of at
//! least [`MIN_QUERY_CHARS`] characters are searched; shorter ones clear the
//! displayed results. Restarting the timer never cancels a search already in
//! flight, so a slow stale response may still arrive after a newer one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use wyrd_common::PhenomenonRecord;

use crate::client::ApiClient;
use crate::error::RetrievalError;
use crate::filters::SearchFilters;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);
pub const MIN_QUERY_CHARS: usize = 2;

/// What the results view should show next
#[derive(Debug)]
pub enum SearchOutcome {
    Results {
        query: String,
        records: Vec<PhenomenonRecord>,
    },
    /// Must be shown as a failure state, not an empty result
    Failed {
        query: String,
        error: RetrievalError,
    },
    Cleared,
}

pub struct DebouncedSearch {
    client: Arc<ApiClient>,
    filters: SearchFilters,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<SearchOutcome>,
}

impl DebouncedSearch {
    /// Search driver plus the receiver its outcomes are delivered on
    pub fn new(client: Arc<ApiClient>) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        (
            Self {
                client,
                filters: SearchFilters::default(),
                delay: DEBOUNCE_DELAY,
                pending: None,
                outcomes,
            },
            receiver,
        )
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Current input value changed
    pub fn input(&mut self, raw: &str) {
        self.cancel_pending();

        let query = raw.trim().to_string();
        let client = self.client.clone();
        let filters = self.filters.clone();
        let outcomes = self.outcomes.clone();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if query.chars().count() < MIN_QUERY_CHARS {
                let _ = outcomes.send(SearchOutcome::Cleared);
                return;
            }

            // Detached so a later keystroke cannot abort it
            tokio::spawn(async move {
                debug!(query = %query, "Issuing search");
                let outcome = match client.search(&query, &filters).await {
                    Ok(records) => SearchOutcome::Results { query, records },
                    Err(error) => SearchOutcome::Failed { query, error },
                };
                let _ = outcomes.send(outcome);
            });
        }));
    }

    /// Escape key: drop the pending timer and clear results now
    pub fn escape(&mut self) {
        self.cancel_pending();
        let _ = self.outcomes.send(SearchOutcome::Cleared);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
