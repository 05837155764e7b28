//! Debounced search typeahead with stale-response discard.
//!
//! Keystrokes within the quiet period coalesce into a single request for
//! the latest value. Each issued request captures a generation from a
//! monotonic counter; a response is applied only if its generation still
//! matches the most recently issued one, so ordering is last-write-wins by
//! issuance time, never by arrival time. There is no cancellation token:
//! superseded responses complete and are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ApiError;

/// Where suggestions come from. Implemented by `SearchClient`; tests plug
/// in controllable stubs.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError>;
}

/// What the suggestion dropdown currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeaheadSnapshot {
    /// The query whose results are displayed.
    pub query: String,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

/// Debounced suggestion fetcher.
pub struct Typeahead<S> {
    source: Arc<S>,
    quiet: Duration,
    /// Bumped on every keystroke; a window fires only if it is still the
    /// latest keystroke when the quiet period elapses.
    keystroke: Arc<AtomicU64>,
    /// Bumped when a request is issued; responses apply only while their
    /// generation is still the latest issued.
    issued: Arc<AtomicU64>,
    snapshot: Arc<RwLock<TypeaheadSnapshot>>,
}

impl<S: SuggestionSource + 'static> Typeahead<S> {
    pub fn new(source: Arc<S>, quiet: Duration) -> Self {
        Self {
            source,
            quiet,
            keystroke: Arc::new(AtomicU64::new(0)),
            issued: Arc::new(AtomicU64::new(0)),
            snapshot: Arc::new(RwLock::new(TypeaheadSnapshot::default())),
        }
    }

    /// Record a keystroke. Opens (or restarts) a debounce window; when the
    /// quiet period elapses without a newer keystroke, one request fires
    /// for this value.
    ///
    /// The returned handle completes when the window is resolved (request
    /// applied, discarded, or superseded); callers other than tests can
    /// drop it.
    pub fn on_input(&self, query: String) -> JoinHandle<()> {
        let my_keystroke = self.keystroke.fetch_add(1, Ordering::SeqCst) + 1;

        let source = self.source.clone();
        let quiet = self.quiet;
        let keystroke = self.keystroke.clone();
        let issued = self.issued.clone();
        let snapshot = self.snapshot.clone();

        tokio::spawn(async move {
            if query.is_empty() {
                // Clearing the field clears the dropdown without a request,
                // and invalidates any response still in flight.
                issued.fetch_add(1, Ordering::SeqCst);
                let mut current = snapshot.write().await;
                *current = TypeaheadSnapshot::default();
                return;
            }

            tokio::time::sleep(quiet).await;

            if keystroke.load(Ordering::SeqCst) != my_keystroke {
                // A newer keystroke restarted the window.
                return;
            }

            let generation = issued.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Issuing suggestion request gen {} for {:?}", generation, query);
            let result = source.suggestions(&query).await;

            // The staleness check must hold the same lock as the write: a
            // check before acquiring it could pass for generation N, then a
            // response for N+1 could apply while N waits for the lock, and
            // N would overwrite the newer result.
            let mut current = snapshot.write().await;
            if issued.load(Ordering::SeqCst) != generation {
                debug!("Discarding stale suggestion response for {:?}", query);
                return;
            }
            match result {
                Ok(suggestions) => {
                    *current = TypeaheadSnapshot {
                        query,
                        suggestions,
                        error: None,
                    };
                }
                Err(e) => {
                    *current = TypeaheadSnapshot {
                        query,
                        suggestions: Vec::new(),
                        error: Some(e.surface("load suggestions")),
                    };
                }
            }
        })
    }

    pub async fn snapshot(&self) -> TypeaheadSnapshot {
        self.snapshot.read().await.clone()
    }
}
