//! Search controller
//!
//! A blank query shows the full catalog (same as a refresh). Anything else
//! narrows the visible list through the service's search endpoint without
//! touching the catalog statistics, which always describe the whole catalog.
//!
//! A failed search leaves the current list on screen.

use crate::client::SceneBackend;
use crate::error::{LibraryError, LibraryResult};
use crate::notify::NoticeKind;
use crate::store::{LibrarySnapshot, LibraryStore};
use std::sync::Arc;
use tracing::{info, warn};

const SEARCH_FAILED: &str = "Search failed";

/// Routes a query to a full refresh or a filtered fetch
#[derive(Clone)]
pub struct SearchController {
    store: Arc<LibraryStore>,
    backend: Arc<dyn SceneBackend>,
}

impl SearchController {
    pub fn new(store: Arc<LibraryStore>) -> Self {
        let backend = Arc::clone(store.backend());
        Self { store, backend }
    }

    pub async fn search(&self, query: &str) -> LibraryResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return self.store.refresh().await;
        }

        let ticket = self.store.issue_ticket();
        let in_flight = self.store.begin();

        // Path segment: the backend embeds it verbatim
        let encoded = urlencoding::encode(query);
        let result = self.backend.search_by_query(&encoded).await;
        drop(in_flight);

        match result {
            Ok(results) => {
                let total = results.total;
                let applied = self
                    .store
                    .replace_if_current(ticket, |current| LibrarySnapshot {
                        scenes: results.scenes,
                        stats: current.stats.clone(),
                        last_query: query.to_string(),
                    })
                    .await;

                if applied {
                    info!(query = %query, total, "Search applied");
                    self.store
                        .notifier()
                        .notify(NoticeKind::Success, &format!("Found {} scenes", total));
                }
                Ok(())
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed, keeping current list");
                let err = LibraryError::from(e);
                self.store.surface(&err.user_message(SEARCH_FAILED));
                Err(err)
            }
        }
    }
}
