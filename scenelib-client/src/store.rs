//! Library store
//!
//! Process-wide cache of the scene collection and the catalog statistics.
//!
//! # Consistency
//! - The cache is only ever replaced whole: readers hold an
//!   `Arc<LibrarySnapshot>` and never see a partially updated value.
//! - Every successful create/update/delete is followed by a full refresh;
//!   single-record results are never merged into the cache.
//! - Failures keep the previous snapshot visible and are surfaced to the
//!   user through the injected [`Notifier`].
//! - Every list-replacing request takes a ticket. A response is applied only
//!   while its ticket is the latest issued, so an older response arriving
//!   late cannot overwrite a newer one.
//!
//! # Status
//! `Idle -> Loading -> Idle` around list fetches. Failures publish a
//! transient `Error` status immediately followed by the settled status.

use crate::client::SceneBackend;
use crate::error::{LibraryError, LibraryResult};
use crate::notify::{Confirmer, NoticeKind, Notifier};
use scenelib_common::{EditMode, SceneDraft, SceneRecord, StatsSnapshot};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// Prompt shown before a delete is sent
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this scene?";

const FETCH_FAILED: &str = "Failed to fetch data";
const SAVE_FAILED: &str = "Failed to save scene";
const DELETE_FAILED: &str = "Failed to delete scene";

/// Cached view of the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySnapshot {
    /// Scenes from the last applied listing or search
    pub scenes: Vec<SceneRecord>,
    /// Catalog-wide statistics (absent until the first full fetch)
    pub stats: Option<StatsSnapshot>,
    /// Query that produced `scenes`; empty for the full listing
    pub last_query: String,
}

/// User-visible store status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Idle,
    Loading,
    /// Transient; replaced by the settled status right after publishing
    Error,
}

/// Published on every status change and snapshot replacement
#[derive(Debug, Clone)]
pub enum LibraryEvent {
    StatusChanged(StoreStatus),
    SnapshotReplaced(Arc<LibrarySnapshot>),
}

/// Write operation against the catalog
#[derive(Debug, Clone)]
pub enum Mutation {
    Create(SceneDraft),
    Update { original_id: i64, draft: SceneDraft },
    Delete(i64),
}

impl Mutation {
    fn success_message(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "Scene created successfully",
            Mutation::Update { .. } => "Scene updated successfully",
            Mutation::Delete(_) => "Scene deleted successfully",
        }
    }

    /// Notice for a failed mutation
    ///
    /// Saves show the service's detail when there is one; deletes always use
    /// the generic message.
    fn failure_notice(&self, err: &LibraryError) -> String {
        match self {
            Mutation::Create(_) | Mutation::Update { .. } => err.user_message(SAVE_FAILED),
            Mutation::Delete(_) => DELETE_FAILED.to_string(),
        }
    }
}

/// Result of a successful mutation, as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Created(SceneRecord),
    Updated(SceneRecord),
    Deleted(i64),
}

/// Result of a confirmed delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Scene collection cache and write orchestration
pub struct LibraryStore {
    backend: Arc<dyn SceneBackend>,
    notifier: Arc<dyn Notifier>,
    snapshot: RwLock<Arc<LibrarySnapshot>>,
    status: Mutex<StoreStatus>,
    in_flight: AtomicUsize,
    latest_ticket: AtomicU64,
    event_tx: broadcast::Sender<LibraryEvent>,
}

impl LibraryStore {
    /// Empty store; call [`refresh`](Self::refresh) for the first load
    pub fn new(backend: Arc<dyn SceneBackend>, notifier: Arc<dyn Notifier>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            backend,
            notifier,
            snapshot: RwLock::new(Arc::new(LibrarySnapshot::default())),
            status: Mutex::new(StoreStatus::Idle),
            in_flight: AtomicUsize::new(0),
            latest_ticket: AtomicU64::new(0),
            event_tx,
        }
    }

    /// Current cached snapshot
    pub async fn snapshot(&self) -> Arc<LibrarySnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    pub fn status(&self) -> StoreStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to store events for re-rendering
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn backend(&self) -> &Arc<dyn SceneBackend> {
        &self.backend
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Reload scenes and stats from the service
    ///
    /// Both requests run concurrently; the cache is replaced only when both
    /// succeed.
    pub async fn refresh(&self) -> LibraryResult<()> {
        let ticket = self.issue_ticket();
        let in_flight = self.begin();

        let result = tokio::try_join!(self.backend.list_all(), self.backend.fetch_stats());
        drop(in_flight);

        match result {
            Ok((scenes, stats)) => {
                let count = scenes.len();
                let applied = self
                    .replace_if_current(ticket, |_| LibrarySnapshot {
                        scenes,
                        stats: Some(stats),
                        last_query: String::new(),
                    })
                    .await;
                if applied {
                    info!(scenes = count, "Library refreshed");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping cached snapshot");
                let err = LibraryError::from(e);
                self.surface(&err.user_message(FETCH_FAILED));
                Err(err)
            }
        }
    }

    /// Apply one write, then reload everything on success
    ///
    /// Drafts are validated first; a rejected draft sends nothing. On
    /// failure the cache is untouched.
    pub async fn mutate(&self, mutation: Mutation) -> LibraryResult<MutationOutcome> {
        let success = mutation.success_message();

        match self.send_mutation(mutation.clone()).await {
            Ok(outcome) => {
                self.notifier.notify(NoticeKind::Success, success);
                if let Err(e) = self.refresh().await {
                    // Already surfaced by refresh; the write itself succeeded
                    debug!(error = %e, "Post-mutation refresh failed");
                }
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "Mutation failed");
                self.surface(&mutation.failure_notice(&err));
                Err(err)
            }
        }
    }

    /// Ask for confirmation, then delete
    pub async fn request_delete(
        &self,
        id: i64,
        confirmer: &dyn Confirmer,
    ) -> LibraryResult<DeleteOutcome> {
        if !confirmer.confirm(DELETE_PROMPT) {
            debug!(scene_id = id, "Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        self.mutate(Mutation::Delete(id)).await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn send_mutation(&self, mutation: Mutation) -> LibraryResult<MutationOutcome> {
        match mutation {
            Mutation::Create(draft) => {
                let record = draft.validate(EditMode::Create)?;
                let created = self.backend.create(&record).await?;
                Ok(MutationOutcome::Created(created))
            }
            Mutation::Update { original_id, draft } => {
                let record = draft.validate(EditMode::Edit { original_id })?;
                let updated = self.backend.update(original_id, &record).await?;
                Ok(MutationOutcome::Updated(updated))
            }
            Mutation::Delete(id) => {
                self.backend.delete(id).await?;
                Ok(MutationOutcome::Deleted(id))
            }
        }
    }

    /// Take a ticket for a list-replacing request
    pub(crate) fn issue_ticket(&self) -> u64 {
        self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the cache if no newer request has been issued
    ///
    /// Returns whether the snapshot was applied.
    pub(crate) async fn replace_if_current<F>(&self, ticket: u64, build: F) -> bool
    where
        F: FnOnce(&LibrarySnapshot) -> LibrarySnapshot,
    {
        let mut guard = self.snapshot.write().await;
        let latest = self.latest_ticket.load(Ordering::SeqCst);
        if ticket != latest {
            debug!(ticket, latest, "Discarding stale response");
            return false;
        }

        let next = Arc::new(build(&guard));
        *guard = Arc::clone(&next);
        drop(guard);

        let _ = self.event_tx.send(LibraryEvent::SnapshotReplaced(next));
        true
    }

    /// Mark a list request in flight until the returned guard drops
    ///
    /// Dropping the guard also covers callers that abandon the request
    /// part way, so the status never sticks at `Loading`.
    pub(crate) fn begin(&self) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.set_status(StoreStatus::Loading);
        InFlight { store: self }
    }

    /// Notify the user and publish the transient error status
    pub(crate) fn surface(&self, message: &str) {
        self.notifier.notify(NoticeKind::Error, message);
        self.set_status(StoreStatus::Error);
        self.set_status(self.settled_status());
    }

    fn settled_status(&self) -> StoreStatus {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            StoreStatus::Loading
        } else {
            StoreStatus::Idle
        }
    }

    fn set_status(&self, status: StoreStatus) {
        let mut guard = self.status.lock().unwrap_or_else(|e| e.into_inner());
        if *guard == status {
            return;
        }
        *guard = status;
        drop(guard);
        let _ = self.event_tx.send(LibraryEvent::StatusChanged(status));
    }
}

/// In-flight marker returned by [`LibraryStore::begin`]
pub(crate) struct InFlight<'a> {
    store: &'a LibraryStore,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.store.set_status(self.store.settled_status());
    }
}

impl std::fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryStore")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .field("latest_ticket", &self.latest_ticket.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
