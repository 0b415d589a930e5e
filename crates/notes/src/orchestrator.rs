//! Top-level sync use case.

use std::sync::Arc;

use chrono::Local;
use habitica::{HabiticaClient, Task, TaskCategory, TaskQuery};
use tracing::{info, instrument};

use crate::classify::classify;
use crate::errors::SyncResult;
use crate::events::{EventHub, SubscriberGroup};
use crate::render::{render_task, RenderSettings};
use crate::storage::NoteStore;

/// Separator between rendered task blocks within one note.
pub const NOTE_SEPARATOR: &str = "\n";

/// Drives one full reconciliation: gated fetch, category fan-out, markdown
/// projection, per-category note overwrite.
pub struct SyncOrchestrator<S> {
    client: HabiticaClient,
    hub: Arc<EventHub>,
    store: S,
    settings: RenderSettings,
}

impl<S: NoteStore> SyncOrchestrator<S> {
    pub fn new(
        client: HabiticaClient,
        hub: Arc<EventHub>,
        store: S,
        settings: RenderSettings,
    ) -> Self {
        Self {
            client,
            hub,
            store,
            settings,
        }
    }

    /// The hub consumers subscribe against.
    #[must_use]
    pub fn hub(&self) -> Arc<EventHub> {
        Arc::clone(&self.hub)
    }

    /// Fetch everything and regenerate the notes.
    ///
    /// The fetch and its fan-out run with the file-sync listeners suspended,
    /// so writing the notes can never re-trigger this path through its own
    /// side effects. Each persisted category's note is fully overwritten;
    /// external edits since the previous sync are discarded by design. A
    /// fetch failure aborts before any note is touched.
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> SyncResult<()> {
        let tasks = self
            .hub
            .run_all_suspended(SubscriberGroup::FileSync, self.fetch_and_emit(None))
            .await?;

        let collection = classify(tasks);
        let today = Local::now().date_naive();

        let mut notes = 0;
        for (category, tasks) in collection.persisted() {
            if tasks.is_empty() {
                continue;
            }
            let content: Vec<String> = tasks
                .iter()
                .map(|task| render_task(task, &self.settings, today))
                .collect();
            self.store
                .write_note(&format!("{category}.md"), &content.join(NOTE_SEPARATOR))
                .await?;
            notes += 1;
        }

        info!(total = collection.len(), notes, "sync complete");
        Ok(())
    }

    /// Fetch everything and fan out without suppression, for live surfaces.
    pub async fn refresh(&self) -> SyncResult<Vec<Task>> {
        self.fetch_and_emit(None).await
    }

    /// Fetch one category and fan out without suppression.
    pub async fn refresh_category(&self, category: TaskCategory) -> SyncResult<Vec<Task>> {
        let query = TaskQuery::category(category);
        self.fetch_and_emit(Some(&query)).await
    }

    async fn fetch_and_emit(&self, query: Option<&TaskQuery>) -> SyncResult<Vec<Task>> {
        let tasks = self.client.fetch_tasks(query).await?;
        self.hub.emit_by_category(&tasks);
        Ok(tasks)
    }
}
