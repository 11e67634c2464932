//! Local task store.
//!
//! All mutations land here synchronously; propagation to the remote authority
//! happens later via the mutation queue and sync engine. Queueing is
//! best-effort: a task write that succeeds is never rolled back because the
//! queue write failed, so a crash between the two loses the sync intent (not
//! the data) until the next mutation of that task re-enqueues it.

use log::warn;
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::entities::task::{self, SyncStatus};
use crate::mutation::{Mutation, TaskSnapshot};
use crate::queue::MutationSink;
use crate::repositories::TaskRepository;
use crate::storage::LocalStorage;
use crate::utils::clock;

/// Errors surfaced by task store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid task id: {0}")]
    InvalidId(String),

    #[error("task already exists: {0}")]
    DuplicateId(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Fields for a new task.
#[derive(Clone, Debug, Default)]
pub struct NewTask {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Partial update; only provided fields change.
#[derive(Clone, Debug, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Durable table of task records with soft delete and sync bookkeeping.
#[derive(Clone)]
pub struct TaskStore {
    storage: Arc<Mutex<LocalStorage>>,
    sink: Option<Arc<dyn MutationSink>>,
}

impl TaskStore {
    /// Create a store. Pass a sink to have every mutation also enqueued for
    /// remote propagation; `None` gives a purely local store.
    pub fn new(storage: Arc<Mutex<LocalStorage>>, sink: Option<Arc<dyn MutationSink>>) -> Self {
        Self { storage, sink }
    }

    /// Create a task, or restore a soft-deleted one under the same id.
    ///
    /// Restore is a full overwrite, not a merge: all fields reset to the new
    /// values, timestamps reset to now, sync bookkeeping cleared.
    pub async fn create(&self, new_task: NewTask) -> Result<task::Model, StoreError> {
        let id = new_task.id.trim().to_string();
        if id.is_empty() {
            return Err(StoreError::InvalidId("id must be a non-empty string".into()));
        }

        let created = {
            let storage = self.storage.lock().await;
            let txn = storage.conn.begin().await.map_err(anyhow::Error::from)?;

            let now = clock::now_millis();
            let existing = TaskRepository::get_any(&txn, &id).await?;
            let model = match existing {
                Some(task) if !task.is_deleted => {
                    return Err(StoreError::DuplicateId(id));
                }
                Some(task) => {
                    let mut active = task.into_active_model();
                    active.title = ActiveValue::Set(new_task.title);
                    active.description = ActiveValue::Set(new_task.description);
                    active.completed = ActiveValue::Set(new_task.completed);
                    active.created_at = ActiveValue::Set(now);
                    active.updated_at = ActiveValue::Set(now);
                    active.is_deleted = ActiveValue::Set(false);
                    active.sync_status = ActiveValue::Set(SyncStatus::Pending);
                    active.server_id = ActiveValue::Set(None);
                    active.last_synced_at = ActiveValue::Set(None);
                    TaskRepository::update(&txn, active).await?
                }
                None => {
                    let active = task::ActiveModel {
                        id: ActiveValue::Set(id),
                        title: ActiveValue::Set(new_task.title),
                        description: ActiveValue::Set(new_task.description),
                        completed: ActiveValue::Set(new_task.completed),
                        created_at: ActiveValue::Set(now),
                        updated_at: ActiveValue::Set(now),
                        is_deleted: ActiveValue::Set(false),
                        sync_status: ActiveValue::Set(SyncStatus::Pending),
                        server_id: ActiveValue::Set(None),
                        last_synced_at: ActiveValue::Set(None),
                    };
                    TaskRepository::insert(&txn, active).await?
                }
            };

            txn.commit().await.map_err(anyhow::Error::from)?;
            model
        };

        self.enqueue_best_effort(Mutation::Create {
            task: TaskSnapshot::from(&created),
        })
        .await;

        Ok(created)
    }

    /// Apply a partial update. Returns `Ok(None)` when the task is absent or
    /// soft-deleted; update never resurrects a deleted task.
    pub async fn update(
        &self,
        id: &str,
        patch: TaskPatch,
    ) -> Result<Option<task::Model>, StoreError> {
        let updated = {
            let storage = self.storage.lock().await;
            let txn = storage.conn.begin().await.map_err(anyhow::Error::from)?;

            let Some(task) = TaskRepository::get_active(&txn, id).await? else {
                return Ok(None);
            };

            let mut active = task.into_active_model();
            if let Some(title) = patch.title {
                active.title = ActiveValue::Set(title);
            }
            if let Some(description) = patch.description {
                active.description = ActiveValue::Set(Some(description));
            }
            if let Some(completed) = patch.completed {
                active.completed = ActiveValue::Set(completed);
            }
            active.updated_at = ActiveValue::Set(clock::now_millis());
            active.sync_status = ActiveValue::Set(SyncStatus::Pending);
            let model = TaskRepository::update(&txn, active).await?;

            txn.commit().await.map_err(anyhow::Error::from)?;
            model
        };

        self.enqueue_best_effort(Mutation::Update {
            task: TaskSnapshot::from(&updated),
        })
        .await;

        Ok(Some(updated))
    }

    /// Soft-delete a task. Returns `false` when it is absent or already
    /// deleted. The row is retained so a later `create` can restore the id.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let deleted = {
            let storage = self.storage.lock().await;
            let txn = storage.conn.begin().await.map_err(anyhow::Error::from)?;

            let Some(task) = TaskRepository::get_active(&txn, id).await? else {
                return Ok(false);
            };

            let mut active = task.into_active_model();
            active.is_deleted = ActiveValue::Set(true);
            active.updated_at = ActiveValue::Set(clock::now_millis());
            active.sync_status = ActiveValue::Set(SyncStatus::Pending);
            let model = TaskRepository::update(&txn, active).await?;

            txn.commit().await.map_err(anyhow::Error::from)?;
            model
        };

        self.enqueue_best_effort(Mutation::Delete {
            id: deleted.id.clone(),
            updated_at: deleted.updated_at,
        })
        .await;

        Ok(true)
    }

    /// Get an active task by id; soft-deleted rows are invisible here.
    pub async fn get(&self, id: &str) -> Result<Option<task::Model>, StoreError> {
        let storage = self.storage.lock().await;
        Ok(TaskRepository::get_active(&storage.conn, id).await?)
    }

    /// All active tasks, most recently created first.
    pub async fn list(&self) -> Result<Vec<task::Model>, StoreError> {
        let storage = self.storage.lock().await;
        Ok(TaskRepository::list_active(&storage.conn).await?)
    }

    /// Tasks with pending or permanently failed mutations, oldest stale first.
    pub async fn list_needing_sync(&self) -> Result<Vec<task::Model>, StoreError> {
        let storage = self.storage.lock().await;
        Ok(TaskRepository::list_needing_sync(&storage.conn).await?)
    }

    /// Queue the mutation for remote propagation. Failures are logged and
    /// swallowed: the local write already committed and must stand on its own.
    async fn enqueue_best_effort(&self, mutation: Mutation) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.enqueue(mutation).await {
                warn!("failed to enqueue mutation for sync: {e}");
            }
        }
    }
}
