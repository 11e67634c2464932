//! Durable mutation queue.
//!
//! The queue exclusively owns its items: the task store appends through the
//! [`MutationSink`] capability, and only the sync engine removes items (on
//! delivery or on retry exhaustion).

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::ActiveValue;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::entities::queue_item;
use crate::mutation::{Mutation, MutationEnvelope};
use crate::repositories::QueueRepository;
use crate::storage::LocalStorage;
use crate::utils::clock;

/// Narrow enqueue capability handed to the task store at construction.
///
/// Keeping the store behind this trait instead of the full queue means the
/// store can record its intent to sync without being able to drain or drop
/// anything.
#[async_trait]
pub trait MutationSink: Send + Sync {
    async fn enqueue(&self, mutation: Mutation) -> Result<()>;
}

/// Durable, ordered log of pending mutations.
#[derive(Clone)]
pub struct MutationQueue {
    storage: Arc<Mutex<LocalStorage>>,
}

impl MutationQueue {
    pub fn new(storage: Arc<Mutex<LocalStorage>>) -> Self {
        Self { storage }
    }

    /// Append a mutation. The snapshot inside `mutation` is serialized as-is
    /// and never re-read from the task table later.
    pub async fn enqueue(&self, mutation: Mutation) -> Result<queue_item::Model> {
        let created_at = clock::now_millis();
        let operation = mutation.operation();
        let task_id = mutation.task_id().to_string();
        // created_at is strictly increasing per process, so this id cannot
        // collide even for back-to-back mutations of the same task.
        let id = format!("{}:{}:{}", task_id, operation.as_str(), created_at);
        let data = serde_json::to_string(&MutationEnvelope::new(mutation))?;

        let model = queue_item::ActiveModel {
            id: ActiveValue::Set(id),
            task_id: ActiveValue::Set(task_id),
            operation: ActiveValue::Set(operation),
            data: ActiveValue::Set(data),
            created_at: ActiveValue::Set(created_at),
            retry_count: ActiveValue::Set(0),
            error_message: ActiveValue::Set(None),
        };

        let storage = self.storage.lock().await;
        QueueRepository::insert(&storage.conn, model).await
    }

    /// Snapshot of all pending items, oldest first. Items enqueued after this
    /// call are not part of the snapshot.
    pub async fn drain(&self) -> Result<Vec<queue_item::Model>> {
        let storage = self.storage.lock().await;
        QueueRepository::all_ordered(&storage.conn).await
    }

    /// Delete one item; idempotent.
    pub async fn remove(&self, item_id: &str) -> Result<()> {
        let storage = self.storage.lock().await;
        QueueRepository::remove(&storage.conn, item_id).await
    }

    /// Store the outcome of a failed attempt without removing the item.
    pub async fn record_failure(
        &self,
        item_id: &str,
        retry_count: i32,
        error_message: &str,
    ) -> Result<()> {
        let storage = self.storage.lock().await;
        QueueRepository::record_failure(&storage.conn, item_id, retry_count, error_message).await
    }

    /// Current number of queued items.
    pub async fn depth(&self) -> Result<u64> {
        let storage = self.storage.lock().await;
        QueueRepository::count(&storage.conn).await
    }
}

#[async_trait]
impl MutationSink for MutationQueue {
    async fn enqueue(&self, mutation: Mutation) -> Result<()> {
        MutationQueue::enqueue(self, mutation).await?;
        Ok(())
    }
}
