//! Synchronization engine.
//!
//! The [`SyncService`] drains the mutation queue in bounded batches, submits
//! each batch to the remote authority, resolves conflicts last-write-wins,
//! and keeps the per-task sync bookkeeping and per-item retry budget honest.
//!
//! One cycle at a time: both the periodic scheduler and manual triggers go
//! through the same mutually exclusive [`SyncService::sync`] entry point, so
//! a queue item can never be double-submitted by overlapping cycles.

pub mod conflict;

use anyhow::Result;
use log::{error, info, warn};
use sea_orm::{ActiveValue, IntoActiveModel, TransactionTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::SyncConfig;
use crate::entities::queue_item;
use crate::entities::task::SyncStatus;
use crate::mutation::{MutationEnvelope, TaskSnapshot};
use crate::probe::ConnectivityProbe;
use crate::queue::MutationQueue;
use crate::remote::{ItemOutcome, RemoteAuthority, SubmitItem};
use crate::repositories::{QueueRepository, TaskRepository};
use crate::storage::LocalStorage;
use crate::sync::conflict::Winner;
use crate::utils::clock;

/// Result of invoking [`SyncService::sync`].
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Another cycle already holds the guard; nothing was attempted.
    InProgress,
    /// The connectivity probe reported unreachable; no queue item and no
    /// task row was touched.
    Offline,
    /// A cycle ran to completion (partial success included).
    Completed(SyncReport),
}

/// Aggregate counts for one completed cycle.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub synced_items: usize,
    pub failed_items: usize,
    pub errors: Vec<SyncItemError>,
}

impl SyncReport {
    /// A cycle succeeds when nothing failed; partial success is an expected,
    /// non-exceptional outcome reported through `errors`.
    pub fn is_success(&self) -> bool {
        self.failed_items == 0
    }
}

/// One failed item within a cycle.
#[derive(Debug, Clone)]
pub struct SyncItemError {
    pub item_id: String,
    pub task_id: String,
    pub message: String,
    /// True when the retry budget is exhausted and the item was dropped.
    pub permanent: bool,
}

/// Point-in-time sync health, for status reporting.
#[derive(Debug, Clone)]
pub struct SyncStatusReport {
    /// Tasks whose sync_status is pending or error.
    pub pending_tasks: u64,
    /// Items currently in the mutation queue.
    pub queue_depth: u64,
    /// Most recent successful propagation across all tasks, Unix millis.
    pub last_synced_at: Option<i64>,
    /// Current connectivity probe result.
    pub online: bool,
}

/// Service that propagates queued mutations to the remote authority.
#[derive(Clone)]
pub struct SyncService {
    storage: Arc<Mutex<LocalStorage>>,
    queue: MutationQueue,
    remote: Arc<dyn RemoteAuthority>,
    probe: Arc<ConnectivityProbe>,
    batch_size: usize,
    max_retries: i32,
    submit_timeout: Duration,
    sync_in_progress: Arc<Mutex<bool>>,
}

impl SyncService {
    /// Build a sync service. All collaborators are injected here; nothing is
    /// late-bound after construction.
    pub fn new(
        storage: Arc<Mutex<LocalStorage>>,
        queue: MutationQueue,
        remote: Arc<dyn RemoteAuthority>,
        config: &SyncConfig,
    ) -> Self {
        let timeout = Duration::from_secs(config.remote_timeout_seconds);
        Self {
            storage,
            queue,
            probe: Arc::new(ConnectivityProbe::new(remote.clone(), timeout)),
            remote,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries.max(1) as i32,
            submit_timeout: timeout,
            sync_in_progress: Arc::new(Mutex::new(false)),
        }
    }

    /// Whether a cycle is currently running.
    pub async fn is_syncing(&self) -> bool {
        *self.sync_in_progress.lock().await
    }

    /// Run one sync cycle. Mutually exclusive: a second caller gets
    /// [`SyncOutcome::InProgress`] instead of a concurrent cycle.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        {
            let mut guard = self.sync_in_progress.lock().await;
            if *guard {
                return Ok(SyncOutcome::InProgress);
            }
            *guard = true;
        }

        let result = self.run_cycle().await;

        {
            let mut guard = self.sync_in_progress.lock().await;
            *guard = false;
        }

        result
    }

    async fn run_cycle(&self) -> Result<SyncOutcome> {
        if !self.probe.is_reachable().await {
            info!("remote unreachable, skipping sync cycle");
            return Ok(SyncOutcome::Offline);
        }

        // Snapshot the queue up front; mutations enqueued while this cycle
        // runs wait for the next one.
        let items = self.queue.drain().await?;
        if items.is_empty() {
            return Ok(SyncOutcome::Completed(SyncReport::default()));
        }

        info!(
            "starting sync cycle: {} queued item(s), batch size {}",
            items.len(),
            self.batch_size
        );

        let mut report = SyncReport::default();
        // Batches only bound per-request payload size; outcomes are still
        // handled per item, in queue order.
        for batch in items.chunks(self.batch_size) {
            self.process_batch(batch, &mut report).await?;
        }

        info!(
            "sync cycle finished: {} synced, {} failed",
            report.synced_items, report.failed_items
        );
        Ok(SyncOutcome::Completed(report))
    }

    async fn process_batch(
        &self,
        batch: &[queue_item::Model],
        report: &mut SyncReport,
    ) -> Result<()> {
        let mut submit_items = Vec::with_capacity(batch.len());
        let mut parsed = Vec::with_capacity(batch.len());
        for item in batch {
            match serde_json::from_str::<MutationEnvelope>(&item.data) {
                Ok(envelope) => {
                    submit_items.push(SubmitItem {
                        id: item.id.clone(),
                        task_id: item.task_id.clone(),
                        operation: item.operation,
                        data: envelope.clone(),
                    });
                    parsed.push((item, envelope));
                }
                Err(e) => {
                    // A payload that does not parse will never deliver; let
                    // it burn through the retry budget like any other failure.
                    self.handle_failure(item, &format!("corrupt queue payload: {e}"), report)
                        .await?;
                }
            }
        }

        if submit_items.is_empty() {
            return Ok(());
        }

        let outcomes =
            match tokio::time::timeout(self.submit_timeout, self.remote.submit_batch(submit_items))
                .await
            {
                Ok(Ok(outcomes)) => outcomes,
                Ok(Err(e)) => {
                    warn!("batch submission failed: {e}");
                    for (item, _) in &parsed {
                        self.handle_failure(item, &e.to_string(), report).await?;
                    }
                    return Ok(());
                }
                Err(_) => {
                    warn!("batch submission timed out after {:?}", self.submit_timeout);
                    for (item, _) in &parsed {
                        self.handle_failure(item, "remote submission timed out", report)
                            .await?;
                    }
                    return Ok(());
                }
            };

        for (idx, (item, envelope)) in parsed.iter().enumerate() {
            match outcomes.get(idx) {
                Some(ItemOutcome::Accepted { server_id, resolved }) => {
                    self.handle_success(item, envelope, server_id, resolved.as_ref())
                        .await?;
                    report.synced_items += 1;
                }
                Some(ItemOutcome::Rejected { message }) => {
                    self.handle_failure(item, message, report).await?;
                }
                None => {
                    self.handle_failure(item, "remote returned no result for item", report)
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Commit a delivered item: adopt the conflict winner, mark the task
    /// synced, and drop the queue item in one transaction. Both halves are
    /// idempotent under replay.
    async fn handle_success(
        &self,
        item: &queue_item::Model,
        envelope: &MutationEnvelope,
        server_id: &str,
        resolved: Option<&TaskSnapshot>,
    ) -> Result<()> {
        let storage = self.storage.lock().await;
        let txn = storage.conn.begin().await?;

        if let Some(task) = TaskRepository::get_any(&txn, &item.task_id).await? {
            let mut active = task.into_active_model();

            // The comparison runs against the snapshot that was submitted,
            // not the current row: the queue carries its own copy.
            if let Some(remote) = resolved {
                if conflict::resolve(envelope.mutation.updated_at(), remote.updated_at)
                    == Winner::Remote
                {
                    active.title = ActiveValue::Set(remote.title.clone());
                    active.description = ActiveValue::Set(remote.description.clone());
                    active.completed = ActiveValue::Set(remote.completed);
                    active.updated_at = ActiveValue::Set(remote.updated_at);
                    active.is_deleted = ActiveValue::Set(remote.is_deleted);
                }
            }

            active.sync_status = ActiveValue::Set(SyncStatus::Synced);
            active.server_id = ActiveValue::Set(Some(server_id.to_string()));
            active.last_synced_at = ActiveValue::Set(Some(clock::now_millis()));
            TaskRepository::update(&txn, active).await?;
        }

        QueueRepository::remove(&txn, &item.id).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Retry bookkeeping for one failed item. Below the ceiling the item
    /// stays queued with an incremented counter; at the ceiling the task is
    /// marked `error` and the item dropped, and only a fresh local mutation
    /// re-triggers sync for it.
    async fn handle_failure(
        &self,
        item: &queue_item::Model,
        message: &str,
        report: &mut SyncReport,
    ) -> Result<()> {
        let new_count = item.retry_count + 1;
        let permanent = new_count >= self.max_retries;

        if permanent {
            error!(
                "giving up on queue item {} after {} attempts: {message}",
                item.id, new_count
            );
            let storage = self.storage.lock().await;
            let txn = storage.conn.begin().await?;
            if let Some(task) = TaskRepository::get_any(&txn, &item.task_id).await? {
                let mut active = task.into_active_model();
                active.sync_status = ActiveValue::Set(SyncStatus::Error);
                TaskRepository::update(&txn, active).await?;
            }
            QueueRepository::remove(&txn, &item.id).await?;
            txn.commit().await?;
        } else {
            warn!(
                "queue item {} failed (attempt {}/{}): {message}",
                item.id, new_count, self.max_retries
            );
            self.queue
                .record_failure(&item.id, new_count, message)
                .await?;
        }

        report.failed_items += 1;
        report.errors.push(SyncItemError {
            item_id: item.id.clone(),
            task_id: item.task_id.clone(),
            message: message.to_string(),
            permanent,
        });
        Ok(())
    }

    /// Current sync health: pending-task count, queue depth, most recent
    /// successful sync, and connectivity.
    pub async fn status(&self) -> Result<SyncStatusReport> {
        let (pending_tasks, queue_depth, last_synced_at) = {
            let storage = self.storage.lock().await;
            (
                TaskRepository::count_pending(&storage.conn).await?,
                QueueRepository::count(&storage.conn).await?,
                TaskRepository::latest_synced_at(&storage.conn).await?,
            )
        };
        let online = self.probe.is_reachable().await;

        Ok(SyncStatusReport {
            pending_tasks,
            queue_depth,
            last_synced_at,
            online,
        })
    }
}
