//! Remote authority abstraction.
//!
//! This module defines the boundary the sync engine talks to: a health check
//! and a batch-submit call. A production implementation backs these with
//! network calls; [`simulated::SimulatedRemote`] backs them with an in-memory
//! table for local use and deterministic failure injection in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::queue_item::Operation;
use crate::mutation::{MutationEnvelope, TaskSnapshot};

pub mod simulated;

pub use simulated::SimulatedRemote;

/// Errors for remote authority operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    #[error("remote error: {0}")]
    Other(String),
}

/// One queue item on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitItem {
    pub id: String,
    pub task_id: String,
    pub operation: Operation,
    pub data: MutationEnvelope,
}

/// Per-item result of a batch submission, one per input item, in order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ItemOutcome {
    /// The remote applied (or resolved) the mutation. `resolved` carries the
    /// remote's competing version of the task when it differs from the
    /// submitted snapshot; the caller runs conflict resolution against it.
    Accepted {
        server_id: String,
        resolved: Option<TaskSnapshot>,
    },
    /// The remote rejected this item; the caller decides whether to retry.
    Rejected { message: String },
}

/// The remote system considered the source of truth once a task has been
/// propagated.
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// Cheap reachability check. `Ok(false)` and `Err` both mean "do not
    /// attempt a sync cycle right now".
    async fn health_check(&self) -> Result<bool, RemoteError>;

    /// Submit an ordered batch of mutations. On success the response holds
    /// exactly one [`ItemOutcome`] per input item, in input order.
    async fn submit_batch(&self, items: Vec<SubmitItem>) -> Result<Vec<ItemOutcome>, RemoteError>;
}

/// Validate the shape of a batch before processing it.
pub fn validate_batch(items: &[SubmitItem]) -> Result<(), RemoteError> {
    if items.is_empty() {
        return Err(RemoteError::InvalidBatch("batch must not be empty".into()));
    }
    for item in items {
        if item.id.trim().is_empty() || item.task_id.trim().is_empty() {
            return Err(RemoteError::InvalidBatch(format!(
                "item is missing required fields: id={:?} task_id={:?}",
                item.id, item.task_id
            )));
        }
    }
    Ok(())
}
