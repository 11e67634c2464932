//! Typed mutation payloads carried by the queue.
//!
//! The queue's `data` column stores a [`MutationEnvelope`]: a versioned,
//! operation-tagged record instead of an opaque blob. Each variant carries
//! exactly the fields its operation needs, captured at enqueue time so that
//! propagation is decoupled from concurrent local edits.

use serde::{Deserialize, Serialize};

use crate::entities::queue_item::Operation;
use crate::entities::task;

/// Current wire version of the queue payload schema.
pub const PAYLOAD_VERSION: u32 = 1;

/// Task state frozen at the moment a mutation was enqueued.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_deleted: bool,
}

impl From<&task::Model> for TaskSnapshot {
    fn from(model: &task::Model) -> Self {
        Self {
            id: model.id.clone(),
            title: model.title.clone(),
            description: model.description.clone(),
            completed: model.completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
            is_deleted: model.is_deleted,
        }
    }
}

/// One pending mutation, tagged by operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Mutation {
    Create { task: TaskSnapshot },
    Update { task: TaskSnapshot },
    Delete { id: String, updated_at: i64 },
}

impl Mutation {
    pub fn task_id(&self) -> &str {
        match self {
            Mutation::Create { task } | Mutation::Update { task } => &task.id,
            Mutation::Delete { id, .. } => id,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create { .. } => Operation::Create,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }

    /// Timestamp of the local state this mutation carries; the local side of
    /// last-write-wins comparison.
    pub fn updated_at(&self) -> i64 {
        match self {
            Mutation::Create { task } | Mutation::Update { task } => task.updated_at,
            Mutation::Delete { updated_at, .. } => *updated_at,
        }
    }
}

/// Versioned wrapper actually serialized into the queue's `data` column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationEnvelope {
    pub version: u32,
    #[serde(flatten)]
    pub mutation: Mutation,
}

impl MutationEnvelope {
    pub fn new(mutation: Mutation) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            mutation,
        }
    }
}
