//! In-memory remote authority.
//!
//! Holds an authoritative copy of every task it has accepted and assigns
//! server ids on first contact. Exposes two injection knobs for tests and
//! demos: `set_offline` fails the health check, `fail_next` rejects the next
//! N submitted items with a transient error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{validate_batch, ItemOutcome, RemoteAuthority, RemoteError, SubmitItem};
use crate::mutation::{Mutation, TaskSnapshot};

#[derive(Clone, Debug)]
struct RemoteRecord {
    server_id: String,
    task: TaskSnapshot,
}

#[derive(Default)]
struct State {
    records: HashMap<String, RemoteRecord>,
    offline: bool,
    failures_remaining: u32,
}

/// Simulated remote authority with deterministic failure injection.
#[derive(Default)]
pub struct SimulatedRemote {
    state: Mutex<State>,
}

impl SimulatedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Recover from poisoning; the state is always left consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the health check report unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Reject the next `n` submitted items with a transient error.
    pub fn fail_next(&self, n: u32) {
        self.state().failures_remaining = n;
    }

    /// Plant an authoritative version of a task, as if another client had
    /// synced it. Used to exercise conflict resolution.
    pub fn seed_task(&self, task: TaskSnapshot) -> String {
        let mut state = self.state();
        let server_id = format!("srv-{}", Uuid::new_v4());
        state.records.insert(
            task.id.clone(),
            RemoteRecord {
                server_id: server_id.clone(),
                task,
            },
        );
        server_id
    }

    /// Read back the authoritative copy of a task, if any.
    pub fn task(&self, task_id: &str) -> Option<TaskSnapshot> {
        let state = self.state();
        state.records.get(task_id).map(|r| r.task.clone())
    }

    fn apply(state: &mut State, item: &SubmitItem) -> ItemOutcome {
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return ItemOutcome::Rejected {
                message: "simulated transient failure".into(),
            };
        }

        let task_id = item.task_id.clone();
        let submitted_at = item.data.mutation.updated_at();

        // An existing record with a strictly newer timestamp wins; the
        // submitted version is discarded and the stored copy comes back as
        // the resolved state.
        if let Some(record) = state.records.get(&task_id) {
            if record.task.updated_at > submitted_at {
                return ItemOutcome::Accepted {
                    server_id: record.server_id.clone(),
                    resolved: Some(record.task.clone()),
                };
            }
        }

        let server_id = state
            .records
            .get(&task_id)
            .map(|r| r.server_id.clone())
            .unwrap_or_else(|| format!("srv-{}", Uuid::new_v4()));

        match &item.data.mutation {
            Mutation::Create { task } | Mutation::Update { task } => {
                state.records.insert(
                    task_id,
                    RemoteRecord {
                        server_id: server_id.clone(),
                        task: task.clone(),
                    },
                );
            }
            Mutation::Delete { .. } => {
                state.records.remove(&task_id);
            }
        }

        ItemOutcome::Accepted {
            server_id,
            resolved: None,
        }
    }
}

#[async_trait]
impl RemoteAuthority for SimulatedRemote {
    async fn health_check(&self) -> Result<bool, RemoteError> {
        let state = self.state();
        if state.offline {
            Err(RemoteError::Unavailable("simulated offline".into()))
        } else {
            Ok(true)
        }
    }

    async fn submit_batch(&self, items: Vec<SubmitItem>) -> Result<Vec<ItemOutcome>, RemoteError> {
        validate_batch(&items)?;

        let mut state = self.state();
        if state.offline {
            return Err(RemoteError::Unavailable("simulated offline".into()));
        }

        Ok(items.iter().map(|item| Self::apply(&mut state, item)).collect())
    }
}
