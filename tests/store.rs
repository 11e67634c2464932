use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use tasksync::mutation::Mutation;
use tasksync::queue::{MutationQueue, MutationSink};
use tasksync::storage::LocalStorage;
use tasksync::store::{NewTask, StoreError, TaskPatch, TaskStore};
use tasksync::task::SyncStatus;

async fn setup() -> (TaskStore, MutationQueue) {
    let storage = Arc::new(Mutex::new(LocalStorage::new_in_memory().await.unwrap()));
    let queue = MutationQueue::new(storage.clone());
    let store = TaskStore::new(storage, Some(Arc::new(queue.clone())));
    (store, queue)
}

fn new_task(id: &str, title: &str) -> NewTask {
    NewTask {
        id: id.to_string(),
        title: title.to_string(),
        ..NewTask::default()
    }
}

#[tokio::test]
async fn create_then_get_is_pending_without_server_id() {
    let (store, _queue) = setup().await;

    store.create(new_task("t1", "buy milk")).await.unwrap();
    let task = store.get("t1").await.unwrap().expect("task should exist");

    assert_eq!(task.sync_status, SyncStatus::Pending);
    assert!(task.server_id.is_none());
    assert!(task.last_synced_at.is_none());
    assert!(!task.is_deleted);
}

#[tokio::test]
async fn create_rejects_blank_id() {
    let (store, _queue) = setup().await;

    let result = store.create(new_task("   ", "whitespace id")).await;
    assert!(matches!(result, Err(StoreError::InvalidId(_))));
}

#[tokio::test]
async fn create_trims_id() {
    let (store, _queue) = setup().await;

    store.create(new_task("  t1  ", "trimmed")).await.unwrap();
    assert!(store.get("t1").await.unwrap().is_some());
}

#[tokio::test]
async fn create_rejects_duplicate_active_id() {
    let (store, _queue) = setup().await;

    store.create(new_task("t1", "first")).await.unwrap();
    let result = store.create(new_task("t1", "second")).await;
    assert!(matches!(result, Err(StoreError::DuplicateId(_))));
}

#[tokio::test]
async fn create_restores_soft_deleted_task_as_full_overwrite() {
    let (store, _queue) = setup().await;

    let original = store
        .create(NewTask {
            id: "t1".into(),
            title: "old title".into(),
            description: Some("old description".into()),
            completed: true,
        })
        .await
        .unwrap();
    assert!(store.delete("t1").await.unwrap());

    let restored = store.create(new_task("t1", "new title")).await.unwrap();

    assert_eq!(restored.title, "new title");
    assert_eq!(restored.description, None);
    assert!(!restored.completed);
    assert!(!restored.is_deleted);
    assert_eq!(restored.sync_status, SyncStatus::Pending);
    assert!(restored.server_id.is_none());
    assert!(restored.last_synced_at.is_none());
    // Fresh timestamps, no trace of the prior incarnation.
    assert!(restored.created_at > original.created_at);
}

#[tokio::test]
async fn update_changes_only_provided_fields_and_advances_updated_at() {
    let (store, _queue) = setup().await;

    let created = store
        .create(NewTask {
            id: "t1".into(),
            title: "title".into(),
            description: Some("description".into()),
            completed: false,
        })
        .await
        .unwrap();

    let updated = store
        .update(
            "t1",
            TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap()
        .expect("task should exist");

    assert_eq!(updated.title, "title");
    assert_eq!(updated.description.as_deref(), Some("description"));
    assert!(updated.completed);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.sync_status, SyncStatus::Pending);
}

#[tokio::test]
async fn update_returns_none_for_missing_task() {
    let (store, _queue) = setup().await;

    let result = store
        .update("ghost", TaskPatch::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn update_never_resurrects_deleted_task() {
    let (store, _queue) = setup().await;

    store.create(new_task("t1", "doomed")).await.unwrap();
    store.delete("t1").await.unwrap();

    let result = store
        .update(
            "t1",
            TaskPatch {
                title: Some("back from the dead".into()),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(store.get("t1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_twice_returns_true_then_false() {
    let (store, _queue) = setup().await;

    store.create(new_task("t1", "task")).await.unwrap();
    assert!(store.delete("t1").await.unwrap());
    assert!(!store.delete("t1").await.unwrap());
    assert!(store.get("t1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_of_unknown_id_returns_false() {
    let (store, _queue) = setup().await;
    assert!(!store.delete("ghost").await.unwrap());
}

#[tokio::test]
async fn list_excludes_deleted_and_orders_newest_first() {
    let (store, _queue) = setup().await;

    store.create(new_task("t1", "first")).await.unwrap();
    store.create(new_task("t2", "second")).await.unwrap();
    store.create(new_task("t3", "third")).await.unwrap();
    store.delete("t2").await.unwrap();

    let tasks = store.list().await.unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t3", "t1"]);
}

#[tokio::test]
async fn list_needing_sync_orders_oldest_stale_first() {
    let (store, _queue) = setup().await;

    store.create(new_task("t1", "first")).await.unwrap();
    store.create(new_task("t2", "second")).await.unwrap();
    // Touch t1 again so it becomes the most recently updated.
    store
        .update(
            "t1",
            TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();

    let tasks = store.list_needing_sync().await.unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t1"]);
}

#[tokio::test]
async fn every_mutation_enqueues_a_queue_item() {
    let (store, queue) = setup().await;

    store.create(new_task("t1", "task")).await.unwrap();
    store
        .update(
            "t1",
            TaskPatch {
                title: Some("renamed".into()),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    store.delete("t1").await.unwrap();

    assert_eq!(queue.depth().await.unwrap(), 3);
}

#[tokio::test]
async fn failing_sink_never_fails_the_task_mutation() {
    struct FailingSink;

    #[async_trait]
    impl MutationSink for FailingSink {
        async fn enqueue(&self, _mutation: Mutation) -> Result<()> {
            anyhow::bail!("queue unavailable")
        }
    }

    let storage = Arc::new(Mutex::new(LocalStorage::new_in_memory().await.unwrap()));
    let store = TaskStore::new(storage, Some(Arc::new(FailingSink)));

    // The queue write fails on every mutation; the task writes all stand.
    let created = store.create(new_task("t1", "kept")).await.unwrap();
    assert_eq!(created.sync_status, SyncStatus::Pending);

    let updated = store
        .update(
            "t1",
            TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap()
        .expect("task should exist");
    assert!(updated.completed);

    assert!(store.delete("t1").await.unwrap());
    assert!(store.get("t1").await.unwrap().is_none());
}

#[tokio::test]
async fn store_without_sink_mutates_without_queueing() {
    let storage = Arc::new(Mutex::new(LocalStorage::new_in_memory().await.unwrap()));
    let queue = MutationQueue::new(storage.clone());
    let store = TaskStore::new(storage, None);

    store.create(new_task("t1", "local only")).await.unwrap();
    assert_eq!(queue.depth().await.unwrap(), 0);
    assert!(store.get("t1").await.unwrap().is_some());
}
