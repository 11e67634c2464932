use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tasksync::mutation::{Mutation, MutationEnvelope, TaskSnapshot};
use tasksync::probe::ConnectivityProbe;
use tasksync::queue_item::Operation;
use tasksync::remote::{
    validate_batch, ItemOutcome, RemoteAuthority, RemoteError, SimulatedRemote, SubmitItem,
};

fn submit_item(id: &str, task_id: &str, updated_at: i64) -> SubmitItem {
    SubmitItem {
        id: id.to_string(),
        task_id: task_id.to_string(),
        operation: Operation::Create,
        data: MutationEnvelope::new(Mutation::Create {
            task: TaskSnapshot {
                id: task_id.to_string(),
                title: "task".into(),
                description: None,
                completed: false,
                created_at: updated_at,
                updated_at,
                is_deleted: false,
            },
        }),
    }
}

#[test]
fn empty_batch_is_rejected() {
    let result = validate_batch(&[]);
    assert!(matches!(result, Err(RemoteError::InvalidBatch(_))));
}

#[test]
fn blank_required_fields_are_rejected() {
    let items = vec![submit_item("", "t1", 10)];
    assert!(matches!(
        validate_batch(&items),
        Err(RemoteError::InvalidBatch(_))
    ));

    let items = vec![submit_item("q1", "  ", 10)];
    assert!(matches!(
        validate_batch(&items),
        Err(RemoteError::InvalidBatch(_))
    ));
}

#[tokio::test]
async fn response_has_one_outcome_per_input_in_order() {
    let remote = SimulatedRemote::new();
    let items = vec![
        submit_item("q1", "t1", 10),
        submit_item("q2", "t2", 11),
        submit_item("q3", "t3", 12),
    ];

    let outcomes = remote.submit_batch(items).await.unwrap();
    assert_eq!(outcomes.len(), 3);
    for outcome in outcomes {
        assert!(matches!(outcome, ItemOutcome::Accepted { .. }));
    }
    assert!(remote.task("t2").is_some());
}

#[tokio::test]
async fn offline_remote_fails_health_check_and_submission() {
    let remote = SimulatedRemote::new();
    remote.set_offline(true);

    assert!(remote.health_check().await.is_err());
    let result = remote.submit_batch(vec![submit_item("q1", "t1", 10)]).await;
    assert!(matches!(result, Err(RemoteError::Unavailable(_))));

    remote.set_offline(false);
    assert!(remote.health_check().await.unwrap());
}

#[tokio::test]
async fn probe_reports_reachable_remote() {
    let probe = ConnectivityProbe::new(Arc::new(SimulatedRemote::new()), Duration::from_secs(5));
    assert!(probe.is_reachable().await);
}

#[tokio::test]
async fn probe_treats_timeout_as_unreachable() {
    // Health check that never answers within the probe's budget.
    struct StalledRemote;

    #[async_trait]
    impl RemoteAuthority for StalledRemote {
        async fn health_check(&self) -> Result<bool, RemoteError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(true)
        }

        async fn submit_batch(
            &self,
            _items: Vec<SubmitItem>,
        ) -> Result<Vec<ItemOutcome>, RemoteError> {
            unreachable!("probe never submits")
        }
    }

    let probe = ConnectivityProbe::new(Arc::new(StalledRemote), Duration::from_millis(50));
    assert!(!probe.is_reachable().await);
}

#[tokio::test]
async fn injected_failures_are_consumed_in_order() {
    let remote = SimulatedRemote::new();
    remote.fail_next(1);

    let outcomes = remote
        .submit_batch(vec![submit_item("q1", "t1", 10), submit_item("q2", "t2", 11)])
        .await
        .unwrap();

    assert!(matches!(outcomes[0], ItemOutcome::Rejected { .. }));
    assert!(matches!(outcomes[1], ItemOutcome::Accepted { .. }));
    // The rejected item never reached the authoritative table.
    assert!(remote.task("t1").is_none());
    assert!(remote.task("t2").is_some());
}
