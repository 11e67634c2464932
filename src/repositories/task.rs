//! Task repository for database operations.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::task::{self, SyncStatus};

/// Repository for task-related database operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Get a single active (non-deleted) task by id.
    pub async fn get_active<C>(conn: &C, id: &str) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::IsDeleted.eq(false))
            .one(conn)
            .await?)
    }

    /// Get a single task by id regardless of deletion status.
    pub async fn get_any<C>(conn: &C, id: &str) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .one(conn)
            .await?)
    }

    /// All active tasks, most recently created first.
    pub async fn list_active<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::IsDeleted.eq(false))
            .order_by_desc(task::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Tasks with unpropagated or permanently failed mutations, oldest stale
    /// first so the longest-waiting tasks get corrected before fresher ones.
    pub async fn list_needing_sync<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::SyncStatus.is_in([SyncStatus::Pending, SyncStatus::Error]))
            .order_by_asc(task::Column::UpdatedAt)
            .all(conn)
            .await?)
    }

    /// Number of tasks still waiting on propagation.
    pub async fn count_pending<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::SyncStatus.is_in([SyncStatus::Pending, SyncStatus::Error]))
            .count(conn)
            .await?)
    }

    /// Most recent successful propagation timestamp across all tasks.
    pub async fn latest_synced_at<C>(conn: &C) -> Result<Option<i64>>
    where
        C: ConnectionTrait,
    {
        let newest = task::Entity::find()
            .filter(task::Column::LastSyncedAt.is_not_null())
            .order_by_desc(task::Column::LastSyncedAt)
            .one(conn)
            .await?;
        Ok(newest.and_then(|t| t.last_synced_at))
    }

    /// Insert a new task row.
    pub async fn insert<C>(conn: &C, model: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Ok(model.insert(conn).await?)
    }

    /// Update an existing task row.
    pub async fn update<C>(conn: &C, model: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Ok(model.update(conn).await?)
    }
}
