//! Queue repository for database operations.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::entities::queue_item;

/// Repository for mutation-queue database operations.
pub struct QueueRepository;

impl QueueRepository {
    /// Insert a new queue item.
    pub async fn insert<C>(conn: &C, model: queue_item::ActiveModel) -> Result<queue_item::Model>
    where
        C: ConnectionTrait,
    {
        Ok(model.insert(conn).await?)
    }

    /// All items oldest-first. Does not remove anything; removal is explicit.
    pub async fn all_ordered<C>(conn: &C) -> Result<Vec<queue_item::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(queue_item::Entity::find()
            .order_by_asc(queue_item::Column::CreatedAt)
            .order_by_asc(queue_item::Column::Id)
            .all(conn)
            .await?)
    }

    /// Get a single item by id.
    pub async fn get_by_id<C>(conn: &C, id: &str) -> Result<Option<queue_item::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(queue_item::Entity::find()
            .filter(queue_item::Column::Id.eq(id))
            .one(conn)
            .await?)
    }

    /// Delete one item. No-op if it is already gone.
    pub async fn remove<C>(conn: &C, id: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        queue_item::Entity::delete_many()
            .filter(queue_item::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Record a failed propagation attempt: bump the retry counter and store
    /// the latest error message. The item stays in the queue.
    pub async fn record_failure<C>(
        conn: &C,
        id: &str,
        retry_count: i32,
        error_message: &str,
    ) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if let Some(item) = Self::get_by_id(conn, id).await? {
            let mut active: queue_item::ActiveModel = item.into();
            active.retry_count = ActiveValue::Set(retry_count);
            active.error_message = ActiveValue::Set(Some(error_message.to_string()));
            active.update(conn).await?;
        }
        Ok(())
    }

    /// Current queue depth.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(queue_item::Entity::find().count(conn).await?)
    }
}
