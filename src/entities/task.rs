use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Propagation state of a task relative to the remote authority.
///
/// `Pending` means the task carries unpropagated local mutations, `Synced`
/// means remote state matched local state as of `last_synced_at`, and `Error`
/// means propagation failed permanently and needs a fresh local mutation to
/// re-trigger sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "synced")]
    Synced,
    #[sea_orm(string_value = "error")]
    Error,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Caller-supplied identifier, immutable once set.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds; the sole input to conflict resolution.
    pub updated_at: i64,
    pub is_deleted: bool,
    pub sync_status: SyncStatus,
    /// Identifier assigned by the remote authority once first synced.
    pub server_id: Option<String>,
    pub last_synced_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::queue_item::Entity")]
    QueueItem,
}

impl Related<super::queue_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QueueItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
