use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of mutation a queue item propagates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[sea_orm(string_value = "create")]
    Create,
    #[sea_orm(string_value = "update")]
    Update,
    #[sea_orm(string_value = "delete")]
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// One pending propagation, durable until the sync engine either delivers it
/// or exhausts its retry budget.
///
/// Items are append-only: `operation` and `data` are never rewritten after
/// enqueue, only `retry_count` and `error_message` move.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_queue")]
pub struct Model {
    /// Derived from `task_id:operation:created_at`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub task_id: String,
    pub operation: Operation,
    /// JSON-serialized [`MutationEnvelope`](crate::mutation::MutationEnvelope)
    /// snapshot taken at enqueue time, never re-fetched.
    pub data: String,
    /// Unix milliseconds; drain order is ascending on this field.
    pub created_at: i64,
    pub retry_count: i32,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id"
    )]
    Task,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
