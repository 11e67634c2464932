//! SeaORM entity models for the local database tables.

pub mod queue_item;
pub mod task;
