//! Repository layer for database operations.
//!
//! Repositories are stateless and generic over [`sea_orm::ConnectionTrait`],
//! so the same query helpers run against a plain connection or inside a
//! transaction.

pub mod queue;
pub mod task;

pub use queue::QueueRepository;
pub use task::TaskRepository;
