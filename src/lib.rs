//! tasksync - An offline-first task store with deferred remote synchronization
//!
//! Callers create, update, and delete tasks against a local SQLite store
//! instantly; every mutation is also recorded in a durable queue, and a sync
//! engine later propagates the queue to a remote authority in bounded
//! batches, resolving conflicts last-write-wins and retrying failures up to a
//! configurable ceiling.
//!
//! # Modules
//!
//! * [`config`] - Application configuration management
//! * [`store`] - Local task store (CRUD with soft delete)
//! * [`queue`] - Durable mutation queue
//! * [`sync`] - Sync engine and conflict resolution
//! * [`remote`] - Remote authority contract and simulated implementation
//! * [`storage`] - Local database connection and schema

/// Configuration module for managing application settings
pub mod config;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging setup
pub mod logger;

/// Typed mutation payloads carried by the queue
pub mod mutation;

/// Connectivity probe gating sync attempts
pub mod probe;

/// Durable mutation queue and the enqueue capability trait
pub mod queue;

/// Remote authority abstraction and simulated backend
pub mod remote;

/// Repository layer for database operations
pub mod repositories;

/// Local storage layer
pub mod storage;

/// Local task store
pub mod store;

/// Synchronization engine
pub mod sync;

/// Utility helpers
pub mod utils;

// Re-export entity models for convenient access
pub use entities::{queue_item, task};
