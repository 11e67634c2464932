//! Local storage module for the task and queue tables.
//!
//! Provides the [`LocalStorage`] connection wrapper; actual queries live in
//! the repository layer.

pub mod db;

pub use db::LocalStorage;
