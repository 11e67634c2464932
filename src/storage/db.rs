use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

/// Durable store backing both the task table and the mutation queue.
///
/// The pool is capped at a single connection: SQLite in-memory databases are
/// private per connection, and a lone connection also serializes every
/// read-modify-write sequence, which is the concurrency model this store
/// promises its callers.
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open an in-memory database. Used by tests and disposable setups; the
    /// data lives exactly as long as this value.
    pub async fn new_in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Open (or create) an on-disk database at the given path.
    pub async fn new_at_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect(&url).await
    }

    async fn connect(url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(url);
        options
            .min_connections(1)
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options).await?;
        let storage = LocalStorage { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_unprepared(
                r"
                CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    completed BOOLEAN NOT NULL DEFAULT 0,
                    created_at BIGINT NOT NULL,
                    updated_at BIGINT NOT NULL,
                    is_deleted BOOLEAN NOT NULL DEFAULT 0,
                    sync_status TEXT NOT NULL DEFAULT 'pending',
                    server_id TEXT,
                    last_synced_at BIGINT
                )
                ",
            )
            .await?;

        self.conn
            .execute_unprepared(
                r"
                CREATE TABLE IF NOT EXISTS sync_queue (
                    id TEXT PRIMARY KEY,
                    task_id TEXT NOT NULL,
                    operation TEXT NOT NULL,
                    data TEXT NOT NULL,
                    created_at BIGINT NOT NULL,
                    retry_count INTEGER NOT NULL DEFAULT 0,
                    error_message TEXT,
                    FOREIGN KEY (task_id) REFERENCES tasks(id)
                )
                ",
            )
            .await?;

        self.conn
            .execute_unprepared("CREATE INDEX IF NOT EXISTS idx_sync_queue_created_at ON sync_queue (created_at)")
            .await?;

        self.conn
            .execute_unprepared("CREATE INDEX IF NOT EXISTS idx_tasks_sync_status ON tasks (sync_status)")
            .await?;

        Ok(())
    }
}
