use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use tokio::sync::Mutex;

use tasksync::config::Config;
use tasksync::queue::MutationQueue;
use tasksync::remote::SimulatedRemote;
use tasksync::storage::LocalStorage;
use tasksync::store::TaskStore;
use tasksync::sync::SyncService;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::config_path()?;
    if !config_path.exists() {
        Config::generate_default_config(&config_path)?;
        eprintln!("Generated default configuration at {}", config_path.display());
    }
    let config = Config::load()?;
    tasksync::logger::init(&config.logging)?;

    let db_path = config.database_path()?;
    let storage = Arc::new(Mutex::new(LocalStorage::new_at_path(&db_path).await?));
    info!("opened task database at {}", db_path.display());

    let remote = Arc::new(SimulatedRemote::new());
    let queue = MutationQueue::new(storage.clone());
    let store = TaskStore::new(storage.clone(), Some(Arc::new(queue.clone())));
    let sync_service = SyncService::new(storage, queue, remote, &config.sync);

    let stale = store.list_needing_sync().await?;
    if !stale.is_empty() {
        info!("{} task(s) awaiting sync from a previous run", stale.len());
    }

    let interval_secs = config.sync.auto_sync_interval_seconds;
    if interval_secs == 0 {
        info!("auto-sync disabled; nothing to schedule");
        return Ok(());
    }

    info!("starting sync scheduler, interval {interval_secs}s");
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        match sync_service.sync().await {
            Ok(outcome) => info!("sync cycle outcome: {outcome:?}"),
            Err(e) => error!("sync cycle failed: {e}"),
        }
    }
}
