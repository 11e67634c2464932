//! Logging setup for the `log` facade, backed by fern.

use anyhow::Result;
use log::LevelFilter;
use once_cell::sync::OnceCell;

use crate::config::LoggingConfig;

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize the global logger from configuration. Safe to call more than
/// once; only the first call takes effect.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let mut result = Ok(());
    INITIALIZED.get_or_init(|| {
        result = apply(config);
    });
    result
}

fn apply(config: &LoggingConfig) -> Result<()> {
    let level = if config.enabled {
        LevelFilter::Info
    } else {
        LevelFilter::Off
    };

    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level);

    let dispatch = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            dispatch.chain(fern::log_file(path)?)
        }
        None => dispatch.chain(std::io::stderr()),
    };

    dispatch.apply()?;
    Ok(())
}
