mod config;
mod store;

pub use config::{Config, TimerConfig};
pub use store::{load_or_default, save, KvStore, MemoryStore, SqliteStore};

use std::path::PathBuf;

/// Returns `~/.config/focuskit[-dev]/` based on FOCUSKIT_ENV.
///
/// Set FOCUSKIT_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSKIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focuskit-dev")
    } else {
        base_dir.join("focuskit")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
