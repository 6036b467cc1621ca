// Logging setup
// Both front-ends draw on stdout, so events are written to a file instead

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::mfs_game::project_dirs;

/// Log file location: platform data directory, or the current directory
pub fn log_path() -> PathBuf {
    match project_dirs() {
        Some(proj) => proj.data_dir().join("mfswpr.log"),
        None => PathBuf::from("mfswpr.log"),
    }
}

/// Install the global subscriber, filter taken from RUST_LOG (default "info")
/// Logging stays off when the file cannot be opened
pub fn init() {
    let path = log_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
