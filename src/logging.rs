use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,sallgood_chat=debug";

/// Sends tracing output to `path`; the terminal belongs to the UI.
///
/// Fails if a global subscriber is already installed.
///
/// The filter comes from `SALLGOOD_LOG`, then `RUST_LOG`, then a default.
pub fn init_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = std::env::var("SALLGOOD_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chat.log");
        // Installs the global subscriber at most once per test binary.
        let _ = init_tracing(&path);
        assert!(path.exists());
    }

    #[test]
    fn second_install_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let _ = init_tracing(&dir.path().join("first.log"));
        let err = init_tracing(&dir.path().join("second.log")).unwrap_err();
        assert!(err.to_string().contains("tracing subscriber"));
    }
}
