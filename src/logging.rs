//! Logging configuration.
//!
//! Answers are printed to stdout, so log records never share it: they go to
//! stderr, or to a file under the state directory with `--log-file`.
//! `RUST_LOG` overrides the default `info` filter.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "board-analyst";
const LOG_FILE: &str = "analyst.log";

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// File target at the default location when `to_file` is set.
    pub fn from_flag(to_file: bool) -> Self {
        if to_file {
            Self::File(default_log_path())
        } else {
            Self::Stderr
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Call once, before anything logs.
///
/// A file target that cannot be opened falls back to stderr.
pub fn init(target: &LogTarget) {
    match target {
        LogTarget::Stderr => init_stderr(),
        LogTarget::File(path) => match open_log_file(path) {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(file)
                .with_ansi(false)
                .init(),
            Err(e) => {
                eprintln!("Warning: logging to stderr, {}: {e}", path.display());
                init_stderr();
            }
        },
    }
}

fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Creates the parent directory and truncates the file.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// `~/.local/state/board-analyst/analyst.log` on Linux; the config directory
/// on platforms without a state directory.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join(APP_DIR).join(LOG_FILE))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path() {
        let path = default_log_path();
        assert!(path.is_absolute());
        assert!(path.ends_with(LOG_FILE));
    }

    #[test]
    fn test_target_from_flag() {
        assert_eq!(LogTarget::from_flag(false), LogTarget::Stderr);
        assert_eq!(
            LogTarget::from_flag(true),
            LogTarget::File(default_log_path())
        );
    }

    #[test]
    fn test_open_log_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(LOG_FILE);

        open_log_file(&path).unwrap();

        assert!(path.exists());
    }
}
