//! Runtime configuration.
//!
//! The data directory is taken from `--dir`, then `TB_DIR`, then
//! `$HOME/.taskboard`. It holds the backend snapshot, the session file and
//! stored attachments. `--db` points at a different snapshot file.

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

pub const DIR_ENV: &str = "TB_DIR";
pub const LOG_ENV: &str = "TB_LOG";
pub const SNAPSHOT_FILE: &str = "tasks_snapshot.json";
pub const SESSION_FILE: &str = "session.json";
pub const ATTACHMENT_DIR: &str = "attachments";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub session_path: PathBuf,
    pub attachment_dir: PathBuf,
}

impl Config {
    /// Resolve paths from command line overrides and the environment.
    pub fn resolve(dir: Option<&Path>, db: Option<&Path>) -> Self {
        let data_dir = dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".taskboard")
            });
        Config::in_dir(data_dir, db)
    }

    pub fn in_dir(data_dir: PathBuf, db: Option<&Path>) -> Self {
        Config {
            snapshot_path: db
                .map(Path::to_path_buf)
                .unwrap_or_else(|| data_dir.join(SNAPSHOT_FILE)),
            session_path: data_dir.join(SESSION_FILE),
            attachment_dir: data_dir.join(ATTACHMENT_DIR),
            data_dir,
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

/// Directive used when neither `TB_LOG` nor `RUST_LOG` is set. Event
/// targets start with the compiled crate name, which is the binary's.
pub fn default_directive(verbose: bool) -> String {
    if verbose {
        format!("{}=debug,warn", env!("CARGO_CRATE_NAME"))
    } else {
        "warn".to_string()
    }
}

/// Log filter from `TB_LOG`, then `RUST_LOG`, then `verbose`.
pub fn log_filter(verbose: bool) -> EnvFilter {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

/// Install the stderr tracing subscriber.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_in_dir() {
        let cfg = Config::in_dir(PathBuf::from("/tmp/tb"), None);
        assert_eq!(cfg.snapshot_path, PathBuf::from("/tmp/tb/tasks_snapshot.json"));
        assert_eq!(cfg.session_path, PathBuf::from("/tmp/tb/session.json"));
        assert_eq!(cfg.attachment_dir, PathBuf::from("/tmp/tb/attachments"));
    }

    #[test]
    fn test_verbose_directive_targets_this_crate() {
        use tracing::level_filters::LevelFilter;

        let crate_root = module_path!().split("::").next().unwrap();
        assert_eq!(default_directive(true), format!("{crate_root}=debug,warn"));
        assert_eq!(
            EnvFilter::new(default_directive(true)).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(default_directive(false), "warn");
        assert_eq!(EnvFilter::new(default_directive(false)).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_db_override() {
        let cfg = Config::resolve(Some(Path::new("/data")), Some(Path::new("/exports/today.json")));
        assert_eq!(cfg.data_dir, PathBuf::from("/data"));
        assert_eq!(cfg.snapshot_path, PathBuf::from("/exports/today.json"));
    }
}
