pub mod models;
pub mod services;
pub mod api;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

static PROCESS_START: OnceLock<Instant> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_PREFIX: &str = "ai-text-detector_";
const LOGS_TO_KEEP: usize = 30;

pub fn mark_process_start() {
    PROCESS_START.get_or_init(Instant::now);
}

pub fn startup_elapsed_ms() -> u128 {
    PROCESS_START
        .get()
        .map(|t| t.elapsed().as_millis())
        .unwrap_or(0)
}

fn env_flag(var: &str) -> bool {
    matches!(
        std::env::var(var).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

/// Initialize logging system with timestamped log files.
/// `default_level` applies when `RUST_LOG` is not set.
pub fn init_logging(default_level: &str) {
    let disable_file_log = env_flag("AITD_DISABLE_FILE_LOG");
    let disable_cleanup = env_flag("AITD_DISABLE_LOG_CLEANUP");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    if disable_file_log {
        init_console_only_logging(env_filter);
        info!("File logging disabled via AITD_DISABLE_FILE_LOG");
        return;
    }

    let logs_dir = match std::env::var("AITD_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => get_logs_dir(),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        init_console_only_logging(env_filter);
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("{}{}.log", LOG_PREFIX, timestamp);

    // One file per session; writes go through a background worker.
    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // Console goes to stderr so CLI output on stdout stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    info!("=== AI Text Detector Started ===");
    info!("Log file: {}/{}", logs_dir.display(), log_filename);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if !disable_cleanup {
        std::thread::spawn(move || {
            cleanup_old_logs(&logs_dir, LOGS_TO_KEEP);
        });
    }
}

/// Get the logs directory path
pub fn get_logs_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(services::config_store::APP_DIR_NAME).join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn cleanup_old_logs(logs_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with(LOG_PREFIX) && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    // Oldest first; the timestamped name breaks mtime ties
    entries.sort_by_key(|e| {
        let modified = e
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        (modified, e.file_name())
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}

fn init_console_only_logging(env_filter: EnvFilter) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_old_logs_only_touches_own_files() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{}2026010{}_000000.log", LOG_PREFIX, i)), "").unwrap();
        }
        fs::write(dir.path().join("other.log"), "").unwrap();

        cleanup_old_logs(dir.path(), 2);

        let remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(remaining.len(), 3);
        assert!(remaining.contains(&"other.log".to_string()));
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        cleanup_old_logs(&dir.path().join("missing"), 1);
    }

    #[test]
    fn test_logs_dir_name() {
        assert!(get_logs_dir().ends_with("logs"));
    }
}
