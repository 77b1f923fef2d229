//! Logging to a file.
//!
//! The terminal belongs to the UI, so nothing is ever written to stdout while it runs.
//!
//! ## Environment Variables
//!
//! 1. **`RULEM_LOG`** (highest priority). A bare level such as `debug` applies to this
//!    crate only; anything containing `=`, `:` or `,` is used as a full filter.
//! 2. **`RUST_LOG`**, used as-is.
//! 3. Default: `warn,rulem=info`.
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/rulem/logs/rulem-<pid>.log`. Override with `RULEM_LOG_FILE`
//! (a file path, or a directory when it has no extension).

use std::{env, path::Path, path::PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

pub const LOG_ENV: &str = "RULEM_LOG";
pub const LOG_FILE_ENV: &str = "RULEM_LOG_FILE";

type InitResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Returned from [`init`]; dropping it flushes and stops the background writer.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

pub fn init() -> InitResult<LogGuard> {
    let override_path = env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    let (log_dir, filename) = resolve_log_path(override_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter());

    Registry::default().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Stdout logging for tests. Safe to call from every test.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("rulem-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rulem")
        .join("logs");
    (dir, filename)
}

fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var(LOG_ENV) {
        return expand_rulem_log(&level);
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new("warn,rulem=info")
}

fn expand_rulem_log(value: &str) -> EnvFilter {
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return EnvFilter::new(value);
    }
    EnvFilter::new(format!("warn,rulem={}", value))
}
