//! Logging initialization (`spec.md` §6 `MCP_DEBUG`/`MCP_LOG_FILE`).
//!
//! Stdout is reserved for stdio-transport protocol bytes, so every
//! subscriber here writes to stderr or to `MCP_LOG_FILE`, never stdout
//! (mirrors the teacher's `turbomcp-server::logging` guard-on-drop shape,
//! trimmed to the two knobs this launcher actually exposes).

use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Must be held for the lifetime of `main` when file logging is active;
/// dropping it early truncates buffered-but-unflushed log lines.
#[allow(dead_code)]
pub struct LoggingGuard(Option<WorkerGuard>);

pub fn init() -> io::Result<LoggingGuard> {
    let debug = std::env::var("MCP_DEBUG").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match std::env::var("MCP_LOG_FILE").ok() {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "MCP_LOG_FILE must name a file"))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
                .try_init()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            Ok(LoggingGuard(Some(guard)))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .try_init()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            Ok(LoggingGuard(None))
        }
    }
}
