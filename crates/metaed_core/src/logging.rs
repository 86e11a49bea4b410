//! Process-wide file logging for editor hosts.
//!
//! # Responsibility
//! - Start one rotating file logger per process on request.
//! - Capture panics in the log before the default hook runs.
//!
//! # Invariants
//! - Library code never calls `init_logging`; hosts (the CLI) do.
//! - Repeating `init_logging` with identical settings is a no-op.
//! - Switching level or directory after start is rejected, never applied.
//! - Initialization returns errors instead of panicking.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "metaed";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 4;
const PANIC_PAYLOAD_LIMIT: usize = 200;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging is already running with another level or directory.
/// - The flexi_logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = resolve_log_dir(log_dir)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(level, &log_dir))?;
    if active.log_dir != log_dir || active.level != level {
        return Err(format!(
            "editor log already open at level `{}` in `{}`; cannot change to `{}` in `{}`",
            active.level,
            active.log_dir.display(),
            level,
            log_dir.display()
        ));
    }
    Ok(())
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|err| format!("log directory `{}` is not writable: {err}", log_dir.display()))?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("log spec `{level}` rejected: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("editor log failed to start: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_started module=logging status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

/// `(level, log_dir)` of the running logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Maps a level name onto the flexi_logger spec string. `off` is refused.
pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    let name = level.trim();
    let filter = LevelFilter::from_str(name)
        .map_err(|_| format!("log level `{name}` is not one of trace|debug|info|warn|error"))?;
    match filter {
        LevelFilter::Off => Err("log level `off` would silence the editor log".to_string()),
        LevelFilter::Error => Ok("error"),
        LevelFilter::Warn => Ok("warn"),
        LevelFilter::Info => Ok("info"),
        LevelFilter::Debug => Ok("debug"),
        LevelFilter::Trace => Ok("trace"),
    }
}

fn resolve_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(log_dir.trim());
    if path.as_os_str().is_empty() {
        return Err("log directory is blank".to_string());
    }
    if path.is_relative() {
        return Err(format!("log directory `{}` is relative", path.display()));
    }
    Ok(path)
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            panic_message(info)
        );
        previous(info);
    }));
}

fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "<opaque payload>"
    };
    clip_to_line(text, PANIC_PAYLOAD_LIMIT)
}

/// Joins lines with spaces and clips to `limit` characters plus `...`.
fn clip_to_line(text: &str, limit: usize) -> String {
    let mut chars = text
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch });
    let mut line: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{clip_to_line, init_logging, logging_status, normalize_level, resolve_log_dir};

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" DEBUG ").unwrap(), "debug");
        assert_eq!(normalize_level("Warn").unwrap(), "warn");
        assert!(normalize_level("loud").is_err());
        assert!(normalize_level("off").is_err());
    }

    #[test]
    fn relative_and_blank_dirs_are_rejected() {
        assert!(resolve_log_dir("  ").unwrap_err().contains("blank"));
        assert!(resolve_log_dir("logs").unwrap_err().contains("relative"));
    }

    #[test]
    fn panic_text_is_clipped_to_one_line() {
        assert_eq!(clip_to_line("a\nb", 10), "a b");
        assert_eq!(clip_to_line("abc", 3), "abc");
        assert_eq!(clip_to_line("abcdef", 3), "abc...");
    }

    #[test]
    fn init_is_idempotent_and_rejects_changes() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_dir = first.path().to_str().unwrap().to_string();
        let second_dir = second.path().to_str().unwrap().to_string();

        init_logging("info", &first_dir).unwrap();
        init_logging("info", &first_dir).unwrap();

        let level_error = init_logging("trace", &first_dir).unwrap_err();
        assert!(level_error.contains("cannot change"));
        let dir_error = init_logging("info", &second_dir).unwrap_err();
        assert!(dir_error.contains("cannot change"));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}
