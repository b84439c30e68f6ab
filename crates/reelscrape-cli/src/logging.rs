use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Directory and file prefix for the daily appender. A bare file name logs
/// to the current directory; "reelscrape.log" rotates as reelscrape.<date>.
fn rolling_target(log_path: &Path) -> Result<(&Path, &str)> {
    let log_dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;
    let log_prefix = log_filename.rsplitn(2, '.').nth(1).unwrap_or(log_filename);
    Ok((log_dir, log_prefix))
}

/// Install the global subscriber. Hold the returned guard for the life of
/// the process when logging to a file so buffered lines get flushed.
pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    // 0 = info, 1 = debug (chromiumoxide's CDP chatter kept at warn), 2+ = trace
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose_level > 0 {
        let filter_str = match verbose_level {
            1 => "debug,chromiumoxide=warn,tungstenite=warn,html5ever=warn,selectors=warn",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,chromiumoxide=warn"))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let (log_dir, log_prefix) = rolling_target(&log_path)?;
        std::fs::create_dir_all(log_dir)?;

        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);
        let (writer, guard) = tracing_appender::non_blocking(file_appender);

        if json {
            let layer = fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(writer);
            registry.with(layer).init();
        } else {
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);
            registry.with(layer).init();
        }
        return Ok(Some(guard));
    }

    if json {
        let layer = fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
        registry.with(layer).init();
    } else {
        let layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
        registry.with(layer).init();
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_log_file_uses_current_dir() {
        let path = PathBuf::from("reelscrape.log");
        let (dir, prefix) = rolling_target(&path).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(prefix, "reelscrape");
    }

    #[test]
    fn test_log_file_in_directory() {
        let path = PathBuf::from("/var/log/reelscrape/run.log");
        let (dir, prefix) = rolling_target(&path).unwrap();
        assert_eq!(dir, Path::new("/var/log/reelscrape"));
        assert_eq!(prefix, "run");

        let relative = PathBuf::from("logs/scrape");
        let (dir, prefix) = rolling_target(&relative).unwrap();
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(prefix, "scrape");
    }

    #[test]
    fn test_log_path_without_file_name_is_rejected() {
        assert!(rolling_target(Path::new("/")).is_err());
        assert!(rolling_target(Path::new("logs/..")).is_err());
    }
}
