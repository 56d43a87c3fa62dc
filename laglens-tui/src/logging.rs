//! Tracing setup.
//!
//! The terminal belongs to the dashboard, so log output goes to a file.
//! `RUST_LOG` takes precedence over the configured level.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{
    filter::EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt, Layer,
};

/// Build the filter from `RUST_LOG`, falling back to `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Open `path` for appending, or a sink if it cannot be opened.
///
/// The returned message describes the failure so the caller can print it
/// before the terminal is taken over.
pub fn file_writer(path: &Path) -> (BoxMakeWriter, Option<String>) {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), None),
        Err(e) => (
            BoxMakeWriter::new(std::io::sink),
            Some(format!(
                "laglens: cannot open log file {}: {e}; logging disabled",
                path.display()
            )),
        ),
    }
}

/// Install the global subscriber writing to `path`.
///
/// Returns a warning if the log file could not be opened. Installing twice
/// is a no-op.
pub fn init(path: &Path, level: &str) -> Option<String> {
    let (writer, warning) = file_writer(path);

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .with_filter(env_filter(level)),
        )
        .try_init();

    warning
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn writer_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laglens.log");
        let (writer, warning) = file_writer(&path);
        assert!(warning.is_none());

        use tracing_subscriber::fmt::MakeWriter;
        writer.make_writer().write_all(b"round complete\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "round complete\n");
    }

    #[test]
    fn unopenable_path_falls_back_to_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("laglens.log");
        let (writer, warning) = file_writer(&path);
        assert!(warning.unwrap().contains("cannot open log file"));

        use tracing_subscriber::fmt::MakeWriter;
        writer.make_writer().write_all(b"dropped").unwrap();
    }
}
