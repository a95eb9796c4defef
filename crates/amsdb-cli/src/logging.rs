use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::DefaultFields, format::Format},
    prelude::*,
    registry::LookupSpan,
};

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Plain-text layer for `--log-file`; spans such as `store_workflow` are kept in each line.
fn file_layer<S>(path: &Path) -> Result<fmt::Layer<S, DefaultFields, Format, File>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let file = File::create(path).map_err(CliError::Io)?;
    Ok(fmt::layer().with_writer(file).with_ansi(false).with_target(true))
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let file_layer = log_file.map(file_layer).transpose()?;

    tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::{debug, info_span};

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        assert_eq!(level_filter(0, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn file_layer_writes_plain_lines_with_spans() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("amsdb.log");
        let subscriber = tracing_subscriber::registry().with(file_layer(&log_path).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            let _span = info_span!("store_workflow").entered();
            debug!("Stored row 7");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Stored row 7"));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("store_workflow"));
        assert!(!content.contains('\u{1b}'));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(dir.path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
