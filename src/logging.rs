use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. The level is `info` unless `debug` is set, in which
/// case `RUST_LOG` may override the default `debug` level.
///
/// With `log_file` set, output goes to that file instead of stderr. Calling
/// this more than once keeps the first subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Ignore RUST_LOG unless debug logging was requested so a stray variable
    // in the environment cannot make release runs verbose.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(path) = log_file else {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(file_name) = path.file_name() else {
        let _ = builder.with_writer(std::io::stderr).try_init();
        tracing::warn!(path = %path.display(), "log file path has no file name; logging to stderr");
        return;
    };

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(&directory)
    {
        Ok(appender) => appender,
        Err(err) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
            tracing::warn!(path = %path.display(), error = %err, "failed to open log file; logging to stderr");
            return;
        }
    };
    let _ = builder.with_ansi(false).with_writer(appender).try_init();
}
