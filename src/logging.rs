use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

// stdout carries the reply, so diagnostics stay quiet unless RUST_LOG asks.
const DEFAULT_LOG_FILTER: &str = "warn";
const DEFAULT_LOG_FILE_PATH: &str = "logs/qwen-direct.log";
const DEFAULT_LOG_FILE_NAME: &str = "qwen-direct.log";
const DEFAULT_LOG_FILE_LIMIT: usize = 20;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File,
    Both,
}

impl LogTarget {
    fn env_name(self) -> &'static str {
        match self {
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Both => "both",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogSettings {
    format: LogFormat,
    target: LogTarget,
    file_path: PathBuf,
    file_limit: usize,
}

impl LogSettings {
    fn from_env_with<F>(get_var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match keyword(get_var("LOG_FORMAT")).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let target = match keyword(get_var("LOG_OUTPUT")).as_deref() {
            Some("file") => LogTarget::File,
            Some("both") => LogTarget::Both,
            _ => LogTarget::Stderr,
        };
        let file_path = get_var("LOG_FILE_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH), PathBuf::from);
        let file_limit = get_var("LOG_FILE_LIMIT")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LOG_FILE_LIMIT);

        Self {
            format,
            target,
            file_path,
            file_limit,
        }
    }
}

fn keyword(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_ascii_lowercase())
}

fn open_rolling_file(
    path: &Path,
    max_files: usize,
) -> Result<(NonBlocking, WorkerGuard), BoxError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE_NAME);

    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(max_files)
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

fn install(format: LogFormat, writer: BoxMakeWriter) -> Result<(), BoxError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

fn install_with_file(settings: &LogSettings) -> Result<Option<WorkerGuard>, BoxError> {
    let (file_writer, guard) = match open_rolling_file(&settings.file_path, settings.file_limit) {
        Ok(opened) => opened,
        Err(err) => {
            let fallback = match settings.target {
                LogTarget::Both => "using stderr only",
                _ => "using stderr instead",
            };
            eprintln!(
                "qwen-direct: failed to initialize LOG_OUTPUT={} at '{}': {err}; {fallback}",
                settings.target.env_name(),
                settings.file_path.display(),
            );
            return install(settings.format, BoxMakeWriter::new(std::io::stderr)).map(|()| None);
        }
    };

    let writer = match settings.target {
        LogTarget::Both => BoxMakeWriter::new(std::io::stderr.and(file_writer)),
        _ => BoxMakeWriter::new(file_writer),
    };
    install(settings.format, writer)?;
    Ok(Some(guard))
}

/// Hold the returned guard until exit; dropping it flushes the log file.
pub fn init() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env_with(|key| env::var(key).ok());
    let installed = match settings.target {
        LogTarget::Stderr => {
            install(settings.format, BoxMakeWriter::new(std::io::stderr)).map(|()| None)
        }
        LogTarget::File | LogTarget::Both => install_with_file(&settings),
    };

    // A subscriber installed earlier (e.g. by a test harness) wins.
    installed.ok().flatten()
}
