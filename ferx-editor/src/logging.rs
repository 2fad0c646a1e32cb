use std::path::PathBuf;

use color_eyre::Report;
use directories::ProjectDirs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    Layer, filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE: &str = "ferx-editor.log";

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level for file output
    pub file_level: Level,
    /// Log level for console output
    pub console_level: Level,
    /// Directory where log files should be written, `None` disables file logs
    pub log_dir: Option<PathBuf>,
    /// Whether file logs are written as JSON
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_level: Level::DEBUG,
            console_level: Level::INFO,
            log_dir: Some(Self::default_log_dir()),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Get the OS-appropriate default log directory
    pub fn default_log_dir() -> PathBuf {
        match ProjectDirs::from("", "", "ferx") {
            // ~/.cache/ferx on Linux, ~/Library/Caches/ferx on macOS
            Some(dirs) => dirs.cache_dir().to_path_buf(),
            None => PathBuf::from("ferx-logs"),
        }
    }

    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let level = |name: &str| var(name).and_then(|v| v.parse::<Level>().ok());
        let mut config = Self::default();

        if let Some(level) = level("FERX_LOG_LEVEL") {
            config.file_level = level;
            config.console_level = level;
        }
        if let Some(level) = level("FERX_FILE_LOG_LEVEL") {
            config.file_level = level;
        }
        if let Some(level) = level("FERX_CONSOLE_LOG_LEVEL") {
            config.console_level = level;
        }

        if let Some(dir) = var("FERX_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if var("FERX_NO_FILE_LOGS").is_some() {
            config.log_dir = None;
        }

        config.json_format = var("FERX_JSON_LOGS").is_some();
        config
    }

    /// Overrides the console level, e.g. from the command line.
    #[must_use]
    pub fn with_console_level(mut self, level: Option<Level>) -> Self {
        if let Some(level) = level {
            self.console_level = level;
        }
        self
    }
}

/// Initialize the logging system with the given configuration.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, Report> {
    let mut layers = vec![];
    let mut guard = None;

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let file_filter = EnvFilter::builder()
            .with_default_directive(config.file_level.into())
            .from_env_lossy();

        let file_layer = if config.json_format {
            fmt::layer().json().with_writer(non_blocking).with_filter(file_filter).boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(file_filter)
                .boxed()
        };

        layers.push(file_layer);
    }

    let console_filter = EnvFilter::builder()
        .with_default_directive(config.console_level.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_target(false) // Hide module paths for cleaner console output
        .with_filter(console_filter)
        .boxed();
    layers.push(console_layer);

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(guard)
}
