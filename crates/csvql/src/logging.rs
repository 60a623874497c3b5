//! Logging configuration for csvql
//!
//! Diagnostics go through the `tracing` framework. Output defaults to
//! stderr so it never interleaves with query results on stdout.

use csvql_core::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "csvql.log";

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stderr
    Stderr,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stderr and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format (default)
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter, in `EnvFilter` syntax
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            output: LogOutput::Stderr,
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    /// Create config with debug level
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Create config with warn level
    pub fn warn() -> Self {
        Self::default()
    }

    /// Set log output to file with rotation
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stderr and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Initialize global logging with this configuration
    ///
    /// `RUST_LOG` overrides the configured level. Returns the file writer's
    /// guard, which must stay alive for file logging to flush. If a global
    /// subscriber is already installed this is a no-op.
    ///
    /// ```rust,no_run
    /// use csvql::logging::LogConfig;
    ///
    /// let _guard = LogConfig::debug().init()?;
    /// # Ok::<(), csvql::Error>(())
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| {
                Error::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid log level '{}': {}", self.level, e),
                ))
            })?;

        let registry = tracing_subscriber::registry().with(env_filter);
        let (installed, guard) = match self.output {
            LogOutput::Stderr => {
                let layer = fmt::layer().with_writer(io::stderr);
                let installed = match self.format {
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                    LogFormat::Compact => registry.with(layer.compact()).try_init(),
                };
                (installed, None)
            }
            LogOutput::File(path) => {
                let (writer, guard) = tracing_appender::non_blocking(file_appender(&path));
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                let installed = match self.format {
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                    LogFormat::Compact => registry.with(layer.compact()).try_init(),
                };
                (installed, Some(guard))
            }
            LogOutput::Both(path) => {
                let (writer, guard) = tracing_appender::non_blocking(file_appender(&path));
                // Both outputs share the compact format
                let installed = registry
                    .with(fmt::layer().with_writer(io::stderr).compact())
                    .with(fmt::layer().with_writer(writer).with_ansi(false).compact())
                    .try_init();
                (installed, Some(guard))
            }
        };

        match installed {
            Ok(()) => Ok(guard),
            Err(_) => Ok(None),
        }
    }
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    tracing_appender::rolling::daily(dir, name)
}
