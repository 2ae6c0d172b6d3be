//! Logging and tracing configuration
//!
//! Operator logs go to stderr, optionally mirrored to a daily rolling file.
//! Stdout stays free for `--print-config` output.

use std::io;

use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::runtime::{ControllerError, ControllerResult};
use crate::types::CliArgs;

/// Prefix of rolling log file names
pub const DEFAULT_LOG_FILE_PREFIX: &str = "badge-access-controller";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate
    pub level: Level,
    /// Whether to emit JSON instead of human-readable lines
    pub json_format: bool,
    /// Directory for daily rolling log files; `None` logs to stderr only
    pub log_directory: Option<String>,
    /// Log file prefix
    pub log_file_prefix: String,
    /// Whether to log span open/close events
    pub enable_span_events: bool,
    /// Whether to enable ANSI colors on stderr
    pub enable_ansi: bool,
    /// Custom filter directive; overrides `level` and `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            log_directory: None,
            log_file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

/// Keeps the non-blocking log writers flushing; drop it only at exit
#[must_use = "logs stop being written once the guard is dropped"]
#[derive(Debug)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration selected by the command line flags
    ///
    /// `--debug` wins over `--verbose`; without either only warnings are shown.
    pub fn from_cli_args(args: &CliArgs) -> Self {
        let mut config = Self::new();
        if args.debug {
            config = config.with_level(Level::DEBUG).with_span_events();
        } else if args.verbose {
            config = config.with_level(Level::INFO);
        }
        if args.json_logs {
            config = config.with_json_format().without_ansi();
        }
        if let Some(dir) = &args.log_dir {
            config = config.with_file_logging(dir.clone());
        }
        config
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Filter directive used when neither a custom filter nor `RUST_LOG` is set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    fn build_filter(&self) -> ControllerResult<EnvFilter> {
        match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter).map_err(|err| {
                ControllerError::logging(format!("invalid filter '{}': {}", filter, err))
            }),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    /// Install the global tracing subscriber
    pub fn init(self) -> ControllerResult<LoggingGuard> {
        let env_filter = self.build_filter()?;
        let span_events = self.span_events();
        let mut guards = Vec::new();

        let (console_writer, console_guard) = non_blocking(io::stderr());
        guards.push(console_guard);

        let registry = Registry::default().with(env_filter);

        let result = match (&self.log_directory, self.json_format) {
            (Some(dir), json) => {
                let (file_writer, file_guard) =
                    non_blocking(rolling::daily(dir, &self.log_file_prefix));
                guards.push(file_guard);

                // Files are always JSON
                let file_layer =
                    fmt::layer().json().with_writer(file_writer).with_span_events(span_events.clone());

                if json {
                    let console_layer =
                        fmt::layer().json().with_writer(console_writer).with_span_events(span_events);
                    registry.with(file_layer).with(console_layer).try_init()
                } else {
                    let console_layer = fmt::layer()
                        .compact()
                        .with_writer(console_writer)
                        .with_ansi(self.enable_ansi)
                        .with_span_events(span_events);
                    registry.with(file_layer).with(console_layer).try_init()
                }
            }
            (None, true) => {
                let layer =
                    fmt::layer().json().with_writer(console_writer).with_span_events(span_events);
                registry.with(layer).try_init()
            }
            (None, false) => {
                let layer = fmt::layer()
                    .compact()
                    .with_writer(console_writer)
                    .with_ansi(self.enable_ansi)
                    .with_span_events(span_events);
                registry.with(layer).try_init()
            }
        };
        result.map_err(|err| ControllerError::logging(err.to_string()))?;

        info!(
            level = %self.level,
            json = self.json_format,
            log_directory = ?self.log_directory,
            "Logging initialized"
        );
        Ok(LoggingGuard { _guards: guards })
    }
}
