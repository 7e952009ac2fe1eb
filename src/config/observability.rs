//! Logging config

use clap::{Args, ValueEnum};

/// Crates whose logs are noisy when dictionaries come over HTTP.
const HTTP_STACK_TARGETS: [&str; 3] = ["hyper", "reqwest", "rustls"];

/// How log lines are rendered on stderr.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One short line per event
    Compact,

    /// One JSON object per event
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Level for veneer's own events (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Line format
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,

    /// Level for the HTTP client stack used by the dictionary fetcher
    #[arg(long, env = "VENEER_HTTP_LOG_LEVEL", default_value = "warn", global = true)]
    pub http_log_level: String,
}

impl LoggingConfig {
    /// `EnvFilter` directives for these settings, e.g.
    /// `info,hyper=warn,reqwest=warn,rustls=warn`.
    pub fn filter_directives(&self) -> String {
        HTTP_STACK_TARGETS
            .iter()
            .fold(self.log_level.clone(), |directives, target| {
                format!("{directives},{target}={}", self.http_log_level)
            })
    }
}
