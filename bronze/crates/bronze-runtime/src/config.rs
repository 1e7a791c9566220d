//! Configuration Module - Diagnostic Output Settings
//!
//! The shim has exactly one tunable concern: how the initialization line is
//! written. Whether it is written is not configurable.
//!
//! # Environment
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `BRONZE_LOG_FORMAT` | `human`, `json` | `human` |
//! | `BRONZE_LOG_TIMESTAMPS` | `1`/`true`/`yes`/`on`, `0`/`false`/`no`/`off` | off |
//! | `BRONZE_LOG_SINK` | `stdout`, `stderr` | `stdout` |

use std::str::FromStr;

use crate::error::{Result, RuntimeError};

/// Environment variable selecting the line format
pub const ENV_FORMAT: &str = "BRONZE_LOG_FORMAT";

/// Environment variable enabling timestamps
pub const ENV_TIMESTAMPS: &str = "BRONZE_LOG_TIMESTAMPS";

/// Environment variable selecting the output stream
pub const ENV_SINK: &str = "BRONZE_LOG_SINK";

/// Line format for diagnostic events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `Initializing llvm_gc_root_chain_bronze_ref to 0x…`
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(RuntimeError::Configuration(format!(
                "{ENV_FORMAT} must be `human` or `json`, got `{other}`"
            ))),
        }
    }
}

/// Output stream for diagnostic events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSink {
    #[default]
    Stdout,
    Stderr,
}

impl FromStr for LogSink {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(LogSink::Stdout),
            "stderr" => Ok(LogSink::Stderr),
            other => Err(RuntimeError::Configuration(format!(
                "{ENV_SINK} must be `stdout` or `stderr`, got `{other}`"
            ))),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RuntimeError::Configuration(format!(
            "{name} must be a boolean flag, got `{other}`"
        ))),
    }
}

/// Diagnostic output configuration
///
/// # Examples
///
/// ```rust
/// use bronze_runtime::{LogFormat, ShimConfig};
///
/// let config = ShimConfig {
///     format: LogFormat::Json,
///     timestamps: true,
///     ..Default::default()
/// };
/// assert_eq!(config.format, LogFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShimConfig {
    /// Line format
    ///
    /// Default: human-readable
    pub format: LogFormat,

    /// Prefix each line with a local timestamp
    ///
    /// Default: false
    pub timestamps: bool,

    /// Stream the line is written to
    ///
    /// Default: stdout
    pub sink: LogSink,
}

impl ShimConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Unset variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(format) = lookup(ENV_FORMAT) {
            config.format = format.parse()?;
        }
        if let Some(timestamps) = lookup(ENV_TIMESTAMPS) {
            config.timestamps = parse_flag(ENV_TIMESTAMPS, &timestamps)?;
        }
        if let Some(sink) = lookup(ENV_SINK) {
            config.sink = sink.parse()?;
        }

        Ok(config)
    }
}
