//! Shim Logging
//!
//! The initialization line is the only operational signal that the chain
//! head was exported and which address was captured. It is always written
//! to the configured stream; it is additionally forwarded to the `log`
//! facade (target `bronze_runtime`, level INFO) for hosts that install a
//! logger.
//!
//! Human format:
//!
//! ```text
//! Initializing llvm_gc_root_chain_bronze_ref to 0x7ffd5c2a1e40
//! ```
//!
//! JSON format:
//!
//! ```text
//! {"type":"chain_exported","symbol":"llvm_gc_root_chain_bronze_ref","source":"llvm_gc_root_chain","address":"0x7ffd5c2a1e40"}
//! ```

use std::collections::VecDeque;
use std::ffi::c_void;
use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::{LogFormat, LogSink, ShimConfig};
use crate::error::Result;

/// Shim event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShimEvent {
    /// The internal chain head was copied into the exported symbol
    ChainExported {
        symbol: &'static str,
        source: &'static str,
        address: usize,
    },
}

impl ShimEvent {
    /// Address carried by the event
    pub fn address(&self) -> usize {
        match self {
            ShimEvent::ChainExported { address, .. } => *address,
        }
    }
}

impl fmt::Display for ShimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShimEvent::ChainExported {
                symbol, address, ..
            } => write!(f, "Initializing {} to {:p}", symbol, *address as *const c_void),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    symbol: &'a str,
    source: &'a str,
    address: String,
}

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Events a logger remembers before dropping the oldest
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Shim logger - writes events as lines and keeps a bounded history
pub struct ShimLogger {
    config: ShimConfig,
    sink: Mutex<Box<dyn Write + Send>>,
    events: Mutex<VecDeque<(Instant, ShimEvent)>>,
    history_limit: usize,
}

impl ShimLogger {
    /// Create a logger writing to the stream named by `config.sink`
    pub fn new(config: ShimConfig) -> Self {
        let sink: Box<dyn Write + Send> = match config.sink {
            LogSink::Stdout => Box::new(io::stdout()),
            LogSink::Stderr => Box::new(io::stderr()),
        };
        Self::from_boxed(config, sink)
    }

    /// Create a logger writing to `writer` instead of a standard stream
    pub fn with_writer<W>(config: ShimConfig, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::from_boxed(config, Box::new(writer))
    }

    fn from_boxed(config: ShimConfig, sink: Box<dyn Write + Send>) -> Self {
        Self {
            config,
            sink: Mutex::new(sink),
            events: Mutex::new(VecDeque::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep at most `limit` events in the history; zero keeps none
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.events.get_mut().truncate(limit);
        self
    }

    /// Configuration this logger was built with
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Record and write an event
    ///
    /// A failed write is reported on stderr; the event stays in the history.
    pub fn log(&self, event: ShimEvent) {
        log::info!(target: "bronze_runtime", "{}", event);

        let line = self.render(&event);
        self.remember(event);

        if let Err(e) = self.write_line(&line) {
            eprintln!("bronze: {}", e);
        }
    }

    fn remember(&self, event: ShimEvent) {
        if self.history_limit == 0 {
            return;
        }
        let mut events = self.events.lock();
        while events.len() >= self.history_limit {
            events.pop_front();
        }
        events.push_back((Instant::now(), event));
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut sink = self.sink.lock();
        writeln!(sink, "{}", line)?;
        sink.flush()?;
        Ok(())
    }

    /// Render an event as the line [`ShimLogger::log`] would write
    pub fn render(&self, event: &ShimEvent) -> String {
        match self.config.format {
            LogFormat::Human => {
                if self.config.timestamps {
                    format!("[{}] {}", timestamp(), event)
                } else {
                    event.to_string()
                }
            },
            LogFormat::Json => self.render_json(event),
        }
    }

    fn render_json(&self, event: &ShimEvent) -> String {
        let record = match event {
            ShimEvent::ChainExported {
                symbol,
                source,
                address,
            } => JsonRecord {
                kind: "chain_exported",
                timestamp: self.config.timestamps.then(timestamp),
                symbol,
                source,
                address: format!("{:p}", *address as *const c_void),
            },
        };
        // A struct of strings always serializes.
        serde_json::to_string(&record).unwrap_or_default()
    }

    /// Get remembered events, oldest first
    pub fn events(&self) -> Vec<(Instant, ShimEvent)> {
        self.events.lock().iter().cloned().collect()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Clear all events
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }
}

impl Default for ShimLogger {
    fn default() -> Self {
        Self::new(ShimConfig::default())
    }
}

impl fmt::Debug for ShimLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimLogger")
            .field("config", &self.config)
            .field("events", &self.event_count())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

static GLOBAL_LOGGER: OnceLock<ShimLogger> = OnceLock::new();

/// Process-wide logger, configured from the environment on first use
///
/// An invalid environment value is reported on stderr and the defaults
/// are used instead.
pub fn global() -> &'static ShimLogger {
    GLOBAL_LOGGER.get_or_init(|| {
        let config = ShimConfig::from_env().unwrap_or_else(|e| {
            eprintln!("bronze: {}; using default log configuration", e);
            ShimConfig::default()
        });
        ShimLogger::new(config)
    })
}
