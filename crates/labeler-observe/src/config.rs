use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::object::{LoggerFormat, LoggerLevel};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Log level filter expression (e.g. "info", "labeler_core=debug,info").
    pub level: LoggerLevel,
    /// Whether to include module/target names in log output.
    pub with_targets: bool,
    /// Whether to use colored output.
    pub use_color: bool,
    /// Emit an event when an instrumented span closes, with its busy/idle time.
    ///
    /// Rule mutations run inside `debug` spans, so this doubles as a cheap latency trace.
    pub span_events: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
            span_events: false,
        }
    }
}

impl LoggerConfig {
    /// Color is used only when enabled in config and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }

    pub(crate) fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}
