//! # Application State
//!
//! Core chat state. No terminal types live here; the `tui` module decides
//! how a line with a given `Emphasis` looks.
//!
//! ```text
//! App
//! ├── endpoint: Endpoint            // server we talk to
//! ├── log: Vec<LogLine>             // everything shown in the scroll region
//! ├── status: ConnectionStatus      // title bar state
//! └── verify_server: bool           // false = any certificate accepted
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use chrono::{DateTime, Local};

use crate::core::endpoint::Endpoint;

/// Oldest lines are dropped once the log grows past this.
pub const MAX_LOG_LINES: usize = 1000;

/// Display emphasis of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub text: String,
    pub emphasis: Emphasis,
    pub at: DateTime<Local>,
}

impl LogLine {
    pub fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            emphasis,
            at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting { attempt: u32, of: u32 },
    Connected,
    /// Session ended (exit typed, remote close, or I/O failure).
    Closed,
    /// Retry budget exhausted without a connection.
    Failed,
}

impl ConnectionStatus {
    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Idle => "Idle".to_string(),
            ConnectionStatus::Connecting { attempt, of } => {
                format!("Connecting ({attempt}/{of})")
            }
            ConnectionStatus::Connected => "Connected".to_string(),
            ConnectionStatus::Closed => "Closed".to_string(),
            ConnectionStatus::Failed => "Connection failed".to_string(),
        }
    }
}

pub struct App {
    pub endpoint: Endpoint,
    pub log: Vec<LogLine>,
    pub status: ConnectionStatus,
    pub verify_server: bool,
}

impl App {
    pub fn new(endpoint: Endpoint, verify_server: bool) -> Self {
        Self {
            endpoint,
            log: Vec::new(),
            status: ConnectionStatus::Idle,
            verify_server,
        }
    }

    /// Append a line to the scroll region, evicting the oldest past the cap.
    pub fn push_line(&mut self, text: impl Into<String>, emphasis: Emphasis) {
        self.log.push(LogLine::new(text, emphasis));
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}
