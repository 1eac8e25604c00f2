//! JSON-RPC Protocol definitions
//!
//! Defines the line-oriented protocol between a debugger front end (which
//! owns the simulator and the command line) and sdb-server.

use crate::config::SessionConfig;
use crate::expr::{Format, Word};
use crate::machine::MachineSnapshot;
use crate::session::MemoryWord;
use crate::watch::{Watchpoint, WatchpointChange, WatchpointId};
use serde::{Deserialize, Serialize};

/// Request from the front end to sdb-server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    /// Replace the session configuration; drops all watchpoints
    #[serde(rename = "initialize")]
    Initialize {
        #[serde(default)]
        config: SessionConfig,
    },

    /// Evaluate an expression: `p expr`, `p/x expr`
    #[serde(rename = "eval")]
    Eval {
        machine: MachineSnapshot,
        expr: String,
        #[serde(default)]
        format: Format,
    },

    /// Dump `count` words starting at the value of `expr`: `x N expr`
    #[serde(rename = "examine")]
    Examine {
        machine: MachineSnapshot,
        expr: String,
        count: usize,
    },

    /// Add a watchpoint: `w expr`
    #[serde(rename = "watch")]
    Watch {
        machine: MachineSnapshot,
        expr: String,
    },

    /// Delete a watchpoint: `d N`
    #[serde(rename = "delete")]
    Delete { id: WatchpointId },

    /// List active watchpoints: `info w`
    #[serde(rename = "watchpoints")]
    Watchpoints,

    /// Re-check watchpoints after a step
    #[serde(rename = "check")]
    Check { machine: MachineSnapshot },

    /// Shutdown the server
    #[serde(rename = "shutdown")]
    Shutdown,
}

/// Response from sdb-server to the front end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    EvalResult { value: String, raw: Word },
    Memory { words: Vec<MemoryWord> },
    WatchAdded { id: WatchpointId, value: Word },
    Watchpoints { watchpoints: Vec<Watchpoint> },
    Changes {
        changed: bool,
        changes: Vec<WatchpointChange>,
    },
    Success { ok: bool },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Byte offset in the expression where lexing stopped
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
}

impl Response {
    pub fn success() -> Self {
        Response::Success { ok: true }
    }

    /// Error tagged with a machine-readable code
    pub fn failure(code: &str, msg: impl Into<String>) -> Self {
        Self::failure_at(code, msg, None)
    }

    pub fn failure_at(code: &str, msg: impl Into<String>, position: Option<usize>) -> Self {
        Response::Error {
            error: msg.into(),
            code: Some(code.to_string()),
            position,
        }
    }

    pub fn eval_result(raw: Word, format: Format) -> Self {
        Response::EvalResult {
            value: format.apply(raw).to_string(),
            raw,
        }
    }

    pub fn changes(changes: Vec<WatchpointChange>) -> Self {
        Response::Changes {
            changed: !changes.is_empty(),
            changes,
        }
    }
}

/// JSON-RPC message wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcMessage<T> {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(flatten)]
    pub content: T,
}

impl<T> RpcMessage<T> {
    pub fn new(id: u64, content: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            content,
        }
    }
}
