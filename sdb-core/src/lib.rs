//! sdb Core Library
//!
//! Expression engine for a simulated-processor debugger:
//! - Regex-driven tokenizer and precedence-split evaluator
//! - Machine state interface (registers, memory)
//! - Fixed-capacity watchpoint pool
//! - JSON-RPC protocol types for sdb-server

pub mod config;
pub mod expr;
pub mod machine;
pub mod protocol;
pub mod session;
pub mod watch;

pub use config::SessionConfig;
pub use expr::{tokenize, EvalError, Evaluator, Format, LexError, Token, TokenKind, Word};
pub use machine::{Machine, MachineSnapshot, MemoryFault};
pub use protocol::{Request, Response};
pub use session::DebugSession;
pub use watch::{WatchError, Watchpoint, WatchpointChange, WatchpointId, WatchpointPool};
