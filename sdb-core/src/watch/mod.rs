//! Watchpoints
//!
//! A fixed pool of watchpoint slots. Each active slot holds an expression and
//! the value it had when last checked; checking after every step reports the
//! slots whose value moved.

mod pool;

pub use pool::{Watchpoint, WatchpointChange, WatchpointId, WatchpointPool};

use thiserror::Error;

use crate::expr::EvalError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("No space to add an extra watchpoint (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    #[error("No active watchpoint {id}")]
    NotActive { id: WatchpointId },

    #[error("Cannot watch '{expr}': {source}")]
    InvalidExpression {
        expr: String,
        #[source]
        source: EvalError,
    },

    #[error("Watchpoint {id} ({expr}) failed: {source}")]
    Evaluation {
        id: WatchpointId,
        expr: String,
        #[source]
        source: EvalError,
    },
}

impl WatchError {
    /// Short machine-readable name of the failure class
    pub fn code(&self) -> &'static str {
        match self {
            WatchError::PoolExhausted { .. } => "pool_full",
            WatchError::NotActive { .. } => "not_found",
            WatchError::InvalidExpression { source, .. }
            | WatchError::Evaluation { source, .. } => source.code(),
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            WatchError::InvalidExpression { source, .. }
            | WatchError::Evaluation { source, .. } => source.position(),
            _ => None,
        }
    }
}
