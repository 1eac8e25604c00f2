//! Expression error types

use thiserror::Error;

use crate::machine::MemoryFault;

/// Failure while splitting source text into tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("No token matches at position {position}")]
    NoMatch { position: usize },

    #[error("Token at position {position} is longer than {limit} bytes")]
    TokenTooLong { position: usize, limit: usize },

    #[error("Expression has more than {limit} tokens")]
    TooManyTokens { limit: usize },
}

impl LexError {
    /// Byte offset of the offending input, when there is one
    pub fn position(&self) -> Option<usize> {
        match self {
            LexError::NoMatch { position } | LexError::TokenTooLong { position, .. } => {
                Some(*position)
            }
            LexError::TooManyTokens { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    // Lexing errors
    #[error(transparent)]
    Lex(#[from] LexError),

    // Structural errors
    #[error("Malformed expression: {message}")]
    Malformed { message: String },

    #[error("Literal '{text}' does not fit in a machine word")]
    LiteralOverflow { text: String },

    // Machine state errors
    #[error("Unknown register: '${name}'")]
    UnresolvedRegister { name: String },

    #[error(transparent)]
    Memory(#[from] MemoryFault),

    // Arithmetic errors
    #[error("Division by zero")]
    DivideByZero,
}

impl EvalError {
    pub fn malformed(message: impl Into<String>) -> Self {
        EvalError::Malformed {
            message: message.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        EvalError::UnresolvedRegister { name: name.into() }
    }

    /// Short machine-readable name of the failure class
    pub fn code(&self) -> &'static str {
        match self {
            EvalError::Lex(_) => "lex",
            EvalError::Malformed { .. } => "malformed",
            EvalError::LiteralOverflow { .. } => "overflow",
            EvalError::UnresolvedRegister { .. } => "unknown_register",
            EvalError::Memory(_) => "memory",
            EvalError::DivideByZero => "divide_by_zero",
        }
    }

    /// Byte offset in the source where lexing stopped
    pub fn position(&self) -> Option<usize> {
        match self {
            EvalError::Lex(e) => e.position(),
            _ => None,
        }
    }
}
