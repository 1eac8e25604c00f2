//! Expression evaluation module
//!
//! Tokenizes and evaluates debugger expressions against machine state.

pub mod error;
pub mod eval;
pub mod lexer;
pub mod token;
pub mod value;

pub use error::{EvalError, LexError};
pub use eval::{parse_tokens, Evaluator, MAX_DEPTH};
pub use lexer::{tokenize, tokenize_with, LexLimits};
pub use token::{Token, TokenKind};
pub use value::{Format, Formatted, Word, WORD_BYTES};
