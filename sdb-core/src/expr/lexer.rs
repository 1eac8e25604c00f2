//! Regex-driven tokenizer
//!
//! Rules are tried in table order at each input position and the first rule
//! that matches at exactly that position wins. Order matters: registers are
//! tried before numbers, hex before decimal.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::LexError;
use super::token::{Token, TokenKind};

/// Bounds on a single token sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexLimits {
    pub max_tokens: usize,
    pub max_token_len: usize,
}

impl Default for LexLimits {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            max_token_len: 31,
        }
    }
}

struct Rule {
    pattern: &'static str,
    regex: Regex,
    /// `None` for input that is consumed without producing a token
    kind: Option<TokenKind>,
}

const RULE_TABLE: &[(&str, Option<TokenKind>)] = &[
    (r"\$[0-9]+|\$[a-zA-Z][a-zA-Z0-9]*", Some(TokenKind::Register)),
    (r"0x[0-9a-fA-F]+", Some(TokenKind::HexNumber)),
    (r"[0-9]+", Some(TokenKind::Number)),
    (r"\s+", None),
    (r"\+", Some(TokenKind::Plus)),
    (r"-", Some(TokenKind::Minus)),
    (r"\*", Some(TokenKind::Mul)),
    (r"/", Some(TokenKind::Div)),
    (r"==", Some(TokenKind::Eq)),
    (r"!=", Some(TokenKind::Ne)),
    (r"\(", Some(TokenKind::LeftParen)),
    (r"\)", Some(TokenKind::RightParen)),
];

// Compiled once, on first use; the table is fixed so a bad pattern is a bug.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(pattern, kind)| Rule {
            pattern,
            regex: Regex::new(&format!("^(?:{})", pattern))
                .unwrap_or_else(|e| panic!("invalid lexer rule {:?}: {}", pattern, e)),
            kind,
        })
        .collect()
});

/// Tokenize with the default limits
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tokenize_with(source, LexLimits::default())
}

/// Split `source` into tokens, dropping whitespace.
///
/// Fails on the first position no rule matches; no partial result is returned.
pub fn tokenize_with(source: &str, limits: LexLimits) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < source.len() {
        let rest = &source[position..];
        let (index, rule, len) = RULES
            .iter()
            .enumerate()
            .find_map(|(i, rule)| rule.regex.find(rest).map(|m| (i, rule, m.end())))
            .ok_or(LexError::NoMatch { position })?;

        log::debug!(
            "match rules[{}] = {:?} at position {} with len {}: {}",
            index,
            rule.pattern,
            position,
            len,
            &rest[..len]
        );

        if let Some(kind) = rule.kind {
            if len > limits.max_token_len {
                return Err(LexError::TokenTooLong {
                    position,
                    limit: limits.max_token_len,
                });
            }
            if tokens.len() == limits.max_tokens {
                return Err(LexError::TooManyTokens {
                    limit: limits.max_tokens,
                });
            }
            tokens.push(Token::new(kind, &rest[..len]));
        }

        position += len;
    }

    Ok(tokens)
}
