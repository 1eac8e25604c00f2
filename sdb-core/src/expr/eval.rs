//! Expression evaluator
//!
//! Evaluates a token span recursively: a single operand is resolved directly,
//! a span wrapped in matching parentheses is unwrapped, and anything else is
//! split at its dominant operator.

use super::error::EvalError;
use super::lexer::{tokenize_with, LexLimits};
use super::token::{mark_dereferences, Token, TokenKind};
use super::value::{Word, WORD_BYTES};
use crate::machine::Machine;

/// Deepest recursion `eval_span` accepts before giving up on a span
pub const MAX_DEPTH: usize = 512;

/// Lex `source` and resolve prefix `*` into dereferences
pub fn parse_tokens(source: &str, limits: LexLimits) -> Result<Vec<Token>, EvalError> {
    let mut tokens = tokenize_with(source, limits)?;
    mark_dereferences(&mut tokens);
    Ok(tokens)
}

/// Expression evaluator bound to one machine state
pub struct Evaluator<'m> {
    machine: &'m dyn Machine,
    limits: LexLimits,
}

impl<'m> Evaluator<'m> {
    pub fn new(machine: &'m dyn Machine) -> Self {
        Self {
            machine,
            limits: LexLimits::default(),
        }
    }

    pub fn with_limits(machine: &'m dyn Machine, limits: LexLimits) -> Self {
        Self { machine, limits }
    }

    /// Tokenize and evaluate a whole expression
    pub fn eval_str(&self, source: &str) -> Result<Word, EvalError> {
        let tokens = parse_tokens(source, self.limits)?;
        let value = self.eval(&tokens)?;
        log::debug!("evaluated {:?} = {:#x}", source, value);
        Ok(value)
    }

    /// Evaluate a full token sequence
    pub fn eval(&self, tokens: &[Token]) -> Result<Word, EvalError> {
        if tokens.is_empty() {
            return Err(EvalError::malformed("empty expression"));
        }
        self.eval_range(tokens, 0, tokens.len() - 1)
    }

    /// Evaluate the closed span `tokens[lo..=hi]`
    pub fn eval_range(&self, tokens: &[Token], lo: usize, hi: usize) -> Result<Word, EvalError> {
        if lo > hi {
            return Err(EvalError::malformed(format!("empty span [{}, {}]", lo, hi)));
        }
        let span = tokens.get(lo..=hi).ok_or_else(|| {
            EvalError::malformed(format!(
                "span [{}, {}] exceeds {} tokens",
                lo,
                hi,
                tokens.len()
            ))
        })?;
        self.eval_span(span, 0)
    }

    fn eval_span(&self, span: &[Token], depth: usize) -> Result<Word, EvalError> {
        if depth > MAX_DEPTH {
            return Err(EvalError::malformed(format!(
                "expression nests deeper than {} levels",
                MAX_DEPTH
            )));
        }
        match span {
            [] => Err(EvalError::malformed("missing operand")),
            [token] => self.eval_operand(token),
            _ if is_wrapped(span) => self.eval_span(&span[1..span.len() - 1], depth + 1),
            _ => {
                let op = dominant_operator(span).ok_or_else(|| {
                    EvalError::malformed(format!("no operator joins '{}'", render(span)))
                })?;
                let (left, right) = (&span[..op], &span[op + 1..]);

                match span[op].kind {
                    TokenKind::Deref => {
                        if !left.is_empty() {
                            return Err(EvalError::malformed(format!(
                                "dereference must prefix its operand in '{}'",
                                render(span)
                            )));
                        }
                        let address = self.eval_span(right, depth + 1)?;
                        Ok(self.machine.read_memory(address, WORD_BYTES)?)
                    }
                    kind => {
                        if left.is_empty() || right.is_empty() {
                            return Err(EvalError::malformed(format!(
                                "operator '{}' is missing an operand",
                                kind.as_str()
                            )));
                        }
                        let l = self.eval_span(left, depth + 1)?;
                        let r = self.eval_span(right, depth + 1)?;
                        apply_binop(kind, l, r)
                    }
                }
            }
        }
    }

    fn eval_operand(&self, token: &Token) -> Result<Word, EvalError> {
        let overflow = || EvalError::LiteralOverflow {
            text: token.text.clone(),
        };
        match token.kind {
            TokenKind::Number => token.text.parse::<Word>().map_err(|_| overflow()),
            TokenKind::HexNumber => {
                let digits = token.text.get(2..).unwrap_or_default();
                Word::from_str_radix(digits, 16).map_err(|_| overflow())
            }
            TokenKind::Register => {
                let name = token.text.strip_prefix('$').unwrap_or(&token.text);
                self.machine
                    .register(name)
                    .ok_or_else(|| EvalError::unresolved(name))
            }
            kind => Err(EvalError::malformed(format!(
                "expected an operand, found '{}'",
                kind.as_str()
            ))),
        }
    }
}

/// Apply a binary operator on machine words
fn apply_binop(op: TokenKind, l: Word, r: Word) -> Result<Word, EvalError> {
    Ok(match op {
        TokenKind::Plus => l.wrapping_add(r),
        TokenKind::Minus => l.wrapping_sub(r),
        TokenKind::Mul => l.wrapping_mul(r),
        TokenKind::Div => l.checked_div(r).ok_or(EvalError::DivideByZero)?,
        TokenKind::Eq => Word::from(l == r),
        TokenKind::Ne => Word::from(l != r),
        other => {
            return Err(EvalError::malformed(format!(
                "'{}' is not a binary operator",
                other.as_str()
            )))
        }
    })
}

/// Parenthesis depth never drops below zero and ends at zero
fn is_balanced(span: &[Token]) -> bool {
    let mut depth = 0i32;
    for token in span {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// The whole span is one parenthesized group: `(a)`, not `(a)+(b)`
fn is_wrapped(span: &[Token]) -> bool {
    match (span.first(), span.last()) {
        (Some(first), Some(last)) if span.len() >= 2 => {
            first.kind == TokenKind::LeftParen
                && last.kind == TokenKind::RightParen
                && is_balanced(&span[1..span.len() - 1])
        }
        _ => false,
    }
}

/// Index of the operator evaluated last.
///
/// Candidates sit outside any parentheses of the span. The loosest-binding
/// candidate wins; among binary operators of equal level the right-most wins,
/// so `8-3-2` splits as `(8-3)-2`. Dereferences are prefix, so among them the
/// left-most wins.
fn dominant_operator(span: &[Token]) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;

    for i in (0..span.len()).rev() {
        let kind = span[i].kind;
        if !kind.is_operator() || !is_balanced(&span[..i]) || !is_balanced(&span[i + 1..]) {
            continue;
        }
        let level = kind.precedence();
        let replace = match best {
            None => true,
            Some((_, best_level)) => {
                level < best_level || (level == best_level && kind == TokenKind::Deref)
            }
        };
        if replace {
            best = Some((i, level));
        }
    }

    best.map(|(i, _)| i)
}

fn render(span: &[Token]) -> String {
    span.iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
