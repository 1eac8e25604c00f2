//! Token definitions for debugger expressions

use serde::{Deserialize, Serialize};

/// Kind of a lexical unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenKind {
    // Operands
    Number,    // 42
    HexNumber, // 0x2a
    Register,  // $pc, $a0, $1

    // Arithmetic
    Plus,  // +
    Minus, // -
    Mul,   // *
    Div,   // /

    // Comparison
    Eq, // ==
    Ne, // !=

    // Grouping
    LeftParen,  // (
    RightParen, // )

    /// Prefix `*`, rewritten from `Mul` after lexing
    Deref,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::HexNumber => "hex number",
            TokenKind::Register => "register",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Eq => "==",
            TokenKind::Ne => "!=",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Deref => "*",
        }
    }

    /// Tokens that may split a span
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Mul
                | TokenKind::Div
                | TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Deref
        )
    }

    /// Binding level; the lowest level in a span is evaluated last
    pub fn precedence(&self) -> u8 {
        match self {
            TokenKind::Plus | TokenKind::Minus => 1,
            TokenKind::Mul | TokenKind::Div => 2,
            TokenKind::Eq | TokenKind::Ne => 3,
            TokenKind::Deref => 5,
            _ => 10,
        }
    }
}

/// A classified piece of source text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Rewrite `*` in operand position into `Deref`.
///
/// Operand position is the start of the expression or directly after an
/// operator or `(`; a `*` after a literal, register or `)` stays a multiply.
pub fn mark_dereferences(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        if tokens[i].kind != TokenKind::Mul {
            continue;
        }
        let prefix = match i.checked_sub(1).map(|p| tokens[p].kind) {
            None => true,
            Some(prev) => prev.is_operator() || prev == TokenKind::LeftParen,
        };
        if prefix {
            tokens[i].kind = TokenKind::Deref;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn toks(spec: &[(TokenKind, &str)]) -> Vec<Token> {
        spec.iter().map(|(k, s)| Token::new(*k, *s)).collect()
    }

    #[test]
    fn test_precedence_order() {
        assert!(TokenKind::Plus.precedence() < TokenKind::Mul.precedence());
        assert!(TokenKind::Div.precedence() < TokenKind::Eq.precedence());
        assert!(TokenKind::Ne.precedence() < TokenKind::Deref.precedence());
        assert_eq!(TokenKind::Register.precedence(), 10);
    }

    #[test]
    fn test_leading_star_is_deref() {
        let mut tokens = toks(&[(TokenKind::Mul, "*"), (TokenKind::HexNumber, "0x10")]);
        mark_dereferences(&mut tokens);
        assert_eq!(kinds(&tokens), vec![TokenKind::Deref, TokenKind::HexNumber]);
    }

    #[test]
    fn test_star_after_operand_is_mul() {
        use TokenKind::*;
        let mut tokens = toks(&[
            (LeftParen, "("),
            (Number, "1"),
            (RightParen, ")"),
            (Mul, "*"),
            (Register, "$sp"),
            (Mul, "*"),
            (Number, "2"),
        ]);
        mark_dereferences(&mut tokens);
        assert_eq!(
            kinds(&tokens),
            vec![LeftParen, Number, RightParen, Mul, Register, Mul, Number]
        );
    }

    #[test]
    fn test_star_after_operator_or_paren_is_deref() {
        use TokenKind::*;
        let mut tokens = toks(&[
            (Number, "1"),
            (Eq, "=="),
            (Mul, "*"),
            (Mul, "*"),
            (LeftParen, "("),
            (Mul, "*"),
            (Register, "$sp"),
            (RightParen, ")"),
        ]);
        mark_dereferences(&mut tokens);
        assert_eq!(
            kinds(&tokens),
            vec![Number, Eq, Deref, Deref, LeftParen, Deref, Register, RightParen]
        );
    }
}
