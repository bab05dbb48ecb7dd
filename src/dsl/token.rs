//! Token types for the command lexer.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source lexeme, quotes included for string literals.
    pub text: String,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Word(String),
    Int(usize),
    /// `"..."` or `'...'` on a single line.
    Str,
    /// `"""..."""`, may span lines.
    MultilineStr,

    // Grammar punctuation
    Colon,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // Separators
    Semicolon,
    Newline,
    Eof,
}

impl TokenKind {
    /// Newline, `;` and end of input all close a command.
    pub fn is_separator(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "'{w}'"),
            TokenKind::Int(n) => write!(f, "integer {n}"),
            TokenKind::Str => f.write_str("string"),
            TokenKind::MultilineStr => f.write_str("multi-line string"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Pipe => f.write_str("'|'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Newline => f.write_str("end of line"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
