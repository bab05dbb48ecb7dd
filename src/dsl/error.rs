//! Error types for the command language front end.

use std::fmt;
use std::path::PathBuf;

/// Input text that does not conform to the grammar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{line}:{col}] {kind}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed literal or stray character.
    LexError,
    /// Tokens that no grammar rule accepts.
    SyntaxError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::LexError => f.write_str("LexError"),
            ErrorKind::SyntaxError => f.write_str("SyntaxError"),
        }
    }
}

impl ParseError {
    pub fn lex(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::LexError,
        }
    }

    pub fn syntax(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::SyntaxError,
        }
    }
}

/// The grammar source is missing or does not compile.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar file not found or unreadable: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("grammar syntax error {0}")]
    Syntax(#[from] ParseError),

    #[error("line {line}: unknown rule '{name}'")]
    UnknownRule { name: String, line: usize },

    #[error("line {line}: unknown terminal '{name}'")]
    UnknownTerminal { name: String, line: usize },

    #[error("rule '{rule}' takes ({expected}) but an alternative yields ({found})")]
    Signature {
        rule: String,
        expected: String,
        found: String,
    },

    #[error("ambiguous grammar: '{first}' and '{second}' both accept `{sequence}`")]
    Ambiguous {
        first: String,
        second: String,
        sequence: String,
    },

    #[error("grammar defines no rules")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_has_position() {
        let err = ParseError::syntax("unknown command 'JUMP'", 2, 5);
        assert_eq!(err.to_string(), "[2:5] SyntaxError: unknown command 'JUMP'");
    }

    #[test]
    fn grammar_syntax_error_wraps_position() {
        let err: GrammarError = ParseError::lex("unexpected character: '@'", 1, 3).into();
        assert_eq!(
            err.to_string(),
            "grammar syntax error [1:3] LexError: unexpected character: '@'"
        );
    }
}
