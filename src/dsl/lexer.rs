//! Lexer for command text and grammar files.
//!
//! Converts source text into a stream of [`Token`]s. Newlines are emitted as
//! separators except inside a `"""..."""` literal, which is always a single
//! token however many lines it spans.

use super::error::ParseError;
use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            self.skip_comment();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    line: self.line,
                    col: self.col,
                });
                break;
            }

            let ch = self.peek();
            let token = match ch {
                '\n' => {
                    let token = self.single_char(TokenKind::Newline);
                    self.line += 1;
                    self.col = 1;
                    token
                }
                ';' => self.single_char(TokenKind::Semicolon),
                ':' => self.single_char(TokenKind::Colon),
                '|' => self.single_char(TokenKind::Pipe),
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                '[' => self.single_char(TokenKind::LBracket),
                ']' => self.single_char(TokenKind::RBracket),
                '"' if self.starts_triple_quote() => self.lex_multiline_string()?,
                '"' | '\'' => self.lex_string()?,
                '0'..='9' => self.lex_int()?,
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(),
                _ => {
                    return Err(ParseError::lex(
                        format!("unexpected character: '{ch}'"),
                        self.line,
                        self.col,
                    ));
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch != '\n' {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            let ch = self.peek();
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        if !self.is_at_end() && self.peek() == '#' {
            while !self.is_at_end() && self.peek() != '\n' {
                self.advance();
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        let ch = self.advance();
        Token {
            kind,
            text: ch.to_string(),
            line,
            col,
        }
    }

    fn starts_triple_quote(&self) -> bool {
        self.peek_at(0) == Some('"') && self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"')
    }

    /// `"..."` or `'...'`. A backslash keeps the next character inside the
    /// literal; unescaping happens when the value is extracted.
    fn lex_string(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col;
        let quote = self.advance();
        let mut text = String::from(quote);

        loop {
            if self.is_at_end() || self.peek() == '\n' {
                return Err(ParseError::lex("unterminated string literal", line, col));
            }
            let ch = self.advance();
            text.push(ch);
            if ch == quote {
                break;
            }
            if ch == '\\' {
                if self.is_at_end() || self.peek() == '\n' {
                    return Err(ParseError::lex("unterminated string literal", line, col));
                }
                text.push(self.advance());
            }
        }

        Ok(Token {
            kind: TokenKind::Str,
            text,
            line,
            col,
        })
    }

    /// `"""..."""` taken verbatim up to the first closing triple quote.
    fn lex_multiline_string(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();
        for _ in 0..3 {
            text.push(self.advance());
        }

        while !self.starts_triple_quote() {
            if self.is_at_end() {
                return Err(ParseError::lex(
                    "unterminated multi-line string literal",
                    line,
                    col,
                ));
            }
            let ch = self.advance();
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            }
            text.push(ch);
        }
        for _ in 0..3 {
            text.push(self.advance());
        }

        Ok(Token {
            kind: TokenKind::MultilineStr,
            text,
            line,
            col,
        })
    }

    fn lex_int(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        let value: usize = text
            .parse()
            .map_err(|_| ParseError::lex(format!("integer out of range: {text}"), line, col))?;
        Ok(Token {
            kind: TokenKind::Int(value),
            text,
            line,
            col,
        })
    }

    fn lex_word(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == '_') {
            text.push(self.advance());
        }
        Token {
            kind: TokenKind::Word(text.clone()),
            text,
            line,
            col,
        }
    }
}
