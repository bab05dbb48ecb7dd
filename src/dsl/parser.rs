//! Parser for command text.
//!
//! Runs the compiled [`Grammar`] over the token stream. Commands are
//! separated by newlines or `;`; each one must be completed by its rule
//! before the separator.

use super::error::ParseError;
use super::grammar::Grammar;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use super::tree::{CommandNode, ParseTree};

/// Parse `source` into a tree with one node per command.
pub fn parse(grammar: &Grammar, source: &str) -> Result<ParseTree, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(grammar, tokens).parse()
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, tokens: Vec<Token>) -> Self {
        Self {
            grammar,
            tokens,
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<ParseTree, ParseError> {
        let mut commands = Vec::new();

        loop {
            self.skip_separators();
            if self.is_at_end() {
                break;
            }
            commands.push(self.parse_command()?);
        }

        if commands.is_empty() {
            let t = self.peek();
            return Err(ParseError::syntax("expected a command", t.line, t.col));
        }

        Ok(ParseTree { commands })
    }

    fn parse_command(&mut self) -> Result<CommandNode, ParseError> {
        let first = self.peek().clone();
        let mut state = Grammar::START;
        let mut args = Vec::new();

        loop {
            let t = self.peek();
            if t.kind.is_separator() {
                return match self.grammar.accepts(state) {
                    Some(kind) => Ok(CommandNode {
                        kind,
                        args,
                        line: first.line,
                        col: first.col,
                    }),
                    None => Err(self.unexpected(state)),
                };
            }

            match self.grammar.step(state, &t.kind) {
                Some((next, symbol)) => {
                    if symbol.arg_type().is_some() {
                        args.push(t.clone());
                    }
                    state = next;
                    self.advance();
                }
                None => return Err(self.unexpected(state)),
            }
        }
    }

    fn unexpected(&self, state: usize) -> ParseError {
        let t = self.peek();
        if state == Grammar::START {
            let message = match &t.kind {
                TokenKind::Word(w) => format!("unknown command '{w}'"),
                other => format!("expected a command, got {other}"),
            };
            return ParseError::syntax(message, t.line, t.col);
        }
        ParseError::syntax(
            format!(
                "unexpected {}, expected {}",
                t.kind,
                self.grammar.expected(state).join(" or ")
            ),
            t.line,
            t.col,
        )
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn skip_separators(&mut self) {
        while !self.is_at_end()
            && matches!(self.peek().kind, TokenKind::Newline | TokenKind::Semicolon)
        {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use crate::dsl::error::ErrorKind;

    fn parse_builtin(src: &str) -> Result<ParseTree, ParseError> {
        let grammar = Grammar::builtin().unwrap();
        parse(&grammar, src)
    }

    fn kinds(tree: &ParseTree) -> Vec<CommandKind> {
        tree.commands.iter().map(|n| n.kind).collect()
    }

    #[test]
    fn parse_every_command() {
        let cases = [
            ("VISUAL LINES 1 TO 3", CommandKind::VisualLines, 2),
            ("INSERT \"x\"", CommandKind::InsertText, 1),
            ("INSERT \"x\" AT LINE 2", CommandKind::InsertText, 2),
            ("DELETE", CommandKind::Delete, 0),
            ("DELETE LINES 2 TO 3", CommandKind::DeleteLines, 2),
            ("GOTO LINE 2", CommandKind::GotoLine, 1),
            ("FIND \"foo\"", CommandKind::FindText, 1),
            ("REPLACE \"a\" WITH \"b\"", CommandKind::ReplaceText, 2),
        ];
        for (src, kind, argc) in cases {
            let tree = parse_builtin(src).unwrap();
            assert_eq!(tree.len(), 1, "{src}");
            assert_eq!(tree.commands[0].kind, kind, "{src}");
            assert_eq!(tree.commands[0].args.len(), argc, "{src}");
        }
    }

    #[test]
    fn parse_keeps_only_value_tokens() {
        let tree = parse_builtin("INSERT \"x\" AT LINE 7").unwrap();
        let args = &tree.commands[0].args;
        assert_eq!(args[0].kind, TokenKind::Str);
        assert_eq!(args[1].kind, TokenKind::Int(7));
    }

    #[test]
    fn parse_multiple_commands_in_order() {
        let src = "GOTO LINE 1\nDELETE; FIND \"a\"\n\n";
        let tree = parse_builtin(src).unwrap();
        assert_eq!(
            kinds(&tree),
            vec![CommandKind::GotoLine, CommandKind::Delete, CommandKind::FindText]
        );
        assert_eq!(tree.commands[1].line, 2);
    }

    #[test]
    fn parse_multiline_literal_spanning_lines() {
        let src = "INSERT \"\"\"one\ntwo\nthree\"\"\" AT LINE 1\nDELETE";
        let tree = parse_builtin(src).unwrap();
        assert_eq!(kinds(&tree), vec![CommandKind::InsertText, CommandKind::Delete]);
        assert_eq!(tree.commands[0].args[0].kind, TokenKind::MultilineStr);
    }

    #[test]
    fn find_rejects_multiline_literal() {
        let err = parse_builtin("FIND \"\"\"x\"\"\"").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
    }

    #[test]
    fn parse_error_unknown_command() {
        let err = parse_builtin("JUMP TO 3").unwrap_err();
        assert_eq!(err.message, "unknown command 'JUMP'");
        assert_eq!((err.line, err.col), (1, 1));
    }

    #[test]
    fn parse_error_missing_clause() {
        let err = parse_builtin("GOTO 3").unwrap_err();
        assert!(err.message.contains("\"LINE\""), "{}", err.message);
        assert_eq!(err.col, 6);
    }

    #[test]
    fn parse_error_incomplete_command() {
        let err = parse_builtin("VISUAL LINES 1 TO").unwrap_err();
        assert!(err.message.contains("end of input"));
        assert!(err.message.contains("INT"));
    }

    #[test]
    fn parse_error_trailing_tokens() {
        let err = parse_builtin("GOTO LINE 1 2").unwrap_err();
        assert!(err.message.contains("end of command"));
    }

    #[test]
    fn parse_error_clause_split_across_lines() {
        assert!(parse_builtin("INSERT \"x\"\nAT LINE 2").is_err());
    }

    #[test]
    fn parse_error_empty_input() {
        assert_eq!(
            parse_builtin("").unwrap_err().message,
            "expected a command"
        );
        assert!(parse_builtin("\n;\n").is_err());
    }

    #[test]
    fn parse_error_lowercase_keyword() {
        assert!(parse_builtin("goto line 1").is_err());
    }

    #[test]
    fn parse_error_malformed_literal() {
        let err = parse_builtin("FIND \"abc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LexError);
    }

    #[test]
    fn parse_with_custom_grammar() {
        let text = "goto_line : (\"GOTO\" | \"GO\") [\"TO\"] \"LINE\" INT\n";
        let grammar = Grammar::compile(text).unwrap();
        assert!(parse(&grammar, "GO TO LINE 4").is_ok());
        assert!(parse(&grammar, "GOTO LINE 4").is_ok());
        let err = parse(&grammar, "DELETE").unwrap_err();
        assert_eq!(err.message, "unknown command 'DELETE'");
    }
}
