//! Parse tree → typed commands → handler results.
//!
//! Commands run strictly in source order against one session, so later
//! commands see the buffer and cursor left by earlier ones. A failing
//! command yields an error result and the rest still run.

use tracing::{debug, warn};

use super::token::{Token, TokenKind};
use super::tree::{CommandNode, ParseTree};
use crate::command::{Command, CommandKind};
use crate::session::EditorSession;

pub struct Transformer<'s, S: EditorSession + ?Sized> {
    session: &'s mut S,
}

impl<'s, S: EditorSession + ?Sized> Transformer<'s, S> {
    pub fn new(session: &'s mut S) -> Self {
        Self { session }
    }

    /// Run every command in `tree`, returning one result per command.
    pub fn transform(&mut self, tree: &ParseTree) -> Vec<String> {
        tree.commands
            .iter()
            .filter_map(|node| self.command(node))
            .collect()
    }

    fn command(&mut self, node: &CommandNode) -> Option<String> {
        let Some(command) = build_command(node) else {
            warn!(kind = %node.kind, line = node.line, "skipping malformed command node");
            return None;
        };
        debug!(?command, "executing");
        let result = match command.execute(self.session) {
            Ok(message) => message,
            Err(err) => {
                warn!(kind = %node.kind, error = %err, "command failed");
                err.to_string()
            }
        };
        Some(result)
    }
}

/// Convert a node's value tokens into a typed [`Command`].
///
/// Compiled grammars only produce argument lists matching each command's
/// signature, so `None` marks a node built by hand.
pub fn build_command(node: &CommandNode) -> Option<Command> {
    let args = &node.args;
    let command = match (node.kind, args.as_slice()) {
        (CommandKind::VisualLines, [start, end]) => Command::VisualLines {
            start: int_value(start)?,
            end: int_value(end)?,
        },
        (CommandKind::InsertText, [text]) => Command::InsertText {
            text: unquote(text)?,
            line: None,
        },
        (CommandKind::InsertText, [text, line]) => Command::InsertText {
            text: unquote(text)?,
            line: Some(int_value(line)?),
        },
        (CommandKind::Delete, []) => Command::Delete,
        (CommandKind::DeleteLines, [start, end]) => Command::DeleteLines {
            start: int_value(start)?,
            end: int_value(end)?,
        },
        (CommandKind::GotoLine, [line]) => Command::GotoLine {
            line: int_value(line)?,
        },
        (CommandKind::FindText, [pattern]) => Command::FindText {
            pattern: unquote(pattern)?,
        },
        (CommandKind::ReplaceText, [old, new]) => Command::ReplaceText {
            old: unquote(old)?,
            new: unquote(new)?,
        },
        _ => return None,
    };
    Some(command)
}

fn int_value(token: &Token) -> Option<usize> {
    match token.kind {
        TokenKind::Int(n) => Some(n),
        _ => None,
    }
}

/// Literal value of a string token.
///
/// Triple-quoted literals lose exactly three quotes on each side and keep
/// their contents verbatim. Single-line literals lose their delimiting quote
/// and have backslash escapes resolved.
pub fn unquote(token: &Token) -> Option<String> {
    match token.kind {
        TokenKind::MultilineStr => {
            let inner = token.text.strip_prefix("\"\"\"")?.strip_suffix("\"\"\"")?;
            Some(inner.to_string())
        }
        TokenKind::Str => {
            let mut chars = token.text.chars();
            let quote = chars.next()?;
            let inner = chars.as_str().strip_suffix(quote)?;
            Some(unescape(inner))
        }
        _ => None,
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(c @ ('\\' | '"' | '\'')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
