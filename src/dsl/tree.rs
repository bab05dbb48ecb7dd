//! Parse tree produced by the command parser.
//!
//! The root (`start`) holds one [`CommandNode`] per command in source order.
//! Nodes keep only value tokens (integers and strings); keywords are dropped
//! once the rule has been recognized.

use std::fmt;

use super::token::{Token, TokenKind};
use crate::command::CommandKind;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    pub commands: Vec<CommandNode>,
}

/// A recognized command and its value tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub kind: CommandKind,
    pub args: Vec<Token>,
    pub line: usize,
    pub col: usize,
}

impl ParseTree {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start")?;
        for node in &self.commands {
            writeln!(f, "  command")?;
            writeln!(f, "    {}", node.kind)?;
            for arg in &node.args {
                writeln!(
                    f,
                    "      {} {}",
                    terminal_name(&arg.kind),
                    arg.text.replace('\n', "\\n")
                )?;
            }
        }
        Ok(())
    }
}

fn terminal_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Int(_) => "INT",
        TokenKind::Str => "STRING",
        TokenKind::MultilineStr => "MULTILINE_STRING",
        TokenKind::Word(_) => "WORD",
        _ => "PUNCT",
    }
}
