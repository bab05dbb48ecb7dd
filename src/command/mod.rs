//! Typed editor commands and their handlers.
//!
//! A [`Command`] is built by the transformer from one parse-tree node and
//! consumed immediately by [`Command::execute`]. Every handler returns an
//! [`Outcome`]; the error side renders with the `Error` marker so either side
//! can be printed as-is.

pub mod handlers;

use std::fmt;

use crate::session::{EditorSession, SessionError};

/// Marker substring that distinguishes failed results from successful ones.
pub const ERROR_MARKER: &str = "Error";

/// The result of one handler: a human-readable message either way.
pub type Outcome = Result<String, CommandError>;

/// Whether a rendered result string reports a failure.
pub fn is_error(result: &str) -> bool {
    result.contains(ERROR_MARKER)
}

/// A command's execution against the session failed.
#[derive(Debug, thiserror::Error)]
#[error("Error {context}: {source}")]
pub struct CommandError {
    /// What the command was doing, e.g. `going to line 4`.
    pub context: String,
    #[source]
    pub source: SessionError,
}

impl CommandError {
    pub fn new(context: impl Into<String>, source: SessionError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }
}

/// The command vocabulary, one kind per grammar rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    VisualLines,
    InsertText,
    Delete,
    DeleteLines,
    GotoLine,
    FindText,
    ReplaceText,
}

/// Type of a value a command takes from the parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Int,
    Text,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Int => f.write_str("INT"),
            ArgType::Text => f.write_str("TEXT"),
        }
    }
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::VisualLines,
        CommandKind::InsertText,
        CommandKind::Delete,
        CommandKind::DeleteLines,
        CommandKind::GotoLine,
        CommandKind::FindText,
        CommandKind::ReplaceText,
    ];

    /// Grammar rule name for this command.
    pub fn rule_name(&self) -> &'static str {
        match self {
            CommandKind::VisualLines => "visual_lines",
            CommandKind::InsertText => "insert_text",
            CommandKind::Delete => "delete",
            CommandKind::DeleteLines => "delete_lines",
            CommandKind::GotoLine => "goto_line",
            CommandKind::FindText => "find_text",
            CommandKind::ReplaceText => "replace_text",
        }
    }

    pub fn from_rule_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.rule_name() == name)
    }

    /// Accepted argument lists, in parse-tree order.
    pub fn signatures(&self) -> &'static [&'static [ArgType]] {
        use ArgType::{Int, Text};
        match self {
            CommandKind::VisualLines | CommandKind::DeleteLines => &[&[Int, Int]],
            CommandKind::InsertText => &[&[Text], &[Text, Int]],
            CommandKind::Delete => &[&[]],
            CommandKind::GotoLine => &[&[Int]],
            CommandKind::FindText => &[&[Text]],
            CommandKind::ReplaceText => &[&[Text, Text]],
        }
    }

    /// Usage line shown in help output.
    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::VisualLines => "VISUAL LINES <start> TO <end>",
            CommandKind::InsertText => "INSERT \"text\" [AT LINE <n>]",
            CommandKind::Delete => "DELETE",
            CommandKind::DeleteLines => "DELETE LINES <start> TO <end>",
            CommandKind::GotoLine => "GOTO LINE <n>",
            CommandKind::FindText => "FIND \"pattern\"",
            CommandKind::ReplaceText => "REPLACE \"old\" WITH \"new\"",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_name())
    }
}

/// One parsed command with typed, 1-based arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    VisualLines { start: usize, end: usize },
    InsertText { text: String, line: Option<usize> },
    Delete,
    DeleteLines { start: usize, end: usize },
    GotoLine { line: usize },
    FindText { pattern: String },
    ReplaceText { old: String, new: String },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::VisualLines { .. } => CommandKind::VisualLines,
            Command::InsertText { .. } => CommandKind::InsertText,
            Command::Delete => CommandKind::Delete,
            Command::DeleteLines { .. } => CommandKind::DeleteLines,
            Command::GotoLine { .. } => CommandKind::GotoLine,
            Command::FindText { .. } => CommandKind::FindText,
            Command::ReplaceText { .. } => CommandKind::ReplaceText,
        }
    }

    /// Run the matching handler against `session`.
    pub fn execute<S: EditorSession + ?Sized>(&self, session: &mut S) -> Outcome {
        match self {
            Command::VisualLines { start, end } => handlers::visual_lines(session, *start, *end),
            Command::InsertText { text, line } => handlers::insert_text(session, text, *line),
            Command::Delete => handlers::delete(session),
            Command::DeleteLines { start, end } => handlers::delete_lines(session, *start, *end),
            Command::GotoLine { line } => handlers::goto_line(session, *line),
            Command::FindText { pattern } => handlers::find_text(session, pattern),
            Command::ReplaceText { old, new } => handlers::replace_text(session, old, new),
        }
    }
}
