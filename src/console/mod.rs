//! Terminal front end for the executor.

pub mod history;
pub mod repl;

pub use history::History;
pub use repl::Repl;

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::command::{is_error, CommandKind};
use crate::dsl::Executor;
use crate::session::{EditorSession, MemorySession};

/// Commands run by demo mode, in order.
pub const DEMO_SCRIPT: &[&str] = &[
    r#"INSERT "Hello, DSL World!""#,
    r#"INSERT "New line at position 3" AT LINE 3"#,
    "GOTO LINE 2",
    "VISUAL LINES 1 TO 3",
    r#"FIND "Hello""#,
    r#"REPLACE "Hello" WITH "Goodbye""#,
    "DELETE LINES 7 TO 8",
];

/// Prefix a command result with a success or failure mark.
pub fn format_result(result: &str, color: bool) -> String {
    match (is_error(result), color) {
        (false, true) => format!("{} {result}", "✓".green()),
        (true, true) => format!("{} {}", "✗".red(), result.red()),
        (false, false) => format!("✓ {result}"),
        (true, false) => format!("✗ {result}"),
    }
}

/// Numbered buffer listing with the cursor line marked.
pub fn format_buffer(session: &MemorySession, color: bool) -> String {
    let cursor_line = session.cursor().map(|c| c.line).unwrap_or(0);
    let width = session.buffer().len().to_string().len();
    let mut out = String::new();
    for (i, line) in session.buffer().iter().enumerate() {
        let number = i + 1;
        let marker = if number == cursor_line { '>' } else { ' ' };
        let gutter = format!("{marker}{number:>width$} │");
        if color {
            out.push_str(&format!("{} {line}\n", gutter.dark_grey()));
        } else {
            out.push_str(&format!("{gutter} {line}\n"));
        }
    }
    if let Ok(mode) = session.mode() {
        if mode.is_visual() {
            out.push_str(&format!("-- {} --\n", mode.as_str()));
        }
    }
    out
}

/// Table of the commands a grammar recognizes.
pub fn command_table(commands: &[CommandKind]) -> String {
    let mut out = String::new();
    for kind in commands {
        out.push_str(&format!("  {:<14} {}\n", kind.rule_name(), kind.usage()));
    }
    out
}

/// Show the buffer, then run each demo command and show the result and the
/// buffer it left behind.
pub fn run_demo<W: Write>(
    executor: &mut Executor<MemorySession>,
    out: &mut W,
    color: bool,
) -> io::Result<()> {
    writeln!(out, "Initial buffer:")?;
    write!(out, "{}", format_buffer(executor.session(), color))?;

    for command in DEMO_SCRIPT {
        writeln!(out)?;
        writeln!(out, "> {command}")?;
        let result = executor.execute(command);
        writeln!(out, "{}", format_result(&result, color))?;
        write!(out, "{}", format_buffer(executor.session(), color))?;
    }
    Ok(())
}
