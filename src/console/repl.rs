//! Interactive prompt. Reads commands line by line and runs them.
//!
//! Lines that aren't meta-commands go straight to the executor.

use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;
use tracing::debug;

use super::{command_table, format_buffer, format_result, History};
use crate::dsl::Executor;
use crate::session::MemorySession;

/// Entries shown by `history`.
const HISTORY_SHOWN: usize = 20;

const HELP: &str = "\
Meta-commands:
  help            show this help
  show            print the buffer
  history         recent commands
  commands        commands the grammar recognizes
  tree <cmd>      print the parse tree of <cmd> without running it
  check <cmd>     report whether <cmd> parses
  reload          re-read the grammar file
  quit            leave (also: exit, q)
Anything else is run as a command.
";

/// What the loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    executor: Executor<MemorySession>,
    history: History,
    color: bool,
}

impl Repl {
    pub fn new(executor: Executor<MemorySession>, history_size: usize, color: bool) -> Self {
        Self {
            executor,
            history: History::new(history_size),
            color,
        }
    }

    /// Prompt and handle lines until `quit` or end of input. A line that
    /// leaves a `"""` literal open continues onto the next one.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Type 'help' for meta-commands, 'quit' to leave.")?;
        write!(out, "{}", format_buffer(self.executor.session(), self.color))?;

        let mut lines = input.lines();
        let mut pending = String::new();
        loop {
            write!(out, "{}", self.prompt(!pending.is_empty()))?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                if !pending.is_empty() {
                    self.handle_line(&pending, out)?;
                }
                break;
            };

            let line = line?;
            if !pending.is_empty() {
                pending.push('\n');
            }
            pending.push_str(&line);
            if is_open_literal(&pending) {
                continue;
            }

            let text = std::mem::take(&mut pending);
            if self.handle_line(&text, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle one input line.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word, rest) {
            ("quit" | "exit" | "q", "") => return Ok(Flow::Quit),
            ("help", "") => write!(out, "{HELP}")?,
            ("show", "") => write!(out, "{}", format_buffer(self.executor.session(), self.color))?,
            ("history", "") => self.show_history(out)?,
            ("commands", "") => {
                writeln!(out, "Grammar: {}", self.executor.grammar_path())?;
                write!(out, "{}", command_table(self.executor.commands()))?;
            }
            ("tree", cmd) if !cmd.is_empty() => match self.executor.parse_tree(cmd) {
                Ok(tree) => write!(out, "{tree}")?,
                Err(err) => {
                    let message = format!("Error: {err}");
                    writeln!(out, "{}", format_result(&message, self.color))?
                }
            },
            ("check", cmd) if !cmd.is_empty() => {
                let verdict = if self.executor.validate(cmd) {
                    "valid"
                } else {
                    "invalid"
                };
                writeln!(out, "{verdict}")?;
            }
            ("reload", "") => match self.executor.reload_grammar() {
                Ok(()) => writeln!(out, "Reloaded grammar from {}", self.executor.grammar_path())?,
                Err(err) => writeln!(
                    out,
                    "{}",
                    format_result(&format!("Error reloading grammar: {err}"), self.color)
                )?,
            },
            _ => self.run_command(line, out)?,
        }
        Ok(Flow::Continue)
    }

    fn run_command<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        debug!(command = line, "interactive command");
        self.history.push(line);
        for result in self.executor.execute_all(line) {
            writeln!(out, "{}", format_result(&result, self.color))?;
        }
        write!(out, "{}", format_buffer(self.executor.session(), self.color))
    }

    fn show_history<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.history.is_empty() {
            return writeln!(out, "(no history)");
        }
        for (n, entry) in self.history.recent(HISTORY_SHOWN) {
            writeln!(out, "{n:>4}  {entry}")?;
        }
        Ok(())
    }

    fn prompt(&self, continuation: bool) -> String {
        let prompt = if continuation { "...>" } else { "textcmd>" };
        if self.color {
            format!("{} ", prompt.cyan())
        } else {
            format!("{prompt} ")
        }
    }

    pub fn executor(&self) -> &Executor<MemorySession> {
        &self.executor
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

/// Whether `text` ends inside a `"""` literal.
fn is_open_literal(text: &str) -> bool {
    text.matches("\"\"\"").count() % 2 == 1
}
