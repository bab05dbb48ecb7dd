//! Command language front end: text → tokens → parse tree → session edits.

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod transform;
pub mod tree;

pub use error::{GrammarError, ParseError};
pub use grammar::{Grammar, GrammarSource};
pub use transform::Transformer;
pub use tree::{CommandNode, ParseTree};

use tracing::{debug, info};

use crate::command::CommandKind;
use crate::session::EditorSession;

/// Parses command text against the active grammar and runs it on a session.
///
/// Every outward result is a printable string; failures contain the
/// [`ERROR_MARKER`](crate::command::ERROR_MARKER).
pub struct Executor<S: EditorSession> {
    session: S,
    source: GrammarSource,
    grammar: Grammar,
}

impl<S: EditorSession> Executor<S> {
    /// Load and compile the grammar from `source`.
    pub fn new(session: S, source: GrammarSource) -> Result<Self, GrammarError> {
        let grammar = Grammar::load(&source)?;
        info!(grammar = %source, commands = grammar.commands().len(), "grammar loaded");
        Ok(Self {
            session,
            source,
            grammar,
        })
    }

    pub fn with_builtin_grammar(session: S) -> Result<Self, GrammarError> {
        Self::new(session, GrammarSource::Builtin)
    }

    /// Parse and run `text`, returning the result of its first command.
    ///
    /// Every command in `text` runs. A parse fault becomes an error result
    /// naming the input. When no command produced a result, the parse tree
    /// itself is returned.
    pub fn execute(&mut self, text: &str) -> String {
        match self.parse_tree(text) {
            Ok(tree) => {
                let mut results = Transformer::new(&mut self.session).transform(&tree);
                if results.is_empty() {
                    tree.to_string()
                } else {
                    results.swap_remove(0)
                }
            }
            Err(err) => parse_failure(text, &err),
        }
    }

    /// Parse and run `text`, returning one result per command.
    pub fn execute_all(&mut self, text: &str) -> Vec<String> {
        match self.parse_tree(text) {
            Ok(tree) => Transformer::new(&mut self.session).transform(&tree),
            Err(err) => vec![parse_failure(text, &err)],
        }
    }

    /// Execute each input independently and in order.
    pub fn execute_batch<I, T>(&mut self, texts: I) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                debug!(index = i, "batch command");
                self.execute(text.as_ref())
            })
            .collect()
    }

    /// Whether `text` parses, without running anything.
    pub fn validate(&self, text: &str) -> bool {
        self.parse_tree(text).is_ok()
    }

    /// Parse without executing.
    pub fn parse_tree(&self, text: &str) -> Result<ParseTree, ParseError> {
        let tree = parser::parse(&self.grammar, text)?;
        debug!(commands = tree.len(), "parsed");
        Ok(tree)
    }

    /// Re-read and recompile the grammar source. On failure the previous
    /// grammar stays active.
    pub fn reload_grammar(&mut self) -> Result<(), GrammarError> {
        self.grammar = Grammar::load(&self.source)?;
        info!(grammar = %self.source, commands = self.grammar.commands().len(), "grammar reloaded");
        Ok(())
    }

    /// Path of the active grammar, or `<builtin>`.
    pub fn grammar_path(&self) -> String {
        self.source.to_string()
    }

    /// Commands the active grammar recognizes.
    pub fn commands(&self) -> &[CommandKind] {
        self.grammar.commands()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }
}

fn parse_failure(text: &str, err: &ParseError) -> String {
    debug!(error = %err, "parse failed");
    format!("Error executing '{text}': {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::is_error;
    use crate::session::MemorySession;

    fn executor(lines: &[&str]) -> Executor<MemorySession> {
        Executor::with_builtin_grammar(MemorySession::new(lines.iter().copied())).unwrap()
    }

    #[test]
    fn execute_returns_first_result() {
        let mut ex = executor(&["a", "b"]);
        assert_eq!(ex.execute("GOTO LINE 2; DELETE"), "Moved to line 2");
        assert_eq!(ex.session().buffer(), &["a", ""]);
    }

    #[test]
    fn execute_all_returns_every_result() {
        let mut ex = executor(&["a", "b"]);
        let results = ex.execute_all("GOTO LINE 2\nDELETE");
        assert_eq!(
            results,
            vec!["Moved to line 2", "Deleted character under cursor"]
        );
    }

    #[test]
    fn parse_failure_embeds_input() {
        let mut ex = executor(&["a"]);
        let result = ex.execute("GOTO LINES 2");
        assert!(is_error(&result));
        assert!(result.starts_with("Error executing 'GOTO LINES 2': "));
        assert_eq!(ex.execute_all("JUMP").len(), 1);
    }

    #[test]
    fn validate_does_not_execute() {
        let ex = executor(&["a", "b"]);
        assert!(ex.validate("DELETE LINES 1 TO 2"));
        assert!(!ex.validate("DELETE LINES 1"));
        assert_eq!(ex.session().buffer(), &["a", "b"]);
    }

    #[test]
    fn parse_tree_is_introspectable() {
        let ex = executor(&["a"]);
        let tree = ex.parse_tree("GOTO LINE 1").unwrap();
        assert_eq!(tree.to_string(), "start\n  command\n    goto_line\n      INT 1\n");
        assert!(ex.parse_tree("GOTO").is_err());
    }

    #[test]
    fn builtin_source_reports_path_and_commands() {
        let mut ex = executor(&["a"]);
        assert_eq!(ex.grammar_path(), "<builtin>");
        assert_eq!(ex.commands().len(), CommandKind::ALL.len());
        ex.reload_grammar().unwrap();
        assert!(ex.validate("DELETE"));
    }

    #[test]
    fn missing_grammar_file_fails_construction() {
        let result = Executor::new(
            MemorySession::default(),
            GrammarSource::file("/nonexistent/grammar"),
        );
        assert!(matches!(result, Err(GrammarError::Io { .. })));
    }
}
