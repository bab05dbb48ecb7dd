//! Grammar loading and compilation.
//!
//! A grammar file maps each command rule to the token sequences it accepts:
//!
//! ```text
//! # comment
//! goto_line   : "GOTO" "LINE" INT
//! insert_text : "INSERT" TEXT [ "AT" "LINE" INT ]
//!             | "APPEND" TEXT
//! ```
//!
//! Quoted items are keywords, bare words are terminals (`INT`, `STRING`,
//! `MULTILINE_STRING`, `TEXT`), `( … )` groups, `[ … ]` marks an optional
//! part and `|` separates alternatives. Rules compile into a trie over
//! terminal symbols, so matching is a single left-to-right pass with one
//! token of lookahead. Two rules accepting the same sequence are rejected
//! when the grammar is compiled.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{GrammarError, ParseError};
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use super::transform::unquote;
use crate::command::{ArgType, CommandKind};

/// Grammar shipped with the crate.
pub const BUILTIN_GRAMMAR: &str = include_str!("../../grammars/commands.grammar");

/// Where grammar text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSource {
    Builtin,
    File(PathBuf),
}

impl GrammarSource {
    pub fn file(path: impl AsRef<Path>) -> Self {
        GrammarSource::File(path.as_ref().to_path_buf())
    }

    pub fn read(&self) -> Result<String, GrammarError> {
        match self {
            GrammarSource::Builtin => Ok(BUILTIN_GRAMMAR.to_string()),
            GrammarSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl fmt::Display for GrammarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSource::Builtin => f.write_str("<builtin>"),
            GrammarSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A terminal symbol in a compiled rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Keyword(String),
    Int,
    Str,
    MultilineStr,
}

impl Symbol {
    pub fn matches(&self, kind: &TokenKind) -> bool {
        match (self, kind) {
            (Symbol::Keyword(k), TokenKind::Word(w)) => k == w,
            (Symbol::Int, TokenKind::Int(_)) => true,
            (Symbol::Str, TokenKind::Str) => true,
            (Symbol::MultilineStr, TokenKind::MultilineStr) => true,
            _ => false,
        }
    }

    /// Value type carried into the parse tree; keywords carry none.
    pub fn arg_type(&self) -> Option<ArgType> {
        match self {
            Symbol::Keyword(_) => None,
            Symbol::Int => Some(ArgType::Int),
            Symbol::Str | Symbol::MultilineStr => Some(ArgType::Text),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Keyword(k) => write!(f, "\"{k}\""),
            Symbol::Int => f.write_str("INT"),
            Symbol::Str => f.write_str("STRING"),
            Symbol::MultilineStr => f.write_str("MULTILINE_STRING"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct State {
    edges: Vec<(Symbol, usize)>,
    accept: Option<CommandKind>,
}

/// A compiled grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    states: Vec<State>,
    commands: Vec<CommandKind>,
}

impl Grammar {
    /// State every command starts from.
    pub const START: usize = 0;

    pub fn load(source: &GrammarSource) -> Result<Self, GrammarError> {
        Self::compile(&source.read()?)
    }

    pub fn builtin() -> Result<Self, GrammarError> {
        Self::compile(BUILTIN_GRAMMAR)
    }

    pub fn compile(text: &str) -> Result<Self, GrammarError> {
        let tokens = Lexer::new(text).tokenize()?;
        let rules = RuleParser::new(tokens).parse()?;
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut states = vec![State::default()];
        for rule in &rules {
            for sequence in &rule.alternatives {
                check_signature(rule.kind, sequence)?;
                insert(&mut states, rule.kind, sequence)?;
            }
        }

        let commands: Vec<CommandKind> = rules.iter().map(|r| r.kind).collect();
        debug!(
            rules = commands.len(),
            states = states.len(),
            "compiled grammar"
        );
        Ok(Self { states, commands })
    }

    /// Commands this grammar recognizes, in definition order.
    pub fn commands(&self) -> &[CommandKind] {
        &self.commands
    }

    /// Follow the edge from `state` matching `token`, if any.
    pub fn step(&self, state: usize, token: &TokenKind) -> Option<(usize, &Symbol)> {
        self.states[state]
            .edges
            .iter()
            .find(|(symbol, _)| symbol.matches(token))
            .map(|(symbol, next)| (*next, symbol))
    }

    /// The command completed at `state`, if a command may end there.
    pub fn accepts(&self, state: usize) -> Option<CommandKind> {
        self.states[state].accept
    }

    /// Human-readable list of what may follow `state`.
    pub fn expected(&self, state: usize) -> Vec<String> {
        let node = &self.states[state];
        let mut expected: Vec<String> = node.edges.iter().map(|(s, _)| s.to_string()).collect();
        if node.accept.is_some() {
            expected.push("end of command".to_string());
        }
        expected
    }
}

fn check_signature(kind: CommandKind, sequence: &[Symbol]) -> Result<(), GrammarError> {
    let found: Vec<ArgType> = sequence.iter().filter_map(Symbol::arg_type).collect();
    if kind.signatures().iter().any(|s| *s == found.as_slice()) {
        return Ok(());
    }
    let expected: Vec<String> = kind
        .signatures()
        .iter()
        .map(|s| render_args(s))
        .collect();
    Err(GrammarError::Signature {
        rule: kind.rule_name().to_string(),
        expected: expected.join(" | "),
        found: render_args(&found),
    })
}

fn render_args(args: &[ArgType]) -> String {
    if args.is_empty() {
        return "none".to_string();
    }
    args.iter()
        .map(ArgType::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn insert(
    states: &mut Vec<State>,
    kind: CommandKind,
    sequence: &[Symbol],
) -> Result<(), GrammarError> {
    let mut at = Grammar::START;
    for symbol in sequence {
        let existing = states[at]
            .edges
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, next)| *next);
        at = match existing {
            Some(next) => next,
            None => {
                states.push(State::default());
                let next = states.len() - 1;
                states[at].edges.push((symbol.clone(), next));
                next
            }
        };
    }

    match states[at].accept {
        Some(other) if other != kind => Err(GrammarError::Ambiguous {
            first: other.rule_name().to_string(),
            second: kind.rule_name().to_string(),
            sequence: sequence
                .iter()
                .map(Symbol::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        }),
        _ => {
            states[at].accept = Some(kind);
            Ok(())
        }
    }
}

/// Grammar expression before expansion.
#[derive(Debug, Clone)]
enum Expr {
    Sym(Symbol),
    Seq(Vec<Expr>),
    Alt(Vec<Expr>),
    Opt(Box<Expr>),
}

impl Expr {
    /// Every terminal sequence the expression accepts.
    fn expand(&self) -> Vec<Vec<Symbol>> {
        match self {
            Expr::Sym(symbol) => vec![vec![symbol.clone()]],
            Expr::Seq(items) => items.iter().fold(vec![Vec::new()], |acc, item| {
                let tails = item.expand();
                acc.iter()
                    .flat_map(|head| {
                        tails.iter().map(move |tail| {
                            let mut seq = head.clone();
                            seq.extend(tail.iter().cloned());
                            seq
                        })
                    })
                    .collect()
            }),
            Expr::Alt(alts) => alts.iter().flat_map(Expr::expand).collect(),
            Expr::Opt(inner) => {
                let mut seqs = inner.expand();
                seqs.push(Vec::new());
                seqs
            }
        }
    }
}

#[derive(Debug)]
struct RuleDef {
    kind: CommandKind,
    alternatives: Vec<Vec<Symbol>>,
}

/// Parses grammar-file tokens into rule definitions.
struct RuleParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl RuleParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(&mut self) -> Result<Vec<RuleDef>, GrammarError> {
        let mut rules: Vec<RuleDef> = Vec::new();

        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }

            let t = self.peek().clone();
            let name = match &t.kind {
                TokenKind::Word(name) => name.clone(),
                other => {
                    return Err(ParseError::syntax(
                        format!("expected rule name, got {other}"),
                        t.line,
                        t.col,
                    )
                    .into());
                }
            };
            self.advance();
            let kind = CommandKind::from_rule_name(&name)
                .ok_or(GrammarError::UnknownRule { name, line: t.line })?;
            self.expect(TokenKind::Colon)?;

            let expr = self.parse_alternatives(true)?;
            let end = self.peek();
            if !matches!(end.kind, TokenKind::Newline | TokenKind::Eof) {
                return Err(ParseError::syntax(
                    format!("unexpected {} in rule", end.kind),
                    end.line,
                    end.col,
                )
                .into());
            }

            let alternatives = expr.expand();
            match rules.iter_mut().find(|r| r.kind == kind) {
                Some(rule) => rule.alternatives.extend(alternatives),
                None => rules.push(RuleDef { kind, alternatives }),
            }
        }

        Ok(rules)
    }

    /// `seq ('|' seq)*`. At the top level an alternative may continue on the
    /// next line when that line starts with `|`.
    fn parse_alternatives(&mut self, top_level: bool) -> Result<Expr, GrammarError> {
        let mut alts = vec![self.parse_sequence(top_level)?];
        loop {
            if top_level {
                let saved = self.pos;
                self.skip_newlines();
                if !self.check(&TokenKind::Pipe) {
                    self.pos = saved;
                }
            } else {
                self.skip_newlines();
            }

            if self.check(&TokenKind::Pipe) {
                self.advance();
                alts.push(self.parse_sequence(top_level)?);
            } else {
                break;
            }
        }

        Ok(if alts.len() == 1 {
            alts.remove(0)
        } else {
            Expr::Alt(alts)
        })
    }

    fn parse_sequence(&mut self, top_level: bool) -> Result<Expr, GrammarError> {
        let mut items = Vec::new();
        loop {
            if !top_level {
                self.skip_newlines();
            }
            let t = self.peek().clone();
            match &t.kind {
                TokenKind::Str => {
                    items.push(Expr::Sym(Symbol::Keyword(keyword(&t)?)));
                    self.advance();
                }
                TokenKind::Word(name) => {
                    items.push(terminal(name, t.line)?);
                    self.advance();
                }
                TokenKind::LParen => {
                    self.advance();
                    let inner = self.parse_alternatives(false)?;
                    self.expect(TokenKind::RParen)?;
                    items.push(inner);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let inner = self.parse_alternatives(false)?;
                    self.expect(TokenKind::RBracket)?;
                    items.push(Expr::Opt(Box::new(inner)));
                }
                _ => {
                    if items.is_empty() {
                        return Err(ParseError::syntax(
                            format!("empty alternative before {}", t.kind),
                            t.line,
                            t.col,
                        )
                        .into());
                    }
                    break;
                }
            }
        }
        Ok(Expr::Seq(items))
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end()
            && std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn skip_newlines(&mut self) {
        while !self.is_at_end() && self.peek().kind == TokenKind::Newline {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        self.skip_newlines();
        if std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            Err(ParseError::syntax(
                format!("expected {kind}, got {}", t.kind),
                t.line,
                t.col,
            ))
        }
    }
}

/// A quoted keyword must be a single word to ever match a word token.
fn keyword(token: &Token) -> Result<String, GrammarError> {
    let word = unquote(token).unwrap_or_default();
    let mut chars = word.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ParseError::syntax(
            format!("keyword {} must be a single word", token.text),
            token.line,
            token.col,
        )
        .into());
    }
    Ok(word)
}

fn terminal(name: &str, line: usize) -> Result<Expr, GrammarError> {
    match name {
        "INT" => Ok(Expr::Sym(Symbol::Int)),
        "STRING" => Ok(Expr::Sym(Symbol::Str)),
        "MULTILINE_STRING" => Ok(Expr::Sym(Symbol::MultilineStr)),
        "TEXT" => Ok(Expr::Alt(vec![
            Expr::Sym(Symbol::Str),
            Expr::Sym(Symbol::MultilineStr),
        ])),
        _ => Err(GrammarError::UnknownTerminal {
            name: name.to_string(),
            line,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(k: &str) -> Symbol {
        Symbol::Keyword(k.to_string())
    }

    fn word(w: &str) -> TokenKind {
        TokenKind::Word(w.to_string())
    }

    /// Walk the automaton over token kinds and return the accepted command.
    fn accepts(grammar: &Grammar, tokens: &[TokenKind]) -> Option<CommandKind> {
        let mut state = Grammar::START;
        for token in tokens {
            state = grammar.step(state, token)?.0;
        }
        grammar.accepts(state)
    }

    #[test]
    fn builtin_grammar_compiles() {
        let grammar = Grammar::builtin().unwrap();
        assert_eq!(grammar.commands().len(), CommandKind::ALL.len());
        for kind in CommandKind::ALL {
            assert!(grammar.commands().contains(&kind));
        }
    }

    #[test]
    fn builtin_grammar_recognizes_delete_forms() {
        let grammar = Grammar::builtin().unwrap();
        assert_eq!(accepts(&grammar, &[word("DELETE")]), Some(CommandKind::Delete));
        assert_eq!(
            accepts(
                &grammar,
                &[
                    word("DELETE"),
                    word("LINES"),
                    TokenKind::Int(1),
                    word("TO"),
                    TokenKind::Int(2)
                ]
            ),
            Some(CommandKind::DeleteLines)
        );
        assert_eq!(accepts(&grammar, &[word("DELETE"), word("LINES")]), None);
    }

    #[test]
    fn optional_clause_expands() {
        let grammar = Grammar::builtin().unwrap();
        let plain = [word("INSERT"), TokenKind::Str];
        let at_line = [
            word("INSERT"),
            TokenKind::MultilineStr,
            word("AT"),
            word("LINE"),
            TokenKind::Int(3),
        ];
        assert_eq!(accepts(&grammar, &plain), Some(CommandKind::InsertText));
        assert_eq!(accepts(&grammar, &at_line), Some(CommandKind::InsertText));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let grammar = Grammar::builtin().unwrap();
        assert_eq!(accepts(&grammar, &[word("delete")]), None);
    }

    #[test]
    fn alternatives_and_continuation_lines() {
        let grammar = Grammar::compile(
            "goto_line : (\"GOTO\" | \"JUMP\") \"LINE\" INT\n          | \"LINE\" INT\n",
        )
        .unwrap();
        let prefixes = [
            vec![word("GOTO"), word("LINE")],
            vec![word("JUMP"), word("LINE")],
            vec![word("LINE")],
        ];
        for prefix in prefixes {
            let mut tokens = prefix;
            tokens.push(TokenKind::Int(4));
            assert_eq!(accepts(&grammar, &tokens), Some(CommandKind::GotoLine));
        }
        assert_eq!(grammar.commands(), &[CommandKind::GotoLine]);
    }

    #[test]
    fn repeated_rule_definitions_accumulate() {
        let text = "find_text : \"FIND\" STRING\nfind_text : \"SEARCH\" STRING\n";
        let grammar = Grammar::compile(text).unwrap();
        assert_eq!(
            accepts(&grammar, &[word("SEARCH"), TokenKind::Str]),
            Some(CommandKind::FindText)
        );
        assert_eq!(grammar.commands().len(), 1);
    }

    #[test]
    fn expected_lists_next_symbols() {
        let grammar = Grammar::builtin().unwrap();
        let (state, symbol) = grammar.step(Grammar::START, &word("DELETE")).unwrap();
        assert_eq!(symbol, &kw("DELETE"));
        let expected = grammar.expected(state);
        assert!(expected.contains(&"\"LINES\"".to_string()));
        assert!(expected.contains(&"end of command".to_string()));
    }

    #[test]
    fn ambiguous_rules_are_rejected() {
        let text = concat!(
            "delete : \"DROP\"\n",
            "find_text : \"FIND\" STRING\n",
            "delete_lines : \"DROP\" INT \"TO\" INT\n",
            "visual_lines : \"DROP\" INT \"TO\" INT\n",
        );
        let err = Grammar::compile(text).unwrap_err();
        match err {
            GrammarError::Ambiguous { first, second, sequence } => {
                assert_eq!(first, "delete_lines");
                assert_eq!(second, "visual_lines");
                assert_eq!(sequence, "\"DROP\" INT \"TO\" INT");
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn signature_mismatch_is_rejected() {
        let err = Grammar::compile("goto_line : \"GOTO\" STRING\n").unwrap_err();
        assert!(matches!(err, GrammarError::Signature { ref rule, .. } if rule == "goto_line"));
        assert!(err.to_string().contains("(INT)"));
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let err = Grammar::compile("\n\nundo : \"UNDO\"\n").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownRule { ref name, line: 3 } if name == "undo"));
    }

    #[test]
    fn unknown_terminal_is_rejected() {
        let err = Grammar::compile("goto_line : \"GOTO\" NUMBER\n").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownTerminal { ref name, .. } if name == "NUMBER"));
    }

    #[test]
    fn keyword_must_be_a_word() {
        let err = Grammar::compile("delete : \"DEL ETE\"\n").unwrap_err();
        assert!(matches!(err, GrammarError::Syntax(_)));
    }

    #[test]
    fn missing_colon_is_syntax_error() {
        let err = Grammar::compile("delete \"DELETE\"\n").unwrap_err();
        match err {
            GrammarError::Syntax(e) => assert_eq!((e.line, e.col), (1, 8)),
            other => panic!("expected Syntax, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_group_is_syntax_error() {
        assert!(matches!(
            Grammar::compile("delete : ( \"DELETE\"\n"),
            Err(GrammarError::Syntax(_))
        ));
    }

    #[test]
    fn empty_alternative_is_syntax_error() {
        assert!(matches!(
            Grammar::compile("delete : \"DELETE\" |\n"),
            Err(GrammarError::Syntax(_))
        ));
    }

    #[test]
    fn empty_grammar_is_rejected() {
        assert!(matches!(
            Grammar::compile("# nothing here\n\n"),
            Err(GrammarError::Empty)
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = GrammarSource::file("/nonexistent/commands.grammar");
        assert!(matches!(
            Grammar::load(&source),
            Err(GrammarError::Io { .. })
        ));
    }

    #[test]
    fn source_display() {
        assert_eq!(GrammarSource::Builtin.to_string(), "<builtin>");
        assert_eq!(
            GrammarSource::file("/tmp/g.grammar").to_string(),
            "/tmp/g.grammar"
        );
    }
}
