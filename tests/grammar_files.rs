//! Grammars loaded from disk: custom vocabularies, reload, load failures.

use std::fs;
use std::path::Path;

use textcmd::command::{is_error, CommandKind};
use textcmd::dsl::{Executor, GrammarError, GrammarSource};
use textcmd::session::{EditorSession, MemorySession};

const GOTO_ONLY: &str = "goto_line : (\"GOTO\" | \"JUMP\") [\"TO\"] \"LINE\" INT\n";

fn write(path: &Path, text: &str) {
    fs::write(path, text).unwrap();
}

fn executor_for(path: &Path) -> Executor<MemorySession> {
    let session = MemorySession::new(["a", "b", "c"]);
    Executor::new(session, GrammarSource::file(path)).unwrap()
}

#[test]
fn custom_vocabulary_drives_the_same_handlers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goto.grammar");
    write(&path, GOTO_ONLY);

    let mut ex = executor_for(&path);
    assert_eq!(ex.commands().to_vec(), vec![CommandKind::GotoLine]);
    assert_eq!(ex.grammar_path(), path.display().to_string());

    assert_eq!(ex.execute("JUMP TO LINE 3"), "Moved to line 3");
    assert_eq!(ex.session().cursor().unwrap().line, 3);
    assert!(is_error(&ex.execute("DELETE")));
}

#[test]
fn reload_picks_up_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commands.grammar");
    write(&path, GOTO_ONLY);

    let mut ex = executor_for(&path);
    assert!(!ex.validate("DELETE LINES 1 TO 2"));

    write(
        &path,
        &format!("{GOTO_ONLY}delete_lines : (\"DELETE\" | \"DROP\") \"LINES\" INT \"TO\" INT\n"),
    );
    ex.reload_grammar().unwrap();

    assert_eq!(ex.commands().len(), 2);
    assert_eq!(ex.execute("DROP LINES 1 TO 2"), "Deleted lines 1 to 2");
    assert_eq!(ex.session().buffer(), &["c"]);
}

#[test]
fn failed_reload_keeps_previous_grammar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commands.grammar");
    write(&path, GOTO_ONLY);
    let mut ex = executor_for(&path);

    write(&path, "goto_line : \"GOTO\" \"LINE\"\n");
    assert!(matches!(
        ex.reload_grammar(),
        Err(GrammarError::Signature { .. })
    ));
    assert!(ex.validate("GOTO LINE 2"));

    fs::remove_file(&path).unwrap();
    assert!(matches!(ex.reload_grammar(), Err(GrammarError::Io { .. })));
    assert!(ex.validate("JUMP LINE 2"));
}

#[test]
fn load_failures_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("missing.grammar", None),
        ("unknown_rule.grammar", Some("teleport : \"TELEPORT\" INT\n")),
        ("unknown_terminal.grammar", Some("goto_line : \"GOTO\" FLOAT\n")),
        (
            "ambiguous.grammar",
            Some(concat!(
                "delete_lines : \"DELETE\" \"LINES\" INT \"TO\" INT\n",
                "visual_lines : \"DELETE\" \"LINES\" INT \"TO\" INT\n",
            )),
        ),
        ("empty.grammar", Some("# nothing here\n")),
        ("syntax.grammar", Some("goto_line \"GOTO\" \"LINE\" INT\n")),
    ];

    for (name, text) in cases {
        let path = dir.path().join(name);
        if let Some(text) = text {
            write(&path, text);
        }
        let result = Executor::new(MemorySession::default(), GrammarSource::file(&path));
        let err = match result {
            Ok(_) => panic!("{name} should not load"),
            Err(err) => err,
        };
        let ok = match name {
            "missing.grammar" => matches!(err, GrammarError::Io { .. }),
            "unknown_rule.grammar" => matches!(err, GrammarError::UnknownRule { .. }),
            "unknown_terminal.grammar" => matches!(err, GrammarError::UnknownTerminal { .. }),
            "ambiguous.grammar" => matches!(err, GrammarError::Ambiguous { .. }),
            "empty.grammar" => matches!(err, GrammarError::Empty),
            _ => matches!(err, GrammarError::Syntax(_)),
        };
        assert!(ok, "{name}: {err}");
    }
}

#[test]
fn shipped_grammar_file_matches_builtin() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("grammars/commands.grammar");
    let ex = Executor::new(MemorySession::default(), GrammarSource::file(&path)).unwrap();
    assert_eq!(ex.commands().to_vec(), CommandKind::ALL.to_vec());
}
