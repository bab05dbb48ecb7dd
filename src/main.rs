use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use textcmd::config::AppConfig;
use textcmd::console::{self, Repl};
use textcmd::dsl::{Executor, GrammarSource};
use textcmd::session::MemorySession;

/// textcmd -- run editing commands like `GOTO LINE 3` against a text buffer.
#[derive(Parser, Debug)]
#[command(name = "textcmd", version, about)]
struct Cli {
    /// Grammar file to load instead of the built-in grammar
    #[arg(long, value_name = "PATH")]
    grammar: Option<PathBuf>,

    /// Seed the buffer from a file (it is never written back)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Run the demo script against the demo buffer (default)
    #[arg(short, long, group = "mode")]
    demo: bool,

    /// Run one command and print the result and buffer
    #[arg(short, long, group = "mode", value_name = "TEXT")]
    command: Option<String>,

    /// Read commands from stdin interactively
    #[arg(short, long, group = "mode")]
    interactive: bool,

    /// Print the parse tree of TEXT without running it
    #[arg(long, group = "mode", value_name = "TEXT")]
    tree: Option<String>,

    /// Report whether TEXT parses; exits 1 if it doesn't
    #[arg(long, group = "mode", value_name = "TEXT")]
    check: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // RUST_LOG wins over the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let color = config.color && !cli.no_color;
    let source = match cli.grammar.clone().or_else(|| config.grammar.clone()) {
        Some(path) => GrammarSource::File(path),
        None => GrammarSource::Builtin,
    };

    let session = match &cli.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            MemorySession::from_text(&text)
        }
        None => MemorySession::new(config.demo_buffer.clone()),
    };

    let mut executor = Executor::new(session, source.clone())
        .with_context(|| format!("failed to load grammar {source}"))?;
    info!(grammar = %executor.grammar_path(), "ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(text) = &cli.command {
        let result = executor.execute(text);
        writeln!(out, "Result: {}", console::format_result(&result, color))?;
        write!(out, "{}", console::format_buffer(executor.session(), color))?;
    } else if let Some(text) = &cli.tree {
        match executor.parse_tree(text) {
            Ok(tree) => write!(out, "{tree}")?,
            Err(err) => {
                writeln!(out, "{}", console::format_result(&format!("Error: {err}"), color))?;
                return Ok(ExitCode::FAILURE);
            }
        }
    } else if let Some(text) = &cli.check {
        let valid = executor.validate(text);
        writeln!(out, "{}", if valid { "valid" } else { "invalid" })?;
        if !valid {
            return Ok(ExitCode::FAILURE);
        }
    } else if cli.interactive {
        let mut repl = Repl::new(executor, config.history_size, color);
        repl.run(io::stdin().lock(), &mut out)
            .context("interactive session failed")?;
    } else {
        info!(requested = cli.demo, "running demo");
        console::run_demo(&mut executor, &mut out, color).context("demo failed")?;
    }

    Ok(ExitCode::SUCCESS)
}
