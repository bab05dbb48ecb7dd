//! Editor session: the stateful buffer/cursor/search service that commands drive.
//!
//! The command layer never caches session state: every handler re-reads the
//! mode, cursor, or buffer it needs at call time.

pub mod memory;

pub use memory::MemorySession;

/// Cursor position: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Column 0 of the given 1-based line.
    pub const fn line_start(line: usize) -> Self {
        Self { line, col: 0 }
    }
}

/// Editor mode as reported by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Character-wise visual selection.
    Visual,
    /// Line-wise visual selection.
    VisualLine,
    /// Block-wise visual selection.
    VisualBlock,
}

impl Mode {
    /// Any visual variant.
    pub fn is_visual(&self) -> bool {
        !matches!(self, Mode::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Visual => "VISUAL",
            Mode::VisualLine => "VISUAL LINE",
            Mode::VisualBlock => "VISUAL BLOCK",
        }
    }
}

/// Flags for a forward pattern search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFlags {
    /// Continue from the top of the buffer after reaching the end.
    pub wrap: bool,
    /// Move the cursor onto the match.
    pub move_cursor: bool,
}

impl SearchFlags {
    /// Report the match line only: no wrap, cursor untouched.
    pub const fn peek() -> Self {
        Self {
            wrap: false,
            move_cursor: false,
        }
    }
}

/// Faults raised by an editor session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cursor position outside buffer: line {line} (buffer has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("invalid line range [{start}, {end}) for buffer of {line_count} lines")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern not found: {0}")]
    PatternNotFound(String),

    #[error("no visual selection")]
    NoSelection,
}

/// The operations the command layer needs from an editor.
///
/// Line numbers in cursor positions and search results are 1-based; line
/// ranges passed to [`replace_lines`](EditorSession::replace_lines) are
/// 0-based and half-open.
pub trait EditorSession {
    /// Snapshot of every buffer line, in order.
    fn lines(&self) -> Result<Vec<String>, SessionError>;

    /// Replace the whole buffer.
    fn set_lines(&mut self, lines: Vec<String>) -> Result<(), SessionError>;

    fn cursor(&self) -> Result<Cursor, SessionError>;

    /// Move the cursor. Lines outside the buffer are rejected; the column is
    /// clamped to the target line.
    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SessionError>;

    fn mode(&self) -> Result<Mode, SessionError>;

    /// Enter line-wise visual mode anchored at the cursor line. Subsequent
    /// cursor moves extend the selection.
    fn start_visual_lines(&mut self) -> Result<(), SessionError>;

    /// Delete the character under the cursor.
    fn delete_char(&mut self) -> Result<(), SessionError>;

    /// Delete the active visual selection and return to normal mode.
    fn delete_selection(&mut self) -> Result<(), SessionError>;

    /// Forward search from the cursor. Returns the 1-based line of the match,
    /// or 0 when there is none.
    fn search(&mut self, pattern: &str, flags: SearchFlags) -> Result<usize, SessionError>;

    /// Make `pattern` the navigable last-search pattern and jump to its next
    /// match, wrapping around the buffer end.
    fn set_search(&mut self, pattern: &str) -> Result<(), SessionError>;

    fn last_search(&self) -> Option<String>;

    /// Substitute every occurrence of `pattern` on every line.
    fn substitute_all(&mut self, pattern: &str, replacement: &str) -> Result<(), SessionError>;

    /// Replace the 0-based half-open line range `[start, end)` with `lines`.
    fn replace_lines(
        &mut self,
        start: usize,
        end: usize,
        lines: Vec<String>,
    ) -> Result<(), SessionError>;

    fn line_count(&self) -> Result<usize, SessionError> {
        Ok(self.lines()?.len())
    }
}
