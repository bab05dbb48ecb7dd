//! In-process editor session backed by a line vector.
//!
//! Follows vim conventions where the command layer can observe them:
//! the buffer always holds at least one line, forward search starts after
//! the cursor, and patterns are regular expressions.

use regex::{NoExpand, Regex};

use super::{Cursor, EditorSession, Mode, SearchFlags, SessionError};

/// A self-contained editing session.
#[derive(Debug, Clone)]
pub struct MemorySession {
    lines: Vec<String>,
    cursor: Cursor,
    mode: Mode,
    anchor: Option<Cursor>,
    last_search: Option<String>,
}

impl MemorySession {
    /// Start a session over `lines` with the cursor at line 1, column 0.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: non_empty(lines.into_iter().map(Into::into).collect()),
            cursor: Cursor::line_start(1),
            mode: Mode::Normal,
            anchor: None,
            last_search: None,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Borrow the buffer without copying it.
    pub fn buffer(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Enter any visual mode anchored at the cursor.
    pub fn start_visual(&mut self, mode: Mode) {
        if mode.is_visual() {
            self.mode = mode;
            self.anchor = Some(self.cursor);
        } else {
            self.escape();
        }
    }

    /// Leave visual mode.
    pub fn escape(&mut self) {
        self.mode = Mode::Normal;
        self.anchor = None;
    }

    /// Line range `[first, last]` (1-based, inclusive) covered by the selection.
    pub fn selected_lines(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        Some(ordered(anchor.line, self.cursor.line))
    }

    fn compile(pattern: &str) -> Result<Regex, SessionError> {
        Regex::new(pattern).map_err(|source| SessionError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
    }

    fn check_line(&self, line: usize) -> Result<(), SessionError> {
        if line == 0 || line > self.lines.len() {
            return Err(SessionError::LineOutOfRange {
                line,
                line_count: self.lines.len(),
            });
        }
        Ok(())
    }

    /// Keep the cursor and selection anchor inside the buffer after an edit.
    fn clamp_cursor(&mut self) {
        let count = self.lines.len();
        self.cursor.line = self.cursor.line.clamp(1, count);
        self.cursor.col = clamp_col(&self.lines[self.cursor.line - 1], self.cursor.col);
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.line = anchor.line.clamp(1, count);
        }
    }

    fn find_forward(&self, re: &Regex, wrap: bool) -> Option<Cursor> {
        let row = self.cursor.line - 1;
        let current = &self.lines[row];
        let after = byte_index(current, self.cursor.col + 1);

        // Matches strictly after the cursor on its own line.
        if let Some(m) = re.find_at(current, after) {
            return Some(Cursor::new(row + 1, char_col(current, m.start())));
        }

        for (idx, line) in self.lines.iter().enumerate().skip(row + 1) {
            if let Some(m) = re.find(line) {
                return Some(Cursor::new(idx + 1, char_col(line, m.start())));
            }
        }

        if wrap {
            for (idx, line) in self.lines.iter().enumerate().take(row + 1) {
                if let Some(m) = re.find(line) {
                    return Some(Cursor::new(idx + 1, char_col(line, m.start())));
                }
            }
        }

        None
    }

    fn delete_charwise(&mut self, anchor: Cursor) {
        let (start, end) = if (anchor.line, anchor.col) <= (self.cursor.line, self.cursor.col) {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        };

        let head: String = self.lines[start.line - 1].chars().take(start.col).collect();
        let tail: String = self.lines[end.line - 1].chars().skip(end.col + 1).collect();
        self.lines
            .splice(start.line - 1..end.line, [format!("{head}{tail}")]);
        self.cursor = start;
    }

    fn delete_blockwise(&mut self, anchor: Cursor) {
        let (first, last) = ordered(anchor.line, self.cursor.line);
        let (left, right) = ordered(anchor.col, self.cursor.col);
        for line in &mut self.lines[first - 1..last] {
            *line = line
                .chars()
                .enumerate()
                .filter(|(i, _)| *i < left || *i > right)
                .map(|(_, c)| c)
                .collect();
        }
        self.cursor = Cursor::new(first, left);
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl EditorSession for MemorySession {
    fn lines(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.lines.clone())
    }

    fn set_lines(&mut self, lines: Vec<String>) -> Result<(), SessionError> {
        self.lines = non_empty(lines);
        self.clamp_cursor();
        Ok(())
    }

    fn cursor(&self) -> Result<Cursor, SessionError> {
        Ok(self.cursor)
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SessionError> {
        self.check_line(cursor.line)?;
        self.cursor = Cursor::new(
            cursor.line,
            clamp_col(&self.lines[cursor.line - 1], cursor.col),
        );
        Ok(())
    }

    fn mode(&self) -> Result<Mode, SessionError> {
        Ok(self.mode)
    }

    fn start_visual_lines(&mut self) -> Result<(), SessionError> {
        self.start_visual(Mode::VisualLine);
        Ok(())
    }

    fn delete_char(&mut self) -> Result<(), SessionError> {
        let line = &mut self.lines[self.cursor.line - 1];
        if let Some((at, _)) = line.char_indices().nth(self.cursor.col) {
            line.remove(at);
        }
        self.clamp_cursor();
        Ok(())
    }

    fn delete_selection(&mut self) -> Result<(), SessionError> {
        let anchor = self.anchor.ok_or(SessionError::NoSelection)?;
        match self.mode {
            Mode::Normal => return Err(SessionError::NoSelection),
            Mode::VisualLine => {
                let (first, last) = ordered(anchor.line, self.cursor.line);
                self.lines.drain(first - 1..last);
                self.lines = non_empty(std::mem::take(&mut self.lines));
                self.cursor = Cursor::line_start(first);
            }
            Mode::Visual => self.delete_charwise(anchor),
            Mode::VisualBlock => self.delete_blockwise(anchor),
        }
        self.escape();
        self.clamp_cursor();
        Ok(())
    }

    fn search(&mut self, pattern: &str, flags: SearchFlags) -> Result<usize, SessionError> {
        let re = Self::compile(pattern)?;
        match self.find_forward(&re, flags.wrap) {
            Some(found) => {
                if flags.move_cursor {
                    self.cursor = found;
                }
                Ok(found.line)
            }
            None => Ok(0),
        }
    }

    fn set_search(&mut self, pattern: &str) -> Result<(), SessionError> {
        let re = Self::compile(pattern)?;
        self.last_search = Some(pattern.to_string());
        let found = self
            .find_forward(&re, true)
            .ok_or_else(|| SessionError::PatternNotFound(pattern.to_string()))?;
        self.cursor = found;
        Ok(())
    }

    fn last_search(&self) -> Option<String> {
        self.last_search.clone()
    }

    fn substitute_all(&mut self, pattern: &str, replacement: &str) -> Result<(), SessionError> {
        let re = Self::compile(pattern)?;
        let mut last_changed = None;
        for (idx, line) in self.lines.iter_mut().enumerate() {
            if re.is_match(line) {
                *line = re.replace_all(line, NoExpand(replacement)).into_owned();
                last_changed = Some(idx + 1);
            }
        }
        let line = last_changed.ok_or_else(|| SessionError::PatternNotFound(pattern.to_string()))?;
        self.cursor = Cursor::line_start(line);
        Ok(())
    }

    fn replace_lines(
        &mut self,
        start: usize,
        end: usize,
        lines: Vec<String>,
    ) -> Result<(), SessionError> {
        // Indices past the end clamp to it; an inverted range is rejected.
        let count = self.lines.len();
        let (from, to) = (start.min(count), end.min(count));
        if from > to {
            return Err(SessionError::RangeOutOfBounds {
                start,
                end,
                line_count: count,
            });
        }
        self.lines.splice(from..to, lines);
        self.lines = non_empty(std::mem::take(&mut self.lines));
        self.clamp_cursor();
        Ok(())
    }

    fn line_count(&self) -> Result<usize, SessionError> {
        Ok(self.lines.len())
    }
}

fn non_empty(lines: Vec<String>) -> Vec<String> {
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Normal-mode cursors sit on a character, so the last valid column is `len - 1`.
fn clamp_col(line: &str, col: usize) -> usize {
    col.min(line.chars().count().saturating_sub(1))
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

fn char_col(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}
