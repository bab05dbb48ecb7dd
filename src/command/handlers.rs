//! One handler per command kind.
//!
//! Handlers take 1-based line numbers, convert to the session's 0-based
//! half-open ranges where needed, and wrap every session fault in a
//! [`CommandError`] naming what was being attempted.

use tracing::debug;

use super::{CommandError, Outcome};
use crate::session::{Cursor, EditorSession, SearchFlags, SessionError};

/// Select `start..=end` line-wise. The range is passed through unvalidated.
pub fn visual_lines<S: EditorSession + ?Sized>(
    session: &mut S,
    start: usize,
    end: usize,
) -> Outcome {
    let select = |session: &mut S| -> Result<(), SessionError> {
        session.set_cursor(Cursor::line_start(start))?;
        session.start_visual_lines()?;
        session.set_cursor(Cursor::line_start(end))
    };
    select(session)
        .map_err(|e| CommandError::new(format!("selecting lines {start}-{end}"), e))?;
    Ok(format!("Selected lines {start} to {end}"))
}

/// Insert `text` (split on newlines) before line `line`, or after the cursor
/// line when no line is given.
pub fn insert_text<S: EditorSession + ?Sized>(
    session: &mut S,
    text: &str,
    line: Option<usize>,
) -> Outcome {
    let new_lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let count = new_lines.len();
    let fail = |e| CommandError::new("inserting text", e);

    match line {
        Some(line) => {
            let at = zero_based(session, line).map_err(fail)?;
            session.replace_lines(at, at, new_lines).map_err(fail)?;
            debug!(line, count, "inserted at line");
            if count == 1 {
                Ok(format!("Inserted text at line {line}"))
            } else {
                Ok(format!("Inserted {count} lines starting at line {line}"))
            }
        }
        None => {
            // The 1-based cursor line is the 0-based index just below it.
            let at = session.cursor().map_err(fail)?.line;
            session.replace_lines(at, at, new_lines).map_err(fail)?;
            debug!(after = at, count, "inserted below cursor");
            if count == 1 {
                Ok("Inserted text at current position".to_string())
            } else {
                Ok(format!("Inserted {count} lines at current position"))
            }
        }
    }
}

/// Delete the visual selection if there is one, else the character under
/// the cursor.
pub fn delete<S: EditorSession + ?Sized>(session: &mut S) -> Outcome {
    let fail = |e| CommandError::new("deleting", e);
    if session.mode().map_err(fail)?.is_visual() {
        session.delete_selection().map_err(fail)?;
        Ok("Deleted visual selection".to_string())
    } else {
        session.delete_char().map_err(fail)?;
        Ok("Deleted character under cursor".to_string())
    }
}

/// Remove lines `start..=end`, i.e. the half-open range `[start - 1, end)`.
pub fn delete_lines<S: EditorSession + ?Sized>(
    session: &mut S,
    start: usize,
    end: usize,
) -> Outcome {
    let fail = |e| CommandError::new(format!("deleting lines {start}-{end}"), e);
    let from = zero_based(session, start).map_err(fail)?;
    session.replace_lines(from, end, Vec::new()).map_err(fail)?;
    Ok(format!("Deleted lines {start} to {end}"))
}

pub fn goto_line<S: EditorSession + ?Sized>(session: &mut S, line: usize) -> Outcome {
    session
        .set_cursor(Cursor::line_start(line))
        .map_err(|e| CommandError::new(format!("going to line {line}"), e))?;
    Ok(format!("Moved to line {line}"))
}

/// Search forward without wrapping. A miss is a normal result, not an error.
pub fn find_text<S: EditorSession + ?Sized>(session: &mut S, pattern: &str) -> Outcome {
    let fail = |e| CommandError::new(format!("searching for '{pattern}'"), e);
    let found = session.search(pattern, SearchFlags::peek()).map_err(fail)?;
    if found > 0 {
        session.set_search(pattern).map_err(fail)?;
        Ok(format!("Found '{pattern}' at line {found}"))
    } else {
        Ok(format!("Pattern '{pattern}' not found"))
    }
}

/// Substitute every occurrence of `old` with `new` across the buffer.
pub fn replace_text<S: EditorSession + ?Sized>(session: &mut S, old: &str, new: &str) -> Outcome {
    session
        .substitute_all(old, new)
        .map_err(|e| CommandError::new(format!("replacing '{old}' with '{new}'"), e))?;
    Ok(format!("Replaced all '{old}' with '{new}'"))
}

/// 0-based index of a 1-based line number. Line 0 has no such index.
fn zero_based<S: EditorSession + ?Sized>(session: &S, line: usize) -> Result<usize, SessionError> {
    match line.checked_sub(1) {
        Some(index) => Ok(index),
        None => Err(SessionError::LineOutOfRange {
            line,
            line_count: session.line_count()?,
        }),
    }
}
