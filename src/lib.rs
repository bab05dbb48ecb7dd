//! textcmd: a grammar-driven command language for editing a text buffer.
//!
//! Command text such as `GOTO LINE 3` or `REPLACE "a" WITH "b"` is parsed
//! against a grammar loaded at runtime and executed against an
//! [`EditorSession`](session::EditorSession).

pub mod command;
pub mod config;
pub mod console;
pub mod dsl;
pub mod session;
