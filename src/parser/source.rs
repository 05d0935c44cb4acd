// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Character source and position tracking

use serde::Serialize;
use std::fmt;

/// Position of the next character within a named source.
///
/// Snapshot semantics: every consumer takes a copy, never a live view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offset {
    pub name: String,
    pub line: u32,
    pub column: u32,
}

impl Offset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line: 1,
            column: 1,
        }
    }

    /// Synthetic origin for nodes the evaluator fabricates itself, such as
    /// the implicit root `assemble` node.
    pub fn root() -> Self {
        Self::new("__root__")
    }

    /// Advance over consumed text. `\n` starts a new line, `\r` returns to
    /// column 1, anything else moves one column right.
    pub fn seek(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.column = 1;
                    self.line += 1;
                }
                '\r' => self.column = 1,
                _ => self.column += 1,
            }
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.line, self.column)
    }
}

/// Owns the full source text and a cursor, with bounded lookahead.
///
/// Running out of input is a normal `None`, never a fault.
pub struct Source {
    chars: Vec<char>,
    cursor: usize,
    offset: Offset,
}

impl Source {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
            offset: Offset::new(name),
        }
    }

    /// Current position, as a snapshot.
    pub fn offset(&self) -> Offset {
        self.offset.clone()
    }

    /// The next `len` characters without consuming, or `None` when fewer
    /// remain.
    pub fn peek(&self, len: usize) -> Option<String> {
        if self.cursor + len <= self.chars.len() {
            Some(self.chars[self.cursor..self.cursor + len].iter().collect())
        } else {
            None
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.chars.get(self.cursor).copied()
    }

    /// True when the upcoming characters literally match `symbol`.
    pub fn starts_with(&self, symbol: &str) -> bool {
        let mut cursor = self.cursor;
        for expected in symbol.chars() {
            match self.chars.get(cursor) {
                Some(&ch) if ch == expected => cursor += 1,
                _ => return false,
            }
        }
        true
    }

    /// Consume `len` characters, keeping line/column tracking correct across
    /// embedded newlines.
    pub fn consume(&mut self, len: usize) -> Option<String> {
        let text = self.peek(len)?;
        self.offset.seek(&text);
        self.cursor += len;
        Some(text)
    }

    pub fn consume_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.offset.seek(&ch.to_string());
        self.cursor += 1;
        Some(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_advance() {
        let source = Source::new("test", "abc");
        assert_eq!(source.peek(2), Some("ab".to_string()));
        assert_eq!(source.peek(2), Some("ab".to_string()));
        assert_eq!(source.peek(4), None);
    }

    #[test]
    fn consume_tracks_lines_and_columns() {
        let mut source = Source::new("test", "ab\ncd\r\nef");
        assert_eq!(source.consume(4), Some("ab\nc".to_string()));
        let offset = source.offset();
        assert_eq!((offset.line, offset.column), (2, 2));

        assert_eq!(source.consume(3), Some("d\r\n".to_string()));
        let offset = source.offset();
        assert_eq!((offset.line, offset.column), (3, 1));
    }

    #[test]
    fn consume_past_end_is_none() {
        let mut source = Source::new("test", "x");
        assert_eq!(source.consume(2), None);
        assert_eq!(source.consume(1), Some("x".to_string()));
        assert_eq!(source.consume(1), None);
    }

    #[test]
    fn carriage_return_resets_column_only() {
        let mut offset = Offset::new("test");
        offset.seek("abc\rx");
        assert_eq!((offset.line, offset.column), (1, 2));
    }

    #[test]
    fn starts_with_matches_literally() {
        let source = Source::new("test", "/* comment */");
        assert!(source.starts_with("/*"));
        assert!(!source.starts_with("//"));
    }
}
