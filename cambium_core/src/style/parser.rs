// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0

//! A small cursor-based parser for style value syntax.

use std::fmt;

/// An error produced while parsing a style value or a binding description.
///
/// `position` is a byte offset into the original input, pointing at the first
/// unexpected token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Byte offset of the first unexpected token.
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Cursor over a style value string.
///
/// All `try_*` methods skip leading whitespace, then either consume the
/// requested construct and return it, or leave the cursor untouched.
pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("pos", &self.pos)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed tail of the input.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// The text consumed since an earlier [`position`](Self::position).
    pub fn consumed_since(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    /// Skips whitespace; returns `true` if the input is exhausted.
    pub fn is_eof(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.input.len()
    }

    /// Skips ASCII whitespace.
    pub fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Returns `true` if the next non-whitespace character is `c`, without
    /// consuming anything.
    pub fn begins_with(&mut self, c: char) -> bool {
        self.skip_whitespace();
        self.remaining().starts_with(c)
    }

    /// Tries to consume `literal` (ASCII case-insensitive).
    pub fn try_literal(&mut self, literal: &str) -> bool {
        self.skip_whitespace();
        let rest = self.remaining();
        if rest.len() >= literal.len() && rest[..literal.len()].eq_ignore_ascii_case(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Tries to consume an identifier (`[A-Za-z_-][A-Za-z0-9_-]*`).
    pub fn try_ident(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.remaining();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
            _ => return None,
        }
        let end = chars
            .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    /// Tries to consume a floating point number.
    pub fn try_double(&mut self) -> Option<f64> {
        self.skip_whitespace();
        let rest = self.remaining();
        let bytes = rest.as_bytes();
        let mut end = 0;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        let int_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'.' {
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        if end == int_start || (end == int_start + 1 && bytes[int_start] == b'.') {
            return None;
        }
        if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
            let mut exp_end = end + 1;
            if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
                exp_end += 1;
            }
            let digits_start = exp_end;
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > digits_start {
                end = exp_end;
            }
        }
        let value: f64 = rest[..end].parse().ok()?;
        self.pos += end;
        Some(value)
    }

    /// Tries to consume a double-quoted string, returning its contents.
    ///
    /// No escape sequences; the binding grammar doesn't use them.
    pub fn try_string(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.remaining();
        let mut chars = rest.char_indices();
        if chars.next().map(|(_, c)| c) != Some('"') {
            return None;
        }
        for (i, c) in chars {
            if c == '"' {
                self.pos += i + 1;
                return Some(&rest[1..i]);
            }
        }
        None
    }

    /// Builds a [`ParseError`] at the current position.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.pos,
        }
    }

    /// Consumes `literal` or fails with an error naming it.
    pub fn expect_literal(&mut self, literal: &str) -> Result<(), ParseError> {
        if self.try_literal(literal) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{literal}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_idents() {
        let mut p = Parser::new("  translateX( 4px )");
        assert!(p.try_literal("translateX("));
        assert_eq!(p.try_double(), Some(4.0));
        assert!(p.try_literal("px"));
        assert!(p.try_literal(")"));
        assert!(p.is_eof());
    }

    #[test]
    fn numbers() {
        let mut p = Parser::new("-1.5 .25 2e3 nope");
        assert_eq!(p.try_double(), Some(-1.5));
        assert_eq!(p.try_double(), Some(0.25));
        assert_eq!(p.try_double(), Some(2000.0));
        assert_eq!(p.try_double(), None);
        assert_eq!(p.try_ident(), Some("nope"));
    }

    #[test]
    fn strings() {
        let mut p = Parser::new(r#" "move-cursor" rest"#);
        assert_eq!(p.try_string(), Some("move-cursor"));
        assert_eq!(p.try_ident(), Some("rest"));
    }

    #[test]
    fn unterminated_string() {
        let mut p = Parser::new(r#""oops"#);
        assert_eq!(p.try_string(), None);
    }
}
