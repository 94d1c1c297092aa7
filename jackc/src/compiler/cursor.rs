//! Character scanner.
use std::{iter::Peekable, str::CharIndices};

/// Stand-in character returned when the cursor has moved past the end of
/// the source. The source itself may contain this character, so check
/// [`Cursor::at_end`] to tell the two apart.
pub(crate) const EOF_CHAR: char = '\0';

/// Cursor over the characters of the source text, with one
/// character of lookahead.
///
/// The cursor starts out before the first character, pointing to a
/// non-existant [`EOF_CHAR`]. Call [`Cursor::next`] once to prime it.
pub(crate) struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    /// Byte offset and value of the character under the cursor.
    current: (usize, char),
    /// Byte length of the whole source.
    len: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            current: (0, EOF_CHAR),
            len: text.len(),
        }
    }

    /// Advance the cursor and return the new current character.
    pub(crate) fn next(&mut self) -> char {
        self.current = match self.chars.next() {
            Some(pair) => pair,
            // There is no end-of-file character, so the cursor is
            // parked one byte past the last character.
            None => (self.len, EOF_CHAR),
        };
        self.current.1
    }

    /// Character under the cursor.
    #[inline]
    pub(crate) fn current(&self) -> char {
        self.current.1
    }

    /// Character after the cursor, without advancing.
    #[inline]
    pub(crate) fn peek(&mut self) -> char {
        self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR)
    }

    /// Byte offset of the character under the cursor.
    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        self.current.0 as u32
    }

    /// Byte offset of the character after the cursor.
    #[inline]
    pub(crate) fn peek_offset(&mut self) -> u32 {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.len) as u32
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}
