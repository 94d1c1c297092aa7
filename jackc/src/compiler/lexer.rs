//! Lexical analysis
use crate::{
    constants::MAX_INT,
    error::{LexError, LexErrorKind},
};

use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{Keyword, Span, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.next();

        let start_pos = cursor.offset();

        Self {
            cursor,
            original: source_code,
            start_pos,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// ## Implementation
    ///
    /// Each iteration starts with the assumption that the internal cursor
    /// is pointing to the start of the remaining source to be consumed,
    /// and must leave the cursor at the start of the next token's text
    /// once it is done.
    ///
    /// Whitespace and both comment forms are erased before the token
    /// starts. Once the source is exhausted every call returns
    /// [`TokenKind::EOF`].
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as TK;

        self.erase_trivia()?;

        self.start_token();

        match self.cursor.current() {
            '{' => Ok(self.make_token(TK::LeftBrace)),
            '}' => Ok(self.make_token(TK::RightBrace)),
            '(' => Ok(self.make_token(TK::LeftParen)),
            ')' => Ok(self.make_token(TK::RightParen)),
            '[' => Ok(self.make_token(TK::LeftBracket)),
            ']' => Ok(self.make_token(TK::RightBracket)),
            '.' => Ok(self.make_token(TK::Dot)),
            ',' => Ok(self.make_token(TK::Comma)),
            ';' => Ok(self.make_token(TK::Semicolon)),
            '+' => Ok(self.make_token(TK::Plus)),
            '-' => Ok(self.make_token(TK::Minus)),
            '*' => Ok(self.make_token(TK::Star)),
            '/' => Ok(self.make_token(TK::Slash)),
            '&' => Ok(self.make_token(TK::Ampersand)),
            '|' => Ok(self.make_token(TK::Pipe)),
            '<' => Ok(self.make_token(TK::Less)),
            '>' => Ok(self.make_token(TK::Greater)),
            '=' => Ok(self.make_token(TK::Eq)),
            '~' => Ok(self.make_token(TK::Tilde)),
            '"' => self.consume_string(),
            '_' | 'a'..='z' | 'A'..='Z' => Ok(self.consume_ident()),
            '0'..='9' => self.consume_number(),

            EOF_CHAR if self.cursor.at_end() => Ok(self.make_token(TK::EOF)),
            c => Err(self.error(LexErrorKind::UnknownCharacter(c))),
        }
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&mut self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.peek_offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);
        let size = end - start;

        Span { index: start, size }
    }

    fn fragment(&mut self) -> &'a str {
        self.make_span().fragment(self.original)
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Build a token, using the source text from the position
    /// stored by [`start_token`](struct.Lexer.html#fn-start_token) to the
    /// current cursor position.
    ///
    /// Also prepare the cursor for the next iteration.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            span: self.make_span(),
            kind,
        };

        // Position the cursor to the starting character for the
        // next token, so the lexer's internal state is primed
        // for the next iteration.
        self.cursor.next();

        token
    }

    #[inline(never)]
    #[cold]
    fn error(&mut self, kind: LexErrorKind) -> LexError {
        let span = self.make_span();
        LexError::new(self.original, span, kind)
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Erase whitespace and comments in front of the next token.
    fn erase_trivia(&mut self) -> Result<(), LexError> {
        loop {
            while is_whitespace(self.cursor.current()) {
                self.cursor.next();
            }

            match (self.cursor.current(), self.cursor.peek()) {
                ('/', '/') => self.erase_line_comment(),
                ('/', '*') => self.erase_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        debug_assert_eq!(self.cursor.current(), '/');

        while !is_newline(self.cursor.current()) && !self.cursor.at_end() {
            self.cursor.next();
        }
    }

    /// Erase a `/* ... */` comment, including the documentation
    /// form `/** ... */`, up to and including the closing marker.
    fn erase_block_comment(&mut self) -> Result<(), LexError> {
        debug_assert_eq!(self.cursor.current(), '/');
        self.start_token();

        // Skip the opening marker so `/*/` isn't mistaken for a closed comment.
        self.cursor.next();
        self.cursor.next();

        loop {
            if self.cursor.at_end() {
                return Err(self.error(LexErrorKind::UnterminatedComment));
            }

            if self.cursor.current() == '*' && self.cursor.peek() == '/' {
                self.cursor.next();
                self.cursor.next();
                return Ok(());
            }

            self.cursor.next();
        }
    }

    /// Make a string constant token. The span includes both quotes.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        debug_assert_eq!(self.cursor.current(), '"');

        loop {
            match self.cursor.peek() {
                '"' => {
                    self.cursor.next();
                    return Ok(self.make_token(TokenKind::String));
                }
                '\n' | '\r' => return Err(self.error(LexErrorKind::NewlineInString)),
                EOF_CHAR if self.cursor.peek_offset() as usize >= self.original.len() => {
                    return Err(self.error(LexErrorKind::UnterminatedString));
                }
                _ => {
                    self.cursor.next();
                }
            }
        }
    }

    /// Make an identifier token.
    fn consume_ident(&mut self) -> Token {
        debug_assert!(is_letter(self.cursor.current()));

        while is_letter_or_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        // Attempt to convert identifier to keyword.
        let token_kind = match Keyword::parse(self.fragment()) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        self.make_token(token_kind)
    }

    /// Make an integer constant token.
    ///
    /// Constants are unsigned. A leading minus is lexed as its own symbol.
    fn consume_number(&mut self) -> Result<Token, LexError> {
        debug_assert!(is_digit(self.cursor.current()));

        while is_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        match self.fragment().parse::<u16>() {
            Ok(value) if value <= MAX_INT => Ok(self.make_token(TokenKind::Number)),
            _ => Err(self.error(LexErrorKind::IntegerOverflow)),
        }
    }
}

/// Test whether the character is considered whitespace
/// that should be ignored by the parser later.
fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{000A}' // line feed
            | '\u{000D}' // carriage return
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Result<Token, LexError>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Ends after the first EOF token or the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        if matches!(result, Ok(Token { kind: TokenKind::EOF, .. }) | Err(_)) {
            self.done = true;
        }
        Some(result)
    }
}
