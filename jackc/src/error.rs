//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
    string::FromUtf8Error,
};

use smol_str::SmolStr;

use crate::compiler::{Span, Token, TokenKind};

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug)]
pub enum JackError {
    /// Source text could not be split into tokens.
    Lex(LexError),
    /// Token does not fit the grammar at its position.
    Syntax(SyntaxError),
    /// Name was never declared in the class or subroutine scope.
    Unresolved {
        name: SmolStr,
        location: Option<Location>,
    },
    /// Declaration would not fit in the 16-bit index space of its kind.
    TooManySymbols {
        name: SmolStr,
        location: Option<Location>,
    },
    /// Name declared twice in the same scope, when strict declarations are on.
    Redeclared { name: SmolStr, location: Location },
    /// Memory segment name outside the stack machine's fixed set.
    UnknownSegment(String),
    /// Arithmetic command outside the stack machine's fixed set.
    UnknownCommand(String),
    Io(io::Error),
    Utf8(FromUtf8Error),
    Fmt(fmt::Error),
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Syntax(err) => write!(f, "{err}"),
            Self::Unresolved {
                name,
                location: Some(location),
            } => write!(f, "unresolved symbol '{name}' {location}"),
            Self::Unresolved {
                name,
                location: None,
            } => write!(f, "unresolved symbol '{name}'"),
            Self::TooManySymbols {
                name,
                location: Some(location),
            } => write!(f, "too many symbols of one kind, at '{name}' {location}"),
            Self::TooManySymbols {
                name,
                location: None,
            } => write!(f, "too many symbols of one kind, at '{name}'"),
            Self::Redeclared { name, location } => {
                write!(f, "symbol '{name}' is already declared in this scope {location}")
            }
            Self::UnknownSegment(name) => write!(f, "unrecognized segment: {name}"),
            Self::UnknownCommand(name) => write!(f, "unrecognized arithmetic command: {name}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Utf8(err) => write!(f, "{err}"),
            Self::Fmt(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for JackError {}

impl From<LexError> for JackError {
    fn from(err: LexError) -> Self {
        JackError::Lex(err)
    }
}

impl From<SyntaxError> for JackError {
    fn from(err: SyntaxError) -> Self {
        JackError::Syntax(err)
    }
}

impl From<io::Error> for JackError {
    fn from(err: io::Error) -> Self {
        JackError::Io(err)
    }
}

impl From<FromUtf8Error> for JackError {
    fn from(err: FromUtf8Error) -> Self {
        JackError::Utf8(err)
    }
}

impl From<fmt::Error> for JackError {
    fn from(err: fmt::Error) -> Self {
        JackError::Fmt(err)
    }
}

/// Position in the source, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Byte offset from the start of the source.
    pub offset: u32,
    /// Line number, starting at 1.
    pub line: usize,
    /// Character column, starting at 1.
    pub column: usize,
}

impl Location {
    pub fn new(source_code: &str, span: &Span) -> Self {
        let offset = (span.index as usize).min(source_code.len());
        let (_, line_span) = span.surrounding_line(source_code);
        let line = source_code[..offset].matches('\n').count() + 1;
        let column = source_code[line_span.index as usize..offset].chars().count() + 1;

        Self {
            offset: offset as u32,
            line,
            column,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at offset {} (line {}, column {})",
            self.offset, self.line, self.column
        )
    }
}

/// Source line with a caret under the given column.
fn marked_line(source_code: &str, span: &Span, column: usize) -> String {
    let (line, _) = span.surrounding_line(source_code);
    format!("{line}\n{}^", " ".repeat(column.saturating_sub(1)))
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
    /// Offending source line, with a marker.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownCharacter(char),
    /// String constant is missing its closing quote.
    UnterminatedString,
    /// String constants may not span lines.
    NewlineInString,
    /// Block comment is missing its closing `*/`.
    UnterminatedComment,
    /// Integer constant is larger than 32767.
    IntegerOverflow,
}

impl LexError {
    pub fn new(source_code: &str, span: Span, kind: LexErrorKind) -> Self {
        let location = Location::new(source_code, &span);
        let context = marked_line(source_code, &span, location.column);
        Self {
            kind,
            location,
            context,
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::UnknownCharacter(c) => write!(f, "unknown character {c:?}")?,
            LexErrorKind::UnterminatedString => write!(f, "unterminated string constant")?,
            LexErrorKind::NewlineInString => write!(f, "newline in string constant")?,
            LexErrorKind::UnterminatedComment => write!(f, "unterminated block comment")?,
            LexErrorKind::IntegerOverflow => write!(f, "integer constant too large")?,
        }
        write!(f, " {}\n{}", self.location, self.context)
    }
}

impl std::error::Error for LexError {}

/// Error returned when an unexpected token is encountered.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    /// Description of the grammar element that was expected.
    pub expected: String,
    pub encountered: TokenKind,
    /// Source text of the encountered token.
    pub fragment: String,
    pub location: Location,
    /// Offending source line, with a marker.
    pub context: String,
}

impl SyntaxError {
    pub fn new(source_code: &str, expected: impl ToString, token: &Token) -> Self {
        let location = Location::new(source_code, &token.span);
        let context = marked_line(source_code, &token.span, location.column);
        Self {
            expected: expected.to_string(),
            encountered: token.kind,
            fragment: token.fragment(source_code).to_owned(),
            location,
            context,
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.encountered)?;
        if !self.fragment.is_empty() && self.encountered.symbol().is_none() {
            write!(f, " \"{}\"", self.fragment)?;
        }
        write!(f, " {}\n{}", self.location, self.context)
    }
}

impl std::error::Error for SyntaxError {}
