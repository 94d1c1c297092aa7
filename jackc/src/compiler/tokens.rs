//! Tokens

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

impl Token {
    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        self.span.fragment(text)
    }

    /// Contents of a string constant, with the surrounding quotes removed.
    pub fn string_value<'a>(&self, text: &'a str) -> &'a str {
        debug_assert_eq!(self.kind, TokenKind::String);
        let fragment = self.fragment(text);
        fragment
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(fragment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum TokenKind {
    // Symbols
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Ampersand,    // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// Decimal integer constant, 0 to 32767
    Number,
    /// Double quoted string constant
    String,

    // ------------------------------------------------------------------------
    // Special
    /// End-of-file
    EOF,
}

impl TokenKind {
    /// Source character of a symbol token.
    #[rustfmt::skip]
    pub fn symbol(&self) -> Option<char> {
        use TokenKind as TK;
        match self {
            TK::LeftBrace    => Some('{'),
            TK::RightBrace   => Some('}'),
            TK::LeftParen    => Some('('),
            TK::RightParen   => Some(')'),
            TK::LeftBracket  => Some('['),
            TK::RightBracket => Some(']'),
            TK::Dot          => Some('.'),
            TK::Comma        => Some(','),
            TK::Semicolon    => Some(';'),
            TK::Plus         => Some('+'),
            TK::Minus        => Some('-'),
            TK::Star         => Some('*'),
            TK::Slash        => Some('/'),
            TK::Ampersand    => Some('&'),
            TK::Pipe         => Some('|'),
            TK::Less         => Some('<'),
            TK::Greater      => Some('>'),
            TK::Eq           => Some('='),
            TK::Tilde        => Some('~'),
            _ => None,
        }
    }

    /// Binary operators usable between two terms of an expression.
    #[inline]
    pub fn is_binary_op(&self) -> bool {
        use TokenKind as TK;
        matches!(
            self,
            TK::Plus
                | TK::Minus
                | TK::Star
                | TK::Slash
                | TK::Ampersand
                | TK::Pipe
                | TK::Less
                | TK::Greater
                | TK::Eq
        )
    }

    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        *self == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            TokenKind::Number => write!(f, "integer constant"),
            TokenKind::String => write!(f, "string constant"),
            TokenKind::EOF => write!(f, "end-of-file"),
            symbol => match symbol.symbol() {
                Some(c) => write!(f, "symbol '{c}'"),
                None => write!(f, "{symbol:?}"),
            },
        }
    }
}

/// Chunk of source code, encoded as a starting byte position and a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.end() as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// The full line of source that contains the start of the span,
    /// excluding the line terminator.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        let index = (self.index as usize).min(text.len());

        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..]
            .find('\n')
            .map(|i| index + i)
            .unwrap_or(text.len());
        let line = text[start..end].trim_end_matches('\r');

        let line_span = Span {
            index: start as u32,
            size: line.len() as u32,
        };

        (line, line_span)
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Program structure
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,

    // ------------------------------------------------------------------------
    // Types
    Int,
    Char,
    Boolean,
    Void,

    // ------------------------------------------------------------------------
    // Constants
    True,
    False,
    Null,
    This,

    // ------------------------------------------------------------------------
    // Statements
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    /// Exact match against the reserved words. Identifiers that merely
    /// start with a keyword, like `classic`, are not keywords.
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "class"       => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function"    => Some(Self::Function),
            "method"      => Some(Self::Method),
            "field"       => Some(Self::Field),
            "static"      => Some(Self::Static),
            "var"         => Some(Self::Var),
            // ----------------------------------------------------------------
            "int"         => Some(Self::Int),
            "char"        => Some(Self::Char),
            "boolean"     => Some(Self::Boolean),
            "void"        => Some(Self::Void),
            // ----------------------------------------------------------------
            "true"        => Some(Self::True),
            "false"       => Some(Self::False),
            "null"        => Some(Self::Null),
            "this"        => Some(Self::This),
            // ----------------------------------------------------------------
            "let"         => Some(Self::Let),
            "do"          => Some(Self::Do),
            "if"          => Some(Self::If),
            "else"        => Some(Self::Else),
            "while"       => Some(Self::While),
            "return"      => Some(Self::Return),
            // ----------------------------------------------------------------
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            // ----------------------------------------------------------------
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            // ----------------------------------------------------------------
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            // ----------------------------------------------------------------
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        }
    }

    /// Built-in primitive type names.
    #[inline]
    pub fn is_primitive_type(&self) -> bool {
        matches!(self, Self::Int | Self::Char | Self::Boolean)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "let x = 12;";

        let spans = &[
            Span::new(0, 3), // let
            Span::new(4, 1), // x
            Span::new(6, 1), // =
            Span::new(8, 2), // 12
        ];

        assert_eq!(spans[0].fragment(CODE), "let");
        assert_eq!(spans[1].fragment(CODE), "x");
        assert_eq!(spans[2].fragment(CODE), "=");
        assert_eq!(spans[3].fragment(CODE), "12");
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line() {
        const CODE: &str = "------------\n....here....\n------------";

        let span = Span::new(17, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(line_span, Span { index: 13, size: 12 });
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line_crlf() {
        const CODE: &str = "------------\r\n....here....\r\n------------";

        let span = Span::new(18, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(line_span, Span { index: 14, size: 12 });
    }

    #[test]
    fn test_span_surrounding_full_text() {
        const CODE: &str = "....here....";

        let (line, line_span) = Span::new(4, 4).surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(line_span, Span { index: 0, size: 12 });
    }

    #[test]
    fn test_keyword_exact_match() {
        assert_eq!(Keyword::parse("class"), Some(Keyword::Class));
        assert_eq!(Keyword::parse("classy"), None);
        assert_eq!(Keyword::parse("Class"), None);
        assert_eq!(Keyword::parse("do"), Some(Keyword::Do));
        assert_eq!(Keyword::parse("done"), None);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Semicolon.to_string(), "symbol ';'");
        assert_eq!(TokenKind::Keyword(Keyword::Let).to_string(), "keyword 'let'");
        assert_eq!(TokenKind::Ident.to_string(), "identifier");
    }
}
