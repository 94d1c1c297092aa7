//! Peekable token stream.
use itertools::{multipeek, MultiPeek};

use crate::error::{JackError, JackResult, LexError, SyntaxError};

use super::{lexer::LexerIter, Lexer, Span, Token, TokenKind};

/// Buffered stream of tokens with two tokens of look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer.
///
/// The peek semantics are determined by the internal `MultiPeek`, which
/// advances a peek cursor on every call. Every method here resets the peek
/// cursor before it returns, so [`TokenStream::peek`] and
/// [`TokenStream::peek_next`] always look from the current token and
/// leave the stream unchanged.
pub struct TokenStream<'a> {
    lexer: MultiPeek<LexerIter<'a>>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            original: lexer.source_code(),
            lexer: multipeek(lexer),
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Helper function to extract the token's string fragment
    /// from the original source code.
    #[inline]
    pub fn fragment(&self, token: &Token) -> &'a str {
        token.fragment(self.original)
    }

    /// Token standing in for everything after the end of the source.
    fn end_of_source(&self) -> Token {
        Token {
            span: Span::new(self.original.len() as u32, 0),
            kind: TokenKind::EOF,
        }
    }

    fn convert(&self, item: Option<&Result<Token, LexError>>) -> JackResult<Token> {
        match item {
            Some(Ok(token)) => Ok(*token),
            Some(Err(err)) => Err(JackError::Lex(err.clone())),
            None => Ok(self.end_of_source()),
        }
    }

    /// Return the current token without advancing the cursor.
    pub fn peek(&mut self) -> JackResult<Token> {
        self.lexer.reset_peek();
        let item = self.lexer.peek().cloned();
        self.lexer.reset_peek();
        self.convert(item.as_ref())
    }

    /// Return the token after the current one, without advancing the cursor.
    ///
    /// Fails with the current token's lexical error if it has one.
    pub fn peek_next(&mut self) -> JackResult<Token> {
        self.lexer.reset_peek();
        let first = self.lexer.peek().cloned();
        let second = self.lexer.peek().cloned();
        self.lexer.reset_peek();

        let first = self.convert(first.as_ref())?;
        if first.kind == TokenKind::EOF {
            return Ok(first);
        }
        self.convert(second.as_ref())
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&mut self) -> JackResult<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    /// Consumes the current token regardless of type.
    ///
    /// At the end of the token stream an EOF token is returned.
    pub fn next_token(&mut self) -> JackResult<Token> {
        self.lexer.reset_peek();
        let item = self.lexer.next();
        self.convert(item.as_ref())
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Returns false when token kinds
    /// do not match, or the token stream is at the end.
    pub fn match_token(&mut self, token_kind: TokenKind) -> JackResult<bool> {
        let is_match = self.peek_kind()? == token_kind;
        if is_match {
            self.next_token()?;
        }
        Ok(is_match)
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token kind, otherwise
    /// a syntax error is returned. The cursor is not advanced if
    /// the token kind does not match.
    pub fn consume(&mut self, token_kind: TokenKind) -> JackResult<Token> {
        let token = self.peek()?;
        if token.kind != token_kind {
            return Err(self.error(token_kind, &token));
        }
        self.next_token()
    }

    /// Return the current token and advance the cursor, if it
    /// matches any of the given kinds.
    pub fn consume_any(&mut self, token_kinds: &[TokenKind]) -> JackResult<Token> {
        let token = self.peek()?;
        if token_kinds.contains(&token.kind) {
            return self.next_token();
        }

        let kind_names = token_kinds
            .iter()
            .map(|kind| kind.to_string())
            .collect::<Vec<_>>();
        Err(self.error(format!("one of {}", kind_names.join(", ")), &token))
    }

    /// Build a syntax error pointing at the given token.
    #[inline(never)]
    #[cold]
    pub fn error(&self, expected: impl ToString, token: &Token) -> JackError {
        SyntaxError::new(self.original, expected, token).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::Keyword;

    #[test]
    fn test_peek_is_idempotent() {
        let mut stream = TokenStream::new(Lexer::new("a [ b"));

        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Ident);
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Ident);
        assert_eq!(stream.peek_next().unwrap().kind, TokenKind::LeftBracket);
        assert_eq!(stream.peek_next().unwrap().kind, TokenKind::LeftBracket);
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Ident);

        stream.next_token().unwrap();
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::LeftBracket);
        assert_eq!(stream.peek_next().unwrap().kind, TokenKind::Ident);
    }

    #[test]
    fn test_peek_next_at_end() {
        let mut stream = TokenStream::new(Lexer::new("x"));
        assert_eq!(stream.peek_next().unwrap().kind, TokenKind::EOF);

        stream.next_token().unwrap();
        assert_eq!(stream.peek_next().unwrap().kind, TokenKind::EOF);

        // Past the end the stream keeps returning EOF.
        stream.next_token().unwrap();
        assert_eq!(stream.next_token().unwrap().kind, TokenKind::EOF);
    }

    #[test]
    fn test_consume_mismatch_does_not_advance() {
        let mut stream = TokenStream::new(Lexer::new("class Foo"));

        let err = stream.consume(TokenKind::Ident).unwrap_err();
        assert!(matches!(err, JackError::Syntax(_)));

        let token = stream.consume(TokenKind::Keyword(Keyword::Class)).unwrap();
        assert_eq!(stream.fragment(&token), "class");
        assert!(stream.match_token(TokenKind::Ident).unwrap());
        assert!(!stream.match_token(TokenKind::Ident).unwrap());
    }

    #[test]
    fn test_consume_any() {
        let mut stream = TokenStream::new(Lexer::new("field ;"));
        let kinds = [
            TokenKind::Keyword(Keyword::Static),
            TokenKind::Keyword(Keyword::Field),
        ];

        assert!(stream.consume_any(&kinds).is_ok());
        let err = stream.consume_any(&kinds).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("expected one of keyword 'static', keyword 'field', found symbol ';'"));
    }

    #[test]
    fn test_lex_error_surfaces() {
        let mut stream = TokenStream::new(Lexer::new("a $"));
        assert!(matches!(stream.peek_next(), Err(JackError::Lex(_))));
        assert!(stream.next_token().is_ok());
        assert!(matches!(stream.peek(), Err(JackError::Lex(_))));
    }
}
