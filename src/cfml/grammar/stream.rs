//! Rewindable token stream
//!
//! The grammar needs to back up after a failed alternative, so the whole input is lexed up
//! front into a vector and the stream is only a cursor over it. Spans are absolute byte
//! offsets into the full source, including for streams lexed from a region of it (string
//! interpolation).

use super::token::Token;
use logos::Logos;
use std::ops::Range;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct TokenStream {
    source: Rc<str>,
    lexemes: Vec<Lexeme>,
    /// Spans the lexer could not match
    errors: Vec<Range<usize>>,
    position: usize,
    end_offset: usize,
}

impl TokenStream {
    pub fn new(source: Rc<str>) -> Self {
        let region = 0..source.len();
        Self::for_region(source, region)
    }

    /// Lex only `region` of `source`, keeping spans absolute
    pub fn for_region(source: Rc<str>, region: Range<usize>) -> Self {
        let base = region.start;
        let text = source.get(region.clone()).unwrap_or("");
        let mut lexemes = Vec::new();
        let mut errors = Vec::new();
        for (result, span) in Token::lexer(text).spanned() {
            let span = span.start + base..span.end + base;
            match result {
                Ok(token) => lexemes.push(Lexeme { token, span }),
                Err(()) => errors.push(span),
            }
        }
        Self {
            source,
            lexemes,
            errors,
            position: 0,
            end_offset: region.end,
        }
    }

    pub fn source(&self) -> &Rc<str> {
        &self.source
    }

    pub fn lex_errors(&self) -> &[Range<usize>] {
        &self.errors
    }

    pub fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.position)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&Lexeme> {
        self.lexemes.get(self.position + n)
    }

    pub fn peek_token(&self) -> Option<Token> {
        self.peek().map(|lexeme| lexeme.token)
    }

    pub fn nth_token(&self, n: usize) -> Option<Token> {
        self.peek_nth(n).map(|lexeme| lexeme.token)
    }

    pub fn advance(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.position).cloned();
        if lexeme.is_some() {
            self.position += 1;
        }
        lexeme
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.lexemes.len()
    }

    pub fn text(&self, lexeme: &Lexeme) -> &str {
        self.source.get(lexeme.span.clone()).unwrap_or("")
    }

    /// Text of the lexeme `n` tokens ahead, empty past the end
    pub fn nth_text(&self, n: usize) -> &str {
        self.peek_nth(n).map_or("", |lexeme| self.text(lexeme))
    }

    /// Whether the lexeme `n` ahead is the identifier `word`, ignoring case
    pub fn nth_is_word(&self, n: usize, word: &str) -> bool {
        matches!(self.nth_token(n), Some(Token::Identifier)) && self.nth_text(n).eq_ignore_ascii_case(word)
    }

    /// Byte offset where the next token starts, or the end of the input
    pub fn offset(&self) -> usize {
        self.peek().map_or(self.end_offset, |lexeme| lexeme.span.start)
    }

    /// Byte offset where the previous token ended
    pub fn previous_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|index| self.lexemes.get(index))
            .map_or_else(|| self.offset(), |lexeme| lexeme.span.end)
    }

    pub fn mark(&self) -> usize {
        self.position
    }

    pub fn seek(&mut self, mark: usize) {
        self.position = mark.min(self.lexemes.len());
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_seek() {
        let mut stream = TokenStream::new(Rc::from("a = 1;"));
        let mark = stream.mark();
        assert_eq!(stream.advance().map(|l| l.token), Some(Token::Identifier));
        assert_eq!(stream.peek_token(), Some(Token::Assign));
        stream.seek(mark);
        assert_eq!(stream.peek_token(), Some(Token::Identifier));
        assert_eq!(stream.len(), 4);
    }

    #[test]
    fn test_region_spans_are_absolute() {
        let source: Rc<str> = Rc::from("'a#x + y#b'");
        let stream = TokenStream::for_region(source, 3..8);
        let spans: Vec<_> = (0..3).filter_map(|n| stream.peek_nth(n)).map(|l| l.span.clone()).collect();
        assert_eq!(spans, vec![3..4, 5..6, 7..8]);
        assert_eq!(stream.nth_text(2), "y");
        assert_eq!(stream.offset(), 3);
    }

    #[test]
    fn test_lex_errors_are_collected() {
        let stream = TokenStream::new(Rc::from("a @ b"));
        assert_eq!(stream.lex_errors(), &[2..3]);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_nth_is_word_ignores_case() {
        let stream = TokenStream::new(Rc::from("LOCK name"));
        assert!(stream.nth_is_word(0, "lock"));
        assert!(!stream.nth_is_word(1, "lock"));
        assert!(!stream.nth_is_word(5, "lock"));
    }
}
