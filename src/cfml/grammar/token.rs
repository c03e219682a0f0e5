//! Token definitions for CFML script
//!
//! Keywords are not tokens of their own: CFML keywords are case-insensitive and most of
//! them are only reserved in context (`param`, `lock`, `property` are fine variable names),
//! so every word lexes as [`Token::Identifier`] and the grammar compares text. The static
//! word tables live here.

use logos::Logos;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;

fn block_comment(lex: &mut logos::Lexer<'_, Token>) -> logos::FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            logos::FilterResult::Error(())
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,
    #[regex(r#""([^"]|"")*""#)]
    DoubleString,
    #[regex(r"'([^']|'')*'")]
    SingleString,

    #[token("#")]
    Hash,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("?:")]
    Elvis,
    #[token("=>")]
    Arrow,

    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("&=")]
    AmpersandAssign,
    #[token("%=")]
    PercentAssign,

    #[token("==")]
    Equal,
    #[token("===")]
    StrictEqual,
    #[token("!=")]
    NotEqual,
    #[token("!==")]
    StrictNotEqual,
    #[token("<>")]
    LessGreater,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("\\")]
    Backslash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("&")]
    Ampersand,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
}

impl Token {
    pub fn is_assignment_operator(&self) -> bool {
        matches!(
            self,
            Token::Assign
                | Token::PlusAssign
                | Token::MinusAssign
                | Token::StarAssign
                | Token::SlashAssign
                | Token::AmpersandAssign
                | Token::PercentAssign
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Token::DoubleString | Token::SingleString)
    }

    /// Symbolic binary operators; keyword operators are identifiers
    pub fn is_symbolic_binary_operator(&self) -> bool {
        matches!(
            self,
            Token::Equal
                | Token::StrictEqual
                | Token::NotEqual
                | Token::StrictNotEqual
                | Token::LessGreater
                | Token::Less
                | Token::LessEqual
                | Token::Greater
                | Token::GreaterEqual
                | Token::AndAnd
                | Token::OrOr
                | Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Backslash
                | Token::Percent
                | Token::Caret
                | Token::Ampersand
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::BlockComment => "comment",
            Token::Identifier => "identifier",
            Token::Integer => "integer",
            Token::Float => "number",
            Token::DoubleString | Token::SingleString => "string",
            Token::Hash => "'#'",
            Token::LeftParen => "'('",
            Token::RightParen => "')'",
            Token::LeftBracket => "'['",
            Token::RightBracket => "']'",
            Token::LeftBrace => "'{'",
            Token::RightBrace => "'}'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Colon => "':'",
            Token::Dot => "'.'",
            Token::Question => "'?'",
            Token::Elvis => "'?:'",
            Token::Arrow => "'=>'",
            Token::Assign => "'='",
            Token::PlusAssign => "'+='",
            Token::MinusAssign => "'-='",
            Token::StarAssign => "'*='",
            Token::SlashAssign => "'/='",
            Token::AmpersandAssign => "'&='",
            Token::PercentAssign => "'%='",
            Token::Equal => "'=='",
            Token::StrictEqual => "'==='",
            Token::NotEqual => "'!='",
            Token::StrictNotEqual => "'!=='",
            Token::LessGreater => "'<>'",
            Token::Less => "'<'",
            Token::LessEqual => "'<='",
            Token::Greater => "'>'",
            Token::GreaterEqual => "'>='",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Bang => "'!'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Backslash => "'\\'",
            Token::Percent => "'%'",
            Token::Caret => "'^'",
            Token::Ampersand => "'&'",
            Token::PlusPlus => "'++'",
            Token::MinusMinus => "'--'",
        };
        f.write_str(text)
    }
}

/// Words that can never be used as a plain identifier, lower case
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "else", "for", "while", "do", "switch", "case", "default", "try", "catch",
        "finally", "return", "break", "continue", "function", "var", "new", "true", "false",
    ]
    .into_iter()
    .chain(KEYWORD_OPERATORS.iter().copied())
    .collect()
});

/// Single-word binary operators and `not`, lower case
pub static KEYWORD_OPERATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "or", "xor", "eqv", "imp", "mod", "eq", "neq", "is", "gt", "gte", "ge", "lt",
        "lte", "le", "contains", "not", "does",
    ]
    .into_iter()
    .collect()
});

/// Scope prefixes folded into the first identifier of a dotted name, lower case
pub static SCOPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "variables", "local", "arguments", "this", "request", "session", "application",
        "server", "url", "form", "cgi", "cookie", "client", "thread", "super",
    ]
    .into_iter()
    .collect()
});

/// Statement keywords written tag-style (`lock name="x" { }`)
pub static TAG_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "lock", "thread", "transaction", "param", "admin", "property", "include", "import",
        "abort", "exit", "throw",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_scope(word: &str) -> bool {
    SCOPES.contains(word.to_ascii_lowercase().as_str())
}

pub fn is_tag_keyword(word: &str) -> bool {
    TAG_KEYWORDS.contains(word.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source).filter_map(Result::ok).collect()
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            lex("a ?: b === c"),
            vec![
                Token::Identifier,
                Token::Elvis,
                Token::Identifier,
                Token::StrictEqual,
                Token::Identifier
            ]
        );
        assert_eq!(lex("i++ - -j"), vec![
            Token::Identifier,
            Token::PlusPlus,
            Token::Minus,
            Token::Minus,
            Token::Identifier
        ]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex("a // line\n/* block\n */ b"),
            vec![Token::Identifier, Token::Identifier]
        );
    }

    #[test]
    fn test_unterminated_block_comment_is_an_error() {
        let results: Vec<_> = Token::lexer("a /* open").collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }

    #[test]
    fn test_strings_with_doubled_quotes() {
        assert_eq!(lex(r#""say ""hi""""#), vec![Token::DoubleString]);
        assert_eq!(lex("'it''s'"), vec![Token::SingleString]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42 4.2 1e10"), vec![Token::Integer, Token::Float, Token::Float]);
    }

    #[test]
    fn test_word_tables_ignore_case() {
        assert!(is_reserved("FUNCTION"));
        assert!(is_reserved("And"));
        assert!(!is_reserved("param"));
        assert!(is_scope("Local"));
        assert!(is_tag_keyword("LOCK"));
    }
}
