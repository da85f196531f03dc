//! Lexical analysis for the pattern language.
//!
//! This module tokenizes the compact Java-flavoured surface language used to
//! build pattern and scope trees. Free-variable names are ordinary
//! identifiers here: `$` is a valid identifier character, so `$cond` and
//! `$body$` lex as plain identifiers and only the matcher assigns them
//! meaning.

use logos::Logos;
use std::fmt;

use crate::error::LexerError;
use crate::tree::Span;

/// Token types for the pattern language
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token {
    // Keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("new")]
    New,
    #[token("instanceof")]
    InstanceOf,
    #[token("synchronized")]
    Synchronized,
    #[token("assert")]
    Assert,
    #[token("class")]
    Class,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("throws")]
    Throws,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Primitive types
    #[token("boolean")]
    Boolean,
    #[token("byte")]
    Byte,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("char")]
    Char,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("void")]
    Void,

    // Modifiers
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("abstract")]
    Abstract,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("native")]
    Native,
    #[token("transient")]
    Transient,
    #[token("volatile")]
    Volatile,
    #[token("strictfp")]
    Strictfp,

    // Identifiers (must come after keywords to avoid conflicts).
    // `$` is part of the identifier alphabet for sentinel names.
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_owned(), priority = 1)]
    Identifier(String),

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLiteral(i64),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len()-1])
    })]
    StringLiteral(String),

    #[regex(r"'([^'\\]|\\.)'", |lex| {
        let s = lex.slice();
        unescape_char(&s[1..s.len()-1])
    })]
    CharLiteral(char),

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
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
    #[token("%=")]
    PercentAssign,
    #[token("&=")]
    AmpAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token(">>>=")]
    UShrAssign,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,
    #[token("~")]
    Tilde,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("?")]
    Question,
    #[token("::")]
    DoubleColon,
    #[token("->")]
    Arrow,

    // Delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("@")]
    At,
}

/// Unescape a string literal
fn unescape_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('0') => result.push('\0'),
                Some(c) => {
                    result.push('\\');
                    result.push(c);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Unescape a character literal body (the part between the quotes)
fn unescape_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let first = chars.next()?;

    if first != '\\' {
        return Some(first);
    }

    match chars.next()? {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '0' => Some('\0'),
        other => Some(other),
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) => write!(f, "Identifier({})", s),
            Token::IntLiteral(v) => write!(f, "Int({})", v),
            Token::FloatLiteral(v) => write!(f, "Float({})", v),
            Token::StringLiteral(s) => write!(f, "String(\"{}\")", s),
            Token::CharLiteral(c) => write!(f, "Char('{}')", c),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer for the pattern language
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: Token::lexer(input),
        }
    }

    /// Tokenize the whole input, failing on the first unrecognized token.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexerError> {
        let mut tokens = Vec::new();

        while let Some(result) = self.inner.next() {
            let span = Span::from(self.inner.span());

            match result {
                Ok(token) => tokens.push(SpannedToken { token, span }),
                Err(_) => {
                    return Err(LexerError::UnrecognizedToken {
                        token: self.inner.slice().to_string(),
                        span,
                    });
                }
            }
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .expect("tokenize should succeed")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokens("if else while do for return new instanceof class"),
            vec![
                Token::If,
                Token::Else,
                Token::While,
                Token::Do,
                Token::For,
                Token::Return,
                Token::New,
                Token::InstanceOf,
                Token::Class,
            ]
        );
    }

    #[test]
    fn test_sentinel_identifiers() {
        assert_eq!(
            tokens("$cond $body$ plain _x $1"),
            vec![
                Token::Identifier("$cond".to_string()),
                Token::Identifier("$body$".to_string()),
                Token::Identifier("plain".to_string()),
                Token::Identifier("_x".to_string()),
                Token::Identifier("$1".to_string()),
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            tokens(r#"42 3.25 "a\nb" 'x' '\n' true false null"#),
            vec![
                Token::IntLiteral(42),
                Token::FloatLiteral(3.25),
                Token::StringLiteral("a\nb".to_string()),
                Token::CharLiteral('x'),
                Token::CharLiteral('\n'),
                Token::True,
                Token::False,
                Token::Null,
            ]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            tokens(">>> >>= >> >= > :: -> ++ += +"),
            vec![
                Token::UShr,
                Token::ShrAssign,
                Token::Shr,
                Token::GreaterEqual,
                Token::Greater,
                Token::DoubleColon,
                Token::Arrow,
                Token::PlusPlus,
                Token::PlusAssign,
                Token::Plus,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokens("a // line\n b /* block */ c"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Identifier("b".to_string()),
                Token::Identifier("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_unrecognized_token() {
        let err = Lexer::new("a # b").tokenize().unwrap_err();
        match err {
            LexerError::UnrecognizedToken { token, .. } => assert_eq!(token, "#"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
