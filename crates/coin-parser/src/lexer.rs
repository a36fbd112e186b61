//! Line tokenizer built on Logos.
//!
//! Ledger files are line oriented, so the parser hands one line at a time to
//! [`tokenize`]. Transaction headers are the exception: their description is
//! free text and only the leading date goes through the lexer.

use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token types produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token<'src> {
    // ===== Literals =====
    /// An absolute date, `YYYY/MM/DD`.
    #[regex(r"[0-9]{4}/[0-9]{1,2}/[0-9]{1,2}")]
    Date(&'src str),

    /// A date relative to the reference date, e.g. `+3d`, `-1m`, `+2y`.
    #[regex(r"[+-][0-9]+[dmy]")]
    RelativeDate(&'src str),

    /// A decimal number with optional sign.
    #[regex(r"[+-]?[0-9]+(\.[0-9]*)?")]
    Number(&'src str),

    /// A double-quoted commodity symbol; the slice includes the quotes.
    #[regex(r#""[^"\n]*""#)]
    Quoted(&'src str),

    /// An account name, commodity symbol or directive keyword.
    #[regex(r#"[^ \t\r\n;="0-9+\-][^ \t\r\n;="]*"#)]
    #[regex(r#"[0-9]+[A-Za-z_][^ \t\r\n;="]*"#)]
    Word(&'src str),

    // ===== Punctuation =====
    /// Introduces a balance assertion.
    #[token("=")]
    Equals,

    /// A `;` comment running to the end of the line.
    #[regex(r";[^\n]*")]
    Comment(&'src str),
}

impl<'src> Token<'src> {
    /// The directive keyword spelled by a `Word` token.
    ///
    /// Only the parser knows whether a word stands where a directive may
    /// start, so names such as `P` or `note` stay plain words here.
    pub fn keyword(&self) -> Option<Keyword> {
        match *self {
            Self::Word("commodity") => Some(Keyword::Commodity),
            Self::Word("account") => Some(Keyword::Account),
            Self::Word("format") => Some(Keyword::Format),
            Self::Word("note") => Some(Keyword::Note),
            Self::Word("P") => Some(Keyword::Price),
            Self::Word("test") => Some(Keyword::Test),
            _ => None,
        }
    }

    /// The commodity symbol carried by a `Word` or `Quoted` token.
    pub fn symbol(&self) -> Option<&'src str> {
        match *self {
            Self::Word(s) => Some(s),
            Self::Quoted(s) => Some(&s[1..s.len() - 1]),
            _ => None,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(s)
            | Self::RelativeDate(s)
            | Self::Number(s)
            | Self::Quoted(s)
            | Self::Word(s)
            | Self::Comment(s) => write!(f, "{s}"),
            Self::Equals => write!(f, "="),
        }
    }
}

/// Words with a meaning at the start of a directive or sub-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `commodity`, a directive and an account sub-line.
    Commodity,
    /// `account`
    Account,
    /// `format`, a commodity sub-line.
    Format,
    /// `note`, a declaration sub-line.
    Note,
    /// `P`, the price directive.
    Price,
    /// `test`, which opens a test block.
    Test,
}

/// Tokenize one line into `(Token, byte range)` pairs.
///
/// Ranges are relative to the start of `line`. On unrecognized input the
/// offending range is returned as the error.
pub fn tokenize(line: &str) -> Result<Vec<(Token<'_>, Range<usize>)>, Range<usize>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(line);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(lexer.span()),
        }
    }
    Ok(tokens)
}

/// Lex only the first token of a line.
pub fn first_token(line: &str) -> Option<Result<(Token<'_>, Range<usize>), Range<usize>>> {
    let mut lexer = Token::lexer(line);
    lexer
        .next()
        .map(|result| result.map(|token| (token, lexer.span())).map_err(|()| lexer.span()))
}
