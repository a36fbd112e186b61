//! The line-oriented item parser.
//!
//! Every top-level entry starts on an unindented line and extends over the
//! indented (or `;`) lines that follow it; a blank line or the next
//! unindented line ends it. [`Parser`] yields one entry at a time and stops
//! for good after the first error.

use chrono::NaiveDate;
use coin_core::Tags;
use std::iter::Peekable;
use std::ops::Range;
use std::vec::IntoIter;

use crate::date::parse_date;
use crate::error::{ParseError, ParseErrorKind};
use crate::item::{
    AccountDecl, CommodityDecl, Item, PriceDecl, RawAmount, RawPosting, RawTransaction, TestBlock,
};
use crate::lexer::{first_token, tokenize, Keyword, Token};
use crate::span::{Span, Spanned};

/// A physical line of the source.
#[derive(Debug, Clone, Copy)]
struct Line<'src> {
    text: &'src str,
    start: usize,
    number: usize,
}

impl<'src> Line<'src> {
    fn span(&self) -> Span {
        Span::new(self.start, self.start + self.text.len(), self.number)
    }

    fn span_of(&self, range: Range<usize>) -> Span {
        Span::new(self.start + range.start, self.start + range.end, self.number)
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn is_indented(&self) -> bool {
        self.text.starts_with([' ', '\t'])
    }

    /// The note text of a `;` line.
    fn comment(&self) -> Option<&'src str> {
        self.text.trim_start().strip_prefix(';').map(note_text)
    }

    fn error(&self, kind: ParseErrorKind, range: Range<usize>) -> ParseError {
        ParseError::new(kind, self.span_of(range))
    }
}

/// Strip the single whitespace character that follows a `;`.
fn note_text(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => text,
    }
}

/// Splits the source into lines, tracking offsets and line numbers.
struct Lines<'src> {
    source: &'src str,
    offset: usize,
    number: usize,
}

impl<'src> Iterator for Lines<'src> {
    type Item = Line<'src>;

    fn next(&mut self) -> Option<Line<'src>> {
        if self.offset >= self.source.len() {
            return None;
        }
        let rest = &self.source[self.offset..];
        let len = rest.find('\n').unwrap_or(rest.len());
        let text = rest[..len].strip_suffix('\r').unwrap_or(&rest[..len]);
        let line = Line {
            text,
            start: self.offset,
            number: self.number + 1,
        };
        self.offset += len + 1;
        self.number += 1;
        Some(line)
    }
}

type Tokens<'src> = Peekable<IntoIter<(Token<'src>, Range<usize>)>>;

/// A lazy parser over one source text.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use coin_parser::{Item, Parser};
///
/// let source = "2018/10/01 payee1\n  AA 10.00 CAD\n  BB -10.00 CAD = 50.00 CAD\n";
/// let reference = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
/// let items: Vec<_> = Parser::new(source, reference).collect::<Result<_, _>>().unwrap();
///
/// let Item::Transaction(txn) = &items[0].value else { panic!() };
/// assert_eq!(txn.description, "payee1");
/// assert_eq!(txn.postings.len(), 2);
/// ```
pub struct Parser<'src> {
    lines: Peekable<Lines<'src>>,
    reference: NaiveDate,
    done: bool,
}

impl<'src> Parser<'src> {
    /// Create a parser; relative dates are resolved against `reference`.
    pub fn new(source: &'src str, reference: NaiveDate) -> Self {
        Self {
            lines: Lines {
                source,
                offset: 0,
                number: 0,
            }
            .peekable(),
            reference,
            done: false,
        }
    }

    fn next_item(&mut self) -> Result<Option<Spanned<Item>>, ParseError> {
        while let Some(line) = self.lines.next() {
            if line.is_blank() || line.comment().is_some() {
                continue;
            }
            if line.is_indented() {
                return Err(ParseError::new(ParseErrorKind::UnexpectedIndent, line.span()));
            }
            let (token, range) = match first_token(line.text) {
                Some(Ok(first)) => first,
                Some(Err(range)) => {
                    let found = line.text[range.clone()].to_string();
                    return Err(line.error(ParseErrorKind::UnexpectedChar(found), range));
                }
                None => continue,
            };
            let item = match token {
                Token::Date(text) | Token::RelativeDate(text) => {
                    self.transaction(line, text, range)?
                }
                token => match token.keyword() {
                    Some(Keyword::Commodity) => self.commodity(line)?,
                    Some(Keyword::Account) => self.account(line)?,
                    Some(Keyword::Price) => self.price(line)?,
                    Some(Keyword::Test) => self.test(line, range)?,
                    Some(Keyword::Format | Keyword::Note) | None => {
                        return Err(line.error(
                            ParseErrorKind::UnknownDirective(token.to_string()),
                            range,
                        ))
                    }
                },
            };
            return Ok(Some(item));
        }
        Ok(None)
    }

    /// The next line if it continues the current entry.
    fn continuation(&mut self) -> Option<Line<'src>> {
        let line = self.lines.peek()?;
        if line.is_blank() || !(line.is_indented() || line.comment().is_some()) {
            return None;
        }
        self.lines.next()
    }

    fn date(&self, line: Line<'src>, text: &str, range: Range<usize>) -> Result<NaiveDate, ParseError> {
        parse_date(text, self.reference)
            .ok_or_else(|| line.error(ParseErrorKind::InvalidDate(text.to_string()), range))
    }

    fn transaction(
        &mut self,
        header: Line<'src>,
        date: &str,
        range: Range<usize>,
    ) -> Result<Spanned<Item>, ParseError> {
        let posted = self
            .date(header, date, range.clone())
            .map_err(|e| e.with_context("transaction header"))?;

        let mut rest = header.text[range.end..].trim_start();
        let mut code = "";
        if let Some((inner, tail)) = rest.strip_prefix('(').and_then(|r| r.split_once(')')) {
            code = inner;
            rest = tail.trim_start();
        }
        let mut note = Vec::new();
        let description = match rest.split_once(';') {
            Some((description, inline)) => {
                note.push(note_text(inline));
                description.trim_end()
            }
            None => rest.trim_end(),
        };

        let mut span = header.span();
        let mut postings: Vec<(RawPosting, Vec<&str>)> = Vec::new();
        while let Some(line) = self.continuation() {
            span = span.merge(&line.span());
            if let Some(text) = line.comment() {
                match postings.last_mut() {
                    Some((_, posting_note)) => posting_note.push(text),
                    None => note.push(text),
                }
            } else {
                postings.push(posting(line)?);
            }
        }

        if postings.len() < 2 {
            return Err(ParseError::new(ParseErrorKind::TooFewPostings, header.span()));
        }
        if let Some((elided, _)) = postings
            .iter()
            .filter(|(p, _)| p.quantity.is_none())
            .nth(1)
        {
            return Err(ParseError::new(
                ParseErrorKind::MultipleElided,
                Span::new(span.start, span.end, elided.line),
            ));
        }

        let note = note.join("\n");
        let transaction = RawTransaction {
            posted,
            code: code.to_string(),
            description: description.to_string(),
            tags: Tags::parse(&note),
            note,
            postings: postings
                .into_iter()
                .map(|(mut posting, lines)| {
                    posting.note = lines.join("\n");
                    posting.tags = Tags::parse(&posting.note);
                    posting
                })
                .collect(),
        };
        Ok(Spanned::new(Item::Transaction(transaction), span))
    }

    fn price(&mut self, line: Line<'src>) -> Result<Spanned<Item>, ParseError> {
        let mut tokens = line_tokens(line)?.into_iter().peekable();
        tokens.next();
        let date = match tokens.next() {
            Some((Token::Date(text) | Token::RelativeDate(text), range)) => {
                self.date(line, text, range)?
            }
            other => return Err(expected(line, "date", other)),
        };
        let commodity = match tokens.next() {
            Some((token, _)) if token.symbol().is_some() => token.symbol().unwrap_or_default(),
            other => return Err(expected(line, "commodity", other)),
        };
        let value = match amount(&mut tokens, line)? {
            Some(value) if value.commodity.is_some() => value,
            Some(_) => return Err(ParseError::new(ParseErrorKind::MissingCurrency, line.span())),
            None => return Err(expected(line, "price amount", tokens.next())),
        };
        end_of_line(&mut tokens, line)?;
        Ok(Spanned::new(
            Item::Price(PriceDecl {
                date,
                commodity: commodity.to_string(),
                value,
            }),
            line.span(),
        ))
    }

    fn commodity(&mut self, line: Line<'src>) -> Result<Spanned<Item>, ParseError> {
        let mut tokens = line_tokens(line)?.into_iter().peekable();
        tokens.next();
        let symbol = match tokens.next() {
            Some((token, _)) if token.symbol().is_some() => token.symbol().unwrap_or_default(),
            other => return Err(expected(line, "commodity symbol", other)),
        };
        let mut note = inline_note(&mut tokens, line)?;
        let mut format = None;
        let mut span = line.span();
        while let Some(sub) = self.continuation() {
            span = span.merge(&sub.span());
            if let Some(text) = sub.comment() {
                note.push(text);
                continue;
            }
            match sub_line_keyword(sub)? {
                Some((token, _)) if token.keyword() == Some(Keyword::Format) => {
                    let mut tokens = line_tokens(sub)?.into_iter().peekable();
                    tokens.next();
                    format = amount(&mut tokens, sub)?;
                    if format.is_none() {
                        return Err(expected(sub, "example amount", tokens.next()));
                    }
                    note.extend(inline_note(&mut tokens, sub)?);
                }
                Some((token, _)) if token.keyword() == Some(Keyword::Note) => {
                    note.push(sub_line_text(sub, "note"));
                }
                Some((token, range)) => {
                    return Err(sub.error(ParseErrorKind::UnknownDirective(token.to_string()), range))
                }
                None => {}
            }
        }
        Ok(Spanned::new(
            Item::Commodity(CommodityDecl {
                symbol: symbol.to_string(),
                format,
                note: note.join("\n"),
            }),
            span,
        ))
    }

    fn account(&mut self, line: Line<'src>) -> Result<Spanned<Item>, ParseError> {
        let mut tokens = line_tokens(line)?.into_iter().peekable();
        tokens.next();
        let name = match tokens.next() {
            Some((Token::Word(name), _)) => name,
            Some((_, range)) => return Err(line.error(ParseErrorKind::MissingAccount, range)),
            None => return Err(ParseError::new(ParseErrorKind::MissingAccount, line.span())),
        };
        let mut note = inline_note(&mut tokens, line)?;
        let mut commodity = None;
        let mut span = line.span();
        while let Some(sub) = self.continuation() {
            span = span.merge(&sub.span());
            if let Some(text) = sub.comment() {
                note.push(text);
                continue;
            }
            match sub_line_keyword(sub)? {
                Some((token, _)) if token.keyword() == Some(Keyword::Commodity) => {
                    let mut tokens = line_tokens(sub)?.into_iter().peekable();
                    tokens.next();
                    match tokens.next() {
                        Some((token, _)) if token.symbol().is_some() => {
                            commodity = token.symbol().map(str::to_string);
                            note.extend(inline_note(&mut tokens, sub)?);
                        }
                        other => return Err(expected(sub, "commodity symbol", other)),
                    }
                }
                Some((token, _)) if token.keyword() == Some(Keyword::Note) => {
                    note.push(sub_line_text(sub, "note"));
                }
                Some((token, range)) => {
                    return Err(sub.error(ParseErrorKind::UnknownDirective(token.to_string()), range))
                }
                None => {}
            }
        }
        Ok(Spanned::new(
            Item::Account(AccountDecl {
                name: name.to_string(),
                commodity,
                note: note.join("\n"),
            }),
            span,
        ))
    }

    fn test(&mut self, line: Line<'src>, keyword: Range<usize>) -> Result<Spanned<Item>, ParseError> {
        let cmd = line.text[keyword.end..].trim();
        let mut expected = String::new();
        let mut span = line.span();
        for next in self.lines.by_ref() {
            span = span.merge(&next.span());
            if next.text.trim() == "end test" {
                return Ok(Spanned::new(
                    Item::Test(TestBlock {
                        cmd: cmd.to_string(),
                        expected,
                    }),
                    span,
                ));
            }
            expected.push_str(next.text);
            expected.push('\n');
        }
        Err(ParseError::new(ParseErrorKind::UnterminatedTest, line.span()))
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Spanned<Item>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_item() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Parse a whole source text, stopping at the first error.
pub fn parse(source: &str, reference: NaiveDate) -> Result<Vec<Spanned<Item>>, ParseError> {
    Parser::new(source, reference).collect()
}

fn line_tokens(line: Line<'_>) -> Result<Vec<(Token<'_>, Range<usize>)>, ParseError> {
    tokenize(line.text).map_err(|range| {
        let found = line.text[range.clone()].to_string();
        line.error(ParseErrorKind::UnexpectedChar(found), range)
    })
}

/// The leading keyword of a declaration sub-line; `note` text is not lexed.
fn sub_line_keyword(line: Line<'_>) -> Result<Option<(Token<'_>, Range<usize>)>, ParseError> {
    first_token(line.text).transpose().map_err(|range| {
        let found = line.text[range.clone()].to_string();
        line.error(ParseErrorKind::UnexpectedChar(found), range)
    })
}

fn expected(line: Line<'_>, what: &str, found: Option<(Token<'_>, Range<usize>)>) -> ParseError {
    match found {
        Some((token, range)) => line
            .error(ParseErrorKind::Expected(what.to_string()), range)
            .with_context(format!("found '{token}'")),
        None => ParseError::new(ParseErrorKind::Expected(what.to_string()), line.span())
            .with_context("found end of line"),
    }
}

fn end_of_line(tokens: &mut Tokens<'_>, line: Line<'_>) -> Result<(), ParseError> {
    match tokens.next() {
        None | Some((Token::Comment(_), _)) => Ok(()),
        other => Err(expected(line, "end of line", other)),
    }
}

/// An optional trailing `; note`, which must end the line.
fn inline_note<'src>(tokens: &mut Tokens<'src>, line: Line<'src>) -> Result<Vec<&'src str>, ParseError> {
    match tokens.next() {
        None => Ok(Vec::new()),
        Some((Token::Comment(text), _)) => Ok(vec![note_text(&text[1..])]),
        other => Err(expected(line, "end of line", other)),
    }
}

/// The free text following a sub-line keyword.
fn sub_line_text<'src>(line: Line<'src>, keyword: &str) -> &'src str {
    let text = line.text.trim_start();
    text.get(keyword.len()..).unwrap_or_default().trim()
}

/// `NUMBER [SYMBOL]` or `SYMBOL NUMBER`, if the next token starts an amount.
fn amount(tokens: &mut Tokens<'_>, line: Line<'_>) -> Result<Option<RawAmount>, ParseError> {
    let Some((token, _)) = tokens.peek().cloned() else {
        return Ok(None);
    };
    if let Token::Number(number) = token {
        tokens.next();
        let symbol = tokens.peek().and_then(|(t, _)| t.symbol());
        if symbol.is_some() {
            tokens.next();
        }
        return Ok(Some(RawAmount::new(number, symbol)));
    }
    let Some(symbol) = token.symbol() else {
        return Ok(None);
    };
    tokens.next();
    match tokens.next() {
        Some((Token::Number(number), _)) => Ok(Some(RawAmount::new(number, Some(symbol)))),
        other => Err(expected(line, "number", other)),
    }
}

fn posting(line: Line<'_>) -> Result<(RawPosting, Vec<&str>), ParseError> {
    let mut tokens = line_tokens(line)?.into_iter().peekable();
    let account = match tokens.next() {
        Some((Token::Word(name), _)) => name,
        Some((token, range)) => {
            return Err(line
                .error(ParseErrorKind::MissingAccount, range)
                .with_context(format!("found '{token}'")))
        }
        None => return Err(ParseError::new(ParseErrorKind::MissingAccount, line.span())),
    };
    let quantity = amount(&mut tokens, line)?;
    let balance = if matches!(tokens.peek(), Some((Token::Equals, _))) {
        tokens.next();
        match amount(&mut tokens, line)? {
            Some(balance) => Some(balance),
            None => return Err(expected(line, "balance amount", tokens.next())),
        }
    } else {
        None
    };
    let note = inline_note(&mut tokens, line)?;
    Ok((
        RawPosting {
            account: account.to_string(),
            quantity,
            balance,
            note: String::new(),
            tags: Tags::new(),
            line: line.number,
        },
        note,
    ))
}
