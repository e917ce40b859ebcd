// SPDX-License-Identifier: MIT

//! Tokenizer for rule expressions

use super::error::{ParseError, ParseErrorReason};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    And,
    Or,
    Not,
    In,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

/// A token and the byte range it covers in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Source text of the token, used in error messages
    pub fn snippet<'a>(&self, source: &'a str) -> &'a str {
        if self.kind == TokenKind::Eof {
            "<eof>"
        } else {
            &source[self.start..self.end]
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Str(s) => write!(f, "{:?}", s),
            TokenKind::Int(n) => write!(f, "{}", n),
            TokenKind::And => write!(f, "and"),
            TokenKind::Or => write!(f, "or"),
            TokenKind::Not => write!(f, "not"),
            TokenKind::In => write!(f, "in"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

/// Split source text into tokens, always ending with [`TokenKind::Eof`]
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let single = match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            chars.next();
            tokens.push(Token {
                kind,
                start,
                end: start + 1,
            });
            continue;
        }

        if c == '"' || c == '\'' {
            chars.next();
            let mut value = String::new();
            let mut end = None;
            while let Some((i, ch)) = chars.next() {
                if ch == c {
                    end = Some(i + 1);
                    break;
                }
                if ch == '\\' {
                    let escaped = match chars.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, e @ ('\\' | '"' | '\''))) => e,
                        Some((j, other)) => {
                            return Err(ParseError::new(
                                i,
                                &source[i..j + other.len_utf8()],
                                ParseErrorReason::InvalidEscape,
                            ))
                        }
                        None => break,
                    };
                    value.push(escaped);
                } else {
                    value.push(ch);
                }
            }
            let end = end.ok_or_else(|| {
                ParseError::new(start, &source[start..], ParseErrorReason::UnterminatedString)
            })?;
            tokens.push(Token {
                kind: TokenKind::Str(value),
                start,
                end,
            });
            continue;
        }

        if c.is_ascii_digit() {
            let end = scan_while(&mut chars, source.len(), |ch| ch.is_ascii_alphanumeric());
            let text = &source[start..end];
            let n = text
                .parse::<i64>()
                .map_err(|_| ParseError::new(start, text, ParseErrorReason::InvalidInteger))?;
            tokens.push(Token {
                kind: TokenKind::Int(n),
                start,
                end,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let end = scan_while(&mut chars, source.len(), |ch| {
                ch.is_ascii_alphanumeric() || ch == '_'
            });
            let kind = match &source[start..end] {
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                "in" => TokenKind::In,
                word => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token { kind, start, end });
            continue;
        }

        return Err(ParseError::new(
            start,
            &source[start..start + c.len_utf8()],
            ParseErrorReason::UnexpectedChar,
        ));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        start: source.len(),
        end: source.len(),
    });
    Ok(tokens)
}

/// Advance while `pred` holds and return the end offset of the run
fn scan_while<I, F>(chars: &mut std::iter::Peekable<I>, len: usize, pred: F) -> usize
where
    I: Iterator<Item = (usize, char)>,
    F: Fn(char) -> bool,
{
    while let Some(&(i, ch)) = chars.peek() {
        if !pred(ch) {
            return i;
        }
        chars.next();
    }
    len
}
