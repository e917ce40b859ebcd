// SPDX-License-Identifier: MIT

//! Typed errors for parsing and evaluating rule expressions
//!
//! Parse and evaluation failures are ordinary results handed back to the
//! caller.

use super::value::ValueKind;
use std::fmt;
use thiserror::Error;

/// Top-level error type for menu-expr
#[derive(Debug, Error)]
pub enum ExprError {
    /// Expression text could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Expression could not be evaluated against an environment
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A rule named in a rule set failed to compile or evaluate
    #[error("Rule '{name}': {source}")]
    Rule {
        name: String,
        #[source]
        source: Box<ExprError>,
    },

    /// Configuration errors (unreadable context, conflicting options)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ExprError {
    /// Attach a rule name to an error
    pub fn rule(name: impl Into<String>, source: impl Into<ExprError>) -> Self {
        Self::Rule {
            name: name.into(),
            source: Box::new(source.into()),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Malformed expression text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at position {position} near `{snippet}`")]
pub struct ParseError {
    /// Byte offset of the offending token
    pub position: usize,
    /// Source text of the offending token, `<eof>` at end of input
    pub snippet: String,
    pub reason: ParseErrorReason,
}

impl ParseError {
    pub fn new(position: usize, snippet: impl Into<String>, reason: ParseErrorReason) -> Self {
        Self {
            position,
            snippet: snippet.into(),
            reason,
        }
    }
}

/// Why a parse failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorReason {
    /// A character that starts no token
    UnexpectedChar,
    /// A string literal without its closing quote
    UnterminatedString,
    /// An escape sequence the lexer does not know
    InvalidEscape,
    /// An integer literal that does not fit in i64
    InvalidInteger,
    /// A token that is not allowed here; lists what would have been
    UnexpectedToken(&'static [&'static str]),
    /// An opening `(` without its `)`
    UnclosedParen,
    /// An opening `[` without its `]`
    UnclosedBracket,
    /// Input ended where an operand was required
    UnexpectedEof,
    /// Input continued after a complete expression
    TrailingInput,
    /// Nesting exceeded the parser's configured limit
    NestingTooDeep(usize),
}

impl fmt::Display for ParseErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorReason::UnexpectedChar => f.write_str("unexpected character"),
            ParseErrorReason::UnterminatedString => f.write_str("unterminated string"),
            ParseErrorReason::InvalidEscape => f.write_str("invalid escape sequence"),
            ParseErrorReason::InvalidInteger => f.write_str("invalid integer literal"),
            ParseErrorReason::UnexpectedToken(expected) => match expected {
                [] => f.write_str("unexpected token"),
                [one] => write!(f, "expected `{one}`"),
                many => {
                    f.write_str("expected one of ")?;
                    for (i, exp) in many.iter().enumerate() {
                        write!(f, "{}`{exp}`", if i > 0 { ", " } else { "" })?;
                    }
                    Ok(())
                }
            },
            ParseErrorReason::UnclosedParen => f.write_str("unclosed parenthesis"),
            ParseErrorReason::UnclosedBracket => f.write_str("unclosed bracket"),
            ParseErrorReason::UnexpectedEof => f.write_str("unexpected end of input"),
            ParseErrorReason::TrailingInput => f.write_str("unexpected input after expression"),
            ParseErrorReason::NestingTooDeep(limit) => {
                write!(f, "expression nested deeper than {limit}")
            }
        }
    }
}

/// Evaluation-time errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Identifier is not a field of the environment
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// Call target is not a function of the environment
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Call argument count does not match the function signature
    #[error("Function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Operand or result has the wrong kind
    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

impl EvalError {
    pub fn type_mismatch(
        context: impl Into<String>,
        expected: ValueKind,
        found: ValueKind,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}
