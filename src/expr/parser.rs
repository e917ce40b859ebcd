//! Recursive-descent parser for rule expressions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr       := orExpr
//! orExpr     := andExpr ("or" andExpr)*
//! andExpr    := unary ("and" unary)*
//! unary      := "not" unary | membership
//! membership := primary ("not")? "in" array | primary
//! primary    := call | identifier | string | integer | "(" expr ")"
//! call       := identifier "(" (expr ("," expr)*)? ")"
//! array      := "[" (primary ("," primary)*)? "]"
//! ```

use super::ast::{BinaryOp, Node};
use super::error::{ParseError, ParseErrorReason};
use super::lexer::{tokenize, Token, TokenKind};

const PRIMARY_START: &[&str] = &["identifier", "string", "integer", "("];
const OPERAND_START: &[&str] = &["not", "identifier", "string", "integer", "("];
const AFTER_PAREN_OPERAND: &[&str] = &["and", "or", "in", "not", ")"];
const AFTER_CALL_ARG: &[&str] = &["and", "or", "in", "not", ",", ")"];

/// Parse an expression string into an AST
pub fn parse(source: &str) -> Result<Node, ParseError> {
    Parser::new().parse(source)
}

/// Expression parser with an optional nesting limit
#[derive(Debug, Clone, Default)]
pub struct Parser {
    max_depth: Option<usize>,
}

impl Parser {
    pub fn new() -> Self {
        Self { max_depth: None }
    }

    /// Reject expressions nested deeper than `max_depth`
    ///
    /// Every `and` / `or` in a chain counts as one level, as do parentheses,
    /// `not`, calls and arrays, so the limit bounds the height of the tree.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    pub fn parse(&self, source: &str) -> Result<Node, ParseError> {
        let tokens = tokenize(source)?;
        let mut state = ParseState {
            source,
            tokens,
            pos: 0,
            depth: 0,
            max_depth: self.max_depth,
        };

        let node = state.parse_or()?;
        let next = state.peek();
        if next.kind != TokenKind::Eof {
            return Err(state.error_at(next, ParseErrorReason::TrailingInput));
        }
        log::debug!("Parsed expression: {}", source.trim());
        Ok(node)
    }
}

struct ParseState<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: Option<usize>,
}

impl<'a> ParseState<'a> {
    fn peek(&self) -> &Token {
        // tokenize always appends Eof, and advance never moves past it
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, reason: ParseErrorReason) -> ParseError {
        ParseError::new(token.start, token.snippet(self.source), reason)
    }

    fn unexpected(&self, token: &Token, expected: &'static [&'static str]) -> ParseError {
        if token.kind == TokenKind::Eof {
            self.error_at(token, ParseErrorReason::UnexpectedEof)
        } else {
            self.error_at(token, ParseErrorReason::UnexpectedToken(expected))
        }
    }

    fn enter(&mut self, token: &Token) -> Result<(), ParseError> {
        self.depth += 1;
        match self.max_depth {
            Some(limit) if self.depth > limit => {
                Err(self.error_at(token, ParseErrorReason::NestingTooDeep(limit)))
            }
            _ => Ok(()),
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;
        let mut folded = 0;
        while self.peek().kind == TokenKind::Or {
            let op = self.advance();
            self.enter(&op)?;
            folded += 1;
            let right = self.parse_and()?;
            left = Node::binary(BinaryOp::Or, left, right);
        }
        self.depth -= folded;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;
        let mut folded = 0;
        while self.peek().kind == TokenKind::And {
            let op = self.advance();
            self.enter(&op)?;
            folded += 1;
            let right = self.parse_unary()?;
            left = Node::binary(BinaryOp::And, left, right);
        }
        self.depth -= folded;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        if self.peek().kind == TokenKind::Not {
            let token = self.advance();
            self.enter(&token)?;
            let operand = self.parse_unary()?;
            self.leave();
            return Ok(Node::not(operand));
        }
        self.parse_membership()
    }

    fn parse_membership(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_primary(OPERAND_START)?;

        let negated = if self.peek().kind == TokenKind::In {
            false
        } else if self.peek().kind == TokenKind::Not {
            self.advance();
            if self.peek().kind != TokenKind::In {
                let next = self.peek().clone();
                return Err(self.unexpected(&next, &["in"]));
            }
            true
        } else {
            return Ok(left);
        };
        self.advance();

        let elements = self.parse_array()?;
        Ok(Node::membership(negated, left, elements))
    }

    fn parse_array(&mut self) -> Result<Vec<Node>, ParseError> {
        let open = self.advance();
        if open.kind != TokenKind::LBracket {
            return Err(self.unexpected(&open, &["["]));
        }
        self.enter(&open)?;

        let mut elements = Vec::new();
        if self.peek().kind == TokenKind::RBracket {
            self.advance();
        } else {
            loop {
                elements.push(self.parse_primary(PRIMARY_START)?);
                let next = self.advance();
                match next.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RBracket => break,
                    TokenKind::Eof => {
                        return Err(self.error_at(&open, ParseErrorReason::UnclosedBracket))
                    }
                    _ => return Err(self.unexpected(&next, &[",", "]"])),
                }
            }
        }

        self.leave();
        Ok(elements)
    }

    fn parse_primary(&mut self, expected: &'static [&'static str]) -> Result<Node, ParseError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                if self.peek().kind == TokenKind::LParen {
                    let open = self.advance();
                    let args = self.parse_call_args(&open)?;
                    Ok(Node::Call { name, args })
                } else {
                    Ok(Node::Identifier(name))
                }
            }
            TokenKind::Str(value) => Ok(Node::Str(value.clone())),
            TokenKind::Int(value) => Ok(Node::Int(*value)),
            TokenKind::LParen => {
                self.enter(&token)?;
                let inner = self.parse_or()?;
                let close = self.advance();
                match close.kind {
                    TokenKind::RParen => {}
                    TokenKind::Eof => {
                        return Err(self.error_at(&token, ParseErrorReason::UnclosedParen))
                    }
                    _ => return Err(self.unexpected(&close, AFTER_PAREN_OPERAND)),
                }
                self.leave();
                Ok(inner)
            }
            _ => Err(self.unexpected(&token, expected)),
        }
    }

    fn parse_call_args(&mut self, open: &Token) -> Result<Vec<Node>, ParseError> {
        self.enter(open)?;

        let mut args = Vec::new();
        if self.peek().kind == TokenKind::RParen {
            self.advance();
        } else {
            loop {
                args.push(self.parse_or()?);
                let next = self.advance();
                match next.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RParen => break,
                    TokenKind::Eof => {
                        return Err(self.error_at(open, ParseErrorReason::UnclosedParen))
                    }
                    _ => return Err(self.unexpected(&next, AFTER_CALL_ARG)),
                }
            }
        }

        self.leave();
        Ok(args)
    }
}
