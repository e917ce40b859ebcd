// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for rule expressions

use std::fmt;

/// A parsed rule expression
///
/// Built once by the parser and only read afterwards. Every consumer matches
/// on all variants, so adding a kind is a compile-time tracked change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Logical AND / OR
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Logical NOT
    Unary { op: UnaryOp, operand: Box<Node> },
    /// `left in [..]` or `left not in [..]`; `right` is always an array literal
    Membership {
        negated: bool,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Function call: name(args..)
    Call { name: String, args: Vec<Node> },
    /// Field reference
    Identifier(String),
    /// Array literal: [a, b, ..]
    Array(Vec<Node>),
    /// String literal
    Str(String),
    /// Integer literal
    Int(i64),
}

/// Binary logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
}

/// Unary logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

impl Node {
    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Node) -> Self {
        Node::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn membership(negated: bool, left: Node, elements: Vec<Node>) -> Self {
        Node::Membership {
            negated,
            left: Box::new(left),
            right: Box::new(Node::Array(elements)),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            args,
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Node::Identifier(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Str(value.into())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::And => write!(f, "and"),
            BinaryOp::Or => write!(f, "or"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_display() {
        assert_eq!(format!("{}", BinaryOp::And), "and");
        assert_eq!(format!("{}", BinaryOp::Or), "or");
        assert_eq!(format!("{}", UnaryOp::Not), "not");
    }

    #[test]
    fn test_membership_wraps_array() {
        let node = Node::membership(true, Node::ident("Appid"), vec![Node::string("App2")]);
        match node {
            Node::Membership { negated, right, .. } => {
                assert!(negated);
                assert_eq!(*right, Node::Array(vec![Node::Str("App2".to_string())]));
            }
            _ => panic!("Expected Membership node"),
        }
    }
}
