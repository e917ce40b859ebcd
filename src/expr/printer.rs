// SPDX-License-Identifier: MIT

//! Indented tree dump of an expression, for debugging rules
//!
//! Binary operators are printed between their operands so the layout reads
//! like the source turned sideways:
//!
//! ```text
//!         IsBUser
//!     and
//!             Appid
//!         in
//!             array
//!                 App1
//! ```

use super::ast::Node;
use super::error::ExprError;
use super::parser::parse;
use std::io::{self, Write};

const INDENT_WIDTH: usize = 4;

/// Write `node` to `sink`, one line per node, starting at `indent` levels
pub fn render<W: Write + ?Sized>(node: &Node, indent: usize, sink: &mut W) -> io::Result<()> {
    match node {
        Node::Binary { op, left, right } => {
            render(left, indent + 1, sink)?;
            write_line(sink, indent, op)?;
            render(right, indent + 1, sink)
        }
        Node::Membership {
            negated,
            left,
            right,
        } => {
            render(left, indent + 1, sink)?;
            write_line(sink, indent, if *negated { "not in" } else { "in" })?;
            render(right, indent + 1, sink)
        }
        Node::Unary { op, operand } => {
            write_line(sink, indent, op)?;
            render(operand, indent + 1, sink)
        }
        Node::Call { name, args } => {
            write_line(sink, indent, name)?;
            for arg in args {
                render(arg, indent + 1, sink)?;
            }
            Ok(())
        }
        Node::Array(elements) => {
            write_line(sink, indent, "array")?;
            for element in elements {
                render(element, indent + 1, sink)?;
            }
            Ok(())
        }
        Node::Identifier(name) => write_line(sink, indent, name),
        Node::Str(value) => write_line(sink, indent, value),
        Node::Int(value) => write_line(sink, indent, value),
    }
}

/// Render a tree into a fresh string
pub fn render_to_string(node: &Node) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = render(node, 0, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parse `source` and write its tree to `sink`
pub fn print_expression<W: Write + ?Sized>(source: &str, sink: &mut W) -> Result<(), ExprError> {
    let node = parse(source)?;
    render(&node, 0, sink)?;
    Ok(())
}

fn write_line<W: Write + ?Sized>(
    sink: &mut W,
    indent: usize,
    message: impl std::fmt::Display,
) -> io::Result<()> {
    writeln!(
        sink,
        "{:width$}{}",
        "",
        message,
        width = indent * INDENT_WIDTH
    )
}
