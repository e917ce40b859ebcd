// SPDX-License-Identifier: MIT

//! Rule expression language
//!
//! Expressions are small boolean predicates over an [`Environment`]:
//! - `IsBUser()`
//! - `Appid in ["App1", "App2"]`
//! - `not IsBUser() and SdkVersionGE("8.8.8")`

pub mod ast;
pub mod cache;
pub mod env;
pub mod error;
pub mod evaluator;
mod lexer;
pub mod parser;
pub mod printer;
pub mod value;

pub use ast::{BinaryOp, Node, UnaryOp};
pub use cache::ProgramCache;
pub use env::{Environment, Signature};
pub use error::{EvalError, ExprError, ParseError, ParseErrorReason};
pub use evaluator::{bind, eval_expr, evaluate};
pub use parser::{parse, Parser};
pub use printer::{print_expression, render, render_to_string};
pub use value::{Value, ValueKind};
