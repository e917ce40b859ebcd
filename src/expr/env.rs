// SPDX-License-Identifier: MIT

//! The binding surface an expression is evaluated against

use super::error::EvalError;
use super::value::{Value, ValueKind};

/// Declared shape of an environment function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [ValueKind],
    pub returns: ValueKind,
}

impl Signature {
    pub const fn new(params: &'static [ValueKind], returns: ValueKind) -> Self {
        Self { params, returns }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Fields and functions an expression may reference
///
/// Names outside what `has_field` and `function` declare are rejected when
/// an expression is bound, before anything is evaluated. `call` is only
/// reached for declared functions with arguments that already match the
/// signature.
pub trait Environment {
    /// Whether `name` is a declared field
    fn has_field(&self, name: &str) -> bool;

    /// Current value of a declared field
    fn field(&self, name: &str) -> Option<Value>;

    /// Signature of a declared function
    fn function(&self, name: &str) -> Option<Signature>;

    /// Invoke a declared function
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError>;

    /// Identifies the set of names this environment declares; two
    /// environments with the same shape bind every expression the same way
    fn shape(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn has_field(&self, name: &str) -> bool {
        (**self).has_field(name)
    }

    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn function(&self, name: &str) -> Option<Signature> {
        (**self).function(name)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        (**self).call(name, args)
    }

    fn shape(&self) -> &'static str {
        (**self).shape()
    }
}
