//! Expression evaluator
//!
//! Evaluation runs in two passes over the tree: `bind` checks every
//! identifier and call against the environment's declared names, then the
//! tree is executed. `and` / `or` short-circuit, so the right operand is
//! never executed once the left one decides the result.

use super::ast::{BinaryOp, Node, UnaryOp};
use super::env::Environment;
use super::error::{EvalError, ExprError};
use super::parser::parse;
use super::value::{Value, ValueKind};

/// Evaluate an expression against an environment
pub fn evaluate<E: Environment + ?Sized>(node: &Node, env: &E) -> Result<bool, EvalError> {
    bind(node, env)?;
    execute(node, env)
}

/// Parse and evaluate an expression in one step
pub fn eval_expr<E: Environment + ?Sized>(source: &str, env: &E) -> Result<bool, ExprError> {
    let node = parse(source)?;
    Ok(evaluate(&node, env)?)
}

/// Check that every name the expression references is declared by `env`
///
/// Function arity is checked here too, so a malformed call fails before any
/// predicate runs.
pub fn bind<E: Environment + ?Sized>(node: &Node, env: &E) -> Result<(), EvalError> {
    match node {
        Node::Binary { left, right, .. } | Node::Membership { left, right, .. } => {
            bind(left, env)?;
            bind(right, env)
        }
        Node::Unary { operand, .. } => bind(operand, env),
        Node::Call { name, args } => {
            let signature = env
                .function(name)
                .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
            if signature.arity() != args.len() {
                return Err(EvalError::ArityMismatch {
                    name: name.clone(),
                    expected: signature.arity(),
                    found: args.len(),
                });
            }
            args.iter().try_for_each(|arg| bind(arg, env))
        }
        Node::Identifier(name) => {
            if env.has_field(name) {
                Ok(())
            } else {
                Err(EvalError::UnknownIdentifier(name.clone()))
            }
        }
        Node::Array(elements) => elements.iter().try_for_each(|e| bind(e, env)),
        Node::Str(_) | Node::Int(_) => Ok(()),
    }
}

/// Execute an already bound expression
pub(crate) fn execute<E: Environment + ?Sized>(node: &Node, env: &E) -> Result<bool, EvalError> {
    let value = eval_value(node, env)?;
    expect_bool(value, "expression result")
}

fn eval_value<E: Environment + ?Sized>(node: &Node, env: &E) -> Result<Value, EvalError> {
    match node {
        Node::Binary { op, left, right } => {
            let context = op.to_string();
            let lhs = expect_bool(eval_value(left, env)?, &context)?;
            let result = match (op, lhs) {
                (BinaryOp::And, false) => false,
                (BinaryOp::Or, true) => true,
                _ => expect_bool(eval_value(right, env)?, &context)?,
            };
            Ok(Value::Bool(result))
        }
        Node::Unary {
            op: UnaryOp::Not,
            operand,
        } => {
            let value = expect_bool(eval_value(operand, env)?, "not")?;
            Ok(Value::Bool(!value))
        }
        Node::Membership {
            negated,
            left,
            right,
        } => {
            let needle = eval_value(left, env)?;
            let found = match eval_value(right, env)? {
                Value::Array(items) => items.contains(&needle),
                other => {
                    return Err(EvalError::type_mismatch(
                        "in",
                        ValueKind::Array,
                        other.kind(),
                    ))
                }
            };
            Ok(Value::Bool(found != *negated))
        }
        Node::Call { name, args } => call_function(name, args, env),
        Node::Identifier(name) => env
            .field(name)
            .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
        Node::Array(elements) => {
            let items = elements
                .iter()
                .map(|e| eval_value(e, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        }
        Node::Str(s) => Ok(Value::Str(s.clone())),
        Node::Int(n) => Ok(Value::Int(*n)),
    }
}

fn call_function<E: Environment + ?Sized>(
    name: &str,
    args: &[Node],
    env: &E,
) -> Result<Value, EvalError> {
    let signature = env
        .function(name)
        .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
    if signature.arity() != args.len() {
        return Err(EvalError::ArityMismatch {
            name: name.to_string(),
            expected: signature.arity(),
            found: args.len(),
        });
    }

    let mut values = Vec::with_capacity(args.len());
    for (i, (arg, expected)) in args.iter().zip(signature.params).enumerate() {
        let value = eval_value(arg, env)?;
        if value.kind() != *expected {
            return Err(EvalError::type_mismatch(
                format!("argument {} of {}", i + 1, name),
                *expected,
                value.kind(),
            ));
        }
        values.push(value);
    }

    let result = env.call(name, &values)?;
    log::trace!("{}({:?}) = {:?}", name, values, result);
    if result.kind() != signature.returns {
        return Err(EvalError::type_mismatch(
            format!("result of {}", name),
            signature.returns,
            result.kind(),
        ));
    }
    Ok(result)
}

fn expect_bool(value: Value, context: &str) -> Result<bool, EvalError> {
    value
        .as_bool()
        .ok_or_else(|| EvalError::type_mismatch(context, ValueKind::Bool, value.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::env::Signature;
    use std::cell::Cell;

    const PREDICATE: Signature = Signature::new(&[], ValueKind::Bool);

    /// Environment with constant predicates T() / F() that count their calls
    #[derive(Default)]
    struct CountingEnv {
        true_calls: Cell<usize>,
        false_calls: Cell<usize>,
    }

    impl Environment for CountingEnv {
        fn has_field(&self, name: &str) -> bool {
            matches!(name, "Name" | "Count")
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "Name" => Some(Value::from("alice")),
                "Count" => Some(Value::from(3)),
                _ => None,
            }
        }

        fn function(&self, name: &str) -> Option<Signature> {
            match name {
                "T" | "F" => Some(PREDICATE),
                "Echo" => Some(Signature::new(&[ValueKind::Str], ValueKind::Str)),
                "Broken" => Some(PREDICATE),
                _ => None,
            }
        }

        fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
            match name {
                "T" => {
                    self.true_calls.set(self.true_calls.get() + 1);
                    Ok(Value::Bool(true))
                }
                "F" => {
                    self.false_calls.set(self.false_calls.get() + 1);
                    Ok(Value::Bool(false))
                }
                "Echo" => Ok(args[0].clone()),
                "Broken" => Ok(Value::Int(1)),
                _ => Err(EvalError::UnknownFunction(name.to_string())),
            }
        }
    }

    fn eval(source: &str, env: &CountingEnv) -> Result<bool, EvalError> {
        evaluate(&parse(source).unwrap(), env)
    }

    #[test]
    fn test_or_short_circuits() {
        let env = CountingEnv::default();
        assert!(eval("T() or F()", &env).unwrap());
        assert_eq!(env.true_calls.get(), 1);
        assert_eq!(env.false_calls.get(), 0);

        let env = CountingEnv::default();
        assert!(eval("F() or T()", &env).unwrap());
        assert_eq!(env.false_calls.get(), 1);
        assert_eq!(env.true_calls.get(), 1);
    }

    #[test]
    fn test_and_short_circuits() {
        let env = CountingEnv::default();
        assert!(!eval("F() and T()", &env).unwrap());
        assert_eq!(env.false_calls.get(), 1);
        assert_eq!(env.true_calls.get(), 0);

        let env = CountingEnv::default();
        assert!(!eval("T() and F()", &env).unwrap());
        assert_eq!(env.true_calls.get(), 1);
        assert_eq!(env.false_calls.get(), 1);
    }

    #[test]
    fn test_short_circuit_skips_type_errors() {
        let env = CountingEnv::default();
        assert!(eval("T() or Name", &env).unwrap());
        assert!(!eval("F() and Count", &env).unwrap());
    }

    #[test]
    fn test_not() {
        let env = CountingEnv::default();
        assert!(eval("not F()", &env).unwrap());
        assert!(!eval("not not F()", &env).unwrap());
    }

    #[test]
    fn test_membership() {
        let env = CountingEnv::default();
        assert!(eval(r#"Name in ["bob", "alice"]"#, &env).unwrap());
        assert!(!eval(r#"Name in ["bob"]"#, &env).unwrap());
        assert!(eval(r#"Name not in ["bob"]"#, &env).unwrap());
        assert!(!eval("Name in []", &env).unwrap());
        assert!(eval("Count in [1, 2, 3]", &env).unwrap());
        // Equality is per kind: "3" is not 3
        assert!(!eval(r#"Count in ["3"]"#, &env).unwrap());
        assert!(eval(r#"Echo("x") in [Name, "x"]"#, &env).unwrap());
    }

    #[test]
    fn test_unknown_identifier() {
        let env = CountingEnv::default();
        assert_eq!(
            eval("T() or Missing", &env),
            Err(EvalError::UnknownIdentifier("Missing".to_string()))
        );
    }

    #[test]
    fn test_unknown_function_fails_before_execution() {
        let env = CountingEnv::default();
        assert_eq!(
            eval("T() and UnknownFn()", &env),
            Err(EvalError::UnknownFunction("UnknownFn".to_string()))
        );
        assert_eq!(env.true_calls.get(), 0);
    }

    #[test]
    fn test_arity_mismatch() {
        let env = CountingEnv::default();
        assert_eq!(
            eval(r#"T("extra")"#, &env),
            Err(EvalError::ArityMismatch {
                name: "T".to_string(),
                expected: 0,
                found: 1,
            })
        );
        assert_eq!(
            eval(r#"Echo() in ["x"]"#, &env),
            Err(EvalError::ArityMismatch {
                name: "Echo".to_string(),
                expected: 1,
                found: 0,
            })
        );
    }

    #[test]
    fn test_argument_type_mismatch() {
        let env = CountingEnv::default();
        assert_eq!(
            eval(r#"Echo(5) in ["5"]"#, &env),
            Err(EvalError::type_mismatch(
                "argument 1 of Echo",
                ValueKind::Str,
                ValueKind::Int
            ))
        );
    }

    #[test]
    fn test_result_type_mismatch() {
        let env = CountingEnv::default();
        assert_eq!(
            eval("Broken()", &env),
            Err(EvalError::type_mismatch(
                "result of Broken",
                ValueKind::Bool,
                ValueKind::Int
            ))
        );
    }

    #[test]
    fn test_top_level_must_be_bool() {
        let env = CountingEnv::default();
        assert_eq!(
            eval("Name", &env),
            Err(EvalError::type_mismatch(
                "expression result",
                ValueKind::Bool,
                ValueKind::Str
            ))
        );
        assert_eq!(
            eval("42", &env),
            Err(EvalError::type_mismatch(
                "expression result",
                ValueKind::Bool,
                ValueKind::Int
            ))
        );
    }

    #[test]
    fn test_operand_type_mismatch() {
        let env = CountingEnv::default();
        assert_eq!(
            eval("Name and T()", &env),
            Err(EvalError::type_mismatch(
                "and",
                ValueKind::Bool,
                ValueKind::Str
            ))
        );
        assert_eq!(
            eval("not Count", &env),
            Err(EvalError::type_mismatch(
                "not",
                ValueKind::Bool,
                ValueKind::Int
            ))
        );
        assert_eq!(
            eval("F() or 1", &env),
            Err(EvalError::type_mismatch("or", ValueKind::Bool, ValueKind::Int))
        );
    }

    #[test]
    fn test_membership_requires_array() {
        let env = CountingEnv::default();
        let node = Node::Membership {
            negated: false,
            left: Box::new(Node::ident("Name")),
            right: Box::new(Node::ident("Name")),
        };
        assert_eq!(
            evaluate(&node, &env),
            Err(EvalError::type_mismatch(
                "in",
                ValueKind::Array,
                ValueKind::Str
            ))
        );
    }

    #[test]
    fn test_eval_expr_reports_parse_errors() {
        let env = CountingEnv::default();
        assert!(matches!(eval_expr("(T() and", &env), Err(ExprError::Parse(_))));
        assert!(matches!(eval_expr("T() and F()", &env), Ok(false)));
    }

    #[test]
    fn test_deterministic() {
        let env = CountingEnv::default();
        let node = parse(r#"(F() or T()) and Name not in ["bob"]"#).unwrap();
        let first = evaluate(&node, &env);
        for _ in 0..10 {
            assert_eq!(evaluate(&node, &env), first);
        }
    }
}
