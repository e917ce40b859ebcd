// SPDX-License-Identifier: MIT

//! Compiled menu rule sets

use super::types::RuleSetDefinition;
use crate::expr::ast::Node;
use crate::expr::env::Environment;
use crate::expr::error::ExprError;
use crate::expr::evaluator::evaluate;
use crate::expr::parser::Parser;
use crate::expr::printer::render;
use std::collections::HashSet;
use std::io::{self, Write};

/// A rule whose expression has been parsed
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub source: String,
    pub node: Node,
}

/// Every rule of a rule file, parsed up front
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Parse every rule; the first malformed expression aborts with its rule name
    pub fn compile(def: &RuleSetDefinition) -> Result<Self, ExprError> {
        Self::compile_with(def, &Parser::new())
    }

    pub fn compile_with(def: &RuleSetDefinition, parser: &Parser) -> Result<Self, ExprError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(def.rules.len());

        for rule in &def.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ExprError::config(format!(
                    "duplicate rule '{}' in rule set '{}'",
                    rule.name, def.name
                )));
            }
            let node = parser
                .parse(&rule.when)
                .map_err(|e| ExprError::rule(&rule.name, e))?;
            rules.push(CompiledRule {
                name: rule.name.clone(),
                source: rule.when.clone(),
                node,
            });
        }

        log::debug!("Compiled rule set '{}' ({} rules)", def.name, rules.len());
        Ok(Self {
            name: def.name.clone(),
            rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Names of the rules that apply to `env`, in file order
    pub fn matching<E: Environment + ?Sized>(&self, env: &E) -> Result<Vec<&str>, ExprError> {
        let mut matched = Vec::new();
        for rule in &self.rules {
            if Self::evaluate_rule(rule, env)? {
                matched.push(rule.name.as_str());
            }
        }
        Ok(matched)
    }

    /// Evaluate a single rule by name
    pub fn evaluate<E: Environment + ?Sized>(
        &self,
        name: &str,
        env: &E,
    ) -> Result<bool, ExprError> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| {
                ExprError::config(format!("no rule '{}' in rule set '{}'", name, self.name))
            })?;
        Self::evaluate_rule(rule, env)
    }

    /// Write each rule's name followed by its tree
    pub fn render<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        for rule in &self.rules {
            writeln!(sink, "# {}", rule.name)?;
            render(&rule.node, 0, sink)?;
        }
        Ok(())
    }

    fn evaluate_rule<E: Environment + ?Sized>(
        rule: &CompiledRule,
        env: &E,
    ) -> Result<bool, ExprError> {
        evaluate(&rule.node, env).map_err(|e| {
            log::warn!("Rule '{}' failed to evaluate: {}", rule.name, e);
            ExprError::rule(&rule.name, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::error::{EvalError, ParseErrorReason};
    use crate::menu::loader::RuleSetLoader;
    use crate::menu::MenuEnv;

    const RULES: &str = r#"
name: home-menu
rules:
  - name: b-legacy
    when: 'IsBUser() and SdkVersionL("8.8.8")'
  - name: b-modern
    when: 'IsBUser() and SdkVersionGE("8.8.8")'
  - name: not-app2
    when: 'Appid not in ["App2"]'
"#;

    fn rule_set(yaml: &str) -> Result<RuleSet, ExprError> {
        RuleSet::compile(&RuleSetLoader::parse_yaml(yaml).unwrap())
    }

    #[test]
    fn test_matching() {
        let set = rule_set(RULES).unwrap();
        assert_eq!(set.name(), "home-menu");
        assert_eq!(set.rules().len(), 3);

        let env = MenuEnv::new("Buser1", "App1", "7.9.8");
        assert_eq!(set.matching(&env).unwrap(), vec!["b-legacy", "not-app2"]);

        let env = MenuEnv::new("Auser1", "App2", "9.0.0");
        assert!(set.matching(&env).unwrap().is_empty());
    }

    #[test]
    fn test_evaluate_by_name() {
        let set = rule_set(RULES).unwrap();
        let env = MenuEnv::new("Buser1", "App1", "8.8.8");
        assert!(set.evaluate("b-modern", &env).unwrap());
        assert!(!set.evaluate("b-legacy", &env).unwrap());
        assert!(matches!(
            set.evaluate("missing", &env),
            Err(ExprError::Config(_))
        ));
    }

    #[test]
    fn test_parse_error_names_rule() {
        let yaml = "name: bad\nrules:\n  - name: broken\n    when: '(IsBUser() and'\n";
        match rule_set(yaml) {
            Err(ExprError::Rule { name, source }) => {
                assert_eq!(name, "broken");
                match *source {
                    ExprError::Parse(err) => {
                        assert_eq!(err.reason, ParseErrorReason::UnexpectedEof)
                    }
                    other => panic!("Expected parse error, got {:?}", other),
                }
            }
            other => panic!("Expected rule error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_rule_names() {
        let yaml = concat!(
            "name: dup\nrules:\n",
            "  - name: a\n    when: IsBUser()\n",
            "  - name: a\n    when: IsBUser()\n",
        );
        assert!(matches!(rule_set(yaml), Err(ExprError::Config(_))));
    }

    #[test]
    fn test_eval_error_aborts_matching() {
        let yaml = concat!(
            "name: bad\nrules:\n",
            "  - name: ok\n    when: IsBUser()\n",
            "  - name: typo\n    when: IsCUser()\n",
        );
        let set = rule_set(yaml).unwrap();
        let env = MenuEnv::new("Buser1", "App1", "7.9.8");
        match set.matching(&env) {
            Err(ExprError::Rule { name, source }) => {
                assert_eq!(name, "typo");
                assert!(matches!(
                    *source,
                    ExprError::Eval(EvalError::UnknownFunction(_))
                ));
            }
            other => panic!("Expected rule error, got {:?}", other),
        }
    }

    #[test]
    fn test_render() {
        let set = rule_set("name: one\nrules:\n  - name: r\n    when: not IsBUser()\n").unwrap();
        let mut buf = Vec::new();
        set.render(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "# r\nnot\n    IsBUser\n");
    }
}
