//! Rule file loader - YAML loading of menu rule sets and user contexts

use super::env::MenuEnv;
use super::types::RuleSetDefinition;
use crate::expr::error::ExprError;
use std::fs;
use std::path::Path;

/// Loads rule set definitions and contexts from disk
pub struct RuleSetLoader;

impl RuleSetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a rule set definition from a YAML file
    pub fn load_rule_set<P: AsRef<Path>>(&self, path: P) -> Result<RuleSetDefinition, ExprError> {
        let path = path.as_ref();
        log::debug!("Loading rule set from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a rule set definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<RuleSetDefinition, ExprError> {
        let def: RuleSetDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }

    /// Load a user context from a `.json` file, or YAML for any other extension
    pub fn load_context<P: AsRef<Path>>(&self, path: P) -> Result<MenuEnv, ExprError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}

impl Default for RuleSetLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_set() {
        let yaml = r#"
name: home-menu
description: "Entries on the home screen"

rules:
  - name: legacy-banner
    when: 'IsBUser() and SdkVersionL("8.8.8")'
  - name: app1-only
    description: "Only shown inside App1"
    when: >-
      Appid in ["App1"]
"#;
        let def = RuleSetLoader::parse_yaml(yaml).unwrap();
        assert_eq!(def.name, "home-menu");
        assert_eq!(def.rules.len(), 2);
        assert_eq!(def.rules[0].name, "legacy-banner");
        assert_eq!(def.rules[0].when, r#"IsBUser() and SdkVersionL("8.8.8")"#);
        assert!(def.rules[0].description.is_none());
        assert_eq!(def.rules[1].when, r#"Appid in ["App1"]"#);
    }

    #[test]
    fn test_parse_empty_rule_set() {
        let def = RuleSetLoader::parse_yaml("name: empty\n").unwrap();
        assert!(def.rules.is_empty());
        assert!(def.description.is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = RuleSetLoader::parse_yaml("rules: [");
        assert!(matches!(result, Err(ExprError::Yaml(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RuleSetLoader::new().load_rule_set("/nonexistent/rules.yaml");
        assert!(matches!(result, Err(ExprError::Io(_))));
    }

    #[test]
    fn test_load_context_by_extension() {
        let dir = std::env::temp_dir().join(format!("menu-expr-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let json = dir.join("ctx.json");
        fs::write(
            &json,
            r#"{"Ucid": "Buser1", "Appid": "App1", "SdkVersion": "7.9.8"}"#,
        )
        .unwrap();
        let yaml = dir.join("ctx.yaml");
        fs::write(&yaml, "Ucid: Auser1\nAppid: App2\nSdkVersion: \"9.0.0\"\n").unwrap();

        let loader = RuleSetLoader::new();
        assert_eq!(
            loader.load_context(&json).unwrap(),
            MenuEnv::new("Buser1", "App1", "7.9.8")
        );
        assert_eq!(
            loader.load_context(&yaml).unwrap(),
            MenuEnv::new("Auser1", "App2", "9.0.0")
        );

        fs::remove_dir_all(&dir).unwrap();
    }
}
