// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// A menu rule file: a named list of rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// One menu entry and the expression deciding whether it applies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    pub when: String,
    #[serde(default)]
    pub description: Option<String>,
}
