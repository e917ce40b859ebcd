// SPDX-License-Identifier: MIT

//! Menu gating rules
//!
//! This module binds the expression language to the request context a menu
//! rule is decided on:
//! - `MenuContext` / `MenuEnv` - user id, app id and SDK version
//! - `version` - strict MAJOR.MINOR.PATCH comparison behind `SdkVersionGE` / `SdkVersionL`
//! - `RuleSet` - rule files loaded from YAML

pub mod env;
pub mod loader;
pub mod rules;
pub mod types;
pub mod version;

pub use env::{MenuBindings, MenuContext, MenuEnv};
pub use loader::RuleSetLoader;
pub use rules::{CompiledRule, RuleSet};
pub use types::{RuleDefinition, RuleSetDefinition};
pub use version::{Version, VersionFormatError};
