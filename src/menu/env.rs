// SPDX-License-Identifier: MIT

//! The user context menu rules are evaluated against

use super::version;
use crate::expr::env::{Environment, Signature};
use crate::expr::error::EvalError;
use crate::expr::value::{Value, ValueKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fields a menu rule may reference
pub const MENU_FIELDS: &[&str] = &["Ucid", "Appid", "SdkVersion"];

static MENU_FUNCTIONS: Lazy<HashMap<&'static str, Signature>> = Lazy::new(|| {
    HashMap::from([
        ("IsBUser", Signature::new(&[], ValueKind::Bool)),
        ("SdkVersionGE", Signature::new(&[ValueKind::Str], ValueKind::Bool)),
        ("SdkVersionL", Signature::new(&[ValueKind::Str], ValueKind::Bool)),
    ])
});

/// Anything that can describe the requesting user to a menu rule
///
/// Implementors supply the three fields; the predicates come for free.
pub trait MenuContext {
    fn ucid(&self) -> &str;
    fn appid(&self) -> &str;
    fn sdk_version(&self) -> &str;

    /// B-side (business) users have a ucid starting with "B"
    fn is_b_user(&self) -> bool {
        self.ucid().starts_with('B')
    }

    /// Whether the user's SDK version is at least `target`
    ///
    /// # Panics
    ///
    /// Panics with the [`VersionFormatError`](super::version::VersionFormatError)
    /// message if either version is not MAJOR.MINOR.PATCH. A malformed version
    /// is a broken rule or context, never a rule that merely does not apply.
    fn sdk_version_ge(&self, target: &str) -> bool {
        match version::ge(self.sdk_version(), target) {
            Ok(result) => result,
            Err(e) => panic!("{}", e),
        }
    }

    /// Whether the user's SDK version is below `target`
    ///
    /// # Panics
    ///
    /// Same as [`sdk_version_ge`](MenuContext::sdk_version_ge).
    fn sdk_version_l(&self, target: &str) -> bool {
        match version::l(self.sdk_version(), target) {
            Ok(result) => result,
            Err(e) => panic!("{}", e),
        }
    }
}

/// Exposes a [`MenuContext`] to the evaluator under the rule names
/// `Ucid`, `Appid`, `SdkVersion`, `IsBUser()`, `SdkVersionGE(v)` and
/// `SdkVersionL(v)`
///
/// Environments with extra predicates can wrap this and fall back to it for
/// the menu names.
pub struct MenuBindings<'a, C: MenuContext + ?Sized>(pub &'a C);

impl<C: MenuContext + ?Sized> Environment for MenuBindings<'_, C> {
    fn has_field(&self, name: &str) -> bool {
        MENU_FIELDS.contains(&name)
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "Ucid" => self.0.ucid(),
            "Appid" => self.0.appid(),
            "SdkVersion" => self.0.sdk_version(),
            _ => return None,
        };
        Some(Value::from(value))
    }

    fn function(&self, name: &str) -> Option<Signature> {
        MENU_FUNCTIONS.get(name).copied()
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let target = args.first().and_then(Value::as_str);
        let result = match (name, args.len(), target) {
            ("IsBUser", 0, _) => self.0.is_b_user(),
            ("SdkVersionGE", 1, Some(target)) => self.0.sdk_version_ge(target),
            ("SdkVersionL", 1, Some(target)) => self.0.sdk_version_l(target),
            _ => {
                return match self.function(name) {
                    Some(signature) if signature.arity() != args.len() => {
                        Err(EvalError::ArityMismatch {
                            name: name.to_string(),
                            expected: signature.arity(),
                            found: args.len(),
                        })
                    }
                    Some(_) => Err(EvalError::type_mismatch(
                        format!("argument 1 of {}", name),
                        ValueKind::Str,
                        args[0].kind(),
                    )),
                    None => Err(EvalError::UnknownFunction(name.to_string())),
                }
            }
        };
        Ok(Value::Bool(result))
    }

    fn shape(&self) -> &'static str {
        "menu"
    }
}

/// A concrete menu context, deserializable from YAML or JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEnv {
    #[serde(rename = "Ucid")]
    pub ucid: String,
    #[serde(rename = "Appid")]
    pub appid: String,
    #[serde(rename = "SdkVersion")]
    pub sdk_version: String,
}

impl MenuEnv {
    pub fn new(
        ucid: impl Into<String>,
        appid: impl Into<String>,
        sdk_version: impl Into<String>,
    ) -> Self {
        Self {
            ucid: ucid.into(),
            appid: appid.into(),
            sdk_version: sdk_version.into(),
        }
    }
}

impl MenuContext for MenuEnv {
    fn ucid(&self) -> &str {
        &self.ucid
    }

    fn appid(&self) -> &str {
        &self.appid
    }

    fn sdk_version(&self) -> &str {
        &self.sdk_version
    }
}

impl Environment for MenuEnv {
    fn has_field(&self, name: &str) -> bool {
        MenuBindings(self).has_field(name)
    }

    fn field(&self, name: &str) -> Option<Value> {
        MenuBindings(self).field(name)
    }

    fn function(&self, name: &str) -> Option<Signature> {
        MenuBindings(self).function(name)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        MenuBindings(self).call(name, args)
    }

    fn shape(&self) -> &'static str {
        "menu"
    }
}
