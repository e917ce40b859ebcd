// SPDX-License-Identifier: MIT

//! Cache of parsed and bound expressions
//!
//! The same rule is usually evaluated once per incoming request, each time
//! with a different environment of the same type. Entries are keyed by the
//! environment's shape and the expression text, and are only stored once
//! parsing and binding both succeeded.
//!
//! The cache grows with every distinct expression it sees unless a bound is
//! set with [`ProgramCache::max_entries`]. Rule sets are a fixed, small
//! population; callers compiling user-supplied text should set one.

use super::ast::Node;
use super::env::Environment;
use super::error::ExprError;
use super::evaluator::{bind, execute};
use super::parser::Parser;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type ProgramMap = HashMap<&'static str, HashMap<String, Arc<Node>>>;

#[derive(Clone, Default)]
pub struct ProgramCache {
    programs: Arc<RwLock<ProgramMap>>,
    parser: Parser,
    max_entries: Option<usize>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that parses with the given parser settings
    pub fn with_parser(parser: Parser) -> Self {
        Self {
            parser,
            ..Self::default()
        }
    }

    /// Stop caching once `max_entries` expressions are stored
    ///
    /// Misses past the bound are still compiled and returned, just not kept.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Parsed and bound tree for `source`, compiling it on a miss
    pub fn compile<E: Environment + ?Sized>(
        &self,
        source: &str,
        env: &E,
    ) -> Result<Arc<Node>, ExprError> {
        let shape = env.shape();
        if let Some(node) = self.get(shape, source) {
            return Ok(node);
        }

        let node = self.parser.parse(source)?;
        bind(&node, env)?;
        let node = Arc::new(node);

        let mut programs = self
            .programs
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stored: usize = programs.values().map(HashMap::len).sum();
        if self.max_entries.is_some_and(|limit| stored >= limit) {
            if let Some(node) = programs.get(shape).and_then(|m| m.get(source)) {
                return Ok(Arc::clone(node));
            }
            log::debug!("Cache full, not storing expression: {}", source.trim());
            return Ok(node);
        }
        // Another thread may have compiled the same expression meanwhile
        let entry = programs
            .entry(shape)
            .or_default()
            .entry(source.to_string())
            .or_insert(node);
        log::debug!("Cached expression for {}: {}", shape, source.trim());
        Ok(Arc::clone(entry))
    }

    /// Evaluate `source` against `env`, reusing a cached tree when present
    pub fn evaluate<E: Environment + ?Sized>(
        &self,
        source: &str,
        env: &E,
    ) -> Result<bool, ExprError> {
        let node = self.compile(source, env)?;
        Ok(execute(&node, env)?)
    }

    /// Number of cached expressions across all shapes
    pub fn len(&self) -> usize {
        self.programs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.programs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn get(&self, shape: &str, source: &str) -> Option<Arc<Node>> {
        let programs = self
            .programs
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        programs.get(shape)?.get(source).cloned()
    }
}
