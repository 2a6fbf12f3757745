// crates/mesh-bridge-core/src/compile/schema.rs
// ============================================================================
// Module: Schema Compiler Facade
// Description: Whole-rule-map compilation into a schema tree.
// Purpose: Walk a field map, dispatch converters, and isolate field failures.
// Dependencies: crate::{compile, error, rules}, serde_json
// ============================================================================

//! ## Overview
//! The facade is the only component aware of the pragma keys that steer a
//! compile: the root-value marker (treat the whole map as one rule), the
//! strict marker (reject unknown fields) and the remove-unknown marker
//! (silently drop unknown fields). Every ordinary field converts
//! independently; a field that fails to compile is skipped and reported in
//! the outcome's failure list so one malformed rule never disables the rest
//! of an operation's schema. A root-value failure aborts the compile, since
//! there is nothing left to salvage.

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

use crate::compile::convert::Limits;
use crate::compile::convert::build_validator;
use crate::compile::pipeline::ComposedValidator;
use crate::error::CompileError;
use crate::rules::descriptor::Strictness;
use crate::rules::normalize::normalize;

// ============================================================================
// SECTION: Pragma Keys
// ============================================================================

/// Prefix shared by every pragma key; pragma keys never name fields.
const PRAGMA_PREFIX: &str = "$$";

/// Marker treating the whole map as one rule instead of a field set.
pub const ROOT_PRAGMA: &str = "$$root";

/// Marker rejecting unknown fields (`true`) or stripping them (`"remove"`).
pub const STRICT_PRAGMA: &str = "$$strict";

/// Marker silently dropping unknown fields.
pub const REMOVE_PRAGMA: &str = "$$remove";

// ============================================================================
// SECTION: Compile Output
// ============================================================================

/// The compiled output: a single root validator or a field-name-keyed map.
///
/// # Invariants
/// - Immutable once built; recompilation replaces trees wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTree {
    /// One validator covering the whole payload.
    Root(ComposedValidator),
    /// Per-field validators plus the unknown-key policy for the payload map.
    Fields {
        /// Validators keyed by field name.
        fields: BTreeMap<String, ComposedValidator>,
        /// Policy for payload keys with no declared field.
        unknown: Strictness,
    },
}

/// A field that failed to compile, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Name of the offending field.
    pub field: String,
    /// Why compilation failed.
    pub error: CompileError,
}

/// Result of compiling one rule map.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutcome {
    /// The compiled schema tree (failed fields omitted).
    pub schema: SchemaTree,
    /// Fields that failed to compile, in rule-map order.
    pub failures: Vec<FieldFailure>,
}

impl CompileOutcome {
    /// Returns whether every field compiled.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// SECTION: Schema Compiler
// ============================================================================

/// Default descriptor nesting budget.
pub const DEFAULT_DEPTH_BUDGET: usize = 64;

/// Compiles rule maps into schema trees.
///
/// The compiler is a synchronous, side-effect-free computation; independent
/// compiles may run concurrently without coordination.
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    strictness: Strictness,
    max_depth: usize,
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCompiler {
    /// Creates a compiler with passthrough strictness and the default depth
    /// budget.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strictness: Strictness::Passthrough,
            max_depth: DEFAULT_DEPTH_BUDGET,
        }
    }

    /// Sets the strictness inherited by maps that declare no markers.
    #[must_use]
    pub const fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Sets the maximum descriptor nesting depth.
    #[must_use]
    pub const fn with_depth_budget(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Compiles a rule map into a schema tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the map itself is malformed (not an object,
    /// invalid pragma values) or when a root-wrapped rule fails to compile.
    /// Ordinary field failures do not abort the compile; they are surfaced
    /// in the outcome's failure list instead.
    pub fn compile(&self, rules: &Value) -> Result<CompileOutcome, CompileError> {
        let Value::Object(map) = rules else {
            return Err(CompileError::MalformedRule {
                reason: "rule map must be an object".to_string(),
            });
        };

        let context = self.root_context(map)?;
        let limits = Limits {
            max_depth: self.max_depth,
        };

        if map.get(ROOT_PRAGMA) == Some(&Value::Bool(true)) {
            let mut rule = Map::new();
            for (key, value) in map {
                if !key.starts_with(PRAGMA_PREFIX) {
                    rule.insert(key.clone(), value.clone());
                }
            }
            let descriptor = normalize(&Value::Object(rule))?;
            let validator = build_validator(&descriptor, context, 0, &limits)?;
            return Ok(CompileOutcome {
                schema: SchemaTree::Root(validator),
                failures: Vec::new(),
            });
        }

        let mut fields = BTreeMap::new();
        let mut failures = Vec::new();
        for (name, rule) in map {
            if name.starts_with(PRAGMA_PREFIX) {
                continue;
            }
            let compiled = normalize(rule)
                .and_then(|descriptor| build_validator(&descriptor, context, 0, &limits));
            match compiled {
                Ok(validator) => {
                    fields.insert(name.clone(), validator);
                }
                Err(error) => failures.push(FieldFailure {
                    field: name.clone(),
                    error,
                }),
            }
        }

        Ok(CompileOutcome {
            schema: SchemaTree::Fields {
                fields,
                unknown: context,
            },
            failures,
        })
    }

    /// Resolves the strictness context declared by the map's pragma markers,
    /// falling back to the compiler's inherited strictness.
    fn root_context(&self, map: &Map<String, Value>) -> Result<Strictness, CompileError> {
        let strict = match map.get(STRICT_PRAGMA) {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::String(mode)) if mode == "remove" => Some(false),
            Some(other) => {
                return Err(CompileError::MalformedRule {
                    reason: format!("{STRICT_PRAGMA} must be a boolean or 'remove', got {other}"),
                });
            }
        };
        let remove_via_strict =
            map.get(STRICT_PRAGMA) == Some(&Value::String("remove".to_string()));
        let remove = match map.get(REMOVE_PRAGMA) {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(other) => {
                return Err(CompileError::MalformedRule {
                    reason: format!("{REMOVE_PRAGMA} must be a boolean, got {other}"),
                });
            }
        };

        if strict.is_none() && remove.is_none() && !remove_via_strict {
            return Ok(self.strictness);
        }
        Ok(Strictness::from_markers(
            strict.unwrap_or(false),
            remove.unwrap_or(false) || remove_via_strict,
        ))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
