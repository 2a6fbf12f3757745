// crates/mesh-bridge-core/src/error.rs
// ============================================================================
// Module: Compile Error Taxonomy
// Description: Error kinds raised while translating rules into validators.
// Purpose: Provide stable, field-scoped compile diagnostics.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure mode of the rule-to-validator translation is enumerated here.
//! Compile errors are synchronous and fatal to the field (or root value) that
//! triggered them; the schema compiler isolates them per field so one bad rule
//! never disables the rest of an operation set.

use thiserror::Error;

/// Errors raised while compiling a rule set into composed validators.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `EmptyPipeline` indicates an internal converter defect, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The shorthand grammar or rule object was malformed, or carried a
    /// modifier the declared type does not recognize.
    #[error("malformed rule: {reason}")]
    MalformedRule {
        /// Human-readable description of the grammar violation.
        reason: String,
    },

    /// The rule declared a type tag outside the closed enumeration.
    #[error("unknown rule type '{type_tag}'")]
    UnknownType {
        /// The unrecognized type tag as written in the rule.
        type_tag: String,
    },

    /// The declared default value disagrees with the rule's type.
    #[error("invalid default for '{type_tag}' rule: {reason}")]
    InvalidDefault {
        /// Type tag of the offending rule.
        type_tag: &'static str,
        /// Why the default was rejected.
        reason: String,
    },

    /// A pattern constraint or generated template failed to compile.
    #[error("pattern '{source}' failed to compile: {reason}")]
    RegexCompilation {
        /// The pattern source text as provided or generated.
        source: String,
        /// Compiler diagnostic for the failure.
        reason: String,
    },

    /// A composite rule was missing a required sub-rule.
    #[error("unsupported rule shape for '{type_tag}': {reason}")]
    UnsupportedRuleShape {
        /// Type tag of the offending composite rule.
        type_tag: &'static str,
        /// Which sub-rule was missing or empty.
        reason: String,
    },

    /// A type converter produced zero stages. This is a converter defect and
    /// must never degrade into a silent pass-through validator.
    #[error("type converter produced an empty pipeline for '{type_tag}'")]
    EmptyPipeline {
        /// Type tag whose converter misbehaved.
        type_tag: String,
    },

    /// Rule nesting exceeded the compiler's depth budget.
    #[error("rule nesting exceeds the depth budget of {max_depth}")]
    DepthExceeded {
        /// The configured maximum nesting depth.
        max_depth: usize,
    },
}
