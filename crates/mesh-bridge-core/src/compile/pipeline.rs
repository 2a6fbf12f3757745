// crates/mesh-bridge-core/src/compile/pipeline.rs
// ============================================================================
// Module: Validator Pipeline
// Description: Stage categories and the composed validator they fold into.
// Purpose: Represent one field's validator as an ordered, immutable pipeline.
// Dependencies: crate::{error, rules::descriptor}, regex, serde_json
// ============================================================================

//! ## Overview
//! A compiled field is an ordered pipeline of stages in five fixed
//! categories: Shape (base type, coercion, nullable/optional/default),
//! PreProcess (value-preserving transforms), Validate (pass/fail
//! constraints), Refine (semantic predicates) and Manipulate
//! (post-validation transforms). The composer folds a converter's stage list
//! into one [`ComposedValidator`]; the category order is fixed and absent
//! categories are skipped, never reordered. An empty stage list is a
//! converter defect and fails composition rather than degrading into a
//! silent pass-through.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::error::CompileError;
use crate::rules::descriptor::Strictness;

// ============================================================================
// SECTION: Stage Categories
// ============================================================================

/// Ordered stage categories of a composed validator.
///
/// # Invariants
/// - Evaluation order follows the declaration order below and is never
///   reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StageKind {
    /// Base type, coercion and nullable/optional/default resolution.
    Shape,
    /// Value-preserving transforms applied before validation.
    PreProcess,
    /// Pass/fail constraint checks.
    Validate,
    /// Semantic predicate checks.
    Refine,
    /// Post-validation transforms.
    Manipulate,
}

impl StageKind {
    /// Returns a stable label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::PreProcess => "pre-process",
            Self::Validate => "validate",
            Self::Refine => "refine",
            Self::Manipulate => "manipulate",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Compiled Patterns
// ============================================================================

/// A regular expression compiled once at schema-compile time.
///
/// Equality and debug formatting use the pattern source so validators stay
/// structurally comparable.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    message: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles a pattern, attaching the failure message reported when a
    /// value does not match.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::RegexCompilation`] when the source is not a
    /// valid pattern.
    pub fn new(source: &str, message: &str) -> Result<Self, CompileError> {
        let regex = Regex::new(source).map_err(|error| CompileError::RegexCompilation {
            source: source.to_string(),
            reason: error.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            message: message.to_string(),
            regex,
        })
    }

    /// Returns the pattern source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the failure message for non-matching values.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the text matches the pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.message == other.message
    }
}

// ============================================================================
// SECTION: Shape Stage
// ============================================================================

/// Base type form checked and coerced by the Shape stage.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseShape {
    /// UTF-8 string; with `coerce`, numbers and booleans stringify.
    String {
        /// Coerce numbers and booleans into strings.
        coerce: bool,
    },
    /// JSON number; with `coerce`, numeric strings parse.
    Number {
        /// Coerce numeric strings into numbers.
        coerce: bool,
    },
    /// Boolean; with `coerce`, `"true"`/`"false"`/`"1"`/`"0"` and `0`/`1`
    /// convert.
    Boolean {
        /// Coerce recognized scalars into booleans.
        coerce: bool,
    },
    /// RFC 3339 date string; with `coerce`, epoch-millisecond numbers are
    /// also accepted. Parse validity is re-checked by the Refine stage.
    Date {
        /// Additionally accept epoch-millisecond numbers.
        coerce: bool,
    },
    /// Any value.
    Any,
    /// String carrying an email address.
    Email {
        /// Coerce non-string scalars into strings first.
        coerce: bool,
    },
    /// String carrying an absolute URL.
    Url {
        /// Coerce non-string scalars into strings first.
        coerce: bool,
    },
    /// String carrying a UUID.
    Uuid {
        /// Coerce non-string scalars into strings first.
        coerce: bool,
    },
    /// Host-object instance recognized by the runtime instance registry.
    Instance {
        /// Expected class name.
        class_name: String,
    },
    /// Callable recognized by the runtime instance registry.
    Callable,
    /// Opaque identity: a string or an instance the identity codec accepts.
    ExternalId,
    /// Array whose elements satisfy the nested validator.
    Array {
        /// Validator applied to every element.
        item: Box<ComposedValidator>,
        /// Wrap a lone non-array value into a one-element array.
        wrap: bool,
    },
    /// Object with named property validators and an unknown-key policy.
    Object {
        /// Property validators keyed by field name.
        props: BTreeMap<String, ComposedValidator>,
        /// Policy for keys not named in `props`.
        unknown: Strictness,
    },
    /// Fixed-arity tuple of positional validators.
    Tuple {
        /// Validators applied per slot.
        slots: Vec<ComposedValidator>,
    },
    /// Key/value map with nested key and value validators.
    Record {
        /// Validator applied to every key.
        key: Box<ComposedValidator>,
        /// Validator applied to every value.
        value: Box<ComposedValidator>,
    },
    /// Union of branch validators tried left to right.
    Union {
        /// Branch validators in declaration order.
        branches: Vec<ComposedValidator>,
    },
}

/// Shape stage: the only stage that resolves optional, nullable and default.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStage {
    /// Base type form.
    pub base: BaseShape,
    /// Absent fields succeed without producing a value.
    pub optional: bool,
    /// Explicit nulls succeed and skip the remaining stages.
    pub nullable: bool,
    /// Value substituted for absent fields.
    pub default: Option<Value>,
}

// ============================================================================
// SECTION: Stage Operations
// ============================================================================

/// Value-preserving transforms applied before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreProcessOp {
    /// Trim surrounding whitespace.
    Trim,
    /// Trim leading whitespace.
    TrimStart,
    /// Trim trailing whitespace.
    TrimEnd,
    /// Fold to lowercase.
    Lowercase,
    /// Fold to uppercase.
    Uppercase,
    /// Trim and lowercase (email normalization).
    NormalizeEmail,
}

/// Pass/fail constraint checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidateOp {
    /// Minimum length in characters.
    MinLength(usize),
    /// Maximum length in characters.
    MaxLength(usize),
    /// Exact length in characters.
    ExactLength(usize),
    /// Reject empty strings.
    NotEmpty,
    /// Match against a compiled pattern.
    Pattern(CompiledPattern),
    /// Require a substring.
    Contains(String),
    /// Require at least one ASCII digit.
    ContainsDigit,
    /// Inclusive numeric lower bound.
    MinNumber(f64),
    /// Inclusive numeric upper bound.
    MaxNumber(f64),
    /// Reject numbers with a fractional part.
    Integer,
    /// Require a value greater than zero.
    Positive,
    /// Require a value less than zero.
    Negative,
    /// Minimum element count.
    MinItems(usize),
    /// Maximum element count.
    MaxItems(usize),
    /// Exact element count.
    ExactItems(usize),
    /// Reject empty arrays.
    NonEmptyArray,
}

/// Semantic predicate checks.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOp {
    /// Number must differ from the given value.
    NotEqualNumber(f64),
    /// Date string or epoch number must parse as a valid date.
    ValidDate {
        /// Whether epoch-millisecond numbers are permitted.
        coerce: bool,
    },
    /// Value must be a member of the fixed set.
    MemberOf(Vec<Value>),
    /// Value must equal the expected value.
    EqualTo {
        /// Expected value.
        expected: Value,
        /// Use type-strict equality instead of coercing comparison.
        strict: bool,
    },
    /// Any present value fails (forbidden fields).
    PresenceForbidden,
    /// String must pass the Luhn checksum.
    Luhn,
    /// Identity codec must accept the value.
    ValidIdentity,
    /// Array must contain this element.
    ContainsOne(Value),
    /// Array must contain every listed element.
    ContainsAll(Vec<Value>),
    /// Array elements must be pairwise distinct.
    UniqueItems,
    /// Every array element must be a member of the fixed set.
    ItemsMemberOf(Vec<Value>),
    /// Minimum number of properties present.
    MinProps(usize),
    /// Maximum number of properties present.
    MaxProps(usize),
}

/// Post-validation transforms.
#[derive(Debug, Clone, PartialEq)]
pub enum ManipulateOp {
    /// Pad the start of the string to the given width.
    PadStart {
        /// Target width in characters.
        width: usize,
        /// Fill character.
        fill: char,
    },
    /// Pad the end of the string to the given width.
    PadEnd {
        /// Target width in characters.
        width: usize,
        /// Fill character.
        fill: char,
    },
    /// Drop the value, leaving the field absent.
    Drop,
    /// Convert an identity to the codec's instance form.
    IdentityToInstance,
    /// Convert an identity to the codec's canonical string form.
    IdentityToString,
}

/// One pipeline stage: a pure function from a value to a transformed value
/// or a validity verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Shape stage.
    Shape(ShapeStage),
    /// Pre-processing transform.
    PreProcess(PreProcessOp),
    /// Constraint check.
    Validate(ValidateOp),
    /// Semantic predicate.
    Refine(RefineOp),
    /// Post-validation transform.
    Manipulate(ManipulateOp),
}

impl Stage {
    /// Returns the stage's category.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::Shape(_) => StageKind::Shape,
            Self::PreProcess(_) => StageKind::PreProcess,
            Self::Validate(_) => StageKind::Validate,
            Self::Refine(_) => StageKind::Refine,
            Self::Manipulate(_) => StageKind::Manipulate,
        }
    }
}

// ============================================================================
// SECTION: Composed Validator
// ============================================================================

/// The folded, ordered stage chain for one field, plus optional description.
///
/// # Invariants
/// - The stage list is non-empty and ordered by [`StageKind`].
/// - Immutable once built; recompilation replaces validators wholesale.
/// - The description is metadata only and never affects evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedValidator {
    stages: Vec<Stage>,
    description: Option<String>,
}

impl ComposedValidator {
    /// Folds a converter's ordered stage list into one validator.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::EmptyPipeline`] when the converter produced
    /// zero stages; this is a defect, never a silent pass-through.
    pub fn compose(
        type_tag: &str,
        stages: Vec<Stage>,
        description: Option<String>,
    ) -> Result<Self, CompileError> {
        if stages.is_empty() {
            return Err(CompileError::EmptyPipeline {
                type_tag: type_tag.to_string(),
            });
        }
        Ok(Self {
            stages,
            description,
        })
    }

    /// Returns the ordered stages.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the attached description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the shape stage that heads the pipeline, if present.
    #[must_use]
    pub fn shape(&self) -> Option<&ShapeStage> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Shape(shape) => Some(shape),
            _ => None,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
