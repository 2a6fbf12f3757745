// crates/mesh-bridge-core/src/rules/descriptor.rs
// ============================================================================
// Module: Rule Descriptors
// Description: Canonical descriptor forms for the rule language's type tags.
// Purpose: Provide the closed sum type consumed by the type converters.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`RuleDescriptor`] is the canonical, structured form of one field's
//! validation rule. The normalizer produces descriptors from shorthand
//! strings or rule objects; the converters consume them. Each variant carries
//! only the constraint fields relevant to its type tag, so conversion never
//! probes for field presence at runtime. Composite variants own their nested
//! descriptors exclusively (tree-shaped, no sharing, no cycles).

use std::collections::BTreeMap;

use serde_json::Value;

// ============================================================================
// SECTION: Strictness
// ============================================================================

/// Policy for unknown keys in an object-typed context.
///
/// # Invariants
/// - Inherited unchanged by every nested conversion unless a local override
///   is declared on the nested object rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Unknown keys are passed through unchanged.
    #[default]
    Passthrough,
    /// Unknown keys cause a validation failure.
    Reject,
    /// Unknown keys are silently removed.
    Strip,
}

impl Strictness {
    /// Resolves the strict and remove-unknown markers into one policy.
    ///
    /// Removing unknowns makes rejecting them moot, so the remove marker
    /// suppresses the strict marker when both are requested.
    #[must_use]
    pub fn from_markers(strict: bool, remove: bool) -> Self {
        if remove {
            Self::Strip
        } else if strict {
            Self::Reject
        } else {
            Self::Passthrough
        }
    }

    /// Returns the effective policy for a context: the local override when
    /// declared, otherwise the inherited policy.
    #[must_use]
    pub fn resolve(local: Option<Self>, inherited: Self) -> Self {
        local.unwrap_or(inherited)
    }
}

// ============================================================================
// SECTION: Shared Fields
// ============================================================================

/// Fields shared by every rule variant.
///
/// # Invariants
/// - `optional`, `nullable` and `default` are resolved only by the Shape
///   stage of the compiled pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Common {
    /// The field may be absent from the payload.
    pub optional: bool,
    /// The field may carry an explicit null.
    pub nullable: bool,
    /// Value substituted when the field is absent.
    pub default: Option<Value>,
    /// Human-readable description, attached to the composed validator as
    /// metadata only.
    pub description: Option<String>,
}

// ============================================================================
// SECTION: Scalar Rules
// ============================================================================

/// String rule with character-level constraints and transforms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce numbers and booleans into their string form.
    pub convert: bool,
    /// When `Some(false)`, empty strings are rejected.
    pub empty: Option<bool>,
    /// Minimum length in characters.
    pub min: Option<usize>,
    /// Maximum length in characters.
    pub max: Option<usize>,
    /// Exact length in characters.
    pub length: Option<usize>,
    /// Regular expression the value must match.
    pub pattern: Option<String>,
    /// Substring the value must contain.
    pub contains: Option<String>,
    /// Restrict to ASCII letters.
    pub alpha: bool,
    /// Restrict to ASCII digits.
    pub numeric: bool,
    /// Restrict to ASCII letters and digits.
    pub alphanum: bool,
    /// Restrict to ASCII letters, digits, dashes and underscores.
    pub alphadash: bool,
    /// Restrict to hexadecimal characters.
    pub hex: bool,
    /// Restrict to the base64 alphabet with valid padding.
    pub base64: bool,
    /// Reject line breaks.
    pub single_line: bool,
    /// Permitted literal values, matched as an anchored alternation.
    pub one_of: Vec<String>,
    /// Trim surrounding whitespace before validation.
    pub trim: bool,
    /// Trim leading whitespace before validation.
    pub trim_left: bool,
    /// Trim trailing whitespace before validation.
    pub trim_right: bool,
    /// Fold to lowercase before validation.
    pub lowercase: bool,
    /// Fold to uppercase before validation.
    pub uppercase: bool,
    /// Pad the start of the value to this width after validation.
    pub pad_start: Option<usize>,
    /// Pad the end of the value to this width after validation.
    pub pad_end: Option<usize>,
    /// Fill character used for padding (defaults to a space).
    pub pad_char: Option<char>,
}

/// Number rule with range and sign constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce numeric strings into numbers.
    pub convert: bool,
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Exact required value.
    pub equal: Option<f64>,
    /// Value the number must differ from.
    pub not_equal: Option<f64>,
    /// Reject values with a fractional part.
    pub integer: bool,
    /// Require a value greater than zero.
    pub positive: bool,
    /// Require a value less than zero.
    pub negative: bool,
}

/// Boolean rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce `"true"`/`"false"`/`"1"`/`"0"` strings and `0`/`1` numbers.
    pub convert: bool,
}

/// Date rule. The wire form of a date is an RFC 3339 string; with `convert`,
/// integer epoch milliseconds are also accepted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateRule {
    /// Shared rule fields.
    pub common: Common,
    /// Additionally accept epoch-millisecond numbers.
    pub convert: bool,
}

/// Rule accepting any value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnyRule {
    /// Shared rule fields.
    pub common: Common,
}

// ============================================================================
// SECTION: Format Rules
// ============================================================================

/// Email address rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmailRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce non-string scalars into their string form before checking.
    pub convert: bool,
    /// Trim and lowercase the address before validation.
    pub normalize: bool,
    /// When `Some(false)`, empty values are rejected.
    pub empty: Option<bool>,
    /// Minimum length in characters.
    pub min: Option<usize>,
    /// Maximum length in characters.
    pub max: Option<usize>,
}

/// Currency string rule built from separator and symbol templates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrencyRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce non-string scalars into their string form before checking.
    pub convert: bool,
    /// Currency symbol expected in the value.
    pub symbol: Option<String>,
    /// Whether the symbol may be omitted.
    pub symbol_optional: bool,
    /// Thousands separator (defaults to `,`).
    pub thousand_separator: Option<String>,
    /// Decimal separator (defaults to `.`).
    pub decimal_separator: Option<String>,
    /// Full replacement pattern overriding the generated template.
    pub custom_pattern: Option<String>,
}

/// URL rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UrlRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce non-string scalars into their string form before checking.
    pub convert: bool,
    /// When `Some(false)`, empty values are rejected.
    pub empty: Option<bool>,
}

/// UUID rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UuidRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce non-string scalars into their string form before checking.
    pub convert: bool,
    /// When `Some(false)`, empty values are rejected.
    pub empty: Option<bool>,
}

/// Luhn-checksummed string rule (payment card numbers and similar).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LuhnRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce non-string scalars into their string form before checking.
    pub convert: bool,
}

/// MAC address rule (colon, dash or dot grouped hex).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacRule {
    /// Shared rule fields.
    pub common: Common,
    /// Coerce non-string scalars into their string form before checking.
    pub convert: bool,
}

// ============================================================================
// SECTION: Identity and Host Rules
// ============================================================================

/// Conversion applied to an opaque external identity after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdConversion {
    /// Leave the value as provided.
    #[default]
    None,
    /// Convert to the codec's instance form.
    Instance,
    /// Convert to the codec's canonical string form.
    StringForm,
}

/// Opaque external identity rule (for example a document identifier).
///
/// Validity and conversion are delegated to the runtime identity codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalIdRule {
    /// Shared rule fields.
    pub common: Common,
    /// Post-validation conversion to apply.
    pub convert: IdConversion,
}

/// Host-object instance rule. Instance checks are delegated to the runtime
/// instance registry; the default registry recognizes nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassRule {
    /// Shared rule fields.
    pub common: Common,
    /// Name of the expected class.
    pub class_name: String,
}

/// Callable rule. JSON payloads cannot carry callables, so recognition is
/// delegated to the runtime instance registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionRule {
    /// Shared rule fields.
    pub common: Common,
}

// ============================================================================
// SECTION: Value Rules
// ============================================================================

/// Membership rule over a fixed value set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumRule {
    /// Shared rule fields.
    pub common: Common,
    /// Permitted values.
    pub values: Vec<Value>,
}

/// Equality rule against one fixed value.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualRule {
    /// Shared rule fields.
    pub common: Common,
    /// The value the field must equal.
    pub value: Value,
    /// Use type-strict equality instead of coercing comparison.
    pub strict: bool,
}

/// Rule forbidding a field from appearing in the payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForbiddenRule {
    /// Shared rule fields.
    pub common: Common,
    /// Silently drop the value instead of rejecting the payload.
    pub remove: bool,
}

// ============================================================================
// SECTION: Composite Rules
// ============================================================================

/// Containment requirement for array elements.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainsRule {
    /// The array must contain this one element.
    One(Value),
    /// The array must contain every listed element.
    All(Vec<Value>),
}

/// Array rule with a nested element descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayRule {
    /// Shared rule fields.
    pub common: Common,
    /// Wrap a lone non-array value into a one-element array.
    pub convert: bool,
    /// When `Some(true)`, empty arrays are accepted; otherwise rejected.
    pub empty: Option<bool>,
    /// Minimum element count.
    pub min: Option<usize>,
    /// Maximum element count.
    pub max: Option<usize>,
    /// Exact element count.
    pub length: Option<usize>,
    /// Required element containment.
    pub contains: Option<ContainsRule>,
    /// Require pairwise-distinct elements.
    pub unique: bool,
    /// Permitted element values.
    pub one_of: Vec<Value>,
    /// Descriptor every element must satisfy.
    pub items: Option<Box<RuleDescriptor>>,
}

/// Object rule with named property descriptors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectRule {
    /// Shared rule fields.
    pub common: Common,
    /// Local strictness override for this object and its descendants.
    pub strict: Option<Strictness>,
    /// Property descriptors keyed by field name.
    pub props: Option<BTreeMap<String, RuleDescriptor>>,
    /// Minimum number of properties present.
    pub min_props: Option<usize>,
    /// Maximum number of properties present.
    pub max_props: Option<usize>,
}

/// Union rule whose branches are tried left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiRule {
    /// Shared rule fields.
    pub common: Common,
    /// Branch descriptors in declaration order.
    pub rules: Vec<RuleDescriptor>,
}

/// Fixed-arity tuple rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleRule {
    /// Shared rule fields.
    pub common: Common,
    /// Slot descriptors in positional order.
    pub items: Vec<RuleDescriptor>,
}

/// Key/value map rule with nested key and value descriptors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordRule {
    /// Shared rule fields.
    pub common: Common,
    /// Descriptor every key must satisfy (defaults to a bare string rule).
    pub key: Option<Box<RuleDescriptor>>,
    /// Descriptor every value must satisfy (defaults to an any rule).
    pub value: Option<Box<RuleDescriptor>>,
}

// ============================================================================
// SECTION: Descriptor Sum Type
// ============================================================================

/// Canonical form of one field's validation rule.
///
/// # Invariants
/// - The enumeration is closed; the normalizer rejects unknown type tags.
/// - Descriptors are immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDescriptor {
    /// String rule.
    String(StringRule),
    /// Number rule.
    Number(NumberRule),
    /// Boolean rule.
    Boolean(BooleanRule),
    /// Date rule.
    Date(DateRule),
    /// Any-value rule.
    Any(AnyRule),
    /// Email rule.
    Email(EmailRule),
    /// Currency rule.
    Currency(CurrencyRule),
    /// Host-object instance rule.
    Class(ClassRule),
    /// Fixed value-set membership rule.
    Enum(EnumRule),
    /// Fixed-value equality rule.
    Equal(EqualRule),
    /// Forbidden-field rule.
    Forbidden(ForbiddenRule),
    /// Callable rule.
    Function(FunctionRule),
    /// Luhn-checksummed string rule.
    Luhn(LuhnRule),
    /// MAC address rule.
    Mac(MacRule),
    /// Array rule.
    Array(ArrayRule),
    /// Object rule.
    Object(ObjectRule),
    /// Union rule.
    Multi(MultiRule),
    /// Tuple rule.
    Tuple(TupleRule),
    /// URL rule.
    Url(UrlRule),
    /// UUID rule.
    Uuid(UuidRule),
    /// Opaque external identity rule.
    ExternalId(ExternalIdRule),
    /// Key/value map rule.
    Record(RecordRule),
}

impl RuleDescriptor {
    /// Returns the type tag this descriptor was declared with.
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Any(_) => "any",
            Self::Email(_) => "email",
            Self::Currency(_) => "currency",
            Self::Class(_) => "class",
            Self::Enum(_) => "enum",
            Self::Equal(_) => "equal",
            Self::Forbidden(_) => "forbidden",
            Self::Function(_) => "function",
            Self::Luhn(_) => "luhn",
            Self::Mac(_) => "mac",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Multi(_) => "multi",
            Self::Tuple(_) => "tuple",
            Self::Url(_) => "url",
            Self::Uuid(_) => "uuid",
            Self::ExternalId(_) => "objectID",
            Self::Record(_) => "record",
        }
    }

    /// Returns the shared rule fields.
    #[must_use]
    pub const fn common(&self) -> &Common {
        match self {
            Self::String(rule) => &rule.common,
            Self::Number(rule) => &rule.common,
            Self::Boolean(rule) => &rule.common,
            Self::Date(rule) => &rule.common,
            Self::Any(rule) => &rule.common,
            Self::Email(rule) => &rule.common,
            Self::Currency(rule) => &rule.common,
            Self::Class(rule) => &rule.common,
            Self::Enum(rule) => &rule.common,
            Self::Equal(rule) => &rule.common,
            Self::Forbidden(rule) => &rule.common,
            Self::Function(rule) => &rule.common,
            Self::Luhn(rule) => &rule.common,
            Self::Mac(rule) => &rule.common,
            Self::Array(rule) => &rule.common,
            Self::Object(rule) => &rule.common,
            Self::Multi(rule) => &rule.common,
            Self::Tuple(rule) => &rule.common,
            Self::Url(rule) => &rule.common,
            Self::Uuid(rule) => &rule.common,
            Self::ExternalId(rule) => &rule.common,
            Self::Record(rule) => &rule.common,
        }
    }
}
