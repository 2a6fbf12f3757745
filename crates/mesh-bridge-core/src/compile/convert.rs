// crates/mesh-bridge-core/src/compile/convert.rs
// ============================================================================
// Module: Type Converters
// Description: Per-type translation of rule descriptors into stage lists.
// Purpose: Compile each descriptor variant into its ordered validator stages.
// Dependencies: crate::{compile::pipeline, error, rules::descriptor}, regex
// ============================================================================

//! ## Overview
//! One converter per type tag. Each converter receives a canonical descriptor
//! and the inherited strictness context and returns the ordered stage list
//! for that field: Shape first, then any PreProcess, Validate, Refine and
//! Manipulate stages the descriptor's constraint fields call for. Composite
//! converters recurse with the same context and a depth budget so hostile
//! rule trees fail closed instead of exhausting the stack. The dispatch is an
//! exhaustive match over the closed enumeration; there is no path on which a
//! descriptor silently produces no pipeline.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::compile::pipeline::BaseShape;
use crate::compile::pipeline::CompiledPattern;
use crate::compile::pipeline::ComposedValidator;
use crate::compile::pipeline::ManipulateOp;
use crate::compile::pipeline::PreProcessOp;
use crate::compile::pipeline::RefineOp;
use crate::compile::pipeline::ShapeStage;
use crate::compile::pipeline::Stage;
use crate::compile::pipeline::ValidateOp;
use crate::error::CompileError;
use crate::rules::descriptor::AnyRule;
use crate::rules::descriptor::ArrayRule;
use crate::rules::descriptor::BooleanRule;
use crate::rules::descriptor::ClassRule;
use crate::rules::descriptor::Common;
use crate::rules::descriptor::ContainsRule;
use crate::rules::descriptor::CurrencyRule;
use crate::rules::descriptor::DateRule;
use crate::rules::descriptor::EmailRule;
use crate::rules::descriptor::EnumRule;
use crate::rules::descriptor::EqualRule;
use crate::rules::descriptor::ExternalIdRule;
use crate::rules::descriptor::ForbiddenRule;
use crate::rules::descriptor::FunctionRule;
use crate::rules::descriptor::IdConversion;
use crate::rules::descriptor::LuhnRule;
use crate::rules::descriptor::MacRule;
use crate::rules::descriptor::MultiRule;
use crate::rules::descriptor::NumberRule;
use crate::rules::descriptor::ObjectRule;
use crate::rules::descriptor::RecordRule;
use crate::rules::descriptor::RuleDescriptor;
use crate::rules::descriptor::StringRule;
use crate::rules::descriptor::Strictness;
use crate::rules::descriptor::TupleRule;
use crate::rules::descriptor::UrlRule;
use crate::rules::descriptor::UuidRule;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MAC addresses grouped by colons, dashes or dots.
const MAC_PATTERN: &str = r"(?i)^(?:(?:[0-9a-f]{2}:){5}[0-9a-f]{2}|(?:[0-9a-f]{2}-){5}[0-9a-f]{2}|(?:[0-9a-f]{4}\.){2}[0-9a-f]{4})$";

/// Character-class constraints expressible as anchored patterns.
const CHARSET_PATTERNS: &[(&str, &str)] = &[
    ("alpha", "^[A-Za-z]+$"),
    ("numeric", "^[0-9]+$"),
    ("alphanum", "^[A-Za-z0-9]+$"),
    ("alphadash", "^[A-Za-z0-9_-]+$"),
    ("hex", "^[0-9a-fA-F]+$"),
    ("base64", "^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$"),
    ("singleLine", "^[^\r\n]*$"),
];

// ============================================================================
// SECTION: Conversion Entry Points
// ============================================================================

/// Compile-time resource limits threaded through recursive conversions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    /// Maximum descriptor nesting depth.
    pub max_depth: usize,
}

/// Converts a descriptor and composes the result into one validator.
///
/// # Errors
///
/// Returns any converter failure mode, or [`CompileError::DepthExceeded`]
/// when the descriptor tree nests deeper than the configured budget.
pub(crate) fn build_validator(
    descriptor: &RuleDescriptor,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<ComposedValidator, CompileError> {
    if depth > limits.max_depth {
        return Err(CompileError::DepthExceeded {
            max_depth: limits.max_depth,
        });
    }
    let stages = convert_descriptor(descriptor, context, depth, limits)?;
    ComposedValidator::compose(
        descriptor.type_tag(),
        stages,
        descriptor.common().description.clone(),
    )
}

/// Dispatches a descriptor to its type converter.
fn convert_descriptor(
    descriptor: &RuleDescriptor,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<Vec<Stage>, CompileError> {
    match descriptor {
        RuleDescriptor::String(rule) => convert_string(rule),
        RuleDescriptor::Number(rule) => convert_number(rule),
        RuleDescriptor::Boolean(rule) => convert_boolean(rule),
        RuleDescriptor::Date(rule) => convert_date(rule),
        RuleDescriptor::Any(rule) => Ok(vec![shape(BaseShape::Any, &rule.common)]),
        RuleDescriptor::Email(rule) => convert_email(rule),
        RuleDescriptor::Currency(rule) => convert_currency(rule),
        RuleDescriptor::Class(rule) => convert_class(rule),
        RuleDescriptor::Enum(rule) => convert_enum(rule),
        RuleDescriptor::Equal(rule) => convert_equal(rule),
        RuleDescriptor::Forbidden(rule) => convert_forbidden(rule),
        RuleDescriptor::Function(rule) => convert_function(rule),
        RuleDescriptor::Luhn(rule) => convert_luhn(rule),
        RuleDescriptor::Mac(rule) => convert_mac(rule),
        RuleDescriptor::Array(rule) => convert_array(rule, context, depth, limits),
        RuleDescriptor::Object(rule) => convert_object(rule, context, depth, limits),
        RuleDescriptor::Multi(rule) => convert_multi(rule, context, depth, limits),
        RuleDescriptor::Tuple(rule) => convert_tuple(rule, context, depth, limits),
        RuleDescriptor::Url(rule) => convert_url(rule),
        RuleDescriptor::Uuid(rule) => convert_uuid(rule),
        RuleDescriptor::ExternalId(rule) => convert_external_id(rule),
        RuleDescriptor::Record(rule) => convert_record(rule, context, depth, limits),
    }
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Builds the Shape stage for a descriptor's shared fields.
fn shape(base: BaseShape, common: &Common) -> Stage {
    Stage::Shape(ShapeStage {
        base,
        optional: common.optional,
        nullable: common.nullable,
        default: common.default.clone(),
    })
}

/// Checks a declared default against the rule's expected runtime type.
fn check_default(
    type_tag: &'static str,
    common: &Common,
    accepts: impl Fn(&Value) -> bool,
    expected: &str,
) -> Result<(), CompileError> {
    match &common.default {
        Some(default) if !accepts(default) => Err(CompileError::InvalidDefault {
            type_tag,
            reason: format!("default must be {expected}, got {default}"),
        }),
        _ => Ok(()),
    }
}

// ============================================================================
// SECTION: Scalar Converters
// ============================================================================

/// Converts a string rule into its ordered stages.
fn convert_string(rule: &StringRule) -> Result<Vec<Stage>, CompileError> {
    check_default("string", &rule.common, Value::is_string, "a string")?;

    let mut stages = vec![shape(
        BaseShape::String {
            coerce: rule.convert,
        },
        &rule.common,
    )];

    for (flag, op) in [
        (rule.trim, PreProcessOp::Trim),
        (rule.trim_left, PreProcessOp::TrimStart),
        (rule.trim_right, PreProcessOp::TrimEnd),
        (rule.lowercase, PreProcessOp::Lowercase),
        (rule.uppercase, PreProcessOp::Uppercase),
    ] {
        if flag {
            stages.push(Stage::PreProcess(op));
        }
    }

    if rule.empty == Some(false) {
        stages.push(Stage::Validate(ValidateOp::NotEmpty));
    }
    if let Some(min) = rule.min {
        stages.push(Stage::Validate(ValidateOp::MinLength(min)));
    }
    if let Some(max) = rule.max {
        stages.push(Stage::Validate(ValidateOp::MaxLength(max)));
    }
    if let Some(length) = rule.length {
        stages.push(Stage::Validate(ValidateOp::ExactLength(length)));
    }
    if let Some(pattern) = &rule.pattern {
        stages.push(Stage::Validate(ValidateOp::Pattern(CompiledPattern::new(
            pattern,
            "value does not match the required pattern",
        )?)));
    }
    if let Some(substring) = &rule.contains {
        stages.push(Stage::Validate(ValidateOp::Contains(substring.clone())));
    }
    for (flag, class) in [
        (rule.alpha, "alpha"),
        (rule.numeric, "numeric"),
        (rule.alphanum, "alphanum"),
        (rule.alphadash, "alphadash"),
        (rule.hex, "hex"),
        (rule.base64, "base64"),
        (rule.single_line, "singleLine"),
    ] {
        if flag {
            stages.push(Stage::Validate(ValidateOp::Pattern(charset_pattern(class)?)));
        }
    }
    if !rule.one_of.is_empty() {
        stages.push(Stage::Validate(ValidateOp::Pattern(one_of_pattern(&rule.one_of)?)));
    }

    let fill = rule.pad_char.unwrap_or(' ');
    if let Some(width) = rule.pad_start {
        stages.push(Stage::Manipulate(ManipulateOp::PadStart {
            width,
            fill,
        }));
    } else if let Some(width) = rule.pad_end {
        stages.push(Stage::Manipulate(ManipulateOp::PadEnd {
            width,
            fill,
        }));
    }

    Ok(stages)
}

/// Looks up a charset class pattern by its modifier name.
fn charset_pattern(class: &str) -> Result<CompiledPattern, CompileError> {
    let source = CHARSET_PATTERNS
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, source)| *source)
        .unwrap_or_default();
    CompiledPattern::new(source, &format!("value violates the '{class}' constraint"))
}

/// Builds an anchored alternation over permitted literal values.
fn one_of_pattern(values: &[String]) -> Result<CompiledPattern, CompileError> {
    let alternation: Vec<String> = values.iter().map(|value| regex::escape(value)).collect();
    let source = format!("^(?:{})$", alternation.join("|"));
    CompiledPattern::new(
        &source,
        &format!("value must be one of: {}", values.join(", ")),
    )
}

/// Converts a number rule into its ordered stages.
fn convert_number(rule: &NumberRule) -> Result<Vec<Stage>, CompileError> {
    check_default("number", &rule.common, Value::is_number, "a number")?;

    let mut stages = vec![shape(
        BaseShape::Number {
            coerce: rule.convert,
        },
        &rule.common,
    )];

    if let Some(equal) = rule.equal {
        stages.push(Stage::Validate(ValidateOp::MinNumber(equal)));
        stages.push(Stage::Validate(ValidateOp::MaxNumber(equal)));
    } else {
        if let Some(min) = rule.min {
            stages.push(Stage::Validate(ValidateOp::MinNumber(min)));
        }
        if let Some(max) = rule.max {
            stages.push(Stage::Validate(ValidateOp::MaxNumber(max)));
        }
    }
    if rule.integer {
        stages.push(Stage::Validate(ValidateOp::Integer));
    }
    if rule.positive {
        stages.push(Stage::Validate(ValidateOp::Positive));
    } else if rule.negative {
        stages.push(Stage::Validate(ValidateOp::Negative));
    }

    if let Some(not_equal) = rule.not_equal {
        stages.push(Stage::Refine(RefineOp::NotEqualNumber(not_equal)));
    }

    Ok(stages)
}

/// Converts a boolean rule into its shape stage.
fn convert_boolean(rule: &BooleanRule) -> Result<Vec<Stage>, CompileError> {
    check_default("boolean", &rule.common, Value::is_boolean, "a boolean")?;
    Ok(vec![shape(
        BaseShape::Boolean {
            coerce: rule.convert,
        },
        &rule.common,
    )])
}

/// Converts a date rule into shape and validity stages.
fn convert_date(rule: &DateRule) -> Result<Vec<Stage>, CompileError> {
    check_default(
        "date",
        &rule.common,
        |value| value.is_string() || (rule.convert && value.is_number()),
        "an RFC 3339 string or, with convert, an epoch number",
    )?;
    Ok(vec![
        shape(
            BaseShape::Date {
                coerce: rule.convert,
            },
            &rule.common,
        ),
        Stage::Refine(RefineOp::ValidDate {
            coerce: rule.convert,
        }),
    ])
}

// ============================================================================
// SECTION: Format Converters
// ============================================================================

/// Converts an email rule into its ordered stages.
fn convert_email(rule: &EmailRule) -> Result<Vec<Stage>, CompileError> {
    check_default("email", &rule.common, Value::is_string, "a string")?;

    let mut stages = vec![shape(
        BaseShape::Email {
            coerce: rule.convert,
        },
        &rule.common,
    )];
    if rule.normalize {
        stages.push(Stage::PreProcess(PreProcessOp::NormalizeEmail));
    }
    if rule.empty == Some(false) {
        stages.push(Stage::Validate(ValidateOp::NotEmpty));
    }
    if let Some(min) = rule.min {
        stages.push(Stage::Validate(ValidateOp::MinLength(min)));
    }
    if let Some(max) = rule.max {
        stages.push(Stage::Validate(ValidateOp::MaxLength(max)));
    }
    Ok(stages)
}

/// Converts a currency rule into shape and pattern stages.
fn convert_currency(rule: &CurrencyRule) -> Result<Vec<Stage>, CompileError> {
    check_default("currency", &rule.common, Value::is_string, "a string")?;

    let mut stages = vec![shape(
        BaseShape::String {
            coerce: rule.convert,
        },
        &rule.common,
    )];
    if let Some(custom) = &rule.custom_pattern {
        stages.push(Stage::Validate(ValidateOp::Pattern(CompiledPattern::new(
            custom,
            "value does not match the custom currency pattern",
        )?)));
    } else {
        stages.push(Stage::Validate(ValidateOp::ContainsDigit));
        stages.push(Stage::Validate(ValidateOp::Pattern(currency_pattern(rule)?)));
    }
    Ok(stages)
}

/// Builds the currency template from symbol and separator settings.
fn currency_pattern(rule: &CurrencyRule) -> Result<CompiledPattern, CompileError> {
    let symbol = match &rule.symbol {
        Some(symbol) => {
            let escaped = regex::escape(symbol);
            if rule.symbol_optional {
                format!("{escaped}?")
            } else {
                escaped
            }
        }
        None => String::new(),
    };
    let thousand = regex::escape(rule.thousand_separator.as_deref().unwrap_or(","));
    let decimal = regex::escape(rule.decimal_separator.as_deref().unwrap_or("."));
    let source = format!(
        "^(-?{symbol}|{symbol}-?)(([0-9]\\d{{0,2}}({thousand}\\d{{3}})*)|0)?({decimal}\\d{{1,2}})?$"
    );
    CompiledPattern::new(&source, "value does not match the currency pattern")
}

/// Converts a URL rule into its ordered stages.
fn convert_url(rule: &UrlRule) -> Result<Vec<Stage>, CompileError> {
    check_default("url", &rule.common, Value::is_string, "a string")?;
    let mut stages = vec![shape(
        BaseShape::Url {
            coerce: rule.convert,
        },
        &rule.common,
    )];
    if rule.empty == Some(false) {
        stages.push(Stage::Validate(ValidateOp::NotEmpty));
    }
    Ok(stages)
}

/// Converts a UUID rule into its ordered stages.
fn convert_uuid(rule: &UuidRule) -> Result<Vec<Stage>, CompileError> {
    check_default("uuid", &rule.common, Value::is_string, "a string")?;
    let mut stages = vec![shape(
        BaseShape::Uuid {
            coerce: rule.convert,
        },
        &rule.common,
    )];
    if rule.empty == Some(false) {
        stages.push(Stage::Validate(ValidateOp::NotEmpty));
    }
    Ok(stages)
}

/// Converts a Luhn rule into shape and checksum stages.
fn convert_luhn(rule: &LuhnRule) -> Result<Vec<Stage>, CompileError> {
    check_default("luhn", &rule.common, Value::is_string, "a string")?;
    Ok(vec![
        shape(
            BaseShape::String {
                coerce: rule.convert,
            },
            &rule.common,
        ),
        Stage::Refine(RefineOp::Luhn),
    ])
}

/// Converts a MAC address rule into shape and pattern stages.
fn convert_mac(rule: &MacRule) -> Result<Vec<Stage>, CompileError> {
    check_default("mac", &rule.common, Value::is_string, "a string")?;
    Ok(vec![
        shape(
            BaseShape::String {
                coerce: rule.convert,
            },
            &rule.common,
        ),
        Stage::Validate(ValidateOp::Pattern(CompiledPattern::new(
            MAC_PATTERN,
            "invalid MAC address",
        )?)),
    ])
}

// ============================================================================
// SECTION: Identity and Host Converters
// ============================================================================

/// Converts a host-instance rule into its shape stage.
fn convert_class(rule: &ClassRule) -> Result<Vec<Stage>, CompileError> {
    check_default("class", &rule.common, Value::is_object, "an instance object")?;
    Ok(vec![shape(
        BaseShape::Instance {
            class_name: rule.class_name.clone(),
        },
        &rule.common,
    )])
}

/// Converts a callable rule into its shape stage.
fn convert_function(rule: &FunctionRule) -> Result<Vec<Stage>, CompileError> {
    if rule.common.default.is_some() {
        return Err(CompileError::InvalidDefault {
            type_tag: "function",
            reason: "callables cannot be expressed as default values".to_string(),
        });
    }
    Ok(vec![shape(BaseShape::Callable, &rule.common)])
}

/// Converts an external-identity rule into its ordered stages.
fn convert_external_id(rule: &ExternalIdRule) -> Result<Vec<Stage>, CompileError> {
    check_default("objectID", &rule.common, Value::is_string, "an identity string")?;
    let mut stages = vec![
        shape(BaseShape::ExternalId, &rule.common),
        Stage::Refine(RefineOp::ValidIdentity),
    ];
    match rule.convert {
        IdConversion::None => {}
        IdConversion::Instance => {
            stages.push(Stage::Manipulate(ManipulateOp::IdentityToInstance));
        }
        IdConversion::StringForm => {
            stages.push(Stage::Manipulate(ManipulateOp::IdentityToString));
        }
    }
    Ok(stages)
}

// ============================================================================
// SECTION: Value Converters
// ============================================================================

/// Converts a value-set membership rule into shape and refine stages.
fn convert_enum(rule: &EnumRule) -> Result<Vec<Stage>, CompileError> {
    if rule.values.is_empty() {
        return Err(CompileError::UnsupportedRuleShape {
            type_tag: "enum",
            reason: "values list must not be empty".to_string(),
        });
    }
    Ok(vec![
        shape(BaseShape::Any, &rule.common),
        Stage::Refine(RefineOp::MemberOf(rule.values.clone())),
    ])
}

/// Converts a fixed-value equality rule into shape and refine stages.
fn convert_equal(rule: &EqualRule) -> Result<Vec<Stage>, CompileError> {
    Ok(vec![
        shape(BaseShape::Any, &rule.common),
        Stage::Refine(RefineOp::EqualTo {
            expected: rule.value.clone(),
            strict: rule.strict,
        }),
    ])
}

/// Converts a forbidden-field rule into its presence handling stages.
fn convert_forbidden(rule: &ForbiddenRule) -> Result<Vec<Stage>, CompileError> {
    if rule.common.default.is_some() {
        return Err(CompileError::InvalidDefault {
            type_tag: "forbidden",
            reason: "forbidden rules cannot declare defaults".to_string(),
        });
    }
    // Absence is the success case, so the shape always treats the field as
    // optional regardless of the declared flag.
    let mut stages = vec![Stage::Shape(ShapeStage {
        base: BaseShape::Any,
        optional: true,
        nullable: rule.common.nullable,
        default: None,
    })];
    if rule.remove {
        stages.push(Stage::Manipulate(ManipulateOp::Drop));
    } else {
        stages.push(Stage::Refine(RefineOp::PresenceForbidden));
    }
    Ok(stages)
}

// ============================================================================
// SECTION: Composite Converters
// ============================================================================

/// Converts an array rule, recursing into its item descriptor.
fn convert_array(
    rule: &ArrayRule,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<Vec<Stage>, CompileError> {
    check_default("array", &rule.common, Value::is_array, "an array")?;
    let items = rule.items.as_ref().ok_or_else(|| CompileError::UnsupportedRuleShape {
        type_tag: "array",
        reason: "missing the items sub-rule".to_string(),
    })?;
    let item = build_validator(items, context, depth + 1, limits)?;

    let mut stages = vec![shape(
        BaseShape::Array {
            item: Box::new(item),
            wrap: rule.convert,
        },
        &rule.common,
    )];

    if rule.empty != Some(true) {
        stages.push(Stage::Validate(ValidateOp::NonEmptyArray));
    }
    if let Some(length) = rule.length {
        stages.push(Stage::Validate(ValidateOp::ExactItems(length)));
    }
    if let Some(min) = rule.min {
        stages.push(Stage::Validate(ValidateOp::MinItems(min)));
    }
    if let Some(max) = rule.max {
        stages.push(Stage::Validate(ValidateOp::MaxItems(max)));
    }

    match &rule.contains {
        Some(ContainsRule::One(element)) => {
            stages.push(Stage::Refine(RefineOp::ContainsOne(element.clone())));
        }
        Some(ContainsRule::All(elements)) => {
            stages.push(Stage::Refine(RefineOp::ContainsAll(elements.clone())));
        }
        None => {}
    }
    if rule.unique {
        stages.push(Stage::Refine(RefineOp::UniqueItems));
    }
    if !rule.one_of.is_empty() {
        stages.push(Stage::Refine(RefineOp::ItemsMemberOf(rule.one_of.clone())));
    }

    Ok(stages)
}

/// Converts an object rule, recursing into its property descriptors.
fn convert_object(
    rule: &ObjectRule,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<Vec<Stage>, CompileError> {
    check_default("object", &rule.common, Value::is_object, "an object")?;
    let declared = rule.props.as_ref().ok_or_else(|| CompileError::UnsupportedRuleShape {
        type_tag: "object",
        reason: "missing the props sub-rule".to_string(),
    })?;

    // A local strict override becomes the inherited context for descendants.
    let effective = Strictness::resolve(rule.strict, context);
    let mut props = BTreeMap::new();
    for (name, descriptor) in declared {
        props.insert(name.clone(), build_validator(descriptor, effective, depth + 1, limits)?);
    }

    let mut stages = vec![shape(
        BaseShape::Object {
            props,
            unknown: effective,
        },
        &rule.common,
    )];
    if let Some(min_props) = rule.min_props {
        stages.push(Stage::Refine(RefineOp::MinProps(min_props)));
    }
    if let Some(max_props) = rule.max_props {
        stages.push(Stage::Refine(RefineOp::MaxProps(max_props)));
    }
    Ok(stages)
}

/// Converts a union rule, recursing into its branch descriptors.
fn convert_multi(
    rule: &MultiRule,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<Vec<Stage>, CompileError> {
    if rule.rules.is_empty() {
        return Err(CompileError::UnsupportedRuleShape {
            type_tag: "multi",
            reason: "missing the rules sub-rules".to_string(),
        });
    }
    let mut branches = Vec::with_capacity(rule.rules.len());
    for branch in &rule.rules {
        branches.push(build_validator(branch, context, depth + 1, limits)?);
    }
    Ok(vec![shape(
        BaseShape::Union {
            branches,
        },
        &rule.common,
    )])
}

/// Converts a tuple rule, recursing into its slot descriptors.
fn convert_tuple(
    rule: &TupleRule,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<Vec<Stage>, CompileError> {
    check_default("tuple", &rule.common, Value::is_array, "an array")?;
    if rule.items.is_empty() {
        return Err(CompileError::UnsupportedRuleShape {
            type_tag: "tuple",
            reason: "missing the items sub-rules".to_string(),
        });
    }
    let mut slots = Vec::with_capacity(rule.items.len());
    for slot in &rule.items {
        slots.push(build_validator(slot, context, depth + 1, limits)?);
    }
    Ok(vec![shape(
        BaseShape::Tuple {
            slots,
        },
        &rule.common,
    )])
}

/// Converts a key/value map rule, recursing into its sub-rules.
fn convert_record(
    rule: &RecordRule,
    context: Strictness,
    depth: usize,
    limits: &Limits,
) -> Result<Vec<Stage>, CompileError> {
    check_default("record", &rule.common, Value::is_object, "an object")?;

    // Key and value sub-rules default to bare string and any rules.
    let key = match &rule.key {
        Some(key) => build_validator(key, context, depth + 1, limits)?,
        None => build_validator(
            &RuleDescriptor::String(StringRule::default()),
            context,
            depth + 1,
            limits,
        )?,
    };
    let value = match &rule.value {
        Some(value) => build_validator(value, context, depth + 1, limits)?,
        None => build_validator(
            &RuleDescriptor::Any(AnyRule::default()),
            context,
            depth + 1,
            limits,
        )?,
    };

    Ok(vec![shape(
        BaseShape::Record {
            key: Box::new(key),
            value: Box::new(value),
        },
        &rule.common,
    )])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
