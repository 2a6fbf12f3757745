// crates/mesh-bridge-core/src/runtime/eval.rs
// ============================================================================
// Module: Validator Evaluation
// Description: Execution of composed validators against payload values.
// Purpose: Apply stage pipelines in order with short-circuit failure.
// Dependencies: crate::{compile, rules, runtime::bindings}, regex, time, url, uuid
// ============================================================================

//! ## Overview
//! Evaluation is an explicit left fold over a validator's stages: the running
//! value is reassigned after every stage, and the first failing stage aborts
//! with a path-qualified error naming the stage category. Only the Shape
//! stage resolves missing values, nulls and defaults; once it produces a
//! value, the remaining stages transform or judge that value. Payload values
//! are untrusted; every check fails closed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;
use uuid::Uuid;

use crate::compile::pipeline::BaseShape;
use crate::compile::pipeline::ComposedValidator;
use crate::compile::pipeline::ManipulateOp;
use crate::compile::pipeline::PreProcessOp;
use crate::compile::pipeline::RefineOp;
use crate::compile::pipeline::ShapeStage;
use crate::compile::pipeline::Stage;
use crate::compile::pipeline::StageKind;
use crate::compile::pipeline::ValidateOp;
use crate::compile::schema::SchemaTree;
use crate::rules::descriptor::Strictness;
use crate::runtime::bindings::RuntimeEnv;

// ============================================================================
// SECTION: Evaluation Types
// ============================================================================

/// Input presented to a field validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldInput<'a> {
    /// The field is absent from the payload.
    Missing,
    /// The field carries this value.
    Present(&'a Value),
}

/// Successful evaluation outcome for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    /// The validated (possibly transformed) value.
    Value(Value),
    /// The field remains absent: optional without default, or dropped.
    Absent,
}

/// A stage rejection, qualified by field path and stage category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {stage} stage rejected the value: {reason}")]
pub struct ValidationError {
    /// Path of the offending field (`$value` for a root payload).
    pub path: String,
    /// Stage category that rejected the value.
    pub stage: StageKind,
    /// Why the value was rejected.
    pub reason: String,
}

/// Builds a stage rejection.
fn fail(path: &str, stage: StageKind, reason: impl fmt::Display) -> ValidationError {
    ValidationError {
        path: path.to_string(),
        stage,
        reason: reason.to_string(),
    }
}

/// Returns a short JSON kind name for diagnostics.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Schema Tree Evaluation
// ============================================================================

impl SchemaTree {
    /// Validates a payload against the compiled schema, returning the
    /// transformed payload.
    ///
    /// # Errors
    ///
    /// Returns the first stage rejection encountered, qualified by field
    /// path and stage category.
    pub fn validate(&self, payload: &Value, env: &RuntimeEnv) -> Result<Value, ValidationError> {
        match self {
            Self::Root(validator) => {
                match validator.evaluate(FieldInput::Present(payload), "$value", env)? {
                    Evaluated::Value(value) => Ok(value),
                    Evaluated::Absent => Ok(Value::Null),
                }
            }
            Self::Fields {
                fields,
                unknown,
            } => {
                let Value::Object(map) = payload else {
                    return Err(fail(
                        "$value",
                        StageKind::Shape,
                        format!("expected an object payload, got {}", kind_of(payload)),
                    ));
                };
                let validated = evaluate_object_fields(fields, *unknown, map, "", env)?;
                Ok(Value::Object(validated))
            }
        }
    }
}

/// Evaluates declared fields and applies the unknown-key policy.
fn evaluate_object_fields(
    fields: &BTreeMap<String, ComposedValidator>,
    unknown: Strictness,
    map: &Map<String, Value>,
    path: &str,
    env: &RuntimeEnv,
) -> Result<Map<String, Value>, ValidationError> {
    let undeclared: Vec<&str> = map
        .keys()
        .filter(|key| !fields.contains_key(key.as_str()))
        .map(String::as_str)
        .collect();
    if unknown == Strictness::Reject && !undeclared.is_empty() {
        let at = if path.is_empty() { "$value" } else { path };
        return Err(fail(
            at,
            StageKind::Shape,
            format!("unknown field(s): {}", undeclared.join(", ")),
        ));
    }

    let mut validated = Map::new();
    for (name, validator) in fields {
        let field_path = join_path(path, name);
        let input = map.get(name).map_or(FieldInput::Missing, FieldInput::Present);
        match validator.evaluate(input, &field_path, env)? {
            Evaluated::Value(value) => {
                validated.insert(name.clone(), value);
            }
            Evaluated::Absent => {}
        }
    }
    if unknown == Strictness::Passthrough {
        for (name, value) in map {
            if !fields.contains_key(name) {
                validated.insert(name.clone(), value.clone());
            }
        }
    }
    Ok(validated)
}

/// Joins a parent path and a field name.
fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

// ============================================================================
// SECTION: Pipeline Evaluation
// ============================================================================

impl ComposedValidator {
    /// Evaluates the pipeline against one field's input.
    ///
    /// # Errors
    ///
    /// Returns the first stage rejection, qualified by `path`.
    pub fn evaluate(
        &self,
        input: FieldInput<'_>,
        path: &str,
        env: &RuntimeEnv,
    ) -> Result<Evaluated, ValidationError> {
        let mut current: Option<Value> = None;

        for stage in self.stages() {
            match stage {
                Stage::Shape(shape) => match apply_shape(shape, input, path, env)? {
                    ShapeOutcome::Absent => return Ok(Evaluated::Absent),
                    ShapeOutcome::Null => return Ok(Evaluated::Value(Value::Null)),
                    ShapeOutcome::Value(value) => current = Some(value),
                },
                Stage::PreProcess(op) => {
                    let value = take_current(current, path, StageKind::PreProcess)?;
                    current = Some(apply_pre_process(*op, value, path)?);
                }
                Stage::Validate(op) => {
                    let value = take_current(current, path, StageKind::Validate)?;
                    apply_validate(op, &value, path)?;
                    current = Some(value);
                }
                Stage::Refine(op) => {
                    let value = take_current(current, path, StageKind::Refine)?;
                    apply_refine(op, &value, path, env)?;
                    current = Some(value);
                }
                Stage::Manipulate(op) => {
                    let value = take_current(current, path, StageKind::Manipulate)?;
                    match apply_manipulate(op, value, path, env)? {
                        Some(next) => current = Some(next),
                        None => return Ok(Evaluated::Absent),
                    }
                }
            }
        }

        match current {
            Some(value) => Ok(Evaluated::Value(value)),
            None => Ok(Evaluated::Absent),
        }
    }
}

/// Extracts the running value, rejecting pipelines that reach a non-shape
/// stage without one (a converter defect).
fn take_current(
    current: Option<Value>,
    path: &str,
    stage: StageKind,
) -> Result<Value, ValidationError> {
    current.ok_or_else(|| fail(path, stage, "pipeline reached this stage without a value"))
}

// ============================================================================
// SECTION: Shape Stage
// ============================================================================

/// Result of the Shape stage.
enum ShapeOutcome {
    /// Field stays absent; remaining stages are skipped.
    Absent,
    /// Field is an accepted explicit null; remaining stages are skipped.
    Null,
    /// Field carries this value; remaining stages run.
    Value(Value),
}

/// Resolves presence, null and default, then checks the base form.
fn apply_shape(
    shape: &ShapeStage,
    input: FieldInput<'_>,
    path: &str,
    env: &RuntimeEnv,
) -> Result<ShapeOutcome, ValidationError> {
    let candidate = match input {
        FieldInput::Missing => match &shape.default {
            Some(default) => default.clone(),
            None if shape.optional => return Ok(ShapeOutcome::Absent),
            None => return Err(fail(path, StageKind::Shape, "required field is missing")),
        },
        FieldInput::Present(Value::Null) => {
            if shape.nullable {
                return Ok(ShapeOutcome::Null);
            }
            return Err(fail(path, StageKind::Shape, "value must not be null"));
        }
        FieldInput::Present(value) => value.clone(),
    };

    apply_base(&shape.base, candidate, path, env).map(ShapeOutcome::Value)
}

#[allow(clippy::too_many_lines, reason = "one arm per base shape keeps dispatch flat")]
fn apply_base(
    base: &BaseShape,
    value: Value,
    path: &str,
    env: &RuntimeEnv,
) -> Result<Value, ValidationError> {
    match base {
        BaseShape::String {
            coerce,
        } => coerce_string(value, *coerce, path),
        BaseShape::Number {
            coerce,
        } => coerce_number(value, *coerce, path),
        BaseShape::Boolean {
            coerce,
        } => coerce_boolean(value, *coerce, path),
        BaseShape::Date {
            coerce,
        } => match &value {
            Value::String(_) => Ok(value),
            Value::Number(_) if *coerce => Ok(value),
            other => Err(fail(
                path,
                StageKind::Shape,
                format!("expected a date, got {}", kind_of(other)),
            )),
        },
        BaseShape::Any => Ok(value),
        BaseShape::Email {
            coerce,
        } => {
            let value = coerce_string(value, *coerce, path)?;
            let Value::String(text) = &value else {
                return Err(fail(path, StageKind::Shape, "expected an email string"));
            };
            if email_pattern().is_match(text) {
                Ok(value)
            } else {
                Err(fail(path, StageKind::Shape, "invalid email address"))
            }
        }
        BaseShape::Url {
            coerce,
        } => {
            let value = coerce_string(value, *coerce, path)?;
            let Value::String(text) = &value else {
                return Err(fail(path, StageKind::Shape, "expected a URL string"));
            };
            if Url::parse(text).is_ok() {
                Ok(value)
            } else {
                Err(fail(path, StageKind::Shape, "invalid URL"))
            }
        }
        BaseShape::Uuid {
            coerce,
        } => {
            let value = coerce_string(value, *coerce, path)?;
            let Value::String(text) = &value else {
                return Err(fail(path, StageKind::Shape, "expected a UUID string"));
            };
            if Uuid::try_parse(text).is_ok() {
                Ok(value)
            } else {
                Err(fail(path, StageKind::Shape, "invalid UUID"))
            }
        }
        BaseShape::Instance {
            class_name,
        } => {
            if env.instances.is_instance(class_name, &value) {
                Ok(value)
            } else {
                Err(fail(
                    path,
                    StageKind::Shape,
                    format!("expected an instance of {class_name}"),
                ))
            }
        }
        BaseShape::Callable => {
            if env.instances.is_callable(&value) {
                Ok(value)
            } else {
                Err(fail(path, StageKind::Shape, "expected a callable"))
            }
        }
        BaseShape::ExternalId => {
            if value.is_string() || env.identity.is_instance(&value) {
                Ok(value)
            } else {
                Err(fail(
                    path,
                    StageKind::Shape,
                    format!("expected an identity string or instance, got {}", kind_of(&value)),
                ))
            }
        }
        BaseShape::Array {
            item,
            wrap,
        } => {
            let elements = match value {
                Value::Array(elements) => elements,
                other if *wrap => vec![other],
                other => {
                    return Err(fail(
                        path,
                        StageKind::Shape,
                        format!("expected an array, got {}", kind_of(&other)),
                    ));
                }
            };
            let mut validated = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                let element_path = format!("{path}[{index}]");
                match item.evaluate(FieldInput::Present(element), &element_path, env)? {
                    Evaluated::Value(value) => validated.push(value),
                    Evaluated::Absent => {}
                }
            }
            Ok(Value::Array(validated))
        }
        BaseShape::Object {
            props,
            unknown,
        } => {
            let Value::Object(map) = &value else {
                return Err(fail(
                    path,
                    StageKind::Shape,
                    format!("expected an object, got {}", kind_of(&value)),
                ));
            };
            let validated = evaluate_object_fields(props, *unknown, map, path, env)?;
            Ok(Value::Object(validated))
        }
        BaseShape::Tuple {
            slots,
        } => {
            let Value::Array(elements) = &value else {
                return Err(fail(
                    path,
                    StageKind::Shape,
                    format!("expected a tuple array, got {}", kind_of(&value)),
                ));
            };
            if elements.len() != slots.len() {
                return Err(fail(
                    path,
                    StageKind::Shape,
                    format!("expected exactly {} element(s), got {}", slots.len(), elements.len()),
                ));
            }
            let mut validated = Vec::with_capacity(slots.len());
            for (index, (slot, element)) in slots.iter().zip(elements).enumerate() {
                let slot_path = format!("{path}[{index}]");
                match slot.evaluate(FieldInput::Present(element), &slot_path, env)? {
                    Evaluated::Value(value) => validated.push(value),
                    Evaluated::Absent => {
                        return Err(fail(
                            &slot_path,
                            StageKind::Shape,
                            "tuple slot produced no value",
                        ));
                    }
                }
            }
            Ok(Value::Array(validated))
        }
        BaseShape::Record {
            key,
            value: value_rule,
        } => {
            let Value::Object(map) = &value else {
                return Err(fail(
                    path,
                    StageKind::Shape,
                    format!("expected a record object, got {}", kind_of(&value)),
                ));
            };
            let mut validated = Map::new();
            for (name, entry) in map {
                let entry_path = join_path(path, name);
                let key_value = Value::String(name.clone());
                let validated_key =
                    match key.evaluate(FieldInput::Present(&key_value), &entry_path, env)? {
                        Evaluated::Value(Value::String(text)) => text,
                        _ => {
                            return Err(fail(
                                &entry_path,
                                StageKind::Shape,
                                "record key must remain a string",
                            ));
                        }
                    };
                match value_rule.evaluate(FieldInput::Present(entry), &entry_path, env)? {
                    Evaluated::Value(entry) => {
                        validated.insert(validated_key, entry);
                    }
                    Evaluated::Absent => {}
                }
            }
            Ok(Value::Object(validated))
        }
        BaseShape::Union {
            branches,
        } => {
            for branch in branches {
                if let Ok(outcome) = branch.evaluate(FieldInput::Present(&value), path, env) {
                    return match outcome {
                        Evaluated::Value(value) => Ok(value),
                        Evaluated::Absent => Ok(Value::Null),
                    };
                }
            }
            Err(fail(
                path,
                StageKind::Shape,
                format!("value did not match any of the {} union branch(es)", branches.len()),
            ))
        }
    }
}

// ============================================================================
// SECTION: Coercions
// ============================================================================

/// Accepts strings, coercing numbers and booleans when enabled.
fn coerce_string(value: Value, coerce: bool, path: &str) -> Result<Value, ValidationError> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(number) if coerce => Ok(Value::String(number.to_string())),
        Value::Bool(flag) if coerce => Ok(Value::String(flag.to_string())),
        other => Err(fail(
            path,
            StageKind::Shape,
            format!("expected a string, got {}", kind_of(&other)),
        )),
    }
}

/// Accepts numbers, parsing numeric strings when enabled.
fn coerce_number(value: Value, coerce: bool, path: &str) -> Result<Value, ValidationError> {
    match value {
        Value::Number(_) => Ok(value),
        Value::String(text) if coerce => parse_number(text.trim()).ok_or_else(|| {
            fail(path, StageKind::Shape, format!("cannot convert '{text}' to a number"))
        }),
        other => Err(fail(
            path,
            StageKind::Shape,
            format!("expected a number, got {}", kind_of(&other)),
        )),
    }
}

/// Parses a numeric string into a JSON number, preferring integer form.
fn parse_number(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = text.parse::<f64>().ok()?;
    if !float.is_finite() {
        return None;
    }
    Number::from_f64(float).map(Value::Number)
}

/// Accepts booleans, converting recognized scalars when enabled.
fn coerce_boolean(value: Value, coerce: bool, path: &str) -> Result<Value, ValidationError> {
    match &value {
        Value::Bool(_) => Ok(value),
        Value::String(text) if coerce => match text.as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(fail(
                path,
                StageKind::Shape,
                format!("cannot convert '{text}' to a boolean"),
            )),
        },
        Value::Number(number) if coerce => match number.as_f64() {
            Some(raw) if raw == 1.0 => Ok(Value::Bool(true)),
            Some(raw) if raw == 0.0 => Ok(Value::Bool(false)),
            _ => Err(fail(
                path,
                StageKind::Shape,
                format!("cannot convert {number} to a boolean"),
            )),
        },
        other => Err(fail(
            path,
            StageKind::Shape,
            format!("expected a boolean, got {}", kind_of(other)),
        )),
    }
}

// ============================================================================
// SECTION: Pre-Process Stage
// ============================================================================

/// Applies a value-preserving string transform.
fn apply_pre_process(
    op: PreProcessOp,
    value: Value,
    path: &str,
) -> Result<Value, ValidationError> {
    let Value::String(text) = value else {
        return Err(fail(path, StageKind::PreProcess, "transform expects a string value"));
    };
    let transformed = match op {
        PreProcessOp::Trim => text.trim().to_string(),
        PreProcessOp::TrimStart => text.trim_start().to_string(),
        PreProcessOp::TrimEnd => text.trim_end().to_string(),
        PreProcessOp::Lowercase => text.to_lowercase(),
        PreProcessOp::Uppercase => text.to_uppercase(),
        PreProcessOp::NormalizeEmail => text.trim().to_lowercase(),
    };
    Ok(Value::String(transformed))
}

// ============================================================================
// SECTION: Validate Stage
// ============================================================================

/// Checks one constraint against the running value.
fn apply_validate(op: &ValidateOp, value: &Value, path: &str) -> Result<(), ValidationError> {
    match op {
        ValidateOp::MinLength(min) => {
            let length = text_length(value, path)?;
            if length < *min {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("length {length} is below the minimum of {min}"),
                ));
            }
        }
        ValidateOp::MaxLength(max) => {
            let length = text_length(value, path)?;
            if length > *max {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("length {length} exceeds the maximum of {max}"),
                ));
            }
        }
        ValidateOp::ExactLength(exact) => {
            let length = text_length(value, path)?;
            if length != *exact {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("length {length} does not equal the required {exact}"),
                ));
            }
        }
        ValidateOp::NotEmpty => {
            let text = text_value(value, path)?;
            if text.trim().is_empty() {
                return Err(fail(path, StageKind::Validate, "value must not be empty"));
            }
        }
        ValidateOp::Pattern(pattern) => {
            let text = text_value(value, path)?;
            if !pattern.is_match(text) {
                return Err(fail(path, StageKind::Validate, pattern.message()));
            }
        }
        ValidateOp::Contains(substring) => {
            let text = text_value(value, path)?;
            if !text.contains(substring.as_str()) {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("value must contain '{substring}'"),
                ));
            }
        }
        ValidateOp::ContainsDigit => {
            let text = text_value(value, path)?;
            if !text.chars().any(|ch| ch.is_ascii_digit()) {
                return Err(fail(path, StageKind::Validate, "value must contain a digit"));
            }
        }
        ValidateOp::MinNumber(min) => {
            let number = number_value(value, path)?;
            if number < *min {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("{number} is below the minimum of {min}"),
                ));
            }
        }
        ValidateOp::MaxNumber(max) => {
            let number = number_value(value, path)?;
            if number > *max {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("{number} exceeds the maximum of {max}"),
                ));
            }
        }
        ValidateOp::Integer => {
            let number = number_value(value, path)?;
            if number.fract() != 0.0 {
                return Err(fail(path, StageKind::Validate, format!("{number} is not an integer")));
            }
        }
        ValidateOp::Positive => {
            let number = number_value(value, path)?;
            if number <= 0.0 {
                return Err(fail(path, StageKind::Validate, format!("{number} is not positive")));
            }
        }
        ValidateOp::Negative => {
            let number = number_value(value, path)?;
            if number >= 0.0 {
                return Err(fail(path, StageKind::Validate, format!("{number} is not negative")));
            }
        }
        ValidateOp::MinItems(min) => {
            let count = item_count(value, path)?;
            if count < *min {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("{count} element(s) is below the minimum of {min}"),
                ));
            }
        }
        ValidateOp::MaxItems(max) => {
            let count = item_count(value, path)?;
            if count > *max {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("{count} element(s) exceeds the maximum of {max}"),
                ));
            }
        }
        ValidateOp::ExactItems(exact) => {
            let count = item_count(value, path)?;
            if count != *exact {
                return Err(fail(
                    path,
                    StageKind::Validate,
                    format!("{count} element(s) does not equal the required {exact}"),
                ));
            }
        }
        ValidateOp::NonEmptyArray => {
            let count = item_count(value, path)?;
            if count == 0 {
                return Err(fail(path, StageKind::Validate, "array must not be empty"));
            }
        }
    }
    Ok(())
}

fn text_value<'a>(value: &'a Value, path: &str) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| fail(path, StageKind::Validate, "constraint expects a string value"))
}

/// Returns the running value's length in characters.
fn text_length(value: &Value, path: &str) -> Result<usize, ValidationError> {
    Ok(text_value(value, path)?.chars().count())
}

/// Reads the running value as a number for a constraint check.
fn number_value(value: &Value, path: &str) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .ok_or_else(|| fail(path, StageKind::Validate, "constraint expects a numeric value"))
}

/// Returns the running value's element count.
fn item_count(value: &Value, path: &str) -> Result<usize, ValidationError> {
    value
        .as_array()
        .map(Vec::len)
        .ok_or_else(|| fail(path, StageKind::Validate, "constraint expects an array value"))
}

// ============================================================================
// SECTION: Refine Stage
// ============================================================================

/// Checks one semantic predicate against the running value.
fn apply_refine(
    op: &RefineOp,
    value: &Value,
    path: &str,
    env: &RuntimeEnv,
) -> Result<(), ValidationError> {
    match op {
        RefineOp::NotEqualNumber(forbidden) => {
            if value.as_f64() == Some(*forbidden) {
                return Err(fail(
                    path,
                    StageKind::Refine,
                    format!("value must not equal {forbidden}"),
                ));
            }
        }
        RefineOp::ValidDate {
            coerce,
        } => {
            let valid = match value {
                Value::String(text) => OffsetDateTime::parse(text, &Rfc3339).is_ok(),
                Value::Number(number) => *coerce && number.as_f64().is_some_and(f64::is_finite),
                _ => false,
            };
            if !valid {
                return Err(fail(path, StageKind::Refine, "invalid date"));
            }
        }
        RefineOp::MemberOf(permitted) => {
            if !permitted.iter().any(|candidate| values_equal(candidate, value)) {
                return Err(fail(
                    path,
                    StageKind::Refine,
                    "value is not a member of the permitted set",
                ));
            }
        }
        RefineOp::EqualTo {
            expected,
            strict,
        } => {
            let equal = if *strict {
                values_equal(expected, value)
            } else {
                loosely_equal(expected, value)
            };
            if !equal {
                return Err(fail(path, StageKind::Refine, format!("value must equal {expected}")));
            }
        }
        RefineOp::PresenceForbidden => {
            return Err(fail(path, StageKind::Refine, "field is forbidden"));
        }
        RefineOp::Luhn => {
            let Value::String(text) = value else {
                return Err(fail(path, StageKind::Refine, "checksum expects a string value"));
            };
            if !luhn_valid(text) {
                return Err(fail(path, StageKind::Refine, "checksum verification failed"));
            }
        }
        RefineOp::ValidIdentity => {
            if !env.identity.is_valid(value) {
                return Err(fail(path, StageKind::Refine, "invalid identity"));
            }
        }
        RefineOp::ContainsOne(element) => {
            let elements = array_value(value, path)?;
            if !elements.iter().any(|candidate| values_equal(candidate, element)) {
                return Err(fail(
                    path,
                    StageKind::Refine,
                    format!("array must contain {element}"),
                ));
            }
        }
        RefineOp::ContainsAll(required) => {
            let elements = array_value(value, path)?;
            for element in required {
                if !elements.iter().any(|candidate| values_equal(candidate, element)) {
                    return Err(fail(
                        path,
                        StageKind::Refine,
                        format!("array must contain {element}"),
                    ));
                }
            }
        }
        RefineOp::UniqueItems => {
            let elements = array_value(value, path)?;
            for (index, element) in elements.iter().enumerate() {
                if elements
                    .iter()
                    .skip(index + 1)
                    .any(|candidate| values_equal(candidate, element))
                {
                    return Err(fail(
                        path,
                        StageKind::Refine,
                        format!("array elements must be unique; {element} repeats"),
                    ));
                }
            }
        }
        RefineOp::ItemsMemberOf(permitted) => {
            let elements = array_value(value, path)?;
            for element in elements {
                if !permitted.iter().any(|candidate| values_equal(candidate, element)) {
                    return Err(fail(
                        path,
                        StageKind::Refine,
                        format!("{element} is not a member of the permitted set"),
                    ));
                }
            }
        }
        RefineOp::MinProps(min) => {
            let count = prop_count(value, path)?;
            if count < *min {
                return Err(fail(
                    path,
                    StageKind::Refine,
                    format!("{count} propert(ies) is below the minimum of {min}"),
                ));
            }
        }
        RefineOp::MaxProps(max) => {
            let count = prop_count(value, path)?;
            if count > *max {
                return Err(fail(
                    path,
                    StageKind::Refine,
                    format!("{count} propert(ies) exceeds the maximum of {max}"),
                ));
            }
        }
    }
    Ok(())
}

fn array_value<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], ValidationError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| fail(path, StageKind::Refine, "predicate expects an array value"))
}

/// Returns the running value's property count.
fn prop_count(value: &Value, path: &str) -> Result<usize, ValidationError> {
    value
        .as_object()
        .map(Map::len)
        .ok_or_else(|| fail(path, StageKind::Refine, "predicate expects an object value"))
}

/// Structural equality with numeric values compared by magnitude, so `1`
/// and `1.0` are the same number.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Coercing equality across scalar kinds.
fn loosely_equal(left: &Value, right: &Value) -> bool {
    if values_equal(left, right) {
        return true;
    }
    match (left, right) {
        (Value::Number(number), Value::String(text))
        | (Value::String(text), Value::Number(number)) => {
            text.trim().parse::<f64>().ok() == number.as_f64()
        }
        (Value::Bool(flag), Value::Number(number))
        | (Value::Number(number), Value::Bool(flag)) => {
            number.as_f64() == Some(if *flag { 1.0 } else { 0.0 })
        }
        (Value::Bool(flag), Value::String(text)) | (Value::String(text), Value::Bool(flag)) => {
            matches!(
                (flag, text.as_str()),
                (true, "true") | (true, "1") | (false, "false") | (false, "0")
            )
        }
        _ => false,
    }
}

/// Luhn checksum over the value's digits with alternating weights.
fn luhn_valid(text: &str) -> bool {
    const DOUBLED: [u32; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

    let digits: Vec<usize> = text
        .chars()
        .filter_map(|ch| ch.to_digit(10))
        .filter_map(|digit| usize::try_from(digit).ok())
        .collect();
    let mut sum: u32 = 0;
    let mut double = false;
    for digit in digits.iter().rev() {
        sum += if double {
            DOUBLED.get(*digit).copied().unwrap_or(0)
        } else {
            u32::try_from(*digit).unwrap_or(0)
        };
        double = !double;
    }
    sum % 10 == 0 && sum > 0
}

// ============================================================================
// SECTION: Manipulate Stage
// ============================================================================

/// Applies a post-validation transform; `None` drops the value.
fn apply_manipulate(
    op: &ManipulateOp,
    value: Value,
    path: &str,
    env: &RuntimeEnv,
) -> Result<Option<Value>, ValidationError> {
    match op {
        ManipulateOp::PadStart {
            width,
            fill,
        } => {
            let Value::String(text) = value else {
                return Err(fail(path, StageKind::Manipulate, "padding expects a string value"));
            };
            Ok(Some(Value::String(pad(&text, *width, *fill, true))))
        }
        ManipulateOp::PadEnd {
            width,
            fill,
        } => {
            let Value::String(text) = value else {
                return Err(fail(path, StageKind::Manipulate, "padding expects a string value"));
            };
            Ok(Some(Value::String(pad(&text, *width, *fill, false))))
        }
        ManipulateOp::Drop => Ok(None),
        ManipulateOp::IdentityToInstance => env
            .identity
            .to_instance(&value)
            .map(Some)
            .ok_or_else(|| fail(path, StageKind::Manipulate, "identity conversion failed")),
        ManipulateOp::IdentityToString => env
            .identity
            .to_string_form(&value)
            .map(Some)
            .ok_or_else(|| fail(path, StageKind::Manipulate, "identity conversion failed")),
    }
}

/// Pads text to `width` characters with the fill character.
fn pad(text: &str, width: usize, fill: char, at_start: bool) -> String {
    let length = text.chars().count();
    if length >= width {
        return text.to_string();
    }
    let filler: String = std::iter::repeat_n(fill, width - length).collect();
    if at_start {
        format!("{filler}{text}")
    } else {
        format!("{text}{filler}")
    }
}

// ============================================================================
// SECTION: Builtin Patterns
// ============================================================================

/// Email address pattern (pragmatic HTML5 form).
fn email_pattern() -> &'static Regex {
    #[allow(clippy::expect_used, reason = "the pattern is a fixed, valid literal")]
    static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("builtin email pattern compiles")
    });
    &EMAIL
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
