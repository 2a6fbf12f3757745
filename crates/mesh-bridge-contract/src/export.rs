// crates/mesh-bridge-contract/src/export.rs
// ============================================================================
// Module: JSON Schema Export
// Description: Rendering of compiled schema trees into JSON Schema payloads.
// Purpose: Serialize validator structure for tool advertisement.
// Dependencies: mesh-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! The exporter walks a compiled [`SchemaTree`] and renders an equivalent
//! JSON Schema object for the tool-calling protocol's input-schema slot. The
//! rendering is structural: it reads the stage facts the compiler produced
//! and never re-interprets the source rules. Predicates with no JSON Schema
//! counterpart (checksums, host instance checks, containment) are omitted
//! from the rendering; the composed validators remain the enforcement
//! authority at call time.

use std::collections::BTreeMap;

use mesh_bridge_core::ComposedValidator;
use mesh_bridge_core::SchemaTree;
use mesh_bridge_core::Strictness;
use mesh_bridge_core::compile::BaseShape;
use mesh_bridge_core::compile::RefineOp;
use mesh_bridge_core::compile::Stage;
use mesh_bridge_core::compile::ValidateOp;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Renders a compiled schema tree as a JSON Schema input-schema payload.
#[must_use]
pub fn input_schema(tree: &SchemaTree) -> Value {
    match tree {
        SchemaTree::Root(validator) => validator_schema(validator),
        SchemaTree::Fields {
            fields,
            unknown,
        } => fields_schema(fields, *unknown),
    }
}

/// Renders a field map as an object schema with required/additional keys.
fn fields_schema(fields: &BTreeMap<String, ComposedValidator>, unknown: Strictness) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (name, validator) in fields {
        properties.insert(name.clone(), validator_schema(validator));
        if is_required(validator) {
            required.push(Value::String(name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": unknown == Strictness::Passthrough,
    })
}

/// Returns whether a field must be present in the payload.
fn is_required(validator: &ComposedValidator) -> bool {
    validator
        .shape()
        .is_some_and(|shape| !shape.optional && shape.default.is_none())
}

// ============================================================================
// SECTION: Validator Rendering
// ============================================================================

/// Renders one composed validator as a JSON Schema fragment.
fn validator_schema(validator: &ComposedValidator) -> Value {
    let Some(shape) = validator.shape() else {
        return json!({});
    };

    let mut schema = base_schema(&shape.base);
    let mut patterns = Vec::new();

    for stage in validator.stages() {
        match stage {
            Stage::Validate(op) => apply_validate_keywords(&mut schema, &mut patterns, op),
            Stage::Refine(op) => {
                if let Some(replacement) = apply_refine_keywords(&mut schema, op) {
                    return replacement;
                }
            }
            Stage::Shape(_) | Stage::PreProcess(_) | Stage::Manipulate(_) => {}
        }
    }
    attach_patterns(&mut schema, patterns);

    if shape.nullable {
        schema = nullable_schema(schema);
    }
    if let (Some(default), Value::Object(map)) = (&shape.default, &mut schema) {
        map.insert("default".to_string(), default.clone());
    }
    if let (Some(description), Value::Object(map)) = (validator.description(), &mut schema) {
        map.insert("description".to_string(), Value::String(description.to_string()));
    }

    schema
}

/// Renders the base type form of a shape stage.
fn base_schema(base: &BaseShape) -> Value {
    match base {
        BaseShape::String {
            ..
        } => json!({ "type": "string" }),
        BaseShape::Number {
            ..
        } => json!({ "type": "number" }),
        BaseShape::Boolean {
            ..
        } => json!({ "type": "boolean" }),
        BaseShape::Date {
            coerce,
        } => {
            if *coerce {
                json!({ "anyOf": [
                    { "type": "string", "format": "date-time" },
                    { "type": "number" }
                ] })
            } else {
                json!({ "type": "string", "format": "date-time" })
            }
        }
        BaseShape::Any | BaseShape::Callable => json!({}),
        BaseShape::Email {
            ..
        } => json!({ "type": "string", "format": "email" }),
        BaseShape::Url {
            ..
        } => json!({ "type": "string", "format": "uri" }),
        BaseShape::Uuid {
            ..
        } => json!({ "type": "string", "format": "uuid" }),
        BaseShape::Instance {
            ..
        } => json!({ "type": "object" }),
        BaseShape::ExternalId => json!({ "type": "string" }),
        BaseShape::Array {
            item,
            ..
        } => json!({ "type": "array", "items": validator_schema(item) }),
        BaseShape::Object {
            props,
            unknown,
        } => fields_schema(props, *unknown),
        BaseShape::Tuple {
            slots,
        } => {
            let rendered: Vec<Value> = slots.iter().map(validator_schema).collect();
            json!({
                "type": "array",
                "prefixItems": rendered,
                "minItems": slots.len(),
                "maxItems": slots.len(),
            })
        }
        BaseShape::Record {
            value,
            ..
        } => json!({ "type": "object", "additionalProperties": validator_schema(value) }),
        BaseShape::Union {
            branches,
        } => {
            let rendered: Vec<Value> = branches.iter().map(validator_schema).collect();
            json!({ "anyOf": rendered })
        }
    }
}

// ============================================================================
// SECTION: Constraint Keywords
// ============================================================================

/// Folds a validate op into JSON Schema keywords.
fn apply_validate_keywords(schema: &mut Value, patterns: &mut Vec<String>, op: &ValidateOp) {
    let Value::Object(map) = schema else {
        return;
    };
    match op {
        ValidateOp::MinLength(min) => {
            map.insert("minLength".to_string(), json!(min));
        }
        ValidateOp::MaxLength(max) => {
            map.insert("maxLength".to_string(), json!(max));
        }
        ValidateOp::ExactLength(exact) => {
            map.insert("minLength".to_string(), json!(exact));
            map.insert("maxLength".to_string(), json!(exact));
        }
        ValidateOp::NotEmpty => {
            map.entry("minLength".to_string()).or_insert_with(|| json!(1));
        }
        ValidateOp::Pattern(pattern) => patterns.push(pattern.source().to_string()),
        ValidateOp::MinNumber(min) => {
            map.insert("minimum".to_string(), json!(min));
        }
        ValidateOp::MaxNumber(max) => {
            map.insert("maximum".to_string(), json!(max));
        }
        ValidateOp::Integer => {
            map.insert("type".to_string(), json!("integer"));
        }
        ValidateOp::Positive => {
            map.insert("exclusiveMinimum".to_string(), json!(0));
        }
        ValidateOp::Negative => {
            map.insert("exclusiveMaximum".to_string(), json!(0));
        }
        ValidateOp::MinItems(min) => {
            map.insert("minItems".to_string(), json!(min));
        }
        ValidateOp::MaxItems(max) => {
            map.insert("maxItems".to_string(), json!(max));
        }
        ValidateOp::ExactItems(exact) => {
            map.insert("minItems".to_string(), json!(exact));
            map.insert("maxItems".to_string(), json!(exact));
        }
        ValidateOp::NonEmptyArray => {
            map.entry("minItems".to_string()).or_insert_with(|| json!(1));
        }
        ValidateOp::Contains(_) | ValidateOp::ContainsDigit => {}
    }
}

/// Folds a refine op into JSON Schema keywords. Returns a replacement schema
/// when the predicate rewrites the whole fragment (forbidden fields).
fn apply_refine_keywords(schema: &mut Value, op: &RefineOp) -> Option<Value> {
    let Value::Object(map) = schema else {
        return None;
    };
    match op {
        RefineOp::MemberOf(values) => {
            map.insert("enum".to_string(), Value::Array(values.clone()));
        }
        RefineOp::EqualTo {
            expected,
            ..
        } => {
            map.insert("const".to_string(), expected.clone());
        }
        RefineOp::UniqueItems => {
            map.insert("uniqueItems".to_string(), Value::Bool(true));
        }
        RefineOp::MinProps(min) => {
            map.insert("minProperties".to_string(), json!(min));
        }
        RefineOp::MaxProps(max) => {
            map.insert("maxProperties".to_string(), json!(max));
        }
        RefineOp::NotEqualNumber(forbidden) => {
            map.insert("not".to_string(), json!({ "const": forbidden }));
        }
        RefineOp::PresenceForbidden => return Some(json!({ "not": {} })),
        RefineOp::ValidDate {
            ..
        }
        | RefineOp::Luhn
        | RefineOp::ValidIdentity
        | RefineOp::ContainsOne(_)
        | RefineOp::ContainsAll(_)
        | RefineOp::ItemsMemberOf(_) => {}
    }
    None
}

/// Attaches accumulated pattern constraints, folding extras into `allOf`.
fn attach_patterns(schema: &mut Value, patterns: Vec<String>) {
    let Value::Object(map) = schema else {
        return;
    };
    let mut iter = patterns.into_iter();
    if let Some(first) = iter.next() {
        map.insert("pattern".to_string(), Value::String(first));
    }
    let rest: Vec<Value> = iter.map(|source| json!({ "pattern": source })).collect();
    if !rest.is_empty() {
        map.insert("allOf".to_string(), Value::Array(rest));
    }
}

// ============================================================================
// SECTION: Nullability
// ============================================================================

/// Widens a schema fragment to accept explicit nulls.
fn nullable_schema(schema: Value) -> Value {
    match schema {
        Value::Object(map) if map.get("type").is_some_and(Value::is_string) => {
            let mut widened = map;
            if let Some(Value::String(base)) = widened.get("type").cloned() {
                widened.insert("type".to_string(), json!([base, "null"]));
            }
            Value::Object(widened)
        }
        other => json!({ "anyOf": [other, { "type": "null" }] }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
