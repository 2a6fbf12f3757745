// crates/mesh-bridge-core/src/rules/normalize/tests.rs
// ============================================================================
// Module: Rule Normalizer Unit Tests
// Description: Unit coverage for shorthand expansion and rule canonicalization.
// Purpose: Ensure unknown modifiers and type tags are rejected, never ignored.
// Dependencies: mesh-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the shorthand grammar, rule-object canonicalization and the
//! rejection paths for malformed rules and unknown type tags.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use serde_json::json;

use super::*;

#[test]
fn bare_type_name_yields_empty_descriptor() {
    let descriptor = normalize(&json!("string")).expect("bare type should normalize");
    let RuleDescriptor::String(rule) = descriptor else {
        panic!("expected a string descriptor");
    };
    assert!(!rule.common.optional);
    assert!(!rule.common.nullable);
    assert!(rule.common.default.is_none());
    assert!(!rule.convert);
    assert!(rule.min.is_none());
    assert!(rule.one_of.is_empty());
}

#[test]
fn shorthand_modifiers_expand_into_flags_and_values() {
    let descriptor = normalize(&json!("string|min:3|max:10|optional")).expect("should normalize");
    let RuleDescriptor::String(rule) = descriptor else {
        panic!("expected a string descriptor");
    };
    assert_eq!(rule.min, Some(3));
    assert_eq!(rule.max, Some(10));
    assert!(rule.common.optional);
}

#[test]
fn shorthand_number_flags_expand() {
    let descriptor = normalize(&json!("number|integer|positive")).expect("should normalize");
    let RuleDescriptor::Number(rule) = descriptor else {
        panic!("expected a number descriptor");
    };
    assert!(rule.integer);
    assert!(rule.positive);
    assert!(!rule.negative);
}

#[test]
fn shorthand_parses_boolean_and_float_values() {
    let descriptor = normalize(&json!("number|convert:true|min:1.5")).expect("should normalize");
    let RuleDescriptor::Number(rule) = descriptor else {
        panic!("expected a number descriptor");
    };
    assert!(rule.convert);
    assert_eq!(rule.min, Some(1.5));
}

#[test]
fn array_shorthand_suffix_expands_to_array_of_items() {
    let descriptor = normalize(&json!("string[]|optional")).expect("should normalize");
    let RuleDescriptor::Array(rule) = descriptor else {
        panic!("expected an array descriptor");
    };
    assert!(rule.common.optional);
    let items = rule.items.expect("array shorthand should carry items");
    assert!(matches!(*items, RuleDescriptor::String(_)));
}

#[test]
fn rule_array_normalizes_to_union() {
    let descriptor = normalize(&json!(["string", "number"])).expect("should normalize");
    let RuleDescriptor::Multi(rule) = descriptor else {
        panic!("expected a multi descriptor");
    };
    assert_eq!(rule.rules.len(), 2);
}

#[test]
fn object_rule_normalizes_nested_props() {
    let descriptor = normalize(&json!({
        "type": "object",
        "strict": true,
        "props": {
            "id": "string",
            "count": { "type": "number", "integer": true }
        }
    }))
    .expect("should normalize");
    let RuleDescriptor::Object(rule) = descriptor else {
        panic!("expected an object descriptor");
    };
    assert_eq!(rule.strict, Some(Strictness::Reject));
    let props = rule.props.expect("props should be present");
    assert!(matches!(props.get("id"), Some(RuleDescriptor::String(_))));
    assert!(matches!(props.get("count"), Some(RuleDescriptor::Number(_))));
}

#[test]
fn object_strict_remove_parses_as_strip() {
    let descriptor = normalize(&json!({
        "type": "object",
        "strict": "remove",
        "props": {}
    }))
    .expect("should normalize");
    let RuleDescriptor::Object(rule) = descriptor else {
        panic!("expected an object descriptor");
    };
    assert_eq!(rule.strict, Some(Strictness::Strip));
}

#[test]
fn unknown_modifier_is_rejected() {
    let error = normalize(&json!("string|sparkle")).expect_err("unknown modifier must fail");
    let CompileError::MalformedRule {
        reason,
    } = error
    else {
        panic!("expected a malformed-rule error");
    };
    assert!(reason.contains("sparkle"));
}

#[test]
fn unknown_modifier_on_object_form_is_rejected() {
    let error = normalize(&json!({ "type": "number", "wobble": 3 }))
        .expect_err("unknown modifier must fail");
    assert!(matches!(error, CompileError::MalformedRule { .. }));
}

#[test]
fn unknown_type_tag_is_rejected() {
    let error = normalize(&json!("quaternion")).expect_err("unknown type must fail");
    let CompileError::UnknownType {
        type_tag,
    } = error
    else {
        panic!("expected an unknown-type error");
    };
    assert_eq!(type_tag, "quaternion");
}

#[test]
fn missing_type_is_rejected() {
    let error = normalize(&json!({ "min": 3 })).expect_err("missing type must fail");
    assert!(matches!(error, CompileError::MalformedRule { .. }));
}

#[test]
fn wrong_modifier_kind_is_rejected() {
    let error =
        normalize(&json!({ "type": "string", "min": "three" })).expect_err("string min must fail");
    assert!(matches!(error, CompileError::MalformedRule { .. }));
}

#[test]
fn empty_shorthand_segment_is_rejected() {
    let error = normalize(&json!("string||min:3")).expect_err("empty modifier must fail");
    assert!(matches!(error, CompileError::MalformedRule { .. }));
}

#[test]
fn class_rule_requires_instance_name() {
    let error = normalize(&json!({ "type": "class" })).expect_err("class without name must fail");
    assert!(matches!(error, CompileError::MalformedRule { .. }));

    let descriptor =
        normalize(&json!({ "type": "class", "instanceOf": "Buffer" })).expect("should normalize");
    let RuleDescriptor::Class(rule) = descriptor else {
        panic!("expected a class descriptor");
    };
    assert_eq!(rule.class_name, "Buffer");
}

#[test]
fn equal_rule_requires_value() {
    let error = normalize(&json!({ "type": "equal" })).expect_err("equal without value must fail");
    assert!(matches!(error, CompileError::MalformedRule { .. }));
}

#[test]
fn external_id_convert_forms_parse() {
    let instance = normalize(&json!({ "type": "objectID", "convert": true }))
        .expect("convert true should normalize");
    let RuleDescriptor::ExternalId(rule) = instance else {
        panic!("expected an external-id descriptor");
    };
    assert_eq!(rule.convert, IdConversion::Instance);

    let string_form = normalize(&json!({ "type": "objectID", "convert": "hexString" }))
        .expect("hexString should normalize");
    let RuleDescriptor::ExternalId(rule) = string_form else {
        panic!("expected an external-id descriptor");
    };
    assert_eq!(rule.convert, IdConversion::StringForm);
}

#[test]
fn description_is_carried_on_the_descriptor() {
    let descriptor = normalize(&json!({ "type": "string", "description": "display name" }))
        .expect("should normalize");
    assert_eq!(descriptor.common().description.as_deref(), Some("display name"));
}
