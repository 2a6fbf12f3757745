// crates/mesh-bridge-core/src/runtime/eval/tests.rs
// ============================================================================
// Module: Validator Evaluation Unit Tests
// Description: Behavioral coverage for every type tag's compiled pipeline.
// Purpose: Ensure each pipeline accepts and rejects canonical examples.
// Dependencies: mesh-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! Compiles single rules through the full normalizer/converter path and
//! evaluates them against canonical payloads: at least one accepted and one
//! rejected example per type tag, plus stage-order observability, default
//! substitution, strictness behavior and the host binding seams.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Arc;

use serde_json::Value;
use serde_json::json;

use super::*;
use crate::compile::convert::Limits;
use crate::compile::convert::build_validator;
use crate::compile::schema::SchemaCompiler;
use crate::rules::normalize::normalize;
use crate::runtime::bindings::InstanceRegistry;

/// Compiles a single rule into a validator.
fn validator(rule: &Value) -> ComposedValidator {
    let descriptor = normalize(rule).expect("rule should normalize");
    let limits = Limits {
        max_depth: 32,
    };
    build_validator(&descriptor, Strictness::Passthrough, 0, &limits)
        .expect("rule should compile")
}

/// Evaluates a rule against a present value with default bindings.
fn eval(rule: &Value, payload: &Value) -> Result<Evaluated, ValidationError> {
    validator(rule).evaluate(FieldInput::Present(payload), "value", &RuntimeEnv::default())
}

/// Asserts the rule accepts the payload.
fn assert_accepts(rule: &Value, payload: &Value) {
    eval(rule, payload).unwrap_or_else(|error| panic!("{rule} rejected {payload}: {error}"));
}

/// Asserts the rule rejects the payload.
fn assert_rejects(rule: &Value, payload: &Value) {
    assert!(eval(rule, payload).is_err(), "{rule} accepted {payload}");
}

/// Registry stub recognizing `Point` objects and `callable:` strings.
struct TestRegistry;

impl InstanceRegistry for TestRegistry {
    fn is_instance(&self, class_name: &str, value: &Value) -> bool {
        class_name == "Point" && value.get("x").is_some() && value.get("y").is_some()
    }

    fn is_callable(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|text| text.starts_with("callable:"))
    }
}

/// Environment with the test registry bound.
fn registry_env() -> RuntimeEnv {
    RuntimeEnv {
        instances: Arc::new(TestRegistry),
        ..RuntimeEnv::default()
    }
}

// ============================================================================
// SECTION: Scalar Types
// ============================================================================

#[test]
fn string_length_window_accepts_and_rejects() {
    let rule = json!({ "type": "string", "min": 3, "max": 5 });
    assert_rejects(&rule, &json!("ab"));
    assert_accepts(&rule, &json!("abcd"));
    assert_rejects(&rule, &json!("abcdef"));
}

#[test]
fn string_rejects_non_strings_without_convert() {
    assert_rejects(&json!("string"), &json!(42));
    assert_accepts(&json!("string|convert"), &json!(42));
}

#[test]
fn string_trim_runs_before_length_validation() {
    let rule = json!({ "type": "string", "trim": true, "min": 4, "max": 4 });
    let Evaluated::Value(value) = eval(&rule, &json!("  abcd  ")).expect("should accept") else {
        panic!("expected a value");
    };
    assert_eq!(value, json!("abcd"));
}

#[test]
fn string_charset_classes_validate() {
    assert_accepts(&json!("string|alpha"), &json!("Rust"));
    assert_rejects(&json!("string|alpha"), &json!("Rust1"));
    assert_accepts(&json!("string|hex"), &json!("deadBEEF"));
    assert_rejects(&json!("string|hex"), &json!("xyz"));
    assert_accepts(&json!("string|base64"), &json!("aGVsbG8="));
    assert_rejects(&json!("string|base64"), &json!("aGVsbG8"));
}

#[test]
fn string_enum_matches_whole_values_only() {
    let rule = json!({ "type": "string", "enum": ["read", "write"] });
    assert_accepts(&rule, &json!("read"));
    assert_rejects(&rule, &json!("reader"));
    assert_rejects(&rule, &json!("misread"));
}

#[test]
fn string_padding_applies_after_validation() {
    let rule = json!({ "type": "string", "max": 3, "padStart": 5, "padChar": "0" });
    let Evaluated::Value(value) = eval(&rule, &json!("42")).expect("should accept") else {
        panic!("expected a value");
    };
    assert_eq!(value, json!("00042"));
}

#[test]
fn number_integer_positive_accepts_and_rejects() {
    let rule = json!({ "type": "number", "integer": true, "positive": true });
    assert_rejects(&rule, &json!(-1));
    assert_rejects(&rule, &json!(1.5));
    assert_accepts(&rule, &json!(4));
}

#[test]
fn number_coercion_runs_before_range_validation() {
    let rule = json!({ "type": "number", "convert": true, "min": 10 });
    let Evaluated::Value(value) = eval(&rule, &json!("42")).expect("should accept") else {
        panic!("expected a value");
    };
    assert_eq!(value, json!(42));
    assert_rejects(&rule, &json!("7"));
    assert_rejects(&rule, &json!("not-a-number"));
}

#[test]
fn number_not_equal_refines() {
    let rule = json!({ "type": "number", "notEqual": 0 });
    assert_accepts(&rule, &json!(1));
    assert_rejects(&rule, &json!(0));
}

#[test]
fn boolean_accepts_and_rejects() {
    assert_accepts(&json!("boolean"), &json!(true));
    assert_rejects(&json!("boolean"), &json!("true"));
    assert_accepts(&json!("boolean|convert"), &json!("true"));
    assert_accepts(&json!("boolean|convert"), &json!(0));
    assert_rejects(&json!("boolean|convert"), &json!("maybe"));
}

#[test]
fn date_accepts_rfc3339_and_rejects_garbage() {
    assert_accepts(&json!("date"), &json!("2024-01-15T10:30:00Z"));
    assert_rejects(&json!("date"), &json!("yesterday"));
    assert_rejects(&json!("date"), &json!(1_705_315_800_000_i64));
    assert_accepts(&json!("date|convert"), &json!(1_705_315_800_000_i64));
}

#[test]
fn any_accepts_values_but_not_missing() {
    assert_accepts(&json!("any"), &json!({ "nested": [1, 2] }));
    let result = validator(&json!("any")).evaluate(
        FieldInput::Missing,
        "value",
        &RuntimeEnv::default(),
    );
    assert!(result.is_err());
}

// ============================================================================
// SECTION: Format Types
// ============================================================================

#[test]
fn email_accepts_and_rejects() {
    assert_accepts(&json!("email"), &json!("dev@example.com"));
    assert_rejects(&json!("email"), &json!("not-an-email"));
}

#[test]
fn email_normalize_lowercases_the_address() {
    let rule = json!({ "type": "email", "normalize": true });
    let Evaluated::Value(value) = eval(&rule, &json!("Dev@Example.COM")).expect("should accept")
    else {
        panic!("expected a value");
    };
    assert_eq!(value, json!("dev@example.com"));
}

#[test]
fn currency_accepts_and_rejects() {
    let rule = json!("currency");
    assert_accepts(&rule, &json!("1,234.56"));
    assert_accepts(&rule, &json!("-12.50"));
    assert_rejects(&rule, &json!("no digits"));
    assert_rejects(&rule, &json!("12,34"));
}

#[test]
fn currency_symbol_is_required_unless_optional() {
    let mandatory = json!({ "type": "currency", "currencySymbol": "$" });
    assert_accepts(&mandatory, &json!("$100"));
    assert_rejects(&mandatory, &json!("100"));

    let optional = json!({ "type": "currency", "currencySymbol": "$", "symbolOptional": true });
    assert_accepts(&optional, &json!("$100"));
    assert_accepts(&optional, &json!("100"));
}

#[test]
fn url_accepts_and_rejects() {
    assert_accepts(&json!("url"), &json!("https://example.com/path"));
    assert_rejects(&json!("url"), &json!("not a url"));
}

#[test]
fn uuid_accepts_and_rejects() {
    assert_accepts(&json!("uuid"), &json!("550e8400-e29b-41d4-a716-446655440000"));
    assert_rejects(&json!("uuid"), &json!("550e8400"));
}

#[test]
fn luhn_checksum_accepts_and_rejects() {
    assert_accepts(&json!("luhn"), &json!("4539148803436467"));
    assert_rejects(&json!("luhn"), &json!("4539148803436468"));
}

#[test]
fn mac_address_groupings_accept_and_reject() {
    assert_accepts(&json!("mac"), &json!("01:23:45:67:89:ab"));
    assert_accepts(&json!("mac"), &json!("01-23-45-67-89-AB"));
    assert_accepts(&json!("mac"), &json!("0123.4567.89ab"));
    assert_rejects(&json!("mac"), &json!("01:23:45:67:89"));
    assert_rejects(&json!("mac"), &json!("not-a-mac"));
}

// ============================================================================
// SECTION: Identity and Host Types
// ============================================================================

#[test]
fn external_id_accepts_canonical_hex_and_rejects_short_ids() {
    assert_accepts(&json!("objectID"), &json!("507f1f77bcf86cd799439011"));
    assert_rejects(&json!("objectID"), &json!("507f1f77"));
    assert_rejects(&json!("objectID"), &json!(12));
}

#[test]
fn external_id_string_form_conversion_round_trips() {
    let rule = json!({ "type": "objectID", "convert": "hexString" });
    let Evaluated::Value(value) =
        eval(&rule, &json!("507f1f77bcf86cd799439011")).expect("should accept")
    else {
        panic!("expected a value");
    };
    assert_eq!(value, json!("507f1f77bcf86cd799439011"));
}

#[test]
fn class_instances_are_delegated_to_the_registry() {
    let rule = json!({ "type": "class", "instanceOf": "Point" });
    let env = registry_env();
    let point = json!({ "x": 1, "y": 2 });
    assert!(validator(&rule).evaluate(FieldInput::Present(&point), "value", &env).is_ok());
    assert!(
        validator(&rule)
            .evaluate(FieldInput::Present(&json!(5)), "value", &env)
            .is_err()
    );
    // The default registry recognizes nothing.
    assert_rejects(&rule, &point);
}

#[test]
fn callables_are_delegated_to_the_registry() {
    let rule = json!("function");
    let env = registry_env();
    let callable = json!("callable:handler");
    assert!(validator(&rule).evaluate(FieldInput::Present(&callable), "value", &env).is_ok());
    assert!(
        validator(&rule)
            .evaluate(FieldInput::Present(&json!("plain string")), "value", &env)
            .is_err()
    );
    assert_rejects(&rule, &callable);
}

// ============================================================================
// SECTION: Value Types
// ============================================================================

#[test]
fn enum_membership_accepts_and_rejects() {
    let rule = json!({ "type": "enum", "values": ["low", "high", 3] });
    assert_accepts(&rule, &json!("low"));
    assert_accepts(&rule, &json!(3));
    assert_rejects(&rule, &json!("medium"));
}

#[test]
fn equal_strict_and_loose_comparisons() {
    let loose = json!({ "type": "equal", "value": 5 });
    assert_accepts(&loose, &json!(5));
    assert_accepts(&loose, &json!("5"));

    let strict = json!({ "type": "equal", "value": 5, "strict": true });
    assert_accepts(&strict, &json!(5));
    assert_rejects(&strict, &json!("5"));
}

#[test]
fn forbidden_allows_absence_and_rejects_presence() {
    let rule = json!("forbidden");
    let absent = validator(&rule).evaluate(FieldInput::Missing, "value", &RuntimeEnv::default());
    assert_eq!(absent.expect("absence is the success case"), Evaluated::Absent);
    assert_rejects(&rule, &json!("anything"));
}

#[test]
fn forbidden_with_remove_drops_the_value() {
    let rule = json!({ "type": "forbidden", "remove": true });
    let outcome = eval(&rule, &json!("secret")).expect("remove should succeed");
    assert_eq!(outcome, Evaluated::Absent);
}

// ============================================================================
// SECTION: Composite Types
// ============================================================================

#[test]
fn array_min_items_accepts_and_rejects() {
    let rule = json!({ "type": "array", "items": "number", "min": 1 });
    assert_rejects(&rule, &json!([]));
    assert_accepts(&rule, &json!([1, 2]));
    assert_rejects(&rule, &json!([1, "two"]));
}

#[test]
fn array_empty_flag_permits_empty_arrays() {
    assert_rejects(&json!({ "type": "array", "items": "number" }), &json!([]));
    assert_accepts(&json!({ "type": "array", "items": "number", "empty": true }), &json!([]));
}

#[test]
fn array_convert_wraps_single_values() {
    let rule = json!({ "type": "array", "items": "string", "convert": true });
    let Evaluated::Value(value) = eval(&rule, &json!("solo")).expect("should accept") else {
        panic!("expected a value");
    };
    assert_eq!(value, json!(["solo"]));
}

#[test]
fn array_unique_and_contains_refinements() {
    let unique = json!({ "type": "array", "items": "number", "unique": true });
    assert_accepts(&unique, &json!([1, 2, 3]));
    assert_rejects(&unique, &json!([1, 2, 1]));

    let contains = json!({ "type": "array", "items": "string", "contains": "admin" });
    assert_accepts(&contains, &json!(["user", "admin"]));
    assert_rejects(&contains, &json!(["user"]));

    let contains_all = json!({ "type": "array", "items": "string", "contains": ["a", "b"] });
    assert_accepts(&contains_all, &json!(["a", "b", "c"]));
    assert_rejects(&contains_all, &json!(["a", "c"]));
}

#[test]
fn array_element_enum_restricts_members() {
    let rule = json!({ "type": "array", "items": "string", "enum": ["r", "w"] });
    assert_accepts(&rule, &json!(["r", "w"]));
    assert_rejects(&rule, &json!(["r", "x"]));
}

#[test]
fn object_strict_rejects_unknown_keys() {
    let rule = json!({ "type": "object", "strict": true, "props": { "id": "string" } });
    assert_accepts(&rule, &json!({ "id": "x" }));
    assert_rejects(&rule, &json!({ "id": "x", "extra": 1 }));
}

#[test]
fn object_strip_removes_unknown_keys() {
    let rule = json!({ "type": "object", "strict": "remove", "props": { "id": "string" } });
    let Evaluated::Value(value) =
        eval(&rule, &json!({ "id": "x", "extra": 1 })).expect("should accept")
    else {
        panic!("expected a value");
    };
    assert_eq!(value, json!({ "id": "x" }));
}

#[test]
fn object_passthrough_keeps_unknown_keys() {
    let rule = json!({ "type": "object", "props": { "id": "string" } });
    let Evaluated::Value(value) =
        eval(&rule, &json!({ "id": "x", "extra": 1 })).expect("should accept")
    else {
        panic!("expected a value");
    };
    assert_eq!(value, json!({ "id": "x", "extra": 1 }));
}

#[test]
fn strictness_propagates_into_nested_objects() {
    let rule = json!({
        "type": "object",
        "strict": true,
        "props": {
            "inner": { "type": "object", "props": { "id": "string" } }
        }
    });
    assert_accepts(&rule, &json!({ "inner": { "id": "x" } }));
    assert_rejects(&rule, &json!({ "inner": { "id": "x", "extra": 1 } }));
}

#[test]
fn object_property_count_refinements() {
    let rule = json!({
        "type": "object",
        "props": { "a": "string|optional", "b": "string|optional" },
        "minProps": 1,
        "maxProps": 1
    });
    assert_accepts(&rule, &json!({ "a": "x" }));
    assert_rejects(&rule, &json!({}));
    assert_rejects(&rule, &json!({ "a": "x", "b": "y" }));
}

#[test]
fn union_branches_are_tried_left_to_right() {
    let rule = json!({ "type": "multi", "rules": ["string", "number"] });
    assert_accepts(&rule, &json!("text"));
    assert_accepts(&rule, &json!(7));
    assert_rejects(&rule, &json!(true));
}

#[test]
fn union_shorthand_array_behaves_like_multi() {
    let rule = json!([{ "type": "number", "min": 10 }, "string"]);
    assert_accepts(&rule, &json!(12));
    assert_accepts(&rule, &json!("fallback"));
    assert_rejects(&rule, &json!(3.0));
}

#[test]
fn tuple_checks_arity_and_slot_types() {
    let rule = json!({ "type": "tuple", "items": ["string", "number"] });
    assert_accepts(&rule, &json!(["x", 1]));
    assert_rejects(&rule, &json!(["x"]));
    assert_rejects(&rule, &json!(["x", 1, 2]));
    assert_rejects(&rule, &json!([1, "x"]));
}

#[test]
fn record_validates_keys_and_values() {
    let rule = json!({
        "type": "record",
        "key": { "type": "string", "min": 2 },
        "value": "number"
    });
    assert_accepts(&rule, &json!({ "ab": 1, "cd": 2 }));
    assert_rejects(&rule, &json!({ "a": 1 }));
    assert_rejects(&rule, &json!({ "ab": "one" }));
}

// ============================================================================
// SECTION: Shape Resolution
// ============================================================================

#[test]
fn optional_fields_stay_absent_when_missing() {
    let outcome = validator(&json!("string|optional"))
        .evaluate(FieldInput::Missing, "value", &RuntimeEnv::default())
        .expect("optional absence succeeds");
    assert_eq!(outcome, Evaluated::Absent);
}

#[test]
fn required_fields_fail_when_missing() {
    let error = validator(&json!("string"))
        .evaluate(FieldInput::Missing, "value", &RuntimeEnv::default())
        .expect_err("required absence fails");
    assert_eq!(error.stage, StageKind::Shape);
}

#[test]
fn nullable_fields_accept_null_and_skip_constraints() {
    let rule = json!({ "type": "string", "nullable": true, "min": 3 });
    let outcome = eval(&rule, &Value::Null).expect("null should pass");
    assert_eq!(outcome, Evaluated::Value(Value::Null));
    assert_rejects(&json!({ "type": "string", "min": 3 }), &Value::Null);
}

#[test]
fn defaults_substitute_for_missing_values() {
    let rule = json!({ "type": "string", "default": "anonymous" });
    let outcome = validator(&rule)
        .evaluate(FieldInput::Missing, "value", &RuntimeEnv::default())
        .expect("default should apply");
    assert_eq!(outcome, Evaluated::Value(json!("anonymous")));
}

#[test]
fn failure_reports_the_stage_and_path() {
    let error = eval(&json!({ "type": "string", "min": 3 }), &json!("ab"))
        .expect_err("short string fails");
    assert_eq!(error.path, "value");
    assert_eq!(error.stage, StageKind::Validate);

    let error = eval(&json!("number"), &json!("7")).expect_err("string payload fails");
    assert_eq!(error.stage, StageKind::Shape);
}

#[test]
fn nested_failures_carry_the_full_path() {
    let rule = json!({
        "type": "object",
        "props": { "tags": { "type": "array", "items": "string", "empty": true } }
    });
    let error =
        eval(&rule, &json!({ "tags": ["ok", 5] })).expect_err("bad element fails");
    assert_eq!(error.path, "value.tags[1]");
}

// ============================================================================
// SECTION: Schema Tree Evaluation
// ============================================================================

#[test]
fn field_trees_validate_and_transform_payloads() {
    let outcome = SchemaCompiler::new()
        .compile(&json!({
            "$$strict": true,
            "name": { "type": "string", "trim": true },
            "age": { "type": "number", "convert": true, "optional": true }
        }))
        .expect("schema should compile");
    assert!(outcome.is_clean());

    let validated = outcome
        .schema
        .validate(&json!({ "name": "  Ada  ", "age": "36" }), &RuntimeEnv::default())
        .expect("payload should validate");
    assert_eq!(validated, json!({ "name": "Ada", "age": 36 }));

    let error = outcome
        .schema
        .validate(&json!({ "name": "Ada", "intruder": 1 }), &RuntimeEnv::default())
        .expect_err("unknown field should be rejected");
    assert!(error.reason.contains("intruder"));
}

#[test]
fn root_trees_validate_the_whole_payload_directly() {
    let outcome = SchemaCompiler::new()
        .compile(&json!({ "$$root": true, "type": "string", "min": 2 }))
        .expect("root schema should compile");
    let validated = outcome
        .schema
        .validate(&json!("payload"), &RuntimeEnv::default())
        .expect("string payload should validate");
    assert_eq!(validated, json!("payload"));
    assert!(outcome.schema.validate(&json!("x"), &RuntimeEnv::default()).is_err());
    assert!(
        outcome.schema.validate(&json!({ "value": "x" }), &RuntimeEnv::default()).is_err()
    );
}

#[test]
fn forbidden_fields_are_dropped_from_validated_payloads() {
    let outcome = SchemaCompiler::new()
        .compile(&json!({
            "id": "string",
            "debug": { "type": "forbidden", "remove": true }
        }))
        .expect("schema should compile");
    let validated = outcome
        .schema
        .validate(&json!({ "id": "x", "debug": "drop-me" }), &RuntimeEnv::default())
        .expect("payload should validate");
    assert_eq!(validated, json!({ "id": "x" }));
}

#[test]
fn repeated_evaluation_is_deterministic() {
    let rule = json!({ "type": "array", "items": "number|convert", "unique": true });
    let first = eval(&rule, &json!(["1", 2, "3"])).expect("should accept");
    let second = eval(&rule, &json!(["1", 2, "3"])).expect("should accept");
    assert_eq!(first, second);
    assert_eq!(first, Evaluated::Value(json!([1, 2, 3])));
}
