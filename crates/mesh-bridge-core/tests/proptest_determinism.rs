// crates/mesh-bridge-core/tests/proptest_determinism.rs
// ============================================================================
// Module: Compiler Property-Based Tests
// Description: Property tests for compile determinism and evaluation stability.
// Purpose: Detect nondeterminism and panics across wide input ranges.
// ============================================================================

//! Property-based tests: compiling the same rule map twice must yield
//! validators with identical structure and identical accept/reject behavior
//! on any input.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use mesh_bridge_core::RuntimeEnv;
use mesh_bridge_core::SchemaCompiler;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

/// JSON scalar strategy for payload generation.
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|raw| Value::Number(raw.into())),
        any::<f64>()
            .prop_filter("finite", |raw| raw.is_finite())
            .prop_map(|raw| serde_json::Number::from_f64(raw).map_or(Value::Null, Value::Number)),
        ".{0,24}".prop_map(Value::String),
    ]
}

/// A fixed but representative rule map exercising most stage categories.
fn reference_rules() -> Value {
    json!({
        "$$strict": true,
        "name": { "type": "string", "trim": true, "min": 1, "max": 16 },
        "count": { "type": "number", "convert": true, "integer": true, "min": 0 },
        "mode": { "type": "enum", "values": ["fast", "safe"] },
        "tags": {
            "type": "array",
            "items": "string|alphadash",
            "unique": true,
            "empty": true,
            "optional": true
        },
        "contact": { "type": "email", "normalize": true, "optional": true }
    })
}

proptest! {
    #[test]
    fn compiling_twice_yields_structurally_equal_outcomes(
        min in 0_usize .. 8,
        span in 0_usize .. 8,
    ) {
        let rules = json!({
            "value": { "type": "string", "min": min, "max": min + span }
        });
        let first = SchemaCompiler::new().compile(&rules).expect("compile");
        let second = SchemaCompiler::new().compile(&rules).expect("compile");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn independent_compiles_agree_on_arbitrary_payloads(payload in prop::collection::btree_map(
        "[a-z]{1,8}",
        scalar_strategy(),
        0 .. 6,
    )) {
        let rules = reference_rules();
        let first = SchemaCompiler::new().compile(&rules).expect("compile");
        let second = SchemaCompiler::new().compile(&rules).expect("compile");
        prop_assert!(first.is_clean());

        let env = RuntimeEnv::default();
        let payload = Value::Object(payload.into_iter().collect());
        let left = first.schema.validate(&payload, &env);
        let right = second.schema.validate(&payload, &env);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn string_window_behavior_matches_character_counts(
        text in ".{0,12}",
        min in 0_usize .. 6,
        span in 0_usize .. 6,
    ) {
        let max = min + span;
        let rules = json!({ "value": { "type": "string", "min": min, "max": max } });
        let outcome = SchemaCompiler::new().compile(&rules).expect("compile");
        prop_assert!(outcome.is_clean());

        let length = text.chars().count();
        let payload = json!({ "value": text });
        let accepted = outcome.schema.validate(&payload, &RuntimeEnv::default()).is_ok();
        prop_assert_eq!(accepted, length >= min && length <= max);
    }

    #[test]
    fn evaluation_never_panics_on_arbitrary_scalars(value in scalar_strategy()) {
        let rules = reference_rules();
        let outcome = SchemaCompiler::new().compile(&rules).expect("compile");
        let payload = json!({ "name": value });
        // Either verdict is acceptable; the property is that evaluation
        // terminates without panicking.
        let _ = outcome.schema.validate(&payload, &RuntimeEnv::default());
    }
}
