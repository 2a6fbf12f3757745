// crates/mesh-bridge-contract/tests/tool_schemas.rs
// ============================================================================
// Module: Tool Schema Integration Tests
// Description: End-to-end coverage from operation catalog to tool listing.
// Purpose: Validate the advertised schemas against real call payloads.
// ============================================================================

//! Drives the public surface the way a protocol server would: register a
//! small catalog of mesh operations, build the tool listing, and check that
//! the advertised schemas and the compiled validators agree on payloads.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]

use mesh_bridge_contract::NoopCompileMetrics;
use mesh_bridge_contract::OperationCatalog;
use mesh_bridge_contract::OperationSpec;
use mesh_bridge_contract::build_tools;
use mesh_bridge_core::RuntimeEnv;
use mesh_bridge_core::SchemaCompiler;
use serde_json::json;

/// Catalog mirroring a small mesh: a greeter and a math service.
struct MeshCatalog;

impl OperationCatalog for MeshCatalog {
    fn operations(&self) -> Vec<OperationSpec> {
        vec![
            OperationSpec {
                name: "greeter.hello".to_string(),
                title: Some("Hello".to_string()),
                description: Some("Returns a fixed greeting.".to_string()),
                params: None,
            },
            OperationSpec {
                name: "greeter.welcome".to_string(),
                title: Some("Welcome".to_string()),
                description: Some("Greets the named caller.".to_string()),
                params: Some(json!({ "name": "string" })),
            },
            OperationSpec {
                name: "math.add".to_string(),
                title: Some("Add".to_string()),
                description: Some("Adds two numbers.".to_string()),
                params: Some(json!({ "a": "number", "b": "number" })),
            },
        ]
    }
}

#[test]
fn the_catalog_advertises_every_operation() {
    let report = build_tools(&MeshCatalog, &SchemaCompiler::new(), &NoopCompileMetrics);
    assert!(report.failures.is_empty());

    let names: Vec<&str> = report.tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, vec!["greeter.hello", "greeter.welcome", "math.add"]);

    let add = report.tools.iter().find(|tool| tool.name.as_str() == "math.add").expect("math.add");
    assert_eq!(add.input_schema["properties"]["a"]["type"], json!("number"));
    assert_eq!(add.input_schema["required"], json!(["a", "b"]));
}

#[test]
fn advertised_schemas_and_validators_agree_on_payloads() {
    let compiler = SchemaCompiler::new();
    let rules = json!({ "a": "number", "b": "number" });
    let outcome = compiler.compile(&rules).expect("rules should compile");
    assert!(outcome.is_clean());

    let env = RuntimeEnv::default();
    assert!(outcome.schema.validate(&json!({ "a": 5, "b": 3 }), &env).is_ok());
    assert!(outcome.schema.validate(&json!({ "a": 5 }), &env).is_err());
    assert!(outcome.schema.validate(&json!({ "a": 5, "b": "three" }), &env).is_err());

    let schema = mesh_bridge_contract::input_schema(&outcome.schema);
    assert_eq!(schema["required"], json!(["a", "b"]));
    assert_eq!(schema["properties"]["b"]["type"], json!("number"));
}

#[test]
fn rebuilt_listings_are_identical_for_the_same_catalog() {
    let first = build_tools(&MeshCatalog, &SchemaCompiler::new(), &NoopCompileMetrics);
    let second = build_tools(&MeshCatalog, &SchemaCompiler::new(), &NoopCompileMetrics);
    assert_eq!(first, second);
}
