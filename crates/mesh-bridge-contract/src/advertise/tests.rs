// crates/mesh-bridge-contract/src/advertise/tests.rs
// ============================================================================
// Module: Tool Advertisement Unit Tests
// Description: Unit coverage for tool assembly and failure isolation.
// Purpose: Ensure broken operations are withheld and reported, not dropped.
// Dependencies: mesh-bridge-contract, mesh-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! Drives the advertisement assembly with an in-memory catalog: clean
//! operations become tool definitions, broken operations are withheld with
//! named reasons, and the metrics sink observes both outcomes.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::telemetry::NoopCompileMetrics;

/// In-memory catalog backed by a fixed operation list.
struct FixedCatalog(Vec<OperationSpec>);

impl OperationCatalog for FixedCatalog {
    fn operations(&self) -> Vec<OperationSpec> {
        self.0.clone()
    }
}

/// Metrics sink recording observed outcomes.
#[derive(Default)]
struct RecordingMetrics {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<(String, String)>>,
}

impl CompileMetrics for RecordingMetrics {
    fn record_success(&self, operation: &str) {
        self.successes.lock().expect("metrics lock").push(operation.to_string());
    }

    fn record_failure(&self, operation: &str, reason: &str) {
        self.failures
            .lock()
            .expect("metrics lock")
            .push((operation.to_string(), reason.to_string()));
    }
}

/// Builds a bare operation with the given parameter rules.
fn operation(name: &str, params: serde_json::Value) -> OperationSpec {
    OperationSpec {
        name: name.to_string(),
        title: None,
        description: None,
        params: Some(params),
    }
}

#[test]
fn clean_operations_become_tool_definitions() {
    let catalog = FixedCatalog(vec![OperationSpec {
        name: "greeter.welcome".to_string(),
        title: Some("Welcome".to_string()),
        description: Some("Greets a caller by name.".to_string()),
        params: Some(json!({ "name": "string|min:1" })),
    }]);
    let metrics = RecordingMetrics::default();

    let report = build_tools(&catalog, &SchemaCompiler::new(), &metrics);
    assert!(report.failures.is_empty());
    assert_eq!(report.tools.len(), 1);

    let tool = report.tools.first().expect("one tool");
    assert_eq!(tool.name.as_str(), "greeter.welcome");
    assert_eq!(tool.title.as_deref(), Some("Welcome"));
    assert_eq!(tool.description, "Greets a caller by name.");
    assert_eq!(tool.input_schema["properties"]["name"]["type"], json!("string"));
    assert_eq!(metrics.successes.lock().expect("metrics lock").len(), 1);
}

#[test]
fn operations_without_params_advertise_an_empty_object_schema() {
    let catalog = FixedCatalog(vec![OperationSpec {
        name: "node.list".to_string(),
        title: None,
        description: None,
        params: None,
    }]);
    let report = build_tools(&catalog, &SchemaCompiler::new(), &NoopCompileMetrics);
    let tool = report.tools.first().expect("one tool");
    assert_eq!(tool.input_schema["type"], json!("object"));
    assert_eq!(tool.input_schema["required"], json!([]));
    assert_eq!(tool.description, "Call the 'node.list' operation.");
}

#[test]
fn broken_operations_are_withheld_and_named() {
    let catalog = FixedCatalog(vec![
        operation("math.add", json!({ "a": "number", "b": "number" })),
        operation("math.bad", json!({ "a": "quaternion" })),
    ]);
    let metrics = RecordingMetrics::default();

    let report = build_tools(&catalog, &SchemaCompiler::new(), &metrics);
    assert_eq!(report.tools.len(), 1);
    assert_eq!(report.tools.first().expect("one tool").name.as_str(), "math.add");

    assert_eq!(report.failures.len(), 1);
    let failure = report.failures.first().expect("one failure");
    assert_eq!(failure.operation, "math.bad");
    assert!(failure.details.first().expect("one detail").contains('a'));

    let failures = metrics.failures.lock().expect("metrics lock");
    assert_eq!(failures.len(), 1);
    assert!(failures.first().expect("one failure").1.contains("quaternion"));
}

#[test]
fn partially_broken_operations_are_withheld_entirely() {
    let catalog = FixedCatalog(vec![operation(
        "deploy.apply",
        json!({ "service": "string", "oops": "string|sparkle" }),
    )]);
    let report = build_tools(&catalog, &SchemaCompiler::new(), &NoopCompileMetrics);

    // Advertising only the surviving fields would accept payloads the
    // operation itself rejects.
    assert!(report.tools.is_empty());
    let failure = report.failures.first().expect("one failure");
    assert_eq!(failure.operation, "deploy.apply");
    assert!(failure.details.iter().any(|detail| detail.starts_with("oops:")));
}

#[test]
fn one_broken_operation_never_disables_its_siblings() {
    let catalog = FixedCatalog(vec![
        operation("svc.one", json!({ "x": "number" })),
        operation("svc.broken", json!({ "x": { "type": "array" } })),
        operation("svc.two", json!({ "y": "string" })),
    ]);
    let report = build_tools(&catalog, &SchemaCompiler::new(), &NoopCompileMetrics);
    let names: Vec<&str> = report.tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(names, vec!["svc.one", "svc.two"]);
    assert_eq!(report.failures.len(), 1);
}
