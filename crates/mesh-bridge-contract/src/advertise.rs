// crates/mesh-bridge-contract/src/advertise.rs
// ============================================================================
// Module: Tool Advertisement
// Description: Assembly of tool definitions from registered operations.
// Purpose: Compile operation rules and isolate per-operation failures.
// Dependencies: crate::{export, telemetry, types}, mesh-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! The advertisement layer sits between the operation registry collaborator
//! and the tool-calling protocol: it compiles every registered operation's
//! parameter rules, renders input schemas for the ones that compile cleanly,
//! and withholds the rest with a per-operation failure report. An operation
//! with any failed field is withheld entirely — advertising a schema with a
//! silently dropped validator would accept payloads the operation would
//! reject. One bad operation never disables its siblings.

use mesh_bridge_core::SchemaCompiler;
use serde_json::json;

use crate::export::input_schema;
use crate::telemetry::CompileMetrics;
use crate::types::OperationSpec;
use crate::types::ToolDefinition;
use crate::types::ToolName;

// ============================================================================
// SECTION: Operation Catalog
// ============================================================================

/// Registry collaborator reporting the currently callable operations.
///
/// Which operations exist, and which are exposed, is decided by the
/// implementor; this crate only compiles and advertises what it is given.
pub trait OperationCatalog {
    /// Returns the operations to advertise, in a stable order.
    fn operations(&self) -> Vec<OperationSpec>;
}

// ============================================================================
// SECTION: Build Report
// ============================================================================

/// An operation withheld from advertisement, with per-field reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// Name of the withheld operation.
    pub operation: String,
    /// One entry per failed field (or one entry for a whole-map failure).
    pub details: Vec<String>,
}

/// Result of building the tool listing from a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolBuildReport {
    /// Tools ready to advertise, in catalog order.
    pub tools: Vec<ToolDefinition>,
    /// Operations withheld from advertisement, in catalog order.
    pub failures: Vec<OperationFailure>,
}

// ============================================================================
// SECTION: Tool Assembly
// ============================================================================

/// Compiles every catalog operation into an advertised tool definition.
///
/// Operations whose rules fail to compile — in whole or in any single field
/// — are withheld and reported; the remaining operations are unaffected.
pub fn build_tools(
    catalog: &dyn OperationCatalog,
    compiler: &SchemaCompiler,
    metrics: &dyn CompileMetrics,
) -> ToolBuildReport {
    let mut tools = Vec::new();
    let mut failures = Vec::new();

    for operation in catalog.operations() {
        let params = operation.params.clone().unwrap_or_else(|| json!({}));
        let details = match compiler.compile(&params) {
            Ok(outcome) if outcome.is_clean() => {
                metrics.record_success(&operation.name);
                tools.push(tool_definition(&operation, input_schema(&outcome.schema)));
                continue;
            }
            Ok(outcome) => outcome
                .failures
                .iter()
                .map(|failure| format!("{}: {}", failure.field, failure.error))
                .collect(),
            Err(error) => vec![error.to_string()],
        };
        metrics.record_failure(&operation.name, &details.join("; "));
        failures.push(OperationFailure {
            operation: operation.name.clone(),
            details,
        });
    }

    ToolBuildReport {
        tools,
        failures,
    }
}

/// Builds the advertised definition for one compiled operation.
fn tool_definition(operation: &OperationSpec, input_schema: serde_json::Value) -> ToolDefinition {
    let description = operation
        .description
        .clone()
        .unwrap_or_else(|| format!("Call the '{}' operation.", operation.name));
    ToolDefinition {
        name: ToolName::new(operation.name.clone()),
        title: operation.title.clone(),
        description,
        input_schema,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
