// crates/mesh-bridge-contract/src/lib.rs
// ============================================================================
// Module: Mesh Bridge Contract Library
// Description: Public API surface for tool advertisement artifacts.
// Purpose: Expose tool definitions, schema export and assembly helpers.
// Dependencies: crate::{advertise, export, telemetry, types}
// ============================================================================

//! ## Overview
//! The contract crate turns compiled rule schemas into the artifacts the
//! tool-calling protocol consumes: JSON Schema input schemas and tool
//! definitions. Transport, sessions and operation discovery stay with their
//! own collaborators; this crate only shapes what they exchange.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod advertise;
pub mod export;
pub mod telemetry;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use advertise::OperationCatalog;
pub use advertise::OperationFailure;
pub use advertise::ToolBuildReport;
pub use advertise::build_tools;
pub use export::input_schema;
pub use telemetry::CompileMetrics;
pub use telemetry::NoopCompileMetrics;
pub use types::OperationSpec;
pub use types::ToolDefinition;
pub use types::ToolName;
