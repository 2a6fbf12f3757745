// crates/mesh-bridge-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Shared data models for tool advertisement artifacts.
// Purpose: Provide canonical shapes for tool listings and operation specs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These are the typed shapes exchanged with the tool-calling protocol layer:
//! the operation specification supplied by the registry collaborator and the
//! tool definition advertised to remote callers.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Tool Name
// ============================================================================

/// Stable identifier a tool is advertised under.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolName(String);

impl ToolName {
    /// Creates a new tool name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ToolName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ToolName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Operation Specification
// ============================================================================

/// One remote operation as reported by the registry collaborator.
///
/// # Invariants
/// - `params` is the operation's raw rule map when present; operations
///   without declared parameters advertise an empty input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Stable operation identifier.
    pub name: String,
    /// Short human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer description for tool listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw parameter rule map in the rule language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

// ============================================================================
// SECTION: Tool Definition
// ============================================================================

/// Tool definition advertised to remote tool-calling clients.
///
/// # Invariants
/// - `input_schema` is a JSON Schema payload describing the call payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Advertised tool name.
    pub name: ToolName,
    /// Short human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Tool description for clients.
    pub description: String,
    /// JSON Schema for the tool input payload.
    pub input_schema: Value,
}
