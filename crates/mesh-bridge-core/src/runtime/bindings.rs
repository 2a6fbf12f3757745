// crates/mesh-bridge-core/src/runtime/bindings.rs
// ============================================================================
// Module: Runtime Bindings
// Description: Trait seams for host-provided identity and instance checks.
// Purpose: Keep the evaluation engine pure while delegating host semantics.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Some rule types reference values that have no JSON-native form: opaque
//! external identities, host-object instances and callables. Their checks
//! and conversions are delegated to these trait seams. The defaults fail
//! closed: the instance registry recognizes nothing, and the identity codec
//! accepts only its canonical 24-character hex string form. Implementations
//! must be stateless or purely functional; a compile or evaluation call
//! never mutates them.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

// ============================================================================
// SECTION: Identity Codec
// ============================================================================

/// Validity and conversion semantics for opaque external identities.
pub trait IdentityCodec: Send + Sync {
    /// Returns whether the value is already in the codec's instance form.
    fn is_instance(&self, value: &Value) -> bool;

    /// Returns whether the value is a valid identity in any accepted form.
    fn is_valid(&self, value: &Value) -> bool;

    /// Converts a valid identity into the codec's instance form.
    fn to_instance(&self, value: &Value) -> Option<Value>;

    /// Converts a valid identity into its canonical string form.
    fn to_string_form(&self, value: &Value) -> Option<Value>;
}

/// Default codec: the canonical identity form is a 24-character hex string.
///
/// Instance and string forms coincide, so conversions are identity
/// functions over valid values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexIdentityCodec;

impl HexIdentityCodec {
    fn is_hex_id(value: &Value) -> bool {
        match value {
            Value::String(text) => {
                text.len() == 24 && text.chars().all(|ch| ch.is_ascii_hexdigit())
            }
            _ => false,
        }
    }
}

impl IdentityCodec for HexIdentityCodec {
    fn is_instance(&self, value: &Value) -> bool {
        Self::is_hex_id(value)
    }

    fn is_valid(&self, value: &Value) -> bool {
        Self::is_hex_id(value)
    }

    fn to_instance(&self, value: &Value) -> Option<Value> {
        Self::is_hex_id(value).then(|| value.clone())
    }

    fn to_string_form(&self, value: &Value) -> Option<Value> {
        Self::is_hex_id(value).then(|| value.clone())
    }
}

// ============================================================================
// SECTION: Instance Registry
// ============================================================================

/// Recognition of host-object instances and callables.
pub trait InstanceRegistry: Send + Sync {
    /// Returns whether the value is an instance of the named class.
    fn is_instance(&self, class_name: &str, value: &Value) -> bool;

    /// Returns whether the value is a callable.
    fn is_callable(&self, value: &Value) -> bool;
}

/// Default registry: recognizes no instances and no callables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInstances;

impl InstanceRegistry for NoInstances {
    fn is_instance(&self, _class_name: &str, _value: &Value) -> bool {
        false
    }

    fn is_callable(&self, _value: &Value) -> bool {
        false
    }
}

// ============================================================================
// SECTION: Runtime Environment
// ============================================================================

/// Host bindings consulted while evaluating composed validators.
#[derive(Clone)]
pub struct RuntimeEnv {
    /// Identity codec for opaque external identities.
    pub identity: Arc<dyn IdentityCodec>,
    /// Registry for host-object instance and callable checks.
    pub instances: Arc<dyn InstanceRegistry>,
}

impl Default for RuntimeEnv {
    fn default() -> Self {
        Self {
            identity: Arc::new(HexIdentityCodec),
            instances: Arc::new(NoInstances),
        }
    }
}

impl fmt::Debug for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeEnv").finish_non_exhaustive()
    }
}
