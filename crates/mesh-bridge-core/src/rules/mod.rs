// crates/mesh-bridge-core/src/rules/mod.rs
// ============================================================================
// Module: Rule Language
// Description: Descriptor model and normalizer for the rule language.
// Purpose: Canonicalize shorthand strings and rule objects into descriptors.
// Dependencies: crate::error, serde_json
// ============================================================================

//! ## Overview
//! The rule language is the compact, declarative form operations use to
//! describe their parameters. This module owns its canonical descriptor
//! model and the normalizer that expands the shorthand grammar.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod descriptor;
pub mod normalize;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use descriptor::Common;
pub use descriptor::ContainsRule;
pub use descriptor::IdConversion;
pub use descriptor::RuleDescriptor;
pub use descriptor::Strictness;
pub use normalize::normalize;
