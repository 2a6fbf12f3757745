// crates/mesh-bridge-core/src/rules/normalize.rs
// ============================================================================
// Module: Rule Normalizer
// Description: Expansion of shorthand rules into canonical descriptors.
// Purpose: Turn untrusted rule values into the closed descriptor enumeration.
// Dependencies: crate::{error, rules::descriptor}, serde_json
// ============================================================================

//! ## Overview
//! The normalizer is a pure function from one field's raw rule — a shorthand
//! string (`"type[|modifier[:value]]*"`), a rule object, or an array of rules
//! (union shorthand) — to a canonical [`RuleDescriptor`]. Every property is
//! consumed exactly once; leftovers are unknown modifiers and fail with
//! [`CompileError::MalformedRule`] rather than being ignored. Unknown type
//! tags fail with [`CompileError::UnknownType`].

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

use crate::error::CompileError;
use crate::rules::descriptor::AnyRule;
use crate::rules::descriptor::ArrayRule;
use crate::rules::descriptor::BooleanRule;
use crate::rules::descriptor::ClassRule;
use crate::rules::descriptor::Common;
use crate::rules::descriptor::ContainsRule;
use crate::rules::descriptor::CurrencyRule;
use crate::rules::descriptor::DateRule;
use crate::rules::descriptor::EmailRule;
use crate::rules::descriptor::EnumRule;
use crate::rules::descriptor::EqualRule;
use crate::rules::descriptor::ExternalIdRule;
use crate::rules::descriptor::ForbiddenRule;
use crate::rules::descriptor::FunctionRule;
use crate::rules::descriptor::IdConversion;
use crate::rules::descriptor::LuhnRule;
use crate::rules::descriptor::MacRule;
use crate::rules::descriptor::MultiRule;
use crate::rules::descriptor::NumberRule;
use crate::rules::descriptor::ObjectRule;
use crate::rules::descriptor::RecordRule;
use crate::rules::descriptor::RuleDescriptor;
use crate::rules::descriptor::StringRule;
use crate::rules::descriptor::Strictness;
use crate::rules::descriptor::TupleRule;
use crate::rules::descriptor::UrlRule;
use crate::rules::descriptor::UuidRule;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Expands one field's raw rule into a canonical descriptor.
///
/// # Errors
///
/// Returns [`CompileError::MalformedRule`] for grammar violations and unknown
/// modifiers, and [`CompileError::UnknownType`] for type tags outside the
/// closed enumeration.
pub fn normalize(rule: &Value) -> Result<RuleDescriptor, CompileError> {
    match rule {
        Value::String(shorthand) => {
            let expanded = expand_shorthand(shorthand)?;
            build_descriptor(&expanded)
        }
        Value::Object(map) => build_descriptor(map),
        Value::Array(branches) => {
            let mut rules = Vec::with_capacity(branches.len());
            for branch in branches {
                rules.push(normalize(branch)?);
            }
            Ok(RuleDescriptor::Multi(MultiRule {
                common: Common::default(),
                rules,
            }))
        }
        other => Err(CompileError::MalformedRule {
            reason: format!("rule must be a string, object or array, got {}", kind_of(other)),
        }),
    }
}

/// Returns a short JSON kind name for diagnostics.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Shorthand Grammar
// ============================================================================

/// Expands `"type[|modifier[:value]]*"` into an equivalent rule object.
///
/// A trailing `[]` on the type name is array shorthand: `"string[]"` expands
/// to an array rule with string items, and the remaining modifiers apply to
/// the array.
fn expand_shorthand(shorthand: &str) -> Result<Map<String, Value>, CompileError> {
    let mut segments = shorthand.split('|');
    let head = segments.next().unwrap_or_default().trim();
    if head.is_empty() {
        return Err(CompileError::MalformedRule {
            reason: "shorthand rule has an empty type name".to_string(),
        });
    }

    let mut expanded = Map::new();
    if let Some(item_tag) = head.strip_suffix("[]") {
        if item_tag.is_empty() {
            return Err(CompileError::MalformedRule {
                reason: "array shorthand `[]` has an empty item type".to_string(),
            });
        }
        expanded.insert("type".to_string(), Value::String("array".to_string()));
        expanded.insert("items".to_string(), Value::String(item_tag.to_string()));
    } else {
        expanded.insert("type".to_string(), Value::String(head.to_string()));
    }

    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(CompileError::MalformedRule {
                reason: format!("shorthand rule '{shorthand}' has an empty modifier"),
            });
        }
        match segment.split_once(':') {
            Some((key, raw)) => {
                expanded.insert(key.trim().to_string(), parse_modifier_value(raw));
            }
            None => {
                expanded.insert(segment.to_string(), Value::Bool(true));
            }
        }
    }

    Ok(expanded)
}

/// Parses a `modifier:value` payload into the closest JSON scalar.
fn parse_modifier_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        return Value::from(float);
    }
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(trimmed.to_string()),
    }
}

// ============================================================================
// SECTION: Descriptor Builders
// ============================================================================

/// Builds a descriptor from a rule object, dispatching on the type tag.
fn build_descriptor(map: &Map<String, Value>) -> Result<RuleDescriptor, CompileError> {
    let tag = match map.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => {
            return Err(CompileError::MalformedRule {
                reason: format!("rule type must be a string, got {}", kind_of(other)),
            });
        }
        None => {
            return Err(CompileError::MalformedRule {
                reason: "rule object is missing a type".to_string(),
            });
        }
    };

    let mut bag = FieldBag::new(map);
    let descriptor = match tag {
        "string" => build_string(&mut bag)?,
        "number" => build_number(&mut bag)?,
        "boolean" => build_boolean(&mut bag)?,
        "date" => build_date(&mut bag)?,
        "any" => build_any(&mut bag)?,
        "email" => build_email(&mut bag)?,
        "currency" => build_currency(&mut bag)?,
        "class" => build_class(&mut bag)?,
        "enum" => build_enum(&mut bag)?,
        "equal" => build_equal(&mut bag)?,
        "forbidden" => build_forbidden(&mut bag)?,
        "function" => build_function(&mut bag)?,
        "luhn" => build_luhn(&mut bag)?,
        "mac" => build_mac(&mut bag)?,
        "array" => build_array(&mut bag)?,
        "object" => build_object(&mut bag)?,
        "multi" => build_multi(&mut bag)?,
        "tuple" => build_tuple(&mut bag)?,
        "url" => build_url(&mut bag)?,
        "uuid" => build_uuid(&mut bag)?,
        "objectID" => build_external_id(&mut bag)?,
        "record" => build_record(&mut bag)?,
        unknown => {
            return Err(CompileError::UnknownType {
                type_tag: unknown.to_string(),
            });
        }
    };
    bag.finish(tag)?;

    Ok(descriptor)
}

/// Builds a string descriptor from the remaining rule properties.
fn build_string(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::String(StringRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
        empty: bag.take_bool("empty")?,
        min: bag.take_usize("min")?,
        max: bag.take_usize("max")?,
        length: bag.take_usize("length")?,
        pattern: bag.take_string("pattern")?,
        contains: bag.take_string("contains")?,
        alpha: bag.take_flag("alpha")?,
        numeric: bag.take_flag("numeric")?,
        alphanum: bag.take_flag("alphanum")?,
        alphadash: bag.take_flag("alphadash")?,
        hex: bag.take_flag("hex")?,
        base64: bag.take_flag("base64")?,
        single_line: bag.take_flag("singleLine")?,
        one_of: bag.take_string_list("enum")?,
        trim: bag.take_flag("trim")?,
        trim_left: bag.take_flag("trimLeft")?,
        trim_right: bag.take_flag("trimRight")?,
        lowercase: bag.take_flag("lowercase")?,
        uppercase: bag.take_flag("uppercase")?,
        pad_start: bag.take_usize("padStart")?,
        pad_end: bag.take_usize("padEnd")?,
        pad_char: bag.take_char("padChar")?,
    }))
}

/// Builds a number descriptor from the remaining rule properties.
fn build_number(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Number(NumberRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
        min: bag.take_f64("min")?,
        max: bag.take_f64("max")?,
        equal: bag.take_f64("equal")?,
        not_equal: bag.take_f64("notEqual")?,
        integer: bag.take_flag("integer")?,
        positive: bag.take_flag("positive")?,
        negative: bag.take_flag("negative")?,
    }))
}

/// Builds a boolean descriptor from the remaining rule properties.
fn build_boolean(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Boolean(BooleanRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
    }))
}

/// Builds a date descriptor from the remaining rule properties.
fn build_date(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Date(DateRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
    }))
}

/// Builds an any-value descriptor from the remaining rule properties.
fn build_any(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Any(AnyRule {
        common: bag.take_common()?,
    }))
}

/// Builds an email descriptor from the remaining rule properties.
fn build_email(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Email(EmailRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
        normalize: bag.take_flag("normalize")?,
        empty: bag.take_bool("empty")?,
        min: bag.take_usize("min")?,
        max: bag.take_usize("max")?,
    }))
}

/// Builds a currency descriptor from the remaining rule properties.
fn build_currency(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Currency(CurrencyRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
        symbol: bag.take_string("currencySymbol")?,
        symbol_optional: bag.take_flag("symbolOptional")?,
        thousand_separator: bag.take_string("thousandSeparator")?,
        decimal_separator: bag.take_string("decimalSeparator")?,
        custom_pattern: bag.take_string("customRegex")?,
    }))
}

/// Builds a host-instance descriptor from the remaining rule properties.
fn build_class(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let class_name = bag.take_string("instanceOf")?.ok_or_else(|| CompileError::MalformedRule {
        reason: "class rule requires an instanceOf name".to_string(),
    })?;
    Ok(RuleDescriptor::Class(ClassRule {
        common,
        class_name,
    }))
}

/// Builds a value-set membership descriptor from the remaining rule properties.
fn build_enum(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let values = bag.take_list("values")?.ok_or_else(|| CompileError::MalformedRule {
        reason: "enum rule requires a values list".to_string(),
    })?;
    Ok(RuleDescriptor::Enum(EnumRule {
        common,
        values,
    }))
}

/// Builds a fixed-value equality descriptor from the remaining rule properties.
fn build_equal(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let value = bag.take("value").ok_or_else(|| CompileError::MalformedRule {
        reason: "equal rule requires a value to compare against".to_string(),
    })?;
    Ok(RuleDescriptor::Equal(EqualRule {
        common,
        value,
        strict: bag.take_flag("strict")?,
    }))
}

/// Builds a forbidden-field descriptor from the remaining rule properties.
fn build_forbidden(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Forbidden(ForbiddenRule {
        common: bag.take_common()?,
        remove: bag.take_flag("remove")?,
    }))
}

/// Builds a callable descriptor from the remaining rule properties.
fn build_function(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Function(FunctionRule {
        common: bag.take_common()?,
    }))
}

/// Builds a Luhn-checksum descriptor from the remaining rule properties.
fn build_luhn(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Luhn(LuhnRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
    }))
}

/// Builds a MAC address descriptor from the remaining rule properties.
fn build_mac(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Mac(MacRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
    }))
}

/// Builds an array descriptor, normalizing its item sub-rule.
fn build_array(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let items = match bag.take("items") {
        Some(rule) => Some(Box::new(normalize(&rule)?)),
        None => None,
    };
    let contains = match bag.take("contains") {
        Some(Value::Array(all)) => Some(ContainsRule::All(all)),
        Some(one) => Some(ContainsRule::One(one)),
        None => None,
    };
    Ok(RuleDescriptor::Array(ArrayRule {
        common,
        convert: bag.take_flag("convert")?,
        empty: bag.take_bool("empty")?,
        min: bag.take_usize("min")?,
        max: bag.take_usize("max")?,
        length: bag.take_usize("length")?,
        contains,
        unique: bag.take_flag("unique")?,
        one_of: bag.take_list("enum")?.unwrap_or_default(),
        items,
    }))
}

/// Builds an object descriptor, normalizing its property sub-rules.
fn build_object(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let strict = bag.take_strictness("strict")?;
    // `props` and `properties` are interchangeable spellings.
    let raw_props = bag.take("props").or_else(|| bag.take("properties"));
    let props = match raw_props {
        Some(Value::Object(map)) => {
            let mut props = BTreeMap::new();
            for (name, rule) in &map {
                props.insert(name.clone(), normalize(rule)?);
            }
            Some(props)
        }
        Some(other) => {
            return Err(CompileError::MalformedRule {
                reason: format!("object props must be an object, got {}", kind_of(&other)),
            });
        }
        None => None,
    };
    Ok(RuleDescriptor::Object(ObjectRule {
        common,
        strict,
        props,
        min_props: bag.take_usize("minProps")?,
        max_props: bag.take_usize("maxProps")?,
    }))
}

/// Builds a union descriptor, normalizing its branch sub-rules.
fn build_multi(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let rules = match bag.take("rules") {
        Some(Value::Array(branches)) => {
            let mut rules = Vec::with_capacity(branches.len());
            for branch in &branches {
                rules.push(normalize(branch)?);
            }
            rules
        }
        Some(other) => {
            return Err(CompileError::MalformedRule {
                reason: format!("multi rules must be an array, got {}", kind_of(&other)),
            });
        }
        None => Vec::new(),
    };
    Ok(RuleDescriptor::Multi(MultiRule {
        common,
        rules,
    }))
}

/// Builds a tuple descriptor, normalizing its slot sub-rules.
fn build_tuple(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let items = match bag.take("items") {
        Some(Value::Array(slots)) => {
            let mut items = Vec::with_capacity(slots.len());
            for slot in &slots {
                items.push(normalize(slot)?);
            }
            items
        }
        Some(other) => {
            return Err(CompileError::MalformedRule {
                reason: format!("tuple items must be an array, got {}", kind_of(&other)),
            });
        }
        None => Vec::new(),
    };
    Ok(RuleDescriptor::Tuple(TupleRule {
        common,
        items,
    }))
}

/// Builds a URL descriptor from the remaining rule properties.
fn build_url(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Url(UrlRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
        empty: bag.take_bool("empty")?,
    }))
}

/// Builds a UUID descriptor from the remaining rule properties.
fn build_uuid(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    Ok(RuleDescriptor::Uuid(UuidRule {
        common: bag.take_common()?,
        convert: bag.take_flag("convert")?,
        empty: bag.take_bool("empty")?,
    }))
}

/// Builds an external-identity descriptor from the remaining rule properties.
fn build_external_id(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let convert = match bag.take("convert") {
        None | Some(Value::Bool(false)) => IdConversion::None,
        Some(Value::Bool(true)) => IdConversion::Instance,
        Some(Value::String(form)) if form == "hexString" => IdConversion::StringForm,
        Some(other) => {
            return Err(CompileError::MalformedRule {
                reason: format!("objectID convert must be a boolean or 'hexString', got {other}"),
            });
        }
    };
    Ok(RuleDescriptor::ExternalId(ExternalIdRule {
        common,
        convert,
    }))
}

/// Builds a key/value map descriptor, normalizing its sub-rules.
fn build_record(bag: &mut FieldBag<'_>) -> Result<RuleDescriptor, CompileError> {
    let common = bag.take_common()?;
    let key = match bag.take("key") {
        Some(rule) => Some(Box::new(normalize(&rule)?)),
        None => None,
    };
    let value = match bag.take("value") {
        Some(rule) => Some(Box::new(normalize(&rule)?)),
        None => None,
    };
    Ok(RuleDescriptor::Record(RecordRule {
        common,
        key,
        value,
    }))
}

// ============================================================================
// SECTION: Field Bag
// ============================================================================

/// Tracks which rule properties a builder consumed so that leftovers can be
/// rejected as unknown modifiers.
struct FieldBag<'a> {
    remaining: BTreeMap<&'a str, &'a Value>,
}

impl<'a> FieldBag<'a> {
    /// Collects every non-type property for consumption tracking.
    fn new(map: &'a Map<String, Value>) -> Self {
        let mut remaining = BTreeMap::new();
        for (key, value) in map {
            if key != "type" {
                remaining.insert(key.as_str(), value);
            }
        }
        Self {
            remaining,
        }
    }

    /// Removes and returns a property, if present.
    fn take(&mut self, key: &str) -> Option<Value> {
        self.remaining.remove(key).cloned()
    }

    /// Removes a boolean property, defaulting to false when absent.
    fn take_flag(&mut self, key: &str) -> Result<bool, CompileError> {
        Ok(self.take_bool(key)?.unwrap_or(false))
    }

    /// Removes a boolean property, rejecting other kinds.
    fn take_bool(&mut self, key: &str) -> Result<Option<bool>, CompileError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(flag)),
            Some(other) => Err(CompileError::MalformedRule {
                reason: format!("modifier '{key}' must be a boolean, got {}", kind_of(&other)),
            }),
        }
    }

    /// Removes a non-negative integer property, rejecting other kinds.
    fn take_usize(&mut self, key: &str) -> Result<Option<usize>, CompileError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Number(number)) => {
                let raw = number.as_u64().ok_or_else(|| CompileError::MalformedRule {
                    reason: format!("modifier '{key}' must be a non-negative integer"),
                })?;
                let size = usize::try_from(raw).map_err(|_| CompileError::MalformedRule {
                    reason: format!("modifier '{key}' is out of range"),
                })?;
                Ok(Some(size))
            }
            Some(other) => Err(CompileError::MalformedRule {
                reason: format!("modifier '{key}' must be a number, got {}", kind_of(&other)),
            }),
        }
    }

    /// Removes a numeric property, rejecting other kinds.
    fn take_f64(&mut self, key: &str) -> Result<Option<f64>, CompileError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Number(number)) => {
                let raw = number.as_f64().ok_or_else(|| CompileError::MalformedRule {
                    reason: format!("modifier '{key}' is not representable as a number"),
                })?;
                Ok(Some(raw))
            }
            Some(other) => Err(CompileError::MalformedRule {
                reason: format!("modifier '{key}' must be a number, got {}", kind_of(&other)),
            }),
        }
    }

    /// Removes a string property, rejecting other kinds.
    fn take_string(&mut self, key: &str) -> Result<Option<String>, CompileError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(other) => Err(CompileError::MalformedRule {
                reason: format!("modifier '{key}' must be a string, got {}", kind_of(&other)),
            }),
        }
    }

    /// Removes a single-character property, rejecting other kinds.
    fn take_char(&mut self, key: &str) -> Result<Option<char>, CompileError> {
        match self.take_string(key)? {
            None => Ok(None),
            Some(text) => match text.chars().next() {
                Some(fill) => Ok(Some(fill)),
                None => Err(CompileError::MalformedRule {
                    reason: format!("modifier '{key}' must not be empty"),
                }),
            },
        }
    }

    /// Removes an array property, rejecting other kinds.
    fn take_list(&mut self, key: &str) -> Result<Option<Vec<Value>>, CompileError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Array(values)) => Ok(Some(values)),
            Some(other) => Err(CompileError::MalformedRule {
                reason: format!("modifier '{key}' must be an array, got {}", kind_of(&other)),
            }),
        }
    }

    /// Removes an array-of-strings property, rejecting other kinds.
    fn take_string_list(&mut self, key: &str) -> Result<Vec<String>, CompileError> {
        let Some(values) = self.take_list(key)? else {
            return Ok(Vec::new());
        };
        let mut texts = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::String(text) => texts.push(text),
                other => {
                    return Err(CompileError::MalformedRule {
                        reason: format!(
                            "modifier '{key}' entries must be strings, got {}",
                            kind_of(&other)
                        ),
                    });
                }
            }
        }
        Ok(texts)
    }

    /// Removes a strictness property (`true`, `false` or `"remove"`).
    fn take_strictness(&mut self, key: &str) -> Result<Option<Strictness>, CompileError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(true)) => Ok(Some(Strictness::Reject)),
            Some(Value::Bool(false)) => Ok(Some(Strictness::Passthrough)),
            Some(Value::String(mode)) if mode == "remove" => Ok(Some(Strictness::Strip)),
            Some(other) => Err(CompileError::MalformedRule {
                reason: format!("modifier '{key}' must be a boolean or 'remove', got {other}"),
            }),
        }
    }

    /// Removes the properties shared by every rule variant.
    fn take_common(&mut self) -> Result<Common, CompileError> {
        Ok(Common {
            optional: self.take_flag("optional")?,
            nullable: self.take_flag("nullable")?,
            default: self.take("default"),
            description: self.take_string("description")?,
        })
    }

    /// Rejects any properties no builder consumed.
    fn finish(self, type_tag: &str) -> Result<(), CompileError> {
        if self.remaining.is_empty() {
            return Ok(());
        }
        let unknown: Vec<&str> = self.remaining.keys().copied().collect();
        Err(CompileError::MalformedRule {
            reason: format!(
                "unknown modifier(s) for '{type_tag}' rule: {}",
                unknown.join(", ")
            ),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
