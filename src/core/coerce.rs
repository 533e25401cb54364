//! Purpose: The coercion engine: turn eligible string leaves into native scalars.
//! Exports: `coerce`, `coerce_str`, `MAX_NESTING`.
//! Role: Pure recursive walk over a value tree under a `Policy`.
//! Invariants: Output has the input's shape: same keys, same key order, same sequence lengths.
//! Invariants: The input tree is borrowed and never mutated; every container is rebuilt.
//! Invariants: String rules apply in fixed order: empty, null, undefined, boolean, number.
//! Invariants: A bare null at the top level is `InvalidInput`; nested nulls pass through.
//! Invariants: Containers nested deeper than `MAX_NESTING` are `InvalidInput`, never a stack overflow.
use crate::core::error::{Error, ErrorKind};
use crate::core::number::parse_numeric_literal;
use crate::core::policy::Policy;
use crate::core::value::{Mapping, Value};

/// Deepest container nesting `coerce` walks; matches serde_json's recursion limit.
pub const MAX_NESTING: usize = 128;

/// Coerces every string leaf of `value` under `policy`.
///
/// Non-string leaves are returned unchanged, so coercing an already-coerced
/// tree is a no-op.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidInput`] when `value` itself is [`Value::Null`],
/// or when containers nest deeper than [`MAX_NESTING`].
pub fn coerce(value: &Value, policy: &Policy) -> Result<Value, Error> {
    if value.is_null() {
        return Err(Error::new(ErrorKind::InvalidInput)
            .with_message("cannot coerce a bare null value")
            .with_hint("Pass the decoded query mapping, a sequence, or a string leaf."));
    }
    coerce_node(value, policy, 0)
}

fn coerce_node(value: &Value, policy: &Policy, depth: usize) -> Result<Value, Error> {
    match value {
        Value::String(text) => Ok(coerce_str(text, policy)),
        Value::Sequence(_) | Value::Mapping(_) if depth >= MAX_NESTING => {
            Err(Error::new(ErrorKind::InvalidInput)
                .with_message(format!("value nests deeper than {MAX_NESTING} levels"))
                .with_hint("Flatten the structure before coercing it."))
        }
        Value::Sequence(items) => items
            .iter()
            .map(|item| coerce_node(item, policy, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, item) in map.iter() {
                out.insert(key, coerce_node(item, policy, depth + 1)?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Number(_)
        | Value::Bool(_)
        | Value::Null
        | Value::Undefined
        | Value::Opaque(_) => Ok(value.clone()),
    }
}

/// Applies the string rules to a single leaf; first match wins.
pub fn coerce_str(text: &str, policy: &Policy) -> Value {
    if text.is_empty() {
        return Value::String(String::new());
    }
    if policy.parse_null && text == "null" {
        return Value::Null;
    }
    if policy.parse_undefined && text == "undefined" {
        return Value::Undefined;
    }
    if policy.parse_boolean {
        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    if policy.parse_number {
        if let Some(number) = parse_numeric_literal(text) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}
