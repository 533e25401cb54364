//! Purpose: Decode a raw URL query string into a string-only value tree.
//! Exports: `decode`, `MAX_DEPTH`, `MAX_PAIRS`.
//! Role: Upstream collaborator of the coercion engine; never coerces anything itself.
//! Invariants: Output is always a `Value::Mapping`; every leaf is a `Value::String`.
//! Invariants: Repeated keys collect into a sequence in arrival order.
//! Invariants: Pairs whose shape conflicts with an earlier pair are dropped, not merged.
//! Invariants: At most `MAX_PAIRS` pairs are read, counting empty-key pairs.
//! Notes: Bracket handling covers `a[b][c]=v` nesting and `a[]=v` appends only.
use url::form_urlencoded;

use crate::core::value::{Mapping, Value};

/// Bracket groups honoured per key; deeper groups stay as one literal key.
pub const MAX_DEPTH: usize = 5;

/// Pairs decoded per query; later pairs are dropped.
pub const MAX_PAIRS: usize = 1000;

pub fn decode(raw: &str) -> Value {
    let mut root = Mapping::new();
    let mut pairs = form_urlencoded::parse(raw.as_bytes());
    for (key, value) in pairs.by_ref().take(MAX_PAIRS) {
        if key.is_empty() {
            continue;
        }
        let path = split_key(&key);
        if !insert_path(&mut root, &path, value.into_owned()) {
            tracing::debug!(key = %key, "dropped query pair with conflicting shape");
        }
    }
    let dropped = pairs.count();
    if dropped > 0 {
        tracing::debug!(dropped, limit = MAX_PAIRS, "dropped query pairs past the limit");
    }
    Value::Mapping(root)
}

fn split_key(key: &str) -> Vec<String> {
    let literal = || vec![key.to_string()];
    let open = match key.find('[') {
        Some(0) | None => return literal(),
        Some(open) => open,
    };

    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() && segments.len() <= MAX_DEPTH {
        if !rest.starts_with('[') {
            return literal();
        }
        let Some(close) = rest.find(']') else {
            return literal();
        };
        segments.push(rest[1..close].to_string());
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(rest.to_string());
    }
    segments
}

fn insert_path(map: &mut Mapping, path: &[String], leaf: String) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return false;
    };
    match rest {
        [] => push_leaf(map, head, leaf, false),
        [append] if append.is_empty() => push_leaf(map, head, leaf, true),
        _ => {
            if !map.contains_key(head) {
                map.insert(head.clone(), Value::Mapping(Mapping::new()));
            }
            match map.get_mut(head) {
                Some(Value::Mapping(child)) => insert_path(child, rest, leaf),
                _ => false,
            }
        }
    }
}

fn push_leaf(map: &mut Mapping, key: &str, leaf: String, as_sequence: bool) -> bool {
    if !map.contains_key(key) {
        let value = if as_sequence {
            Value::Sequence(vec![Value::String(leaf)])
        } else {
            Value::String(leaf)
        };
        map.insert(key, value);
        return true;
    }
    let Some(slot) = map.get_mut(key) else {
        return false;
    };
    match slot {
        Value::Sequence(items) => items.push(Value::String(leaf)),
        Value::String(previous) => {
            let previous = std::mem::take(previous);
            *slot = Value::Sequence(vec![Value::String(previous), Value::String(leaf)]);
        }
        _ => return false,
    }
    true
}
