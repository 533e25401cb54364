//! Purpose: Convert value trees to and from `serde_json::Value`.
//! Exports: `UndefinedMode`, `to_json`, `to_json_with`, `from_json`, `number_to_json`, `is_omitted_entry`.
//! Role: Output path for handlers and the CLI; input path for JSON-sourced trees.
//! Invariants: Sequence lengths survive conversion; only mapping entries may be omitted.
//! Invariants: Non-finite numbers render as JSON null; integral values render as integers.
use serde_json::{Map, Number, Value as Json};

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};

/// Largest integer magnitude an `f64` holds exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// How undefined markers are written out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UndefinedMode {
    /// Omitted from mappings; `null` inside sequences and at the top level.
    #[default]
    Stringify,
    /// Always `null`.
    Null,
    /// Any undefined marker is an `InvalidInput` error.
    Reject,
}

/// Renders `value` using [`UndefinedMode::Stringify`].
pub fn to_json(value: &Value) -> Json {
    render(value, UndefinedMode::Stringify).unwrap_or(Json::Null)
}

pub fn to_json_with(value: &Value, mode: UndefinedMode) -> Result<Json, Error> {
    render(value, mode)
}

fn render(value: &Value, mode: UndefinedMode) -> Result<Json, Error> {
    match value {
        Value::String(text) => Ok(Json::String(text.clone())),
        Value::Number(number) => Ok(number_to_json(*number)),
        Value::Bool(flag) => Ok(Json::Bool(*flag)),
        Value::Null | Value::Opaque(_) => Ok(Json::Null),
        Value::Undefined => match mode {
            UndefinedMode::Reject => Err(undefined_error()),
            UndefinedMode::Stringify | UndefinedMode::Null => Ok(Json::Null),
        },
        Value::Sequence(items) => items
            .iter()
            .map(|item| render(item, mode))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        Value::Mapping(map) => render_mapping(map, mode).map(Json::Object),
    }
}

fn render_mapping(map: &Mapping, mode: UndefinedMode) -> Result<Map<String, Json>, Error> {
    let mut out = Map::new();
    for (key, item) in map.iter() {
        if is_omitted_entry(item, mode) {
            continue;
        }
        out.insert(key.to_string(), render(item, mode)?);
    }
    Ok(out)
}

/// Whether a mapping entry holding `item` is dropped from rendered output.
pub fn is_omitted_entry(item: &Value, mode: UndefinedMode) -> bool {
    match item {
        Value::Opaque(_) => mode != UndefinedMode::Null,
        Value::Undefined => mode == UndefinedMode::Stringify,
        _ => false,
    }
}

fn undefined_error() -> Error {
    Error::new(ErrorKind::InvalidInput)
        .with_message("undefined marker cannot be rendered as JSON")
        .with_hint("Disable the undefined rule or choose the stringify/null undefined mode.")
}

pub fn number_to_json(number: f64) -> Json {
    if !number.is_finite() {
        return Json::Null;
    }
    if number.fract() == 0.0 && number.abs() <= MAX_EXACT_INTEGER {
        // `as` drops the sign of -0.0, matching how JSON writers print it.
        return Json::from(number as i64);
    }
    Number::from_f64(number).map_or(Json::Null, Json::Number)
}

pub fn from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(flag) => Value::Bool(flag),
        Json::Number(number) => number.as_f64().map_or(Value::Null, Value::Number),
        Json::String(text) => Value::String(text),
        Json::Array(items) => Value::Sequence(items.into_iter().map(from_json).collect()),
        Json::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, item)| (key, from_json(item)))
                .collect(),
        ),
    }
}
