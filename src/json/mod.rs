//! Purpose: JSON boundary for value trees.
//! Exports: `to_json`, `to_json_with`, `from_json`, `number_to_json`, `is_omitted_entry`, `UndefinedMode`, `parse`.
//! Role: Single seam where undefined markers, non-finite numbers, and opaque leaves meet JSON.
//! Invariants: Rendering undefined markers is always an explicit `UndefinedMode` choice.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

mod convert;
pub mod parse;

pub use convert::{
    UndefinedMode, from_json, is_omitted_entry, number_to_json, to_json, to_json_with,
};
