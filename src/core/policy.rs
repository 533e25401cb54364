//! Purpose: Caller-selected coercion policy.
//! Exports: `Policy`.
//! Role: Immutable four-flag configuration read by the coercion engine.
//! Invariants: Every flag defaults to enabled, individually and as a whole.
//! Invariants: Serialized option names are `parseBoolean`, `parseNull`, `parseNumber`, `parseUndefined`.
use serde::{Deserialize, Serialize};

/// Which string literals the engine may replace with native scalars.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Policy {
    /// `"true"` / `"false"` become booleans.
    pub parse_boolean: bool,
    /// `"null"` becomes the null marker.
    pub parse_null: bool,
    /// Whole-string numeric literals become numbers.
    pub parse_number: bool,
    /// `"undefined"` becomes the undefined marker.
    pub parse_undefined: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            parse_boolean: true,
            parse_null: true,
            parse_number: true,
            parse_undefined: true,
        }
    }
}

impl Policy {
    /// A policy with every rule disabled; coercion becomes the identity.
    pub fn none() -> Self {
        Self {
            parse_boolean: false,
            parse_null: false,
            parse_number: false,
            parse_undefined: false,
        }
    }

    pub fn with_boolean(mut self, enabled: bool) -> Self {
        self.parse_boolean = enabled;
        self
    }

    pub fn with_null(mut self, enabled: bool) -> Self {
        self.parse_null = enabled;
        self
    }

    pub fn with_number(mut self, enabled: bool) -> Self {
        self.parse_number = enabled;
        self
    }

    pub fn with_undefined(mut self, enabled: bool) -> Self {
        self.parse_undefined = enabled;
        self
    }
}
