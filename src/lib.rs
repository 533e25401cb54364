//! Purpose: Library crate behind the `qcoerce` CLI and the axum query adapter.
//! Exports: `core` (value tree, policy, engine, errors), `json`, `query`, `middleware`.
//! Role: Coerce stringly-typed query values into native scalars under a caller policy.
//! Invariants: The engine is pure; I/O and logging live in `query`, `middleware`, and the binary.
//! Invariants: Root re-exports are the supported entry points for callers.
pub mod core;
pub mod json;
pub mod middleware;
pub mod query;

pub use crate::core::coerce::{coerce, coerce_str};
pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::policy::Policy;
pub use crate::core::value::{Mapping, Opaque, Value};
pub use crate::middleware::{CoercedQuery, with_query_coercion};
