// Core modules implementing the value tree, policy, and coercion engine.
pub mod coerce;
pub mod error;
pub mod number;
pub mod policy;
pub mod value;
