//! Shared helpers: timestamp parsing, local-time conversion and exact rounding.

pub mod math;
pub mod time;
