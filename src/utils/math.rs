//! Mathematical utility functions for report values
//!
//! Durations are converted into report units with integer arithmetic so the
//! same input always produces the same decimal output, independent of
//! floating-point accumulation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How fractional report values are reduced to the configured number of decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Round to nearest, ties away from zero
    #[default]
    HalfUp,
    /// Drop the remainder
    Truncate,
}

impl FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "half_up" | "half-up" | "round" => Ok(RoundingPolicy::HalfUp),
            "truncate" | "trunc" | "floor" => Ok(RoundingPolicy::Truncate),
            other => Err(format!("unknown rounding policy: {}", other)),
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingPolicy::HalfUp => write!(f, "half_up"),
            RoundingPolicy::Truncate => write!(f, "truncate"),
        }
    }
}

/// Divide `numerator` by `denominator` and round to `decimals` places.
///
/// Both operands must be non-negative; a zero denominator yields 0.0.
///
/// # Examples
/// ```
/// use store_uptime::utils::math::{round_ratio, RoundingPolicy};
///
/// assert_eq!(round_ratio(5, 2, 0, RoundingPolicy::HalfUp), 3.0);
/// assert_eq!(round_ratio(5, 2, 0, RoundingPolicy::Truncate), 2.0);
/// assert_eq!(round_ratio(1, 3, 2, RoundingPolicy::HalfUp), 0.33);
/// assert_eq!(round_ratio(2, 3, 2, RoundingPolicy::HalfUp), 0.67);
/// assert_eq!(round_ratio(2, 3, 2, RoundingPolicy::Truncate), 0.66);
/// ```
pub fn round_ratio(numerator: i128, denominator: i128, decimals: u32, policy: RoundingPolicy) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let scale = 10i128.pow(decimals);
    let scaled = numerator * scale;
    let mut quotient = scaled / denominator;
    let remainder = scaled % denominator;
    if policy == RoundingPolicy::HalfUp && remainder * 2 >= denominator {
        quotient += 1;
    }
    quotient as f64 / scale as f64
}
