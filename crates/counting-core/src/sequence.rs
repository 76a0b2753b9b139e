//! Sequence validation: does an evaluated number continue the count?

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Per-conversation count. Starts at 0; the next accepted number is `count + 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountState {
    pub count: u64,
}

/// Why a message produced no number at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    MalformedNumeral,
    UnsupportedExpression,
    NotANumber,
}

/// Result of feeding one message to the counter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The value was exactly the next integer; the count is now `count`.
    Advance { count: u64 },
    /// A valid number, but not the next one. The count is back to 0.
    Reset { expected: u64, got: f64 },
    /// Not a number at all. The state is untouched; the caller decides.
    Reject { reason: RejectReason },
}

impl CountState {
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    /// The number that would advance the count.
    pub fn expected(&self) -> u64 {
        self.count.saturating_add(1)
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Apply one evaluated value.
    ///
    /// Only a value with no fractional part that equals `count + 1` exactly
    /// advances; everything else resets to 0.
    pub fn observe(&mut self, value: f64) -> Outcome {
        let expected = self.expected();
        if as_exact_integer(value) == Some(expected) {
            self.count = expected;
            return Outcome::Advance { count: expected };
        }

        debug!(expected, got = value, "count broken");
        self.reset();
        Outcome::Reset {
            expected,
            got: value,
        }
    }
}

impl Outcome {
    /// One-line JSON, e.g. `{"outcome":"advance","count":3}`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `Some(n)` only for non-negative integral values `f64` holds exactly.
pub fn as_exact_integer(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_EXACT_INTEGER {
        return None;
    }
    Some(value as u64)
}
