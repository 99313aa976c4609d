//! Game-wide tunables read from the game variables document.
//!
//! Each entry looks like `{"max_score": {"Value": "9.9"}}`. A missing, empty,
//! non-string or unparsable `Value` falls back to that variable's default
//! independently of the others.

use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MAX_SCORE: f64 = 9.9;
pub const DEFAULT_SCORE_PRECISION: i32 = 1;
pub const DEFAULT_SCORE_RANGE: ScoreRange = ScoreRange { lo: 1.0, hi: 5.0 };

/// Raw compatibility score domain, `"lo_hi"` in the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreRange {
    pub lo: f64,
    pub hi: f64,
}

impl ScoreRange {
    /// Parse `"<lo>_<hi>"`, splitting on the first underscore.
    pub fn parse(raw: &str) -> Option<Self> {
        let (lo, hi) = raw.split_once('_')?;
        Some(Self {
            lo: lo.trim().parse().ok()?,
            hi: hi.trim().parse().ok()?,
        })
    }

    /// `hi > lo`.
    pub fn is_valid(&self) -> bool {
        self.hi > self.lo
    }

    /// Linearly map `value` from `[lo, hi]` to `[0, 1]`, clamped.
    ///
    /// A degenerate range (`hi <= lo`) rescales with the default `[1, 5]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = if self.is_valid() { *self } else { DEFAULT_SCORE_RANGE };
        ((value - range.lo) / (range.hi - range.lo)).clamp(0.0, 1.0)
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        DEFAULT_SCORE_RANGE
    }
}

impl std::fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.lo, self.hi)
    }
}

/// Score tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameVariables {
    /// Upper bound of the agnostic score.
    pub max_score: f64,
    /// Decimal digits the score is rounded to.
    pub score_precision: i32,
    /// Raw score domain normalized from.
    pub score_range: ScoreRange,
}

impl Default for GameVariables {
    fn default() -> Self {
        Self {
            max_score: DEFAULT_MAX_SCORE,
            score_precision: DEFAULT_SCORE_PRECISION,
            score_range: DEFAULT_SCORE_RANGE,
        }
    }
}

impl GameVariables {
    /// Read the recognized variables from the raw document.
    pub fn from_json(raw: &Value) -> Self {
        let max_score = value_of(raw, "max_score")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_MAX_SCORE);

        let score_precision = value_of(raw, "score_precision")
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(DEFAULT_SCORE_PRECISION);

        let score_range = value_of(raw, "tag_compatibility_score_range")
            .and_then(ScoreRange::parse)
            .unwrap_or(DEFAULT_SCORE_RANGE);

        if !score_range.is_valid() {
            tracing::warn!(range = %score_range, "degenerate score range; rescaling with the default");
        }

        Self {
            max_score,
            score_precision,
            score_range,
        }
    }

    /// Round to `score_precision` digits, half to even.
    pub fn round(&self, value: f64) -> f64 {
        round_half_even(value, self.score_precision)
    }
}

/// Trimmed, non-empty string `Value` of a variable entry.
fn value_of<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)?
        .get("Value")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Round `value` to `digits` decimal digits, ties to even.
///
/// Negative `digits` round to tens, hundreds, and so on. Precision beyond what
/// an `f64` can represent returns the value unchanged; a magnitude so coarse
/// that the scale factor underflows rounds to `0.0`.
pub fn round_half_even(value: f64, digits: i32) -> f64 {
    if !value.is_finite() || digits > 15 {
        return value;
    }
    let factor = 10f64.powi(digits);
    if factor == 0.0 {
        // Coarser than any finite f64: everything rounds to zero.
        return 0.0;
    }
    let rounded = (value * factor).round_ties_even() / factor;
    // Normalize -0.0 so "0.0" prints as such.
    if rounded == 0.0 { 0.0 } else { rounded }
}
