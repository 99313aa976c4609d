//! Edge-level helpers shared by browsing and scoring.
//!
//! The raw documents store scores directionally (`a -> {b: score}`) with no
//! guarantee that `b -> a` exists as well. Every undirected read goes through
//! [`undirected`] so the index and the score engine cannot drift apart.

use serde_json::Value;

/// Look up `a -> b`, falling back to `b -> a`.
pub fn undirected<T>(a: &str, b: &str, mut lookup: impl FnMut(&str, &str) -> Option<T>) -> Option<T> {
    lookup(a, b).or_else(|| lookup(b, a))
}

/// Coerce a raw JSON score to a float.
///
/// Numbers are taken as-is; strings are trimmed and parsed (`"3.000"` → 3.0).
/// Anything else, and any non-finite result, yields `None`.
pub fn coerce_score(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Like [`coerce_score`], but missing and null values count as zero.
///
/// Used for optional per-tag and per-group weights, where absence means "no effect".
pub fn coerce_weight(raw: Option<&Value>) -> f64 {
    match raw {
        None | Some(Value::Null) => 0.0,
        Some(v) => coerce_score(v).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn undirected_prefers_forward_edge() {
        let lookup = |a: &str, b: &str| match (a, b) {
            ("X", "Y") => Some(1.0),
            ("Y", "X") => Some(2.0),
            _ => None,
        };
        assert_eq!(undirected("X", "Y", lookup), Some(1.0));
        assert_eq!(undirected("Y", "X", lookup), Some(2.0));
    }

    #[test]
    fn undirected_falls_back_to_reverse() {
        let lookup = |a: &str, b: &str| (a == "Y" && b == "X").then_some(3.0);
        assert_eq!(undirected("X", "Y", lookup), Some(3.0));
        assert_eq!(undirected("X", "Z", lookup), None);
    }

    #[test]
    fn coerce_numbers_and_numeric_strings() {
        assert_eq!(coerce_score(&json!(4)), Some(4.0));
        assert_eq!(coerce_score(&json!(2.5)), Some(2.5));
        assert_eq!(coerce_score(&json!("3.000")), Some(3.0));
        assert_eq!(coerce_score(&json!(" 1.5 ")), Some(1.5));
    }

    #[test]
    fn coerce_rejects_garbage() {
        assert_eq!(coerce_score(&json!("n/a")), None);
        assert_eq!(coerce_score(&json!("")), None);
        assert_eq!(coerce_score(&json!("NaN")), None);
        assert_eq!(coerce_score(&json!(null)), None);
        assert_eq!(coerce_score(&json!(true)), None);
        assert_eq!(coerce_score(&json!([1])), None);
    }

    #[test]
    fn weights_default_to_zero() {
        assert_eq!(coerce_weight(None), 0.0);
        assert_eq!(coerce_weight(Some(&json!(null))), 0.0);
        assert_eq!(coerce_weight(Some(&json!("oops"))), 0.0);
        assert_eq!(coerce_weight(Some(&json!("-2"))), -2.0);
    }
}
