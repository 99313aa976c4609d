//! Genre-pair matrix.
//!
//! The genre document stores two sub-scores per genre pair
//! (`{"DRAMA": {"COMEDY": {"Item1": 4.0, "Item2": 6.0}}}`); they are averaged
//! into a single value when loaded.

use std::collections::HashMap;

use serde_json::Value;

use crate::category::is_genre;
use crate::edge::{coerce_score, undirected};

/// Directed genre → genre → averaged score table.
#[derive(Debug, Clone, Default)]
pub struct GenrePairMatrix {
    pairs: HashMap<String, HashMap<String, f64>>,
}

impl GenrePairMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the raw document.
    ///
    /// An entry needs both `Item1` and `Item2` to be readable numbers; anything
    /// else skips that entry only.
    pub fn from_json(raw: &Value) -> Self {
        let mut matrix = Self::new();
        let Some(rows) = raw.as_object() else {
            tracing::warn!("genre pair document is not a JSON object; ignoring it");
            return matrix;
        };
        for (a, row) in rows {
            let Some(row) = row.as_object() else {
                tracing::debug!(genre = %a, "skipping non-object genre row");
                continue;
            };
            for (b, entry) in row {
                let item1 = entry.get("Item1").and_then(coerce_score);
                let item2 = entry.get("Item2").and_then(coerce_score);
                match (item1, item2) {
                    (Some(x), Some(y)) => matrix.insert(a, b, (x + y) / 2.0),
                    _ => tracing::debug!(from = %a, to = %b, "skipping incomplete genre pair"),
                }
            }
        }
        matrix
    }

    /// Insert an already-averaged value for `a -> b`.
    pub fn insert(&mut self, a: &str, b: &str, value: f64) {
        self.pairs
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), value);
    }

    fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.pairs.get(a)?.get(b).copied()
    }

    /// Undirected lookup, only when both keys are genre tags.
    pub fn score_between(&self, a: &str, b: &str) -> Option<f64> {
        if !(is_genre(a) && is_genre(b)) {
            return None;
        }
        undirected(a, b, |x, y| self.get(x, y))
    }

    /// Number of stored directed pairs.
    pub fn len(&self) -> usize {
        self.pairs.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
