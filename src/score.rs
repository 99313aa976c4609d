//! Agnostic score of a tag selection.
//!
//! Every unordered pair of distinct tags contributes the mean of whatever
//! values are available for it: the undirected compatibility edge and, when
//! both tags are genres, the undirected genre-pair value. Pairs with neither
//! value are left out. The mean contribution is rescaled from the configured
//! raw range to `[0, max_score]` and rounded half to even.

use std::collections::HashSet;

use serde::Serialize;

use crate::genre::GenrePairMatrix;
use crate::index::CompatibilityIndex;
use crate::paths::DataLayout;
use crate::snapshot::ConfigSnapshot;
use crate::variables::GameVariables;

/// Values found for one pair of tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairContribution {
    pub a: String,
    pub b: String,
    pub compatibility: Option<f64>,
    pub genre: Option<f64>,
    /// Mean of the available values; `None` excludes the pair.
    pub contribution: Option<f64>,
}

/// Every intermediate of a score computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub pairs: Vec<PairContribution>,
    /// Mean of the contributing pairs.
    pub mean: Option<f64>,
    /// `mean` rescaled into `[0, 1]`.
    pub normalized: Option<f64>,
    pub score: f64,
}

impl ScoreBreakdown {
    pub fn contributing(&self) -> usize {
        self.pairs.iter().filter(|p| p.contribution.is_some()).count()
    }
}

/// Scores selections against one index, genre matrix and set of variables.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine<'a> {
    index: &'a CompatibilityIndex,
    genres: &'a GenrePairMatrix,
    variables: GameVariables,
}

impl<'a> ScoreEngine<'a> {
    pub fn new(
        index: &'a CompatibilityIndex,
        genres: &'a GenrePairMatrix,
        variables: GameVariables,
    ) -> Self {
        Self {
            index,
            genres,
            variables,
        }
    }

    pub fn variables(&self) -> &GameVariables {
        &self.variables
    }

    /// `(compatibility, genre, contribution)` for one pair.
    fn pair_values(&self, a: &str, b: &str) -> (Option<f64>, Option<f64>, Option<f64>) {
        let compatibility = self.index.score_between(a, b);
        let genre = self.genres.score_between(a, b);
        let contribution = match (compatibility, genre) {
            (Some(c), Some(g)) => Some((c + g) / 2.0),
            (one, other) => one.or(other),
        };
        (compatibility, genre, contribution)
    }

    /// Rescale, clamp, stretch to `max_score` and round a mean contribution.
    fn finish(&self, mean: Option<f64>) -> (Option<f64>, f64) {
        match mean {
            None => (None, self.variables.round(0.0)),
            Some(mean) => {
                let normalized = self.variables.score_range.normalize(mean);
                (
                    Some(normalized),
                    self.variables.round(normalized * self.variables.max_score),
                )
            }
        }
    }

    /// The agnostic score of `selection`.
    ///
    /// Order and repeated tags do not matter. Fewer than two distinct tags, or
    /// no pair with a known value, score `0.0`.
    pub fn score<S: AsRef<str>>(&self, selection: &[S]) -> f64 {
        let keys = distinct(selection);
        let (mut sum, mut count) = (0.0, 0usize);
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                if let (_, _, Some(value)) = self.pair_values(a, b) {
                    sum += value;
                    count += 1;
                }
            }
        }
        let mean = (count > 0).then(|| sum / count as f64);
        self.finish(mean).1
    }

    /// Like [`score`](Self::score), keeping every pair and intermediate value.
    pub fn breakdown<S: AsRef<str>>(&self, selection: &[S]) -> ScoreBreakdown {
        let keys = distinct(selection);
        let mut pairs = Vec::new();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                let (compatibility, genre, contribution) = self.pair_values(a, b);
                pairs.push(PairContribution {
                    a: a.to_string(),
                    b: b.to_string(),
                    compatibility,
                    genre,
                    contribution,
                });
            }
        }

        let values: Vec<f64> = pairs.iter().filter_map(|p| p.contribution).collect();
        let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
        let (normalized, score) = self.finish(mean);

        ScoreBreakdown {
            pairs,
            mean,
            normalized,
            score,
        }
    }
}

/// Distinct keys in first-seen order.
fn distinct<S: AsRef<str>>(selection: &[S]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(selection.len());
    selection
        .iter()
        .map(S::as_ref)
        .filter(|key| seen.insert(*key))
        .collect()
}

/// Load the layout's documents and score `selection` once.
///
/// Reads everything from disk on every call and never fails: a missing
/// compatibility document scores as an empty index.
pub fn compute_agnostic_score<S: AsRef<str>>(selection: &[S], layout: &DataLayout) -> f64 {
    ConfigSnapshot::load_lenient(layout).engine().score(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine_parts(compat: serde_json::Value) -> (CompatibilityIndex, GenrePairMatrix) {
        (CompatibilityIndex::build(&compat), GenrePairMatrix::new())
    }

    #[test]
    fn fewer_than_two_tags_is_zero() {
        let (index, genres) = engine_parts(json!({"X": {"Y": 5.0}}));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        let empty: [&str; 0] = [];
        assert_eq!(engine.score(&empty), 0.0);
        assert_eq!(engine.score(&["ONLY_ONE"]), 0.0);
        assert_eq!(engine.score(&["X", "X"]), 0.0);
    }

    #[test]
    fn max_edge_reaches_max_score() {
        let (index, genres) = engine_parts(json!({"X": {"Y": 5.0}}));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        assert_eq!(engine.score(&["X", "Y"]), 9.9);
    }

    #[test]
    fn reverse_edge_scores_the_same() {
        let (forward, genres) = engine_parts(json!({"X": {"Y": 3.0}}));
        let (reverse, _) = engine_parts(json!({"Y": {"X": 3.0}}));
        let vars = GameVariables::default();
        let a = ScoreEngine::new(&forward, &genres, vars).score(&["X", "Y"]);
        let b = ScoreEngine::new(&reverse, &genres, vars).score(&["X", "Y"]);
        assert_eq!(a, b);
        // 0.5 * 9.9 = 4.95, a tie at one digit that rounds to even.
        assert_eq!(a, 5.0);
    }

    #[test]
    fn genre_pairs_blend_with_compatibility() {
        let index = CompatibilityIndex::build(&json!({"DRAMA": {"COMEDY": 2.0}}));
        let genres = GenrePairMatrix::from_json(&json!({
            "DRAMA": {"COMEDY": {"Item1": 4.0, "Item2": 6.0}}
        }));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        let breakdown = engine.breakdown(&["DRAMA", "COMEDY"]);
        assert_eq!(breakdown.pairs.len(), 1);
        assert_eq!(breakdown.pairs[0].compatibility, Some(2.0));
        assert_eq!(breakdown.pairs[0].genre, Some(5.0));
        assert_eq!(breakdown.pairs[0].contribution, Some(3.5));
        assert_eq!(breakdown.mean, Some(3.5));
    }

    #[test]
    fn genre_value_alone_is_used() {
        let index = CompatibilityIndex::default();
        let genres = GenrePairMatrix::from_json(&json!({
            "DRAMA": {"COMEDY": {"Item1": 5.0, "Item2": 5.0}}
        }));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        assert_eq!(engine.score(&["COMEDY", "DRAMA"]), 9.9);
    }

    #[test]
    fn pairs_without_values_are_excluded_not_zero() {
        let (index, genres) = engine_parts(json!({"X": {"Y": 5.0}}));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        // Pairs (X,Z) and (Y,Z) have no value; only (X,Y) counts.
        assert_eq!(engine.score(&["X", "Y", "Z"]), 9.9);
        let breakdown = engine.breakdown(&["X", "Y", "Z"]);
        assert_eq!(breakdown.pairs.len(), 3);
        assert_eq!(breakdown.contributing(), 1);

        assert_eq!(engine.score(&["Z", "W"]), 0.0);
        assert_eq!(engine.breakdown(&["Z", "W"]).mean, None);
    }

    #[test]
    fn score_is_order_independent_and_idempotent() {
        let (index, genres) = engine_parts(json!({
            "A": {"B": 2.0, "C": 4.5},
            "C": {"B": 1.5}
        }));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        let first = engine.score(&["A", "B", "C"]);
        assert_eq!(first, engine.score(&["C", "A", "B", "A"]));
        assert_eq!(first, engine.score(&["A", "B", "C"]));
        // mean (2 + 4.5 + 1.5) / 3 = 2.666.., normalized 0.41666.., * 9.9 = 4.125
        assert_eq!(first, 4.1);
    }

    #[test]
    fn out_of_range_means_are_clamped() {
        let (index, genres) = engine_parts(json!({"X": {"Y": 12.0}, "P": {"Q": -4.0}}));
        let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
        assert_eq!(engine.score(&["X", "Y"]), 9.9);
        assert_eq!(engine.score(&["P", "Q"]), 0.0);
    }

    #[test]
    fn variables_shape_the_result() {
        let (index, genres) = engine_parts(json!({"X": {"Y": 3.0}}));
        let vars = GameVariables::from_json(&json!({
            "max_score": {"Value": "10"},
            "score_precision": {"Value": "2"},
            "tag_compatibility_score_range": {"Value": "0_4"}
        }));
        let engine = ScoreEngine::new(&index, &genres, vars);
        assert_eq!(engine.score(&["X", "Y"]), 7.5);

        let degenerate = GameVariables::from_json(&json!({
            "tag_compatibility_score_range": {"Value": "5_5"}
        }));
        let engine = ScoreEngine::new(&index, &genres, degenerate);
        assert_eq!(engine.score(&["X", "Y"]), 5.0);
    }

    #[test]
    fn extreme_negative_precision_scores_zero() {
        let (index, genres) = engine_parts(json!({"X": {"Y": 3.0}}));
        let vars = GameVariables::from_json(&json!({
            "score_precision": {"Value": "-400"}
        }));
        assert_eq!(vars.score_precision, -400);
        let engine = ScoreEngine::new(&index, &genres, vars);
        assert_eq!(engine.score(&["X", "Y"]), 0.0);
        assert_eq!(engine.breakdown(&["X", "Y"]).score, 0.0);
    }
}
