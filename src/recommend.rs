//! "What if I add this tag?" sweeps over a candidate pool.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::score::ScoreEngine;

/// Fraction of the largest positive delta at which an improvement counts as strong.
pub const STRONG_FRACTION: f64 = 0.66;
/// Deltas at or above this (and not positive) are neutral; below, harmful.
pub const HARMFUL_BELOW: f64 = -0.9;

/// Score effect of adding one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateOutcome {
    pub tag: String,
    pub score: f64,
    pub delta: f64,
}

/// Result of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub current_score: f64,
    /// Candidate with the strictly highest score; first seen wins ties.
    pub best: Option<String>,
    /// Evaluated candidates in pool order.
    pub outcomes: Vec<CandidateOutcome>,
    /// Largest delta, never below 0.
    pub max_positive_delta: f64,
    /// Smallest delta, never above 0.
    pub min_negative_delta: f64,
}

impl Recommendation {
    pub fn scores(&self) -> BTreeMap<&str, f64> {
        self.outcomes.iter().map(|o| (o.tag.as_str(), o.score)).collect()
    }

    pub fn deltas(&self) -> BTreeMap<&str, f64> {
        self.outcomes.iter().map(|o| (o.tag.as_str(), o.delta)).collect()
    }

    pub fn outcome(&self, tag: &str) -> Option<&CandidateOutcome> {
        self.outcomes.iter().find(|o| o.tag == tag)
    }

    /// Band of `delta` relative to this sweep's largest improvement.
    pub fn band(&self, delta: f64) -> DeltaBand {
        DeltaBand::classify(delta, self.max_positive_delta)
    }

    pub fn is_best(&self, tag: &str) -> bool {
        self.best.as_deref() == Some(tag)
    }
}

/// Presentation band of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaBand {
    Strong,
    Improves,
    Neutral,
    Harmful,
}

impl DeltaBand {
    pub fn classify(delta: f64, max_positive_delta: f64) -> Self {
        if delta > 0.0 {
            if max_positive_delta > 0.0 && delta >= STRONG_FRACTION * max_positive_delta {
                Self::Strong
            } else {
                Self::Improves
            }
        } else if delta >= HARMFUL_BELOW {
            Self::Neutral
        } else {
            Self::Harmful
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Improves => "improves",
            Self::Neutral => "neutral",
            Self::Harmful => "harmful",
        }
    }
}

impl std::fmt::Display for DeltaBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Score `selection + [candidate]` for every pool candidate not yet selected.
///
/// Candidates repeated in the pool are evaluated once, at their first position.
pub fn recommend<S, P>(engine: &ScoreEngine<'_>, selection: &[S], pool: &[P]) -> Recommendation
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let mut trial: Vec<&str> = selection.iter().map(S::as_ref).collect();
    let current_score = engine.score(&trial);

    let mut skip: HashSet<&str> = trial.iter().copied().collect();
    let mut outcomes = Vec::new();
    let mut best: Option<(usize, f64)> = None;
    let (mut max_positive_delta, mut min_negative_delta) = (0.0_f64, 0.0_f64);

    for candidate in pool.iter().map(P::as_ref) {
        if !skip.insert(candidate) {
            continue;
        }
        trial.push(candidate);
        let score = engine.score(&trial);
        trial.pop();

        let delta = score - current_score;
        max_positive_delta = max_positive_delta.max(delta);
        min_negative_delta = min_negative_delta.min(delta);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((outcomes.len(), score));
        }
        outcomes.push(CandidateOutcome {
            tag: candidate.to_string(),
            score,
            delta,
        });
    }

    let best = best.map(|(i, _)| outcomes[i].tag.clone());
    tracing::debug!(
        candidates = outcomes.len(),
        current = current_score,
        best = best.as_deref().unwrap_or("-"),
        "recommendation sweep"
    );

    Recommendation {
        current_score,
        best,
        outcomes,
        max_positive_delta,
        min_negative_delta,
    }
}
