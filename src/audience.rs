//! Audience breakdown for a selection.
//!
//! Each audience group carries six weights. The selection's art and
//! commercial appeal (summed over its tags, floored at zero) is fed through
//! every group's weights and the results are normalized to percentages.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::edge::coerce_weight;
use crate::metadata::TagMetadataTable;

/// Groups shown first, in this order. Anything else follows by id.
pub const DISPLAY_ORDER: [&str; 6] = ["AF", "AM", "TF", "TM", "YF", "YM"];

/// Friendly label for a group id; unknown ids are returned unchanged.
pub fn group_label(id: &str) -> &str {
    match id {
        "AF" => "Adult Female",
        "AM" => "Adult Male",
        "TF" => "Teen Female",
        "TM" => "Teen Male",
        "YF" => "Young Female",
        "YM" => "Young Male",
        other => other,
    }
}

/// Weights of one audience group. Missing or unreadable fields are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AudienceWeights {
    pub base_weight: f64,
    pub art_weight: f64,
    pub commercial_weight: f64,
    pub base_default_audience: f64,
    pub art_default_audience: f64,
    pub com_default_audience: f64,
}

impl AudienceWeights {
    pub fn from_json(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let field = |name: &str| coerce_weight(obj.get(name));
        Some(Self {
            base_weight: field("baseWeight"),
            art_weight: field("artWeight"),
            commercial_weight: field("commercialWeight"),
            base_default_audience: field("baseDefaultAudience"),
            art_default_audience: field("artDefaultAudience"),
            com_default_audience: field("comDefaultAudience"),
        })
    }

    /// Unnormalized share for the given appeal, floored at zero.
    pub fn raw_share(&self, art: f64, commercial: f64) -> f64 {
        let raw = self.base_weight
            + self.art_weight * art
            + self.commercial_weight * commercial
            + self.base_default_audience
            + self.art_default_audience * art
            + self.com_default_audience * commercial;
        raw.max(0.0)
    }
}

/// Group id → weights, iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct AudienceGroups {
    groups: BTreeMap<String, AudienceWeights>,
}

/// One row of an audience distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudienceShare {
    pub group: String,
    pub percent: f64,
}

impl AudienceShare {
    pub fn label(&self) -> &str {
        group_label(&self.group)
    }
}

impl AudienceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the raw document. Non-object groups are skipped.
    pub fn from_json(raw: &Value) -> Self {
        let mut groups = Self::new();
        let Some(obj) = raw.as_object() else {
            if !raw.is_null() {
                tracing::warn!("audience document is not a JSON object; ignoring it");
            }
            return groups;
        };
        for (id, entry) in obj {
            match AudienceWeights::from_json(entry) {
                Some(weights) => groups.insert(id.clone(), weights),
                None => tracing::debug!(group = %id, "skipping non-object audience group"),
            }
        }
        groups
    }

    pub fn insert(&mut self, id: impl Into<String>, weights: AudienceWeights) {
        self.groups.insert(id.into(), weights);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Percent share per group, sorted by group id.
    ///
    /// Art and commercial values are summed over the distinct tags of the
    /// selection and floored at zero. When no group gets a positive share every
    /// group reads 0; with no groups the result is empty.
    pub fn distribution<S: AsRef<str>>(
        &self,
        selection: &[S],
        metadata: &TagMetadataTable,
    ) -> Vec<AudienceShare> {
        if self.groups.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let (mut art, mut commercial) = (0.0, 0.0);
        for tag in selection.iter().map(S::as_ref) {
            if seen.insert(tag) {
                let (a, c) = metadata.appeal(tag);
                art += a;
                commercial += c;
            }
        }
        let (art, commercial) = (f64::max(art, 0.0), f64::max(commercial, 0.0));

        let raws: Vec<(&String, f64)> = self
            .groups
            .iter()
            .map(|(id, w)| (id, w.raw_share(art, commercial)))
            .collect();
        let total: f64 = raws.iter().map(|(_, v)| v).sum();

        raws.into_iter()
            .map(|(id, raw)| AudienceShare {
                group: id.clone(),
                percent: if total > 0.0 { 100.0 * raw / total } else { 0.0 },
            })
            .collect()
    }
}

/// Reorder a distribution for display: [`DISPLAY_ORDER`] first, the rest after.
pub fn display_order(mut shares: Vec<AudienceShare>) -> Vec<AudienceShare> {
    shares.sort_by_key(|share| {
        DISPLAY_ORDER
            .iter()
            .position(|id| *id == share.group)
            .unwrap_or(DISPLAY_ORDER.len())
    });
    shares
}
