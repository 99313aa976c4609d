//! Category-partitioned compatibility index.
//!
//! Uses `petgraph` for the edge structure and a category → tag bucket map for
//! browsing. Edges are filed under the *source* key's category: a tag's related
//! tags are always found through its own bucket.

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde_json::Value;

use crate::category::{Category, CategoryResolver};
use crate::edge::{coerce_score, undirected};

/// Tag compatibility graph with per-category buckets.
pub struct CompatibilityIndex {
    /// Directed graph: nodes are tag keys, edges carry the raw score.
    graph: DiGraph<String, f64>,
    /// Tag key → NodeIndex for O(1) node lookups.
    node_index: HashMap<String, NodeIndex>,
    /// Category → source tags filed under it.
    by_category: BTreeMap<Category, BTreeMap<String, NodeIndex>>,
    resolver: CategoryResolver,
    /// Edges dropped because their score could not be read.
    skipped_edges: usize,
}

impl CompatibilityIndex {
    /// Create an empty index that files tags with `resolver`.
    pub fn new(resolver: CategoryResolver) -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            by_category: BTreeMap::new(),
            resolver,
            skipped_edges: 0,
        }
    }

    /// Build from a raw `{a: {b: score}}` document, categorising by key prefix.
    pub fn build(raw: &Value) -> Self {
        Self::build_with(raw, CategoryResolver::prefix_only())
    }

    /// Build from a raw `{a: {b: score}}` document with a custom resolver.
    ///
    /// A score that cannot be read as a number drops only that edge; a row that
    /// is not an object drops only that row.
    pub fn build_with(raw: &Value, resolver: CategoryResolver) -> Self {
        let mut index = Self::new(resolver);
        let Some(rows) = raw.as_object() else {
            tracing::warn!("compatibility document is not a JSON object; index is empty");
            return index;
        };

        for (a, mapping) in rows {
            let Some(mapping) = mapping.as_object() else {
                tracing::debug!(tag = %a, "skipping non-object compatibility row");
                continue;
            };
            for (b, raw_score) in mapping {
                match coerce_score(raw_score) {
                    Some(score) => index.add_edge(a, b, score),
                    None => {
                        tracing::debug!(from = %a, to = %b, raw = %raw_score, "skipping unreadable score");
                        index.skipped_edges += 1;
                    }
                }
            }
        }

        tracing::debug!(
            tags = index.tag_count(),
            edges = index.edge_count(),
            skipped = index.skipped_edges,
            categories = index.by_category.len(),
            "built compatibility index"
        );
        index
    }

    /// Ensure a node exists for the given key, returning its NodeIndex.
    fn ensure_node(&mut self, key: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(key) {
            return *idx;
        }
        let idx = self.graph.add_node(key.to_string());
        self.node_index.insert(key.to_string(), idx);
        idx
    }

    /// Insert or replace the edge `a -> b`, filing `a` under its category.
    pub fn add_edge(&mut self, a: &str, b: &str, score: f64) {
        let a_idx = self.ensure_node(a);
        let b_idx = self.ensure_node(b);
        self.graph.update_edge(a_idx, b_idx, score);

        let category = self.resolver.resolve(a);
        self.by_category
            .entry(category)
            .or_default()
            .insert(a.to_string(), a_idx);
    }

    /// Every category with at least one source tag, in display order.
    pub fn categories(&self) -> Vec<&Category> {
        self.by_category.keys().collect()
    }

    /// Source tags filed under `category`, sorted. Empty for unknown categories.
    pub fn items(&self, category: &Category) -> Vec<&str> {
        self.by_category
            .get(category)
            .map(|bucket| bucket.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Outbound edges of `key`, found through `key`'s own category bucket.
    pub fn related(&self, key: &str) -> BTreeMap<String, f64> {
        let category = self.resolver.resolve(key);
        let Some(&idx) = self.by_category.get(&category).and_then(|b| b.get(key)) else {
            return BTreeMap::new();
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()].clone(), *e.weight()))
            .collect()
    }

    /// Tags with an edge pointing at `key`.
    pub fn incoming(&self, key: &str) -> BTreeMap<String, f64> {
        let Some(&idx) = self.node_index.get(key) else {
            return BTreeMap::new();
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (self.graph[e.source()].clone(), *e.weight()))
            .collect()
    }

    /// Directed edge score `a -> b`.
    pub fn edge(&self, a: &str, b: &str) -> Option<f64> {
        let a_idx = *self.node_index.get(a)?;
        let b_idx = *self.node_index.get(b)?;
        let e = self.graph.find_edge(a_idx, b_idx)?;
        self.graph.edge_weight(e).copied()
    }

    /// Undirected edge score: `a -> b`, else `b -> a`.
    pub fn score_between(&self, a: &str, b: &str) -> Option<f64> {
        undirected(a, b, |x, y| self.edge(x, y))
    }

    pub fn category_of(&self, key: &str) -> Category {
        self.resolver.resolve(key)
    }

    pub fn resolver(&self) -> &CategoryResolver {
        &self.resolver
    }

    /// All source tags grouped by category, in display order.
    pub fn tags_by_category(&self) -> Vec<(&Category, Vec<&str>)> {
        self.by_category
            .iter()
            .map(|(cat, bucket)| (cat, bucket.keys().map(String::as_str).collect()))
            .collect()
    }

    /// All source tags in display order.
    pub fn tags(&self) -> Vec<&str> {
        self.by_category
            .values()
            .flat_map(|bucket| bucket.keys().map(String::as_str))
            .collect()
    }

    /// Number of tags with outbound edges.
    pub fn tag_count(&self) -> usize {
        self.by_category.values().map(BTreeMap::len).sum()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}

impl Default for CompatibilityIndex {
    fn default() -> Self {
        Self::new(CategoryResolver::default())
    }
}

impl std::fmt::Debug for CompatibilityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatibilityIndex")
            .field("tags", &self.tag_count())
            .field("edges", &self.edge_count())
            .field("categories", &self.by_category.len())
            .field("skipped_edges", &self.skipped_edges)
            .finish()
    }
}
