//! Configuration snapshot: every document of a data layout, loaded once.
//!
//! A [`ConfigSnapshot`] is immutable. Reloading builds a new one. For long
//! running callers, [`LiveSnapshot`] keeps the latest snapshot and rebuilds it
//! whenever a document's modification time or length changes, or a document
//! appears or disappears.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

use crate::audience::AudienceGroups;
use crate::category::CategoryResolver;
use crate::error::LoadResult;
use crate::genre::GenrePairMatrix;
use crate::index::CompatibilityIndex;
use crate::loader::{read_compatibility, read_document};
use crate::metadata::TagMetadataTable;
use crate::paths::DataLayout;
use crate::score::ScoreEngine;
use crate::variables::GameVariables;

/// How a missing or broken compatibility document is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Fail with a [`LoadError`](crate::error::LoadError).
    Strict,
    /// Log a warning and continue with an empty index.
    Lenient,
}

/// Modification time and length of one document; `None` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl DocumentStamp {
    pub fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Stamps of every document in a layout, in [`DataLayout::documents`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint([Option<DocumentStamp>; 5]);

impl Fingerprint {
    pub fn of(layout: &DataLayout) -> Self {
        Self(layout.documents().map(DocumentStamp::of))
    }
}

/// All loaded documents of one layout at one point in time.
#[derive(Debug)]
pub struct ConfigSnapshot {
    layout: DataLayout,
    mode: LoadMode,
    fingerprint: Fingerprint,
    metadata: Arc<TagMetadataTable>,
    index: CompatibilityIndex,
    genres: GenrePairMatrix,
    variables: GameVariables,
    audience: AudienceGroups,
}

impl ConfigSnapshot {
    /// Load every document. A missing or unparsable compatibility document fails.
    pub fn load(layout: &DataLayout) -> LoadResult<Self> {
        Self::load_with(layout, LoadMode::Strict)
    }

    /// Load every document, degrading a broken compatibility document to empty.
    pub fn load_lenient(layout: &DataLayout) -> Self {
        let fingerprint = Fingerprint::of(layout);
        let compatibility = read_document(&layout.compatibility);
        Self::assemble(layout, LoadMode::Lenient, fingerprint, compatibility)
    }

    pub fn load_with(layout: &DataLayout, mode: LoadMode) -> LoadResult<Self> {
        match mode {
            LoadMode::Strict => {
                let fingerprint = Fingerprint::of(layout);
                let compatibility = read_compatibility(&layout.compatibility)?;
                Ok(Self::assemble(layout, mode, fingerprint, compatibility))
            }
            LoadMode::Lenient => Ok(Self::load_lenient(layout)),
        }
    }

    /// `fingerprint` must be taken before any document is read, so a write
    /// racing the load leaves the snapshot stale.
    fn assemble(
        layout: &DataLayout,
        mode: LoadMode,
        fingerprint: Fingerprint,
        compatibility: Value,
    ) -> Self {
        let metadata = Arc::new(TagMetadataTable::from_json(&read_document(&layout.tag_data)));
        let index = CompatibilityIndex::build_with(
            &compatibility,
            CategoryResolver::layered(Arc::clone(&metadata)),
        );
        let genres = GenrePairMatrix::from_json(&read_document(&layout.genre_pairs));
        let variables = GameVariables::from_json(&read_document(&layout.game_variables));
        let audience = AudienceGroups::from_json(&read_document(&layout.audience_groups));

        tracing::info!(
            configs = %layout.configs_dir.display(),
            tags = index.tag_count(),
            edges = index.edge_count(),
            skipped = index.skipped_edges(),
            genre_pairs = genres.len(),
            metadata = metadata.len(),
            audience_groups = audience.len(),
            "loaded configuration snapshot"
        );

        Self {
            layout: layout.clone(),
            mode,
            fingerprint,
            metadata,
            index,
            genres,
            variables,
            audience,
        }
    }

    /// Load a fresh snapshot from the same layout, in the same mode.
    pub fn reload(&self) -> LoadResult<Self> {
        Self::load_with(&self.layout, self.mode)
    }

    /// Whether any document changed since this snapshot was loaded.
    pub fn is_stale(&self) -> bool {
        Fingerprint::of(&self.layout) != self.fingerprint
    }

    /// Score engine over this snapshot.
    pub fn engine(&self) -> ScoreEngine<'_> {
        ScoreEngine::new(&self.index, &self.genres, self.variables)
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn metadata(&self) -> &TagMetadataTable {
        &self.metadata
    }

    pub fn index(&self) -> &CompatibilityIndex {
        &self.index
    }

    pub fn genres(&self) -> &GenrePairMatrix {
        &self.genres
    }

    pub fn variables(&self) -> &GameVariables {
        &self.variables
    }

    pub fn audience(&self) -> &AudienceGroups {
        &self.audience
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            configs_dir: self.layout.configs_dir.display().to_string(),
            categories: self.index.categories().len(),
            tags: self.index.tag_count(),
            edges: self.index.edge_count(),
            skipped_edges: self.index.skipped_edges(),
            genre_pairs: self.genres.len(),
            metadata_entries: self.metadata.len(),
            audience_groups: self.audience.len(),
            variables: self.variables,
        }
    }
}

/// Summary counts of a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub configs_dir: String,
    pub categories: usize,
    pub tags: usize,
    pub edges: usize,
    pub skipped_edges: usize,
    pub genre_pairs: usize,
    pub metadata_entries: usize,
    pub audience_groups: usize,
    pub variables: GameVariables,
}

impl std::fmt::Display for SnapshotInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tagscope snapshot: {}", self.configs_dir)?;
        writeln!(f, "  categories:   {}", self.categories)?;
        writeln!(f, "  tags:         {}", self.tags)?;
        writeln!(f, "  edges:        {} ({} skipped)", self.edges, self.skipped_edges)?;
        writeln!(f, "  genre pairs:  {}", self.genre_pairs)?;
        writeln!(f, "  metadata:     {}", self.metadata_entries)?;
        writeln!(f, "  audiences:    {}", self.audience_groups)?;
        writeln!(
            f,
            "  scoring:      max {} / precision {} / range {}",
            self.variables.max_score, self.variables.score_precision, self.variables.score_range
        )?;
        Ok(())
    }
}

/// A snapshot that reloads itself when its documents change on disk.
#[derive(Debug)]
pub struct LiveSnapshot {
    current: Arc<ConfigSnapshot>,
}

impl LiveSnapshot {
    pub fn new(layout: &DataLayout, mode: LoadMode) -> LoadResult<Self> {
        Ok(Self {
            current: Arc::new(ConfigSnapshot::load_with(layout, mode)?),
        })
    }

    /// The latest snapshot, reloading first if any document changed.
    ///
    /// If the reload fails the previous snapshot is kept and the error returned.
    pub fn current(&mut self) -> LoadResult<Arc<ConfigSnapshot>> {
        if self.current.is_stale() {
            tracing::info!(
                configs = %self.current.layout().configs_dir.display(),
                "configuration changed on disk; reloading"
            );
            self.current = Arc::new(self.current.reload()?);
        }
        Ok(Arc::clone(&self.current))
    }

    /// The cached snapshot, without checking the disk.
    pub fn cached(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use tempfile::TempDir;

    fn layout_in(tmp: &TempDir) -> DataLayout {
        let layout = DataLayout::for_project(tmp.path());
        std::fs::create_dir_all(&layout.configs_dir).unwrap();
        layout
    }

    #[test]
    fn snapshot_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConfigSnapshot>();
    }

    #[test]
    fn strict_load_requires_compatibility() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        assert!(matches!(
            ConfigSnapshot::load(&layout),
            Err(LoadError::CompatibilityMissing { .. })
        ));
    }

    #[test]
    fn lenient_load_degrades_to_empty() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        let snapshot = ConfigSnapshot::load_lenient(&layout);
        assert!(snapshot.index().is_empty());
        assert!(snapshot.genres().is_empty());
        assert_eq!(*snapshot.variables(), GameVariables::default());
        assert!(snapshot.audience().is_empty());
    }

    #[test]
    fn secondary_documents_are_optional() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        std::fs::write(&layout.compatibility, r#"{"X": {"Y": 5}}"#).unwrap();
        std::fs::write(&layout.game_variables, "garbage").unwrap();

        let snapshot = ConfigSnapshot::load(&layout).unwrap();
        let info = snapshot.info();
        assert_eq!(info.tags, 1);
        assert_eq!(info.edges, 1);
        assert_eq!(info.genre_pairs, 0);
        assert!(info.to_string().contains("edges:        1 (0 skipped)"));
    }

    #[test]
    fn live_snapshot_reloads_on_change_only() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        std::fs::write(&layout.compatibility, r#"{"X": {"Y": 5}}"#).unwrap();

        let mut live = LiveSnapshot::new(&layout, LoadMode::Strict).unwrap();
        let first = live.current().unwrap();
        let again = live.current().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        // Length change is detected regardless of timestamp granularity.
        std::fs::write(&layout.compatibility, r#"{"X": {"Y": 5, "Z": 4}, "Z": {"Y": 1}}"#).unwrap();
        let reloaded = live.current().unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.index().edge_count(), 3);

        // A new secondary document also invalidates.
        std::fs::write(&layout.genre_pairs, r#"{"DRAMA": {"COMEDY": {"Item1": 1, "Item2": 3}}}"#)
            .unwrap();
        let with_genres = live.current().unwrap();
        assert_eq!(with_genres.genres().len(), 1);
    }

    #[test]
    fn edit_during_load_leaves_snapshot_stale() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        std::fs::write(&layout.compatibility, r#"{"X": {"Y": 5}}"#).unwrap();

        let fingerprint = Fingerprint::of(&layout);
        let compatibility = read_compatibility(&layout.compatibility).unwrap();
        std::fs::write(&layout.compatibility, r#"{"X": {"Y": 5, "Z": 4}}"#).unwrap();
        let snapshot =
            ConfigSnapshot::assemble(&layout, LoadMode::Strict, fingerprint, compatibility);

        assert_eq!(snapshot.index().edge_count(), 1);
        assert!(snapshot.is_stale());
        assert_eq!(snapshot.reload().unwrap().index().edge_count(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        std::fs::write(&layout.compatibility, r#"{"X": {"Y": 5}}"#).unwrap();

        let mut live = LiveSnapshot::new(&layout, LoadMode::Strict).unwrap();
        std::fs::remove_file(&layout.compatibility).unwrap();
        assert!(live.current().is_err());
        assert_eq!(live.cached().index().edge_count(), 1);
    }
}
