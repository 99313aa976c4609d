//! Which tags are available: unlocked at game start, or unlocked by hand.
//!
//! A tag is a start unlock when its metadata condition carries a
//! `DATE:>=01-01-<year>` or `DATE:>=<year>` marker for the start year. Manual
//! unlocks are a sorted JSON array of tag keys kept beside the project.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{PrefsError, PrefsResult};
use crate::metadata::TagMetadataTable;

static RE_DATE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DATE:>=(?:01-01-)?(\d{4})").unwrap());

/// Whether `condition` carries a date marker for `start_year`.
pub fn is_start_condition(condition: &str, start_year: u16) -> bool {
    RE_DATE_MARKER
        .captures_iter(condition)
        .filter_map(|caps| caps[1].parse::<u16>().ok())
        .any(|year| year == start_year)
}

/// Tags whose condition marks them as available at game start.
pub fn start_unlocked(metadata: &TagMetadataTable, start_year: u16) -> BTreeSet<String> {
    metadata
        .iter()
        .filter(|(_, meta)| {
            meta.condition
                .as_deref()
                .is_some_and(|cond| is_start_condition(cond, start_year))
        })
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// The manual unlock preference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualUnlocks {
    path: PathBuf,
    tags: BTreeSet<String>,
}

impl ManualUnlocks {
    /// An empty set that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Read the preference file. Missing or malformed files read as empty.
    pub fn load(path: &Path) -> Self {
        let mut unlocks = Self::empty(path);
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return unlocks,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read manual unlocks");
                return unlocks;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => {
                unlocks.tags = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        other => {
                            tracing::debug!(item = %other, "skipping non-string manual unlock");
                            None
                        }
                    })
                    .collect();
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "manual unlocks are not a JSON array; ignoring them");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed manual unlocks; ignoring them");
            }
        }
        unlocks
    }

    /// Write the set as a sorted, pretty-printed JSON array.
    pub fn save(&self) -> PrefsResult<()> {
        let content = serde_json::to_string_pretty(&self.tags).map_err(|e| PrefsError::Serialize {
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|e| PrefsError::Write {
            path: self.path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), count = self.tags.len(), "saved manual unlocks");
        Ok(())
    }

    /// Returns `true` if the tag was not already unlocked.
    pub fn add(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Returns `true` if the tag was unlocked.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Start unlocks together with manual unlocks.
#[derive(Debug, Clone)]
pub struct Unlocks {
    start: BTreeSet<String>,
    manual: ManualUnlocks,
}

impl Unlocks {
    pub fn new(start: BTreeSet<String>, manual: ManualUnlocks) -> Self {
        Self { start, manual }
    }

    /// Derive start unlocks from `metadata` and read the manual file.
    pub fn load(metadata: &TagMetadataTable, start_year: u16, manual_path: &Path) -> Self {
        Self::new(
            start_unlocked(metadata, start_year),
            ManualUnlocks::load(manual_path),
        )
    }

    pub fn is_unlocked(&self, tag: &str) -> bool {
        self.start.contains(tag) || self.manual.contains(tag)
    }

    /// Union of start and manual unlocks, sorted.
    pub fn effective(&self) -> BTreeSet<&str> {
        self.start
            .iter()
            .map(String::as_str)
            .chain(self.manual.iter())
            .collect()
    }

    pub fn start(&self) -> &BTreeSet<String> {
        &self.start
    }

    pub fn manual(&self) -> &ManualUnlocks {
        &self.manual
    }

    pub fn manual_mut(&mut self) -> &mut ManualUnlocks {
        &mut self.manual
    }
}
