//! User settings: where the game data lives and what the documents are called.
//!
//! Settings are persisted as TOML in `$XDG_CONFIG_HOME/tagscope/config.toml`.
//! Every key is optional; an absent file means "all defaults".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult, TagscopeResult};
use crate::paths::{AppPaths, DataLayout};

/// Top-level settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Game project directory. `None` means the current working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Directory of the JSON documents, relative to the project root.
    #[serde(default = "default_configs_subdir")]
    pub configs_subdir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub documents: DocumentNames,
    #[serde(default)]
    pub unlocks: UnlockSettings,
}

/// File names of the configuration documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNames {
    #[serde(default = "default_tag_data")]
    pub tag_data: String,
    #[serde(default = "default_compatibility")]
    pub compatibility: String,
    #[serde(default = "default_genre_pairs")]
    pub genre_pairs: String,
    #[serde(default = "default_game_variables")]
    pub game_variables: String,
    #[serde(default = "default_audience_groups")]
    pub audience_groups: String,
}

/// Unlock rules and the manual unlock preference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSettings {
    /// Year whose `DATE:>=` condition marks a tag as available at game start.
    #[serde(default = "default_start_year")]
    pub start_year: u16,
    /// Preference file name, relative to the project root.
    #[serde(default = "default_manual_file")]
    pub manual_file: String,
}

fn default_configs_subdir() -> PathBuf {
    PathBuf::from("Data").join("Configs")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_tag_data() -> String {
    "TagData.json".into()
}
fn default_compatibility() -> String {
    "TagCompatibilityData.json".into()
}
fn default_genre_pairs() -> String {
    "GenreCompatibilityData.json".into()
}
fn default_game_variables() -> String {
    "GameVariables.json".into()
}
fn default_audience_groups() -> String {
    "AudienceGroups.json".into()
}
fn default_start_year() -> u16 {
    1929
}
fn default_manual_file() -> String {
    "ManualUnlocked.json".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_root: None,
            configs_subdir: default_configs_subdir(),
            log_level: default_log_level(),
            documents: DocumentNames::default(),
            unlocks: UnlockSettings::default(),
        }
    }
}

impl Default for DocumentNames {
    fn default() -> Self {
        Self {
            tag_data: default_tag_data(),
            compatibility: default_compatibility(),
            genre_pairs: default_genre_pairs(),
            game_variables: default_game_variables(),
            audience_groups: default_audience_groups(),
        }
    }
}

impl Default for UnlockSettings {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            manual_file: default_manual_file(),
        }
    }
}

impl Settings {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            let settings = Self::load(path)?;
            tracing::debug!(path = %path.display(), "loaded settings");
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    /// Locate and load the settings file.
    ///
    /// `explicit` wins; otherwise the XDG settings file is used. Returns the
    /// path alongside the settings so callers can write back to it.
    pub fn discover(explicit: Option<&Path>) -> TagscopeResult<(PathBuf, Self)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => AppPaths::resolve()?.settings_file(),
        };
        let settings = Self::load_or_default(&path)?;
        Ok((path, settings))
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| SettingsError::Serialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// The project root: explicit setting, else the current directory.
    pub fn project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve document paths against the configured project root.
    pub fn layout(&self) -> DataLayout {
        self.layout_for(&self.project_root())
    }

    /// Resolve document paths against an explicit project root.
    pub fn layout_for(&self, project_root: &Path) -> DataLayout {
        let configs_dir = project_root.join(&self.configs_subdir);
        DataLayout {
            tag_data: configs_dir.join(&self.documents.tag_data),
            compatibility: configs_dir.join(&self.documents.compatibility),
            genre_pairs: configs_dir.join(&self.documents.genre_pairs),
            game_variables: configs_dir.join(&self.documents.game_variables),
            audience_groups: configs_dir.join(&self.documents.audience_groups),
            manual_unlocks: project_root.join(&self.unlocks.manual_file),
            configs_dir,
        }
    }
}
