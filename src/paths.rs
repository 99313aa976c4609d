//! XDG-compliant path resolution for tagscope.
//!
//! Provides `AppPaths` (global directories) and `DataLayout` (the per-project
//! configuration documents and preference file).

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(tagscope::paths::no_home),
        help("Set the HOME environment variable or pass `--config` explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(tagscope::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for tagscope.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// `$XDG_CONFIG_HOME/tagscope/`
    pub config_dir: PathBuf,
}

impl AppPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("tagscope");

        Ok(Self { config_dir })
    }

    /// Create the config directory. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        std::fs::create_dir_all(&self.config_dir).map_err(|e| PathError::CreateDir {
            path: self.config_dir.display().to_string(),
            source: e,
        })
    }

    /// Path to the global settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

/// Resolved locations of every document a snapshot reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    /// Directory holding the JSON documents (`<root>/Data/Configs` by default).
    pub configs_dir: PathBuf,
    pub tag_data: PathBuf,
    pub compatibility: PathBuf,
    pub genre_pairs: PathBuf,
    pub game_variables: PathBuf,
    pub audience_groups: PathBuf,
    /// Manual unlock preference file, kept beside the project, not inside game data.
    pub manual_unlocks: PathBuf,
}

impl DataLayout {
    /// Layout with the stock file names under `<project_root>/Data/Configs`.
    pub fn for_project(project_root: &Path) -> Self {
        crate::settings::Settings::default().layout_for(project_root)
    }

    /// All JSON documents, in load order. The preference file is not included.
    pub fn documents(&self) -> [&Path; 5] {
        [
            self.tag_data.as_path(),
            self.compatibility.as_path(),
            self.genre_pairs.as_path(),
            self.game_variables.as_path(),
            self.audience_groups.as_path(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_paths_use_xdg_layout() {
        let paths = AppPaths::resolve().unwrap();
        assert!(
            paths.config_dir.to_string_lossy().contains("tagscope"),
            "config_dir should contain 'tagscope': {}",
            paths.config_dir.display()
        );
        assert!(paths.settings_file().starts_with(&paths.config_dir));
    }

    #[test]
    fn project_layout_uses_stock_names() {
        let layout = DataLayout::for_project(Path::new("/games/studio"));
        assert_eq!(layout.configs_dir, PathBuf::from("/games/studio/Data/Configs"));
        assert_eq!(
            layout.compatibility,
            PathBuf::from("/games/studio/Data/Configs/TagCompatibilityData.json")
        );
        assert_eq!(
            layout.manual_unlocks,
            PathBuf::from("/games/studio/ManualUnlocked.json")
        );
        assert_eq!(layout.documents().len(), 5);
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = AppPaths {
            config_dir: tmp.path().join("config"),
        };
        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();
        assert!(paths.config_dir.is_dir());
    }
}
