//! Rich diagnostic error types for tagscope.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.
//!
//! Most data problems are *not* errors: missing secondary documents and malformed
//! individual values degrade to empty data. Only the primary compatibility
//! document is required, because an empty index would silently score every
//! selection as zero.

use miette::Diagnostic;
use thiserror::Error;

use crate::paths::PathError;

/// Top-level error type for tagscope.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum TagscopeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prefs(#[from] PrefsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("could not find the compatibility document at {path}")]
    #[diagnostic(
        code(tagscope::load::compatibility_missing),
        help(
            "The compatibility document seeds the whole index. \
             Point `--project-root` at the game directory that contains \
             `Data/Configs`, or set `project_root` / `documents.compatibility` \
             in the settings file."
        )
    )]
    CompatibilityMissing { path: String },

    #[error("failed to read the compatibility document at {path}")]
    #[diagnostic(
        code(tagscope::load::compatibility_io),
        help("Check the file permissions and that the path is a regular file.")
    )]
    CompatibilityIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse the compatibility document at {path}: {message}")]
    #[diagnostic(
        code(tagscope::load::compatibility_parse),
        help(
            "The document must be a JSON object of the form \
             {{\"TAG_A\": {{\"TAG_B\": 3.0}}}}. Scores may be numbers or numeric strings."
        )
    )]
    CompatibilityParse { path: String, message: String },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Preference errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PrefsError {
    #[error("failed to write preference file: {path}")]
    #[diagnostic(
        code(tagscope::prefs::write),
        help("Ensure the project directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize preferences: {message}")]
    #[diagnostic(code(tagscope::prefs::serialize))]
    Serialize { message: String },
}

pub type PrefsResult<T> = std::result::Result<T, PrefsError>;

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("failed to read settings file: {path}")]
    #[diagnostic(
        code(tagscope::settings::read),
        help("Ensure the settings file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {path}: {message}")]
    #[diagnostic(
        code(tagscope::settings::parse),
        help("Check the TOML syntax. Every key is optional; delete a key to use its default.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize settings for {path}: {message}")]
    #[diagnostic(code(tagscope::settings::serialize))]
    Serialize { path: String, message: String },

    #[error("failed to write settings file: {path}")]
    #[diagnostic(
        code(tagscope::settings::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Convenience result alias for top-level operations.
pub type TagscopeResult<T> = std::result::Result<T, TagscopeError>;
