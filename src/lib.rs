// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # tagscope
//!
//! A browser and "film builder" calculator for a game's tag-compatibility data.
//!
//! ## Architecture
//!
//! - **Config loading** (`loader`, `metadata`, `genre`, `variables`, `audience`):
//!   lenient JSON readers; only the compatibility document is required
//! - **Category resolution** (`category`): genre allowlist → known prefix →
//!   tag metadata → `UNKNOWN`
//! - **Compatibility index** (`index`): category-bucketed petgraph of tag → tag scores
//! - **Scoring** (`score`, `recommend`): agnostic score of a selection and
//!   "what if I add this tag" sweeps
//! - **Snapshots** (`snapshot`): every document loaded once, reloaded explicitly
//!   or when the files change
//!
//! ## Library usage
//!
//! ```no_run
//! use tagscope::paths::DataLayout;
//! use tagscope::recommend::recommend;
//! use tagscope::snapshot::ConfigSnapshot;
//!
//! let layout = DataLayout::for_project(std::path::Path::new("/games/film-studio"));
//! let snapshot = ConfigSnapshot::load(&layout).unwrap();
//! let engine = snapshot.engine();
//!
//! let selection = ["DRAMA", "PROTAGONIST_DETECTIVE"];
//! println!("score: {}", engine.score(&selection));
//!
//! let pool = snapshot.index().tags();
//! let rec = recommend(&engine, &selection, &pool);
//! println!("best addition: {:?}", rec.best);
//! ```

pub mod audience;
pub mod category;
pub mod display;
pub mod edge;
pub mod error;
pub mod genre;
pub mod index;
pub mod loader;
pub mod metadata;
pub mod paths;
pub mod recommend;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod unlock;
pub mod variables;
