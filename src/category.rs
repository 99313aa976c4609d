//! Category resolution for flat tag keys.
//!
//! Raw tag identifiers are inconsistently structured: some encode their category
//! in a `PREFIX_` convention, some rely on the metadata side table, and genre
//! tags have neither. A [`CategoryResolver`] is an ordered chain of
//! [`ResolverTier`]s; the first tier that answers wins and [`Category::Unknown`]
//! is the exhaustive fallback, so resolution is pure and total.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

use crate::metadata::TagMetadataTable;

/// The closed set of genre tags. None of them carry a category prefix.
pub const GENRE_TAGS: [&str; 11] = [
    "DRAMA",
    "COMEDY",
    "ACTION",
    "ROMANCE",
    "DETECTIVE",
    "ADVENTURE",
    "THRILLER",
    "HISTORICAL",
    "HORROR",
    "SCIENCE_FICTION",
    "SLAPSTICK_COMEDY",
];

/// Whether `key` is one of the fixed genre tags.
pub fn is_genre(key: &str) -> bool {
    GENRE_TAGS.contains(&key)
}

/// Split a key on its first underscore.
pub fn split_prefix(key: &str) -> Option<(&str, &str)> {
    key.split_once('_')
}

/// Coarse grouping a tag is filed under.
///
/// Variant order is display order: the known categories first, then any other
/// label alphabetically, then `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Genre,
    Setting,
    Protagonist,
    Antagonist,
    SupportingCharacter,
    Theme,
    Events,
    Finale,
    /// A label that is none of the above (raw prefixes, custom `CategoryID`s).
    Other(String),
    Unknown,
}

impl Category {
    /// Map a label to a category. Known names map to their variant, `UNKNOWN`
    /// to [`Category::Unknown`], everything else to [`Category::Other`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "Genre" => Self::Genre,
            "Setting" => Self::Setting,
            "Protagonist" => Self::Protagonist,
            "Antagonist" => Self::Antagonist,
            "SupportingCharacter" => Self::SupportingCharacter,
            "Theme" => Self::Theme,
            "Events" => Self::Events,
            "Finale" => Self::Finale,
            "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map a numeric category code from tag metadata.
    ///
    /// Code 32 (events) is filed under `Theme` in the game data.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Setting),
            2 => Some(Self::Protagonist),
            4 => Some(Self::SupportingCharacter),
            8 => Some(Self::Antagonist),
            16 | 32 => Some(Self::Theme),
            _ => None,
        }
    }

    /// Map a key prefix through the synonym table.
    ///
    /// The prefix is NFKC-normalized, upper-cased and stripped of anything that
    /// is not alphanumeric, so `Supporting-Character` and `SUPPORTINGCHARACTER`
    /// resolve alike.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let normalized: String = prefix
            .nfkc()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_uppercase)
            .collect();
        match normalized.as_str() {
            "PROTAGONIST" => Some(Self::Protagonist),
            "ANTAGONIST" => Some(Self::Antagonist),
            "SUPPORTINGCHARACTER" => Some(Self::SupportingCharacter),
            "THEME" => Some(Self::Theme),
            "EVENTS" => Some(Self::Events),
            "FINALE" => Some(Self::Finale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Genre => "Genre",
            Self::Setting => "Setting",
            Self::Protagonist => "Protagonist",
            Self::Antagonist => "Antagonist",
            Self::SupportingCharacter => "SupportingCharacter",
            Self::Theme => "Theme",
            Self::Events => "Events",
            Self::Finale => "Finale",
            Self::Other(label) => label,
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One step of the resolution chain.
#[derive(Debug, Clone)]
pub enum ResolverTier {
    /// Keys in [`GENRE_TAGS`] are `Genre`.
    GenreAllowlist,
    /// `PREFIX_rest` where the prefix is in the synonym table.
    KnownPrefix,
    /// `PREFIX_rest` where the literal prefix *is* the category.
    RawPrefix,
    /// Metadata side table: `CategoryID`, else the numeric code.
    Metadata(Arc<TagMetadataTable>),
}

impl ResolverTier {
    pub fn name(&self) -> &'static str {
        match self {
            ResolverTier::GenreAllowlist => "genre allowlist",
            ResolverTier::KnownPrefix => "known prefix",
            ResolverTier::RawPrefix => "raw prefix",
            ResolverTier::Metadata(_) => "tag metadata",
        }
    }

    /// Answer for `key`, or `None` to defer to the next tier.
    pub fn resolve(&self, key: &str) -> Option<Category> {
        match self {
            ResolverTier::GenreAllowlist => is_genre(key).then_some(Category::Genre),
            ResolverTier::KnownPrefix => {
                split_prefix(key).and_then(|(prefix, _)| Category::from_prefix(prefix))
            }
            ResolverTier::RawPrefix => {
                split_prefix(key).map(|(prefix, _)| Category::from_label(prefix))
            }
            ResolverTier::Metadata(table) => {
                let meta = table.get(key)?;
                if let Some(label) = &meta.category_id {
                    return Some(Category::from_label(label));
                }
                meta.category_code.and_then(Category::from_code)
            }
        }
    }
}

/// Ordered chain of resolver tiers.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    tiers: Vec<ResolverTier>,
}

impl CategoryResolver {
    /// Build a resolver from explicit tiers.
    pub fn new(tiers: Vec<ResolverTier>) -> Self {
        Self { tiers }
    }

    /// Category is the literal prefix before the first underscore.
    pub fn prefix_only() -> Self {
        Self::new(vec![ResolverTier::RawPrefix])
    }

    /// Genre allowlist, then known prefixes, then tag metadata.
    pub fn layered(metadata: Arc<TagMetadataTable>) -> Self {
        Self::new(vec![
            ResolverTier::GenreAllowlist,
            ResolverTier::KnownPrefix,
            ResolverTier::Metadata(metadata),
        ])
    }

    /// Resolve a key. Never fails.
    pub fn resolve(&self, key: &str) -> Category {
        self.tiers
            .iter()
            .find_map(|tier| tier.resolve(key))
            .unwrap_or(Category::Unknown)
    }

    /// Resolve a key and report which tier answered (`None` for the fallback).
    pub fn resolve_traced(&self, key: &str) -> (Category, Option<&ResolverTier>) {
        self.tiers
            .iter()
            .find_map(|tier| tier.resolve(key).map(|cat| (cat, Some(tier))))
            .unwrap_or((Category::Unknown, None))
    }
}

impl Default for CategoryResolver {
    fn default() -> Self {
        Self::prefix_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TagMetadata;

    fn table() -> Arc<TagMetadataTable> {
        let mut t = TagMetadataTable::new();
        t.insert(
            "WILD_WEST",
            TagMetadata {
                category_code: Some(1),
                ..Default::default()
            },
        );
        t.insert(
            "BIG_HEIST",
            TagMetadata {
                category_id: Some("Events".into()),
                category_code: Some(16),
                ..Default::default()
            },
        );
        t.insert(
            "PROTAGONIST_SPY",
            TagMetadata {
                category_id: Some("Setting".into()),
                ..Default::default()
            },
        );
        t.insert(
            "DRAMA",
            TagMetadata {
                category_code: Some(2),
                ..Default::default()
            },
        );
        t.insert(
            "MYSTERY_BOX",
            TagMetadata {
                category_code: Some(64),
                ..Default::default()
            },
        );
        Arc::new(t)
    }

    #[test]
    fn genre_allowlist_wins() {
        let resolver = CategoryResolver::layered(table());
        assert_eq!(resolver.resolve("DRAMA"), Category::Genre);
        assert_eq!(resolver.resolve("SCIENCE_FICTION"), Category::Genre);
        assert_eq!(resolver.resolve("SLAPSTICK_COMEDY"), Category::Genre);
    }

    #[test]
    fn known_prefix_beats_metadata() {
        let resolver = CategoryResolver::layered(table());
        assert_eq!(resolver.resolve("PROTAGONIST_SPY"), Category::Protagonist);
        assert_eq!(resolver.resolve("FINALE_WEDDING"), Category::Finale);
        assert_eq!(
            resolver.resolve("SUPPORTINGCHARACTER_SIDEKICK"),
            Category::SupportingCharacter
        );
    }

    #[test]
    fn prefix_matching_is_normalized() {
        assert_eq!(Category::from_prefix("theme"), Some(Category::Theme));
        assert_eq!(
            Category::from_prefix("Supporting-Character"),
            Some(Category::SupportingCharacter)
        );
        assert_eq!(Category::from_prefix("ＥＶＥＮＴＳ"), Some(Category::Events));
        assert_eq!(Category::from_prefix("SETTING"), None);
    }

    #[test]
    fn metadata_label_beats_code() {
        let resolver = CategoryResolver::layered(table());
        assert_eq!(resolver.resolve("BIG_HEIST"), Category::Events);
        assert_eq!(resolver.resolve("WILD_WEST"), Category::Setting);
    }

    #[test]
    fn unmapped_code_and_missing_entry_are_unknown() {
        let resolver = CategoryResolver::layered(table());
        assert_eq!(resolver.resolve("MYSTERY_BOX"), Category::Unknown);
        assert_eq!(resolver.resolve("NOWHERE"), Category::Unknown);
        assert_eq!(resolver.resolve(""), Category::Unknown);
    }

    #[test]
    fn prefix_only_uses_literal_prefix() {
        let resolver = CategoryResolver::prefix_only();
        assert_eq!(resolver.resolve("A_X"), Category::Other("A".into()));
        assert_eq!(resolver.resolve("PROTAGONIST_COWBOY"), Category::Other("PROTAGONIST".into()));
        assert_eq!(resolver.resolve("Setting_TOWN"), Category::Setting);
        assert_eq!(resolver.resolve("DRAMA"), Category::Unknown);
    }

    #[test]
    fn traced_resolution_names_the_tier() {
        let resolver = CategoryResolver::layered(table());
        let (cat, tier) = resolver.resolve_traced("WILD_WEST");
        assert_eq!(cat, Category::Setting);
        assert_eq!(tier.map(ResolverTier::name), Some("tag metadata"));

        let (cat, tier) = resolver.resolve_traced("NOWHERE");
        assert_eq!(cat, Category::Unknown);
        assert!(tier.is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let resolver = CategoryResolver::layered(table());
        for key in ["DRAMA", "WILD_WEST", "THEME_LOVE", "??", "_", "A__B"] {
            assert_eq!(resolver.resolve(key), resolver.resolve(key));
        }
    }

    #[test]
    fn display_order() {
        let mut cats = vec![
            Category::Unknown,
            Category::Other("Zeta".into()),
            Category::Finale,
            Category::Other("Alpha".into()),
            Category::Genre,
            Category::Setting,
        ];
        cats.sort();
        let labels: Vec<&str> = cats.iter().map(Category::as_str).collect();
        assert_eq!(labels, ["Genre", "Setting", "Finale", "Alpha", "Zeta", "UNKNOWN"]);
    }
}
