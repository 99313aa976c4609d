//! Presentation helpers shared by the command-line front end.

use crate::category::Category;
use crate::unlock::Unlocks;

const STRIPPED_PREFIXES: [&str; 6] = [
    "PROTAGONIST_",
    "ANTAGONIST_",
    "SUPPORTINGCHARACTER_",
    "THEME_",
    "EVENTS_",
    "FINALE_",
];

/// Display name of a tag: known category prefix removed, underscores as spaces.
///
/// `THEME_LOST_LOVE` reads `LOST LOVE`; `SCIENCE_FICTION` reads `SCIENCE FICTION`.
pub fn pretty_tag_name(tag: &str) -> String {
    let rest = STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| tag.strip_prefix(*prefix))
        .unwrap_or(tag);
    rest.replace('_', " ")
}

/// Display name of a category.
pub fn pretty_category(category: &Category) -> String {
    match category {
        Category::SupportingCharacter => "Supporting Character".to_string(),
        other => other.to_string(),
    }
}

/// Candidate filter: case-insensitive substring on the tag key, optionally
/// restricted to unlocked tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolFilter<'a> {
    pub query: Option<&'a str>,
    pub unlocked: Option<&'a Unlocks>,
}

impl PoolFilter<'_> {
    fn passes(&self, tag: &str, query_lower: Option<&str>) -> bool {
        query_lower.is_none_or(|q| tag.to_lowercase().contains(q))
            && self.unlocked.is_none_or(|u| u.is_unlocked(tag))
    }

    /// Keep the tags that pass, in their original order.
    pub fn apply<'t>(&self, tags: impl IntoIterator<Item = &'t str>) -> Vec<&'t str> {
        let query = self
            .query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        tags.into_iter()
            .filter(|tag| self.passes(tag, query.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unlock::ManualUnlocks;
    use std::collections::BTreeSet;

    #[test]
    fn known_prefixes_are_stripped() {
        assert_eq!(pretty_tag_name("THEME_LOST_LOVE"), "LOST LOVE");
        assert_eq!(pretty_tag_name("SUPPORTINGCHARACTER_BUTLER"), "BUTLER");
        assert_eq!(pretty_tag_name("SCIENCE_FICTION"), "SCIENCE FICTION");
        assert_eq!(pretty_tag_name("SETTING_TOWN"), "SETTING TOWN");
        assert_eq!(pretty_tag_name("DRAMA"), "DRAMA");
    }

    #[test]
    fn category_names() {
        assert_eq!(pretty_category(&Category::SupportingCharacter), "Supporting Character");
        assert_eq!(pretty_category(&Category::Theme), "Theme");
        assert_eq!(pretty_category(&Category::Unknown), "UNKNOWN");
    }

    #[test]
    fn pool_filter_by_query_and_unlocks() {
        let tags = ["THEME_LOVE", "THEME_WAR", "DRAMA", "FINALE_LOVE_SONG"];

        let by_query = PoolFilter {
            query: Some("  Love "),
            ..Default::default()
        };
        assert_eq!(by_query.apply(tags), ["THEME_LOVE", "FINALE_LOVE_SONG"]);

        let mut manual = ManualUnlocks::empty("unused.json");
        manual.add("FINALE_LOVE_SONG");
        let unlocks = Unlocks::new(BTreeSet::from(["DRAMA".to_string()]), manual);
        let unlocked_only = PoolFilter {
            query: None,
            unlocked: Some(&unlocks),
        };
        assert_eq!(unlocked_only.apply(tags), ["DRAMA", "FINALE_LOVE_SONG"]);

        let both = PoolFilter {
            query: Some("love"),
            unlocked: Some(&unlocks),
        };
        assert_eq!(both.apply(tags), ["FINALE_LOVE_SONG"]);

        assert_eq!(PoolFilter::default().apply(tags).len(), 4);
    }
}
