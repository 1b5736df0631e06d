#[cfg(test)]
mod tests;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

/// Keyword to occurrence count, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    entries: Vec<(String, usize)>,
}

impl KeywordCounts {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `keyword` unless it is already present; returns whether it was added
    #[inline]
    pub fn insert_if_absent(&mut self, keyword: impl Into<String>, count: usize) -> bool {
        let keyword = keyword.into();
        if self.contains(&keyword) {
            return false;
        }
        self.entries.push((keyword, count));
        true
    }

    #[inline]
    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == keyword)
    }

    #[inline]
    pub fn get(&self, keyword: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, count)| *count)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }
}

impl Serialize for KeywordCounts {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (keyword, count) in &self.entries {
            map.serialize_entry(keyword, count)?;
        }
        map.end()
    }
}

/// Non-overlapping literal occurrences of `needle` in `haystack`
#[inline]
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn normalize_keyword(keyword: &str) -> Option<String> {
    let keyword = keyword.trim().to_lowercase();
    (!keyword.is_empty()).then_some(keyword)
}

/// Count how often each keyword appears in the lower-cased, space-joined `texts`.
///
/// Keys are the selected `keywords` in order followed by any `custom_keywords`
/// not already present. Custom keywords are always reported, with 0 when they
/// never occur. Matching is plain substring search, so "dim" also matches
/// inside "dimly".
#[inline]
pub fn count_keywords(
    keywords: &[String],
    custom_keywords: &[String],
    texts: &[String],
) -> KeywordCounts {
    let search_text = texts
        .iter()
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut counts = KeywordCounts::new();
    for keyword in keywords.iter().chain(custom_keywords) {
        let Some(keyword) = normalize_keyword(keyword) else {
            continue;
        };
        if counts.contains(&keyword) {
            continue;
        }
        let count = count_occurrences(&search_text, &keyword);
        counts.insert_if_absent(keyword, count);
    }

    debug!(
        "Counted {} keywords over {} texts",
        counts.len(),
        texts.len()
    );
    counts
}
