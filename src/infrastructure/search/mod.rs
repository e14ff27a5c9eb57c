use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::domain::search::{SearchEntry, SearchHistory};

/// A service that performs fuzzy searching using the Skim algorithm.
#[derive(Clone)]
pub struct FuzzySearcher {
    matcher: Arc<SkimMatcherV2>,
}

impl Default for FuzzySearcher {
    fn default() -> Self {
        Self {
            matcher: Arc::new(SkimMatcherV2::default()),
        }
    }
}

impl std::fmt::Debug for FuzzySearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzySearcher").finish_non_exhaustive()
    }
}

impl FuzzySearcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn score(&self, choice: &str, pattern: &str) -> Option<i64> {
        self.matcher.fuzzy_match(choice, pattern)
    }

    /// History entries matching `pattern`, best match first.
    ///
    /// Ties keep history order, so pinned and recently used entries win.
    /// Queries present in both lists appear once. A blank pattern returns
    /// the history as-is.
    #[must_use]
    pub fn suggest<'a>(
        &self,
        history: &'a SearchHistory,
        pattern: &str,
        limit: usize,
    ) -> Vec<&'a SearchEntry> {
        let pattern = pattern.trim();
        let mut seen = std::collections::HashSet::new();
        let unique = history.entries().filter(|e| seen.insert(e.query.as_str()));

        if pattern.is_empty() {
            return unique.take(limit).collect();
        }

        let mut scored: Vec<(i64, &SearchEntry)> = unique
            .filter_map(|entry| self.score(&entry.query, pattern).map(|s| (s, entry)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, e)| e).collect()
    }
}
