use serde::{Deserialize, Serialize};

/// Maximum number of recent queries kept.
pub const MAX_RECENT: usize = 30;
/// Maximum number of unpinned saved queries kept. Pinned ones are exempt.
pub const MAX_SAVED_UNPINNED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Recent,
    Saved,
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recent => write!(f, "recent"),
            Self::Saved => write!(f, "saved"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub query: String,
    pub kind: SearchKind,
    #[serde(default)]
    pub pinned: bool,
    /// Milliseconds since the Unix epoch.
    pub last_used: i64,
}

impl SearchEntry {
    #[must_use]
    pub fn new(query: impl Into<String>, kind: SearchKind, last_used: i64) -> Self {
        Self {
            query: query.into(),
            kind,
            pinned: false,
            last_used,
        }
    }
}

/// Recent and saved tag queries, kept sorted pinned-first then
/// most-recently-used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    #[serde(default)]
    recent: Vec<SearchEntry>,
    #[serde(default)]
    saved: Vec<SearchEntry>,
}

fn normalize(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn sort_entries(entries: &mut [SearchEntry]) {
    entries.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| b.last_used.cmp(&a.last_used))
    });
}

impl SearchHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn recent(&self) -> &[SearchEntry] {
        &self.recent
    }

    #[must_use]
    pub fn saved(&self) -> &[SearchEntry] {
        &self.saved
    }

    /// All entries, saved before recent.
    pub fn entries(&self) -> impl Iterator<Item = &SearchEntry> {
        self.saved.iter().chain(self.recent.iter())
    }

    /// Records a query that was just run. Blank queries are ignored.
    pub fn record_recent(&mut self, query: &str, now: i64) {
        let Some(query) = normalize(query) else {
            return;
        };
        Self::touch_or_insert(&mut self.recent, query, SearchKind::Recent, now);
        if let Some(saved) = self.saved.iter_mut().find(|e| e.query == query) {
            saved.last_used = now;
        }
        self.normalize_lists();
    }

    /// Saves a query for later.
    pub fn save(&mut self, query: &str, now: i64) {
        let Some(query) = normalize(query) else {
            return;
        };
        Self::touch_or_insert(&mut self.saved, query, SearchKind::Saved, now);
        self.normalize_lists();
    }

    /// Pins or unpins a saved query. Returns false if it is not saved.
    pub fn set_pinned(&mut self, query: &str, pinned: bool) -> bool {
        let Some(query) = normalize(query) else {
            return false;
        };
        let Some(entry) = self.saved.iter_mut().find(|e| e.query == query) else {
            return false;
        };
        entry.pinned = pinned;
        self.normalize_lists();
        true
    }

    /// Removes a query from one list. Returns true if something was removed.
    pub fn remove(&mut self, query: &str, kind: SearchKind) -> bool {
        let list = match kind {
            SearchKind::Recent => &mut self.recent,
            SearchKind::Saved => &mut self.saved,
        };
        let before = list.len();
        list.retain(|e| e.query != query.trim());
        before != list.len()
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }

    /// Re-establishes ordering and caps, e.g. after loading from disk.
    pub fn normalize_lists(&mut self) {
        sort_entries(&mut self.recent);
        self.recent.truncate(MAX_RECENT);

        sort_entries(&mut self.saved);
        let mut unpinned = 0;
        self.saved.retain(|e| {
            if e.pinned {
                return true;
            }
            unpinned += 1;
            unpinned <= MAX_SAVED_UNPINNED
        });
    }

    fn touch_or_insert(list: &mut Vec<SearchEntry>, query: &str, kind: SearchKind, now: i64) {
        if let Some(entry) = list.iter_mut().find(|e| e.query == query) {
            entry.last_used = now;
        } else {
            list.push(SearchEntry::new(query, kind, now));
        }
    }
}
