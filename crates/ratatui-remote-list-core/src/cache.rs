use std::collections::HashMap;
use std::fmt;

/// Cache key for one fetched page: the page number plus the controller state version the
/// fetch was issued under. Displays as `"{page}-{version}"`, the key format the generic
/// infinite-scroll contract expects.
///
/// Tying the version into the key is what makes stale data invisible: after any
/// query/filter/sort mutation the controller's version has moved on, so keys built for the
/// new version never match entries fetched under the old one. In-flight fetches are never
/// cancelled; their results just land under a key nothing reads anymore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u32,
    pub version: u64,
}

impl PageKey {
    pub fn new(page: u32, version: u64) -> Self {
        Self { page, version }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.page, self.version)
    }
}

/// Consumer-owned store of fetched pages. The cache itself is deliberately dumb: it stores
/// whatever it is given and answers exact-key lookups. Version discipline lives in the
/// consumer, which builds lookup keys from the controller's current version and may
/// [`prune`](PageCache::prune) superseded entries whenever convenient.
#[derive(Clone, Debug)]
pub struct PageCache<T> {
    entries: HashMap<PageKey, Vec<T>>,
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: PageKey, items: Vec<T>) {
        self.entries.insert(key, items);
    }

    pub fn get(&self, key: PageKey) -> Option<&[T]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: PageKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Drop every entry not belonging to `version`.
    pub fn prune(&mut self, version: u64) {
        self.entries.retain(|key, _| key.version == version);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_displays_as_page_dash_version() {
        assert_eq!(PageKey::new(4, 17).to_string(), "4-17");
    }

    #[test]
    fn stale_entry_is_invisible_under_the_new_version() {
        let mut cache = PageCache::new();
        // A fetch issued under version 1 resolves after a refresh bumped the version to 2.
        cache.insert(PageKey::new(1, 1), vec!["old"]);
        assert_eq!(cache.get(PageKey::new(1, 2)), None);
        assert_eq!(cache.get(PageKey::new(1, 1)), Some(&["old"][..]));
    }

    #[test]
    fn prune_retains_only_the_given_version() {
        let mut cache = PageCache::new();
        cache.insert(PageKey::new(1, 1), vec![1]);
        cache.insert(PageKey::new(2, 1), vec![2]);
        cache.insert(PageKey::new(1, 2), vec![3]);
        cache.prune(2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(PageKey::new(1, 2)));
    }
}
