//! Ordered header multimap
//!
//! Keys are stored exactly as received. Gateway triggers already deliver lowercased
//! header names, so no case folding happens here.

use std::collections::BTreeMap;

/// Ordered, case-sensitive header multimap
///
/// [`insert`](HeaderMap::insert) replaces an existing entry in place (last write wins),
/// while [`append`](HeaderMap::append) keeps every value, which engines use for
/// repeated response headers such as `set-cookie`.
///
/// # Examples
///
/// ```rust
/// use turul_gateway_http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("content-type", "text/plain");
/// headers.insert("content-type", "application/json");
/// headers.append("set-cookie", "a=1");
/// headers.append("set-cookie", "b=2");
///
/// assert_eq!(headers.get("content-type"), Some("application/json"));
/// assert_eq!(headers.get_all("set-cookie").collect::<Vec<_>>(), vec!["a=1", "b=2"]);
/// assert_eq!(headers.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing every existing value for that key
    ///
    /// The first existing entry keeps its position; later duplicates are dropped.
    /// Returns the previous value if one was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();

        let Some(position) = self.entries.iter().position(|(k, _)| *k == key) else {
            self.entries.push((key, value));
            return None;
        };

        let previous = std::mem::replace(&mut self.entries[position].1, value);
        let mut index = 0;
        self.entries.retain(|(k, _)| {
            let keep = index <= position || *k != key;
            index += 1;
            keep
        });
        Some(previous)
    }

    /// Add a value for `key` without touching existing values
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Last value stored for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored for `key`, in insertion order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove every value for `key`, returning them in insertion order
    pub fn remove(&mut self, key: &str) -> Vec<String> {
        self.remove_where(|k| k == key)
    }

    /// Like [`HeaderMap::remove`], matching `key` in any ASCII case
    pub fn remove_ignore_ascii_case(&mut self, key: &str) -> Vec<String> {
        self.remove_where(|k| k.eq_ignore_ascii_case(key))
    }

    fn remove_where(&mut self, matches: impl Fn(&str) -> bool) -> Vec<String> {
        let mut removed = Vec::new();
        self.entries.retain(|(k, v)| {
            if matches(k.as_str()) {
                removed.push(v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse to a single value per key (last write wins)
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderMap::new();
        for (key, value) in iter {
            headers.insert(key, value);
        }
        headers
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for HeaderMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for HeaderMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
