//! Hash indexes over join keys.

use std::collections::HashMap;

use crate::key::MatchKey;

/// Positions of a key population, indexed by code and by name.
///
/// Duplicate keys keep the first position seen, matching a linear
/// front-to-back scan of the underlying slice; collisions are logged so
/// bad exports (two rows for the same municipality) are visible.
#[derive(Debug, Default)]
pub struct KeyIndex {
    by_code: HashMap<i64, usize>,
    by_name: HashMap<String, usize>,
}

impl KeyIndex {
    /// Builds the index from keys in slice order.
    #[must_use]
    pub fn build<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = MatchKey>,
    {
        let mut index = Self::default();
        for (position, key) in keys.into_iter().enumerate() {
            if let Some(code) = key.code {
                if let Some(existing) = index.by_code.get(&code) {
                    log::warn!("Duplicate municipality code {code} at positions {existing} and {position}; keeping the first");
                } else {
                    index.by_code.insert(code, position);
                }
            }
            if let Some(name) = key.name {
                if let Some(existing) = index.by_name.get(&name) {
                    log::warn!("Duplicate municipality name \"{name}\" at positions {existing} and {position}; keeping the first");
                } else {
                    index.by_name.insert(name, position);
                }
            }
        }
        index
    }

    /// Earliest position matching `key` by code or by name.
    ///
    /// Both routes are tried and the smaller position wins, which keeps
    /// the result identical to a front-to-back scan with an either-side
    /// predicate. A blank key matches nothing.
    #[must_use]
    pub fn find(&self, key: &MatchKey) -> Option<usize> {
        let by_code = key.code.and_then(|code| self.by_code.get(&code)).copied();
        let by_name = key
            .name
            .as_deref()
            .and_then(|name| self.by_name.get(name))
            .copied();
        match (by_code, by_name) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(p), None) | (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }

    /// Whether any position matches `key`.
    #[must_use]
    pub fn contains(&self, key: &MatchKey) -> bool {
        self.find(key).is_some()
    }
}
