use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Serialized `scheme://host[:port]` identity of a navigated resource.
///
/// Built by the origin resolver; the only key used for freeze preferences.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// Wraps an already-serialized origin, as read back from storage.
    pub(crate) fn from_serialized(serialized: String) -> Self {
        Self(serialized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of origins for which freezing is enabled.
///
/// Persisted as an ordered JSON array; duplicates in stored data collapse on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginSet(BTreeSet<Origin>);

impl OriginSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, origin: &Origin) -> bool {
        self.0.contains(origin)
    }

    /// Adds `origin`, returning `false` if it was already present.
    pub fn insert(&mut self, origin: Origin) -> bool {
        self.0.insert(origin)
    }

    /// Removes `origin`, returning `false` if it was absent.
    pub fn remove(&mut self, origin: &Origin) -> bool {
        self.0.remove(origin)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Origin> {
        self.0.iter()
    }
}

impl FromIterator<Origin> for OriginSet {
    fn from_iter<I: IntoIterator<Item = Origin>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
