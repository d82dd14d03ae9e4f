use std::fmt;

/// Key space of the cache store.
///
/// The store holds two kinds of data in one namespace: the ranked id list
/// (under two well-known slots) and one detail record per item id. A sum
/// type keeps the kinds apart without string-prefix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The current ranked id list. Short-lived.
    BestIds,
    /// The last successfully fetched ranked id list. Never expires; only
    /// overwritten by a fresh fetch.
    BestIdsBackup,
    /// The detail record for one item.
    Story(u64),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::BestIds => write!(f, "best-ids"),
            CacheKey::BestIdsBackup => write!(f, "best-ids-backup"),
            CacheKey::Story(id) => write!(f, "story:{}", id),
        }
    }
}
