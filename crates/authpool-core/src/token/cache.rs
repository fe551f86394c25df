//! In-memory token cache keyed by client id

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// A cached signed token with its lifetime bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCacheEntry {
    /// The signed token string
    pub token: String,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
    /// Hard expiry (`issued_at` + TTL)
    pub expires_at: DateTime<Utc>,
}

/// Thread-safe token cache with TTL and proactive refresh semantics
///
/// Entries are keyed solely by `client_id`; the pool-level precondition is
/// that client ids are unique per credential set. A read whose remaining
/// lifetime is below the refresh margin is treated as a miss even though the
/// entry has not technically expired, which keeps in-flight requests from
/// racing a token's hard expiry.
///
/// # Thread Safety
///
/// The map is guarded by an `RwLock`; reads are concurrent, writes exclusive.
pub struct TokenCache {
    entries: RwLock<HashMap<String, TokenCacheEntry>>,
    ttl: Duration,
    refresh_margin: Duration,
}

impl TokenCache {
    /// Create a cache with the given TTL and refresh margin
    pub fn new(ttl: Duration, refresh_margin: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            refresh_margin,
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Configured refresh margin
    pub fn refresh_margin(&self) -> Duration {
        self.refresh_margin
    }

    /// Get a cached token if it is still live at `now`
    ///
    /// Returns `None` for absent entries and for entries with less than the
    /// refresh margin remaining before expiry.
    pub fn get_live(&self, client_id: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.read();
        let entry = entries.get(client_id)?;
        if entry.expires_at - now >= self.refresh_margin {
            Some(entry.token.clone())
        } else {
            None
        }
    }

    /// Store a token issued at `now`, overwriting any previous entry
    pub fn insert(&self, client_id: &str, token: String, now: DateTime<Utc>) -> TokenCacheEntry {
        let entry = TokenCacheEntry {
            token,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let mut entries = self.entries.write();
        entries.insert(client_id.to_string(), entry.clone());
        entry
    }

    /// Raw entry lookup, regardless of liveness
    pub fn entry(&self, client_id: &str) -> Option<TokenCacheEntry> {
        self.entries.read().get(client_id).cloned()
    }

    /// Number of cached entries (live or stale)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
