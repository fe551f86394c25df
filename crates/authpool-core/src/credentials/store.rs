//! Immutable, validated list of credential sets

use std::sync::Arc;

use thiserror::Error;

use super::set::CredentialSet;

/// Errors that can occur while loading or validating credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential list is empty - at least one credential set is required")]
    Empty,

    #[error("invalid credential set at index {index}: {reason}")]
    Invalid { index: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential file is not a valid JSON array: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable, validated, ordered list of credential sets
///
/// Built once at startup from the loader's output and shared read-only for
/// the process lifetime. Order is the configured order; duplicate entries are
/// allowed and act as positional weighting for the round-robin selector.
///
/// # Example
///
/// ```
/// use authpool_core::credentials::{CredentialSet, CredentialStore};
///
/// let store = CredentialStore::new(vec![
///     CredentialSet::new("c1", "s1", "tenant"),
///     CredentialSet::new("c2", "s2", "tenant"),
/// ]).unwrap();
/// assert_eq!(store.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CredentialStore {
    sets: Arc<[CredentialSet]>,
}

impl CredentialStore {
    /// Build a store from an already-parsed list of credential sets
    ///
    /// Refuses an empty list and re-checks every entry's required fields.
    /// The loader is expected to have validated already; this is the fail-fast
    /// backstop at the core's boundary.
    pub fn new(sets: Vec<CredentialSet>) -> Result<Self, CredentialError> {
        if sets.is_empty() {
            return Err(CredentialError::Empty);
        }
        for (index, set) in sets.iter().enumerate() {
            set.validate()
                .map_err(|e| CredentialError::Invalid {
                    index,
                    reason: e.to_string(),
                })?;
        }
        Ok(Self { sets: sets.into() })
    }

    /// All credential sets in configured order
    pub fn sets(&self) -> &[CredentialSet] {
        &self.sets
    }

    /// Number of configured credential sets (duplicates counted)
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Always false for a constructed store; present for completeness
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
