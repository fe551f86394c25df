//! Thread-safe round-robin selector with failover support

use parking_lot::Mutex;
use thiserror::Error;

use crate::credentials::{CredentialSet, CredentialStore};
use crate::logging::{noop_logger, SharedLogger};

/// Errors that can occur during selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    #[error("no available credential sets - all sets have failed or none are configured")]
    NoAvailableCredentialSet,
}

/// Error returned by [`RotationSelector::with_selection`]
#[derive(Debug, Error)]
pub enum WithSelectionError<E>
where
    E: std::error::Error,
{
    /// No credential set could be selected
    #[error(transparent)]
    Selection(#[from] RotationError),

    /// The body failed; the selected set has already been marked failed
    #[error("selected credential set failed: {0}")]
    Body(E),
}

/// Point-in-time counters for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationStats {
    /// Total selections served since construction
    pub total_selections: u64,
    /// Credential sets currently selectable
    pub available_count: usize,
    /// Credential sets currently excluded
    pub failed_count: usize,
    /// Configured pool size (available + failed)
    pub total_count: usize,
}

/// Mutable rotation state, only ever touched under the selector's mutex.
struct RotationState {
    available: Vec<CredentialSet>,
    failed: Vec<CredentialSet>,
    cursor: usize,
    total_selections: u64,
}

/// Thread-safe round-robin selector over a pool of credential sets
///
/// Selection walks the available list in configured order, wrapping at the
/// end. A set reported as failed is excluded from selection until
/// [`reset_failed`](Self::reset_failed) re-admits it. All operations are
/// linearizable with respect to each other; no external call ever happens
/// while the internal lock is held.
///
/// The cursor is monotonic and the index is taken modulo the available
/// length at the moment of each selection, so re-admitting failed sets
/// resumes the traversal where it would have been instead of restarting at
/// the front.
///
/// # Example
///
/// ```
/// use authpool_core::credentials::{CredentialSet, CredentialStore};
/// use authpool_core::rotation::RotationSelector;
///
/// let store = CredentialStore::new(vec![
///     CredentialSet::new("c1", "s1", "t"),
///     CredentialSet::new("c2", "s2", "t"),
/// ]).unwrap();
/// let selector = RotationSelector::new(&store);
///
/// assert_eq!(selector.select_next().unwrap().client_id, "c1");
/// assert_eq!(selector.select_next().unwrap().client_id, "c2");
/// assert_eq!(selector.select_next().unwrap().client_id, "c1");
/// ```
pub struct RotationSelector {
    state: Mutex<RotationState>,
    total_count: usize,
    logger: SharedLogger,
}

impl RotationSelector {
    /// Create a selector over the store's credential sets with a silent logger
    pub fn new(store: &CredentialStore) -> Self {
        Self::with_logger(store, noop_logger())
    }

    /// Create a selector with an explicit logger
    pub fn with_logger(store: &CredentialStore, logger: SharedLogger) -> Self {
        Self::from_parts(store.sets().to_vec(), logger)
    }

    /// Build a selector over raw sets, bypassing store validation
    ///
    /// Lets tests seed the pool with sets that cannot pass validation, to
    /// exercise issuance-failure paths.
    #[cfg(test)]
    pub(crate) fn from_sets(available: Vec<CredentialSet>, logger: SharedLogger) -> Self {
        Self::from_parts(available, logger)
    }

    fn from_parts(available: Vec<CredentialSet>, logger: SharedLogger) -> Self {
        let total_count = available.len();
        logger.info(&format!(
            "rotation selector initialized with {} credential sets",
            total_count
        ));
        Self {
            state: Mutex::new(RotationState {
                available,
                failed: Vec::new(),
                cursor: 0,
                total_selections: 0,
            }),
            total_count,
            logger,
        }
    }

    /// Select the next credential set in round-robin order
    ///
    /// The index is recomputed against the current available length on every
    /// call, so concurrent failure-marking can never leave a dangling index.
    ///
    /// # Errors
    ///
    /// [`RotationError::NoAvailableCredentialSet`] when every set has failed.
    pub fn select_next(&self) -> Result<CredentialSet, RotationError> {
        let mut state = self.state.lock();

        if state.available.is_empty() {
            self.logger
                .error("no available credential sets - all sets have failed");
            return Err(RotationError::NoAvailableCredentialSet);
        }

        let index = state.cursor % state.available.len();
        let set = state.available[index].clone();
        state.cursor = state.cursor.wrapping_add(1);
        state.total_selections += 1;

        self.logger.info(&format!(
            "using credential set '{}' (selection #{}, index {})",
            set.display_name(),
            state.total_selections,
            index
        ));

        Ok(set)
    }

    /// Exclude a credential set from future selections
    ///
    /// Removes every occurrence from the available list (duplicates are the
    /// same upstream credentials) and records them for later re-admission.
    /// Marking a set that is not currently available is a no-op.
    pub fn mark_failed(&self, set: &CredentialSet) {
        let mut state = self.state.lock();

        let mut removed: Vec<CredentialSet> = Vec::new();
        state.available.retain(|candidate| {
            if candidate == set {
                removed.push(candidate.clone());
                false
            } else {
                true
            }
        });

        if removed.is_empty() {
            if state.failed.iter().any(|failed| failed == set) {
                self.logger.warn(&format!(
                    "credential set '{}' is already marked as failed",
                    set.display_name()
                ));
            } else {
                self.logger.warn(&format!(
                    "credential set '{}' is not in the available pool",
                    set.display_name()
                ));
            }
            return;
        }

        state.failed.extend(removed);

        self.logger.error(&format!(
            "credential set '{}' marked as failed (available {}/{})",
            set.display_name(),
            state.available.len(),
            self.total_count
        ));

        if state.available.is_empty() {
            self.logger.error("all credential sets have failed");
        }
    }

    /// Re-admit all failed credential sets
    ///
    /// Failed sets are appended to the available list in their original
    /// relative order. The cursor and selection counter are left untouched so
    /// the round-robin traversal resumes where it would have been.
    pub fn reset_failed(&self) {
        let mut state = self.state.lock();

        if state.failed.is_empty() {
            self.logger.debug("no failed credential sets to reset");
            return;
        }

        let count = state.failed.len();
        let readmitted = std::mem::take(&mut state.failed);
        state.available.extend(readmitted);

        self.logger.info(&format!(
            "reset {} failed credential sets ({} available)",
            count,
            state.available.len()
        ));
    }

    /// Select a set and run `body` with it, marking the set failed on error
    ///
    /// The selector lock is released before `body` runs, so the body may
    /// perform blocking work (token signing, network calls). On an `Err` the
    /// selected set is marked failed before the error propagates; the caller
    /// may simply call `with_selection` again to retry with the next set.
    pub fn with_selection<T, E, F>(&self, body: F) -> Result<T, WithSelectionError<E>>
    where
        E: std::error::Error,
        F: FnOnce(&CredentialSet) -> Result<T, E>,
    {
        let set = self.select_next()?;
        match body(&set) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.mark_failed(&set);
                Err(WithSelectionError::Body(e))
            }
        }
    }

    /// Current counters
    pub fn stats(&self) -> RotationStats {
        let state = self.state.lock();
        RotationStats {
            total_selections: state.total_selections,
            available_count: state.available.len(),
            failed_count: state.failed.len(),
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ids: &[&str]) -> CredentialStore {
        let sets = ids
            .iter()
            .map(|id| CredentialSet::new(*id, "secret", "tenant").with_name(*id))
            .collect();
        CredentialStore::new(sets).unwrap()
    }

    fn next_id(selector: &RotationSelector) -> String {
        selector.select_next().unwrap().client_id
    }

    #[test]
    fn test_round_robin_order() {
        let selector = RotationSelector::new(&store(&["a", "b", "c"]));
        let picks: Vec<String> = (0..7).map(|_| next_id(&selector)).collect();
        assert_eq!(picks, ["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn test_ith_selection_is_i_mod_n() {
        let ids = ["a", "b", "c", "d", "e"];
        let selector = RotationSelector::new(&store(&ids));
        for i in 0..23 {
            assert_eq!(next_id(&selector), ids[i % ids.len()]);
        }
    }

    #[test]
    fn test_single_set_repeats() {
        let selector = RotationSelector::new(&store(&["only"]));
        assert_eq!(next_id(&selector), "only");
        assert_eq!(next_id(&selector), "only");
    }

    #[test]
    fn test_mark_failed_excludes_set() {
        let selector = RotationSelector::new(&store(&["a", "b"]));
        let a = selector.select_next().unwrap();
        selector.mark_failed(&a);
        for _ in 0..5 {
            assert_eq!(next_id(&selector), "b");
        }
    }

    #[test]
    fn test_mark_failed_only_set_exhausts_pool() {
        let selector = RotationSelector::new(&store(&["only"]));
        let set = selector.select_next().unwrap();
        selector.mark_failed(&set);
        assert_eq!(
            selector.select_next().unwrap_err(),
            RotationError::NoAvailableCredentialSet
        );
    }

    #[test]
    fn test_mark_failed_is_idempotent() {
        let selector = RotationSelector::new(&store(&["a", "b"]));
        let a = selector.select_next().unwrap();
        selector.mark_failed(&a);
        selector.mark_failed(&a); // no-op
        let stats = selector.stats();
        assert_eq!(stats.available_count, 1);
        assert_eq!(stats.failed_count, 1);
    }

    #[test]
    fn test_mark_failed_warns_differently_for_failed_and_unknown_sets() {
        use crate::logging::test_support::RecordingLogger;

        let recorder = RecordingLogger::shared();
        let selector = RotationSelector::with_logger(&store(&["a", "b"]), recorder.clone());

        let a = selector.select_next().unwrap();
        selector.mark_failed(&a);
        selector.mark_failed(&a); // repeat: already failed
        let stranger = CredentialSet::new("zzz", "secret", "tenant").with_name("zzz");
        selector.mark_failed(&stranger); // never configured

        let lines = recorder.lines();
        assert!(lines
            .iter()
            .any(|line| line.contains("'a' is already marked as failed")));
        assert!(lines
            .iter()
            .any(|line| line.contains("'zzz' is not in the available pool")));

        // Neither repeat nor stranger changed the pool.
        let stats = selector.stats();
        assert_eq!(stats.available_count, 1);
        assert_eq!(stats.failed_count, 1);
    }

    #[test]
    fn test_mark_failed_removes_duplicates_together() {
        let set = CredentialSet::new("dup", "secret", "tenant");
        let other = CredentialSet::new("other", "secret", "tenant");
        let store =
            CredentialStore::new(vec![set.clone(), other.clone(), set.clone()]).unwrap();
        let selector = RotationSelector::new(&store);

        selector.mark_failed(&set);
        let stats = selector.stats();
        assert_eq!(stats.available_count, 1);
        assert_eq!(stats.failed_count, 2);

        selector.reset_failed();
        assert_eq!(selector.stats().available_count, 3);
    }

    #[test]
    fn test_reset_failed_restores_continuity() {
        // Spec'd scenario: A,B -> fail B -> A,A,A -> reset -> B,A,B
        let selector = RotationSelector::new(&store(&["a", "b"]));
        assert_eq!(next_id(&selector), "a");
        let b = selector.select_next().unwrap();
        assert_eq!(b.client_id, "b");

        selector.mark_failed(&b);
        assert_eq!(next_id(&selector), "a");
        assert_eq!(next_id(&selector), "a");
        assert_eq!(next_id(&selector), "a");

        selector.reset_failed();
        assert_eq!(next_id(&selector), "b");
        assert_eq!(next_id(&selector), "a");
        assert_eq!(next_id(&selector), "b");
    }

    #[test]
    fn test_reset_failed_preserves_counters() {
        let selector = RotationSelector::new(&store(&["a", "b"]));
        let a = selector.select_next().unwrap();
        selector.mark_failed(&a);
        selector.reset_failed();
        assert_eq!(selector.stats().total_selections, 1);
    }

    #[test]
    fn test_reset_failed_without_failures_is_noop() {
        let selector = RotationSelector::new(&store(&["a", "b"]));
        selector.reset_failed();
        let stats = selector.stats();
        assert_eq!(stats.available_count, 2);
        assert_eq!(stats.failed_count, 0);
    }

    #[test]
    fn test_reset_failed_keeps_relative_order() {
        let selector = RotationSelector::new(&store(&["a", "b", "c"]));
        let a = selector.select_next().unwrap();
        let b = selector.select_next().unwrap();
        selector.mark_failed(&a);
        selector.mark_failed(&b);
        selector.reset_failed();

        // Available is now [c, a, b]; cursor is at 2, so traversal continues
        // with index 2 % 3.
        assert_eq!(next_id(&selector), "b");
        assert_eq!(next_id(&selector), "c");
        assert_eq!(next_id(&selector), "a");
    }

    #[test]
    fn test_with_selection_marks_failed_on_error() {
        #[derive(Debug, Error)]
        #[error("upstream rejected the token")]
        struct UpstreamError;

        let selector = RotationSelector::new(&store(&["a", "b"]));

        let result: Result<(), _> =
            selector.with_selection(|_set| Err::<(), _>(UpstreamError));
        assert!(matches!(result, Err(WithSelectionError::Body(_))));

        // "a" was marked failed; the retry lands on "b".
        let ok = selector
            .with_selection(|set| Ok::<_, UpstreamError>(set.client_id.clone()))
            .unwrap();
        assert_eq!(ok, "b");
    }

    #[test]
    fn test_with_selection_surfaces_exhaustion() {
        #[derive(Debug, Error)]
        #[error("boom")]
        struct Boom;

        let selector = RotationSelector::new(&store(&["only"]));
        let _ = selector.with_selection(|_set| Err::<(), _>(Boom));
        let result = selector.with_selection(|set| Ok::<_, Boom>(set.client_id.clone()));
        assert!(matches!(
            result,
            Err(WithSelectionError::Selection(
                RotationError::NoAvailableCredentialSet
            ))
        ));
    }

    #[test]
    fn test_stats_track_counts() {
        let selector = RotationSelector::new(&store(&["a", "b", "c"]));
        next_id(&selector);
        next_id(&selector);
        let b = CredentialSet::new("b", "secret", "tenant").with_name("b");
        selector.mark_failed(&b);

        let stats = selector.stats();
        assert_eq!(stats.total_selections, 2);
        assert_eq!(stats.available_count, 2);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(stats.total_count, 3);
    }
}
