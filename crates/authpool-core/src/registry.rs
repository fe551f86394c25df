//! Process-wide shared rotation and issuance state
//!
//! Request-handling contexts are created and torn down constantly; the
//! selector and the token cache must outlive all of them so that rotation
//! order and cached tokens are shared within the process. The registry is the
//! single holder of that pair: lazily created on first access, created
//! exactly once under concurrent first access, and resettable for test
//! isolation.
//!
//! Cross-process coordination is explicitly out of scope; each process owns
//! an independent registry.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::credentials::CredentialStore;
use crate::logging::{noop_logger, SharedLogger};
use crate::rotation::RotationSelector;
use crate::token::{IssuerConfig, TokenIssuer};

/// The shared (selector, issuer) pair handed to every caller
pub struct SharedComponents {
    /// Round-robin selector over the configured credential sets
    pub selector: Arc<RotationSelector>,
    /// Token issuer with the process-wide cache
    pub issuer: Arc<TokenIssuer>,
}

/// Options applied when the shared pair is first created
///
/// Later `get_or_create` calls ignore these; the first caller wins.
#[derive(Clone)]
pub struct RegistryConfig {
    /// Issuer TTL, refresh margin and signing key
    pub issuer: IssuerConfig,
    /// Logger handed to both components
    pub logger: SharedLogger,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            issuer: IssuerConfig::default(),
            logger: noop_logger(),
        }
    }
}

/// Lazily-initialized, lock-guarded holder of the shared pair
///
/// Construction is guarded by double-checked locking: the fast path is a
/// read lock, and only the first caller takes the write lock and builds the
/// components. No operation here blocks on I/O.
///
/// # Example
///
/// ```
/// use authpool_core::credentials::{CredentialSet, CredentialStore};
/// use authpool_core::registry::{RegistryConfig, SharedRegistry};
///
/// let store = CredentialStore::new(vec![
///     CredentialSet::new("c1", "s1", "t"),
/// ]).unwrap();
///
/// let registry = SharedRegistry::new();
/// let a = registry.get_or_create(&store, RegistryConfig::default());
/// let b = registry.get_or_create(&store, RegistryConfig::default());
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
#[derive(Default)]
pub struct SharedRegistry {
    inner: RwLock<Option<Arc<SharedComponents>>>,
}

impl SharedRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Return the shared pair, creating it on first access
    ///
    /// `store` and `config` are only consulted by the creating call; every
    /// subsequent call returns the existing pair untouched.
    pub fn get_or_create(
        &self,
        store: &CredentialStore,
        config: RegistryConfig,
    ) -> Arc<SharedComponents> {
        if let Some(components) = self.inner.read().as_ref() {
            return components.clone();
        }

        let mut guard = self.inner.write();
        // Another caller may have won the race between the read and the write.
        if let Some(components) = guard.as_ref() {
            return components.clone();
        }

        let components = Arc::new(SharedComponents {
            selector: Arc::new(RotationSelector::with_logger(store, config.logger.clone())),
            issuer: Arc::new(TokenIssuer::with_logger(config.issuer, config.logger)),
        });
        *guard = Some(components.clone());
        components
    }

    /// The shared pair, if it has been created
    pub fn get(&self) -> Option<Arc<SharedComponents>> {
        self.inner.read().clone()
    }

    /// Whether the pair has been created
    pub fn is_initialized(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Discard the shared pair
    ///
    /// The next `get_or_create` rebuilds from scratch. Intended for test
    /// harnesses that must not leak rotation or cache state across tests.
    pub fn reset(&self) {
        *self.inner.write() = None;
    }
}

/// Process-wide registry instance
static GLOBAL: Lazy<SharedRegistry> = Lazy::new(SharedRegistry::new);

/// The process-wide registry
pub fn global() -> &'static SharedRegistry {
    &GLOBAL
}
