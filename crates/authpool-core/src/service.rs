//! Boundary facade for host collaborators
//!
//! The forwarding layer talks to this module only: acquire a credential set
//! plus token, report how the upstream call went, and periodically re-admit
//! failed sets. Everything else (rotation bookkeeping, cache lookups,
//! failover) happens behind [`CredentialService::acquire`].

use std::sync::Arc;

use thiserror::Error;

use crate::credentials::{CredentialSet, CredentialStore};
use crate::logging::{noop_logger, SharedLogger};
use crate::registry::{RegistryConfig, SharedComponents, SharedRegistry};
use crate::rotation::{RotationError, RotationSelector};
use crate::token::TokenIssuer;

/// Errors surfaced to the host at the acquire boundary
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Every configured credential set has failed (or none could issue a
    /// token); maps to a service-unavailable outcome at the transport layer.
    #[error("service unavailable: {0}")]
    Unavailable(#[from] RotationError),
}

/// A credential set paired with a signed token, ready for one upstream call
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// The selected credential set
    pub set: CredentialSet,
    /// Signed token for the set
    pub token: String,
    /// Display name for request logs
    pub display_name: String,
}

/// Facade combining selection and issuance with automatic failover
///
/// `acquire` hides per-set failures from the caller: a set whose token cannot
/// be issued is marked failed and the next one is tried, until either a token
/// is produced or the pool is exhausted. Individual set failures therefore
/// cost the caller only latency; exhaustion surfaces as
/// [`ServiceError::Unavailable`].
pub struct CredentialService {
    selector: Arc<RotationSelector>,
    issuer: Arc<TokenIssuer>,
    logger: SharedLogger,
}

impl CredentialService {
    /// Build a service from an explicit selector/issuer pair
    pub fn new(selector: Arc<RotationSelector>, issuer: Arc<TokenIssuer>) -> Self {
        Self::with_logger(selector, issuer, noop_logger())
    }

    /// Build a service with an explicit logger
    pub fn with_logger(
        selector: Arc<RotationSelector>,
        issuer: Arc<TokenIssuer>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            selector,
            issuer,
            logger,
        }
    }

    /// Build a service on top of a registry's shared pair
    ///
    /// The service logs through the same logger the shared components were
    /// configured with.
    pub fn from_registry(
        registry: &SharedRegistry,
        store: &CredentialStore,
        config: RegistryConfig,
    ) -> Self {
        let logger = config.logger.clone();
        let components = registry.get_or_create(store, config);
        Self {
            selector: components.selector.clone(),
            issuer: components.issuer.clone(),
            logger,
        }
    }

    /// Build a service from already-created shared components
    pub fn from_components(components: &SharedComponents) -> Self {
        Self {
            selector: components.selector.clone(),
            issuer: components.issuer.clone(),
            logger: noop_logger(),
        }
    }

    /// Select the next credential set and issue a token for it
    ///
    /// Retries with the next set whenever token issuance fails, marking the
    /// failing set as failed. Bounded: every failed attempt shrinks the
    /// available pool, so the loop ends in success or exhaustion.
    pub fn acquire(&self) -> Result<IssuedCredential, ServiceError> {
        loop {
            let set = self.selector.select_next()?;
            match self.issuer.issue_for(&set) {
                Ok(token) => {
                    return Ok(IssuedCredential {
                        display_name: set.display_name(),
                        token,
                        set,
                    });
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "token issuance failed for '{}': {e}; trying next set",
                        set.display_name()
                    ));
                    self.selector.mark_failed(&set);
                }
            }
        }
    }

    /// Report that an upstream call using this set failed
    ///
    /// The set is excluded from selection until [`reset_failed`](Self::reset_failed).
    pub fn report_failure(&self, set: &CredentialSet, reason: &str) {
        self.logger.warn(&format!(
            "upstream failure reported for '{}': {reason}",
            set.display_name()
        ));
        self.selector.mark_failed(set);
    }

    /// Report that an upstream call using this set succeeded
    ///
    /// Observability hook only; no state changes.
    pub fn report_success(&self, _set: &CredentialSet) {}

    /// Re-admit all failed credential sets
    ///
    /// Invoked by an external scheduler on whatever cadence the host chooses;
    /// the core has no internal retry timer.
    pub fn reset_failed(&self) {
        self.selector.reset_failed();
    }

    /// Rotation counters, for host metrics
    pub fn stats(&self) -> crate::rotation::RotationStats {
        self.selector.stats()
    }
}
