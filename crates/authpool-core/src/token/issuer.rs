//! Signed token construction with cache-first issuance

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cache::TokenCache;
use super::clock::{Clock, SystemClock};
use crate::credentials::{CredentialFieldError, CredentialSet};
use crate::logging::{noop_logger, SharedLogger};

/// Errors that can occur while issuing a token
#[derive(Debug, Error)]
pub enum TokenError {
    /// A required field was missing from the credential set
    ///
    /// The store's validation should make this unreachable, but the issuer
    /// still refuses to emit a malformed token.
    #[error("credential set is incomplete: {0}")]
    IncompleteCredentialSet(#[from] CredentialFieldError),

    /// The signing library rejected the input
    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an issued token
///
/// The payload is the credential bundle itself plus timing claims, matching
/// what the upstream service expects; there is no derived identity claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Upstream client identifier
    pub client_id: String,
    /// Upstream client secret, carried as a claim per the upstream contract
    pub client_secret: String,
    /// Tenant the credentials belong to
    pub tenant: String,
    /// Issued-at, unix seconds
    pub iat: u64,
    /// Expiry, unix seconds
    pub exp: u64,
}

/// Which secret signs the token
///
/// The upstream contract does not pin this down, so it is a configuration
/// parameter rather than an assumption baked into the issuer.
#[derive(Clone, Default)]
pub enum SigningKey {
    /// Sign each token with the set's own client secret (original behavior)
    #[default]
    ClientSecret,
    /// Sign every token with one shared secret
    Shared(String),
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKey::ClientSecret => write!(f, "ClientSecret"),
            SigningKey::Shared(_) => write!(f, "Shared(<redacted>)"),
        }
    }
}

/// Issuer configuration
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Token time-to-live
    pub ttl: Duration,
    /// Remaining lifetime below which a cached token is re-signed
    pub refresh_margin: Duration,
    /// Signing key selection
    pub signing_key: SigningKey,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(3600),
            refresh_margin: Duration::seconds(300),
            signing_key: SigningKey::ClientSecret,
        }
    }
}

/// Builds and signs HS256 tokens for credential sets, cache-first
///
/// A token is signed at most once per TTL window per client id; repeated
/// calls inside the window return the cached token byte-identical. Signing is
/// pure computation, so `issue_for` never blocks on I/O.
///
/// # Example
///
/// ```
/// use authpool_core::credentials::CredentialSet;
/// use authpool_core::token::{IssuerConfig, TokenIssuer};
///
/// let issuer = TokenIssuer::new(IssuerConfig::default());
/// let set = CredentialSet::new("c1", "secret", "tenant");
///
/// let first = issuer.issue_for(&set).unwrap();
/// let second = issuer.issue_for(&set).unwrap();
/// assert_eq!(first, second);
/// ```
pub struct TokenIssuer {
    cache: TokenCache,
    signing_key: SigningKey,
    clock: Arc<dyn Clock>,
    logger: SharedLogger,
}

impl TokenIssuer {
    /// Create an issuer with a silent logger and the system clock
    pub fn new(config: IssuerConfig) -> Self {
        Self::with_logger(config, noop_logger())
    }

    /// Create an issuer with an explicit logger
    pub fn with_logger(config: IssuerConfig, logger: SharedLogger) -> Self {
        Self::with_clock(config, logger, Arc::new(SystemClock))
    }

    /// Create an issuer with an explicit clock (used by tests)
    pub fn with_clock(config: IssuerConfig, logger: SharedLogger, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: TokenCache::new(config.ttl, config.refresh_margin),
            signing_key: config.signing_key,
            clock,
            logger,
        }
    }

    /// The underlying cache
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Return a signed token for the credential set
    ///
    /// Cache hit: the stored token is returned unchanged. Miss (absent or
    /// inside the refresh margin): a new token is signed, cached and
    /// returned. Two racing misses may both sign; the later insert wins,
    /// which is harmless since both tokens are valid.
    pub fn issue_for(&self, set: &CredentialSet) -> Result<String, TokenError> {
        set.validate()?;

        let now = self.clock.now();
        if let Some(token) = self.cache.get_live(&set.client_id, now) {
            self.logger.debug(&format!(
                "token cache hit for '{}'",
                set.display_name()
            ));
            return Ok(token);
        }

        let expires_at = now + self.cache.ttl();
        let claims = TokenClaims {
            client_id: set.client_id.clone(),
            client_secret: set.client_secret.clone(),
            tenant: set.tenant.clone(),
            iat: now.timestamp() as u64,
            exp: expires_at.timestamp() as u64,
        };

        let key = match &self.signing_key {
            SigningKey::ClientSecret => set.client_secret.as_str(),
            SigningKey::Shared(secret) => secret.as_str(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )?;

        self.cache.insert(&set.client_id, token.clone(), now);
        self.logger.info(&format!(
            "issued token for '{}' (expires at {})",
            set.display_name(),
            expires_at
        ));

        Ok(token)
    }
}

/// Verify a token's signature and decode its claims
///
/// Expiry is not enforced here; this is a structural check used by tests and
/// diagnostics, not a gatekeeper for upstream calls.
pub fn decode_claims(token: &str, key: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;

    /// Clock that only moves when told to
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn at(start: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(start),
            })
        }

        fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn issuer_at(start: DateTime<Utc>) -> (TokenIssuer, Arc<ManualClock>) {
        let clock = ManualClock::at(start);
        let issuer = TokenIssuer::with_clock(
            IssuerConfig::default(),
            crate::logging::noop_logger(),
            clock.clone(),
        );
        (issuer, clock)
    }

    fn sample_set() -> CredentialSet {
        CredentialSet::new("c1", "secret-1", "tenant").with_name("one")
    }

    #[test]
    fn test_issue_signs_expected_claims() {
        let (issuer, _clock) = issuer_at(t0());
        let token = issuer.issue_for(&sample_set()).unwrap();

        let claims = decode_claims(&token, "secret-1").unwrap();
        assert_eq!(claims.client_id, "c1");
        assert_eq!(claims.client_secret, "secret-1");
        assert_eq!(claims.tenant, "tenant");
        assert_eq!(claims.iat, t0().timestamp() as u64);
        assert_eq!(claims.exp, (t0() + Duration::seconds(3600)).timestamp() as u64);
    }

    #[test]
    fn test_issue_is_idempotent_within_ttl() {
        let (issuer, clock) = issuer_at(t0());
        let set = sample_set();

        let first = issuer.issue_for(&set).unwrap();
        clock.advance(Duration::seconds(1000));
        let second = issuer.issue_for(&set).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_issue_resigns_below_refresh_margin() {
        let (issuer, clock) = issuer_at(t0());
        let set = sample_set();

        let first = issuer.issue_for(&set).unwrap();
        // 200 seconds of life left, below the 300 second margin.
        clock.advance(Duration::seconds(3400));
        let second = issuer.issue_for(&set).unwrap();
        assert_ne!(first, second);

        let claims = decode_claims(&second, "secret-1").unwrap();
        assert_eq!(claims.iat, (t0() + Duration::seconds(3400)).timestamp() as u64);
    }

    #[test]
    fn test_issue_rejects_incomplete_set() {
        let (issuer, _clock) = issuer_at(t0());
        let set = CredentialSet::new("c1", "", "tenant");
        let err = issuer.issue_for(&set).unwrap_err();
        assert!(matches!(err, TokenError::IncompleteCredentialSet(_)));
        assert!(issuer.cache().is_empty());
    }

    #[test]
    fn test_cache_keyed_by_client_id() {
        let (issuer, _clock) = issuer_at(t0());
        let a = CredentialSet::new("a", "sa", "tenant");
        let b = CredentialSet::new("b", "sb", "tenant");

        let token_a = issuer.issue_for(&a).unwrap();
        let token_b = issuer.issue_for(&b).unwrap();
        assert_ne!(token_a, token_b);
        assert_eq!(issuer.cache().len(), 2);
    }

    #[test]
    fn test_shared_signing_key() {
        let config = IssuerConfig {
            signing_key: SigningKey::Shared("pool-secret".to_string()),
            ..IssuerConfig::default()
        };
        let issuer = TokenIssuer::with_clock(
            config,
            crate::logging::noop_logger(),
            ManualClock::at(t0()),
        );
        let token = issuer.issue_for(&sample_set()).unwrap();

        assert!(decode_claims(&token, "pool-secret").is_ok());
        assert!(decode_claims(&token, "secret-1").is_err());
    }

    #[test]
    fn test_decode_rejects_tampered_token() {
        let (issuer, _clock) = issuer_at(t0());
        let token = issuer.issue_for(&sample_set()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_claims(&tampered, "secret-1").is_err());
    }

    #[test]
    fn test_signing_key_debug_redacts_shared_secret() {
        let key = SigningKey::Shared("very-secret".to_string());
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("very-secret"));
    }
}
