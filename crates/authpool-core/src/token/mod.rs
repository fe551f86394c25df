//! Token issuance with a TTL'd, refresh-aware cache

mod cache;
mod clock;
mod issuer;

pub use cache::{TokenCache, TokenCacheEntry};
pub use clock::{Clock, SystemClock};
pub use issuer::{decode_claims, IssuerConfig, SigningKey, TokenClaims, TokenError, TokenIssuer};
