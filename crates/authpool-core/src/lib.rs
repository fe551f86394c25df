//! AuthPool Core
//!
//! Runtime-agnostic credential rotation and token issuance.
//! This crate selects among interchangeable sets of upstream credentials in
//! round-robin order, mints short-lived HS256 tokens for the selected set,
//! and keeps both correct under heavy concurrent access: failed sets are
//! excluded until re-admitted, and tokens are cached per client id with TTL
//! and proactive refresh.
//!
//! ## Typical flow
//!
//! ```rust,no_run
//! use authpool_core::credentials::load_credential_file;
//! use authpool_core::registry::{self, RegistryConfig};
//! use authpool_core::service::CredentialService;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = load_credential_file("secrets.json")?;
//! let service = CredentialService::from_registry(
//!     registry::global(),
//!     &store,
//!     RegistryConfig::default(),
//! );
//!
//! let issued = service.acquire()?;
//! // ... call upstream with issued.token ...
//! service.report_failure(&issued.set, "upstream rejected token");
//! # Ok(())
//! # }
//! ```
//!
//! Transport, header rewriting and scheduling of failure resets belong to the
//! host; this crate owns only the rotation and issuance state.

pub mod credentials;
pub mod logging;
pub mod registry;
pub mod rotation;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use credentials::{load_credential_file, CredentialError, CredentialSet, CredentialStore};

pub use logging::{ConsoleLogger, Logger, NoOpLogger, SharedLogger};

pub use registry::{RegistryConfig, SharedComponents, SharedRegistry};

pub use rotation::{RotationError, RotationSelector, RotationStats, WithSelectionError};

pub use service::{CredentialService, IssuedCredential, ServiceError};

pub use token::{IssuerConfig, SigningKey, TokenCache, TokenError, TokenIssuer};
