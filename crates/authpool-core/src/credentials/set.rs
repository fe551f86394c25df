//! A single credential set

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A required credential field was missing or blank
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}' must be a non-empty string")]
pub struct CredentialFieldError {
    /// Name of the offending field, as it appears in the credential file
    pub field: &'static str,
}

/// A named bundle of upstream credentials
///
/// Loaded once at startup and immutable for the process lifetime. The wire
/// format matches the original `secrets.json` layout (camelCase keys):
///
/// ```json
/// {
///   "name": "primary",
///   "clientId": "abc",
///   "clientSecret": "shh",
///   "tenant": "acme",
///   "agent": "proxy",
///   "appToAccess": "llm-gateway"
/// }
/// ```
///
/// `agent` and `appToAccess` are carried for logging only and are never part
/// of a signed token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    /// Optional display name used in logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Upstream client identifier; must be unique across the pool
    pub client_id: String,
    /// Upstream client secret
    pub client_secret: String,
    /// Tenant the credentials belong to
    pub tenant: String,
    /// Optional agent identifier, logging only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Optional target application, logging only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_to_access: Option<String>,
}

impl CredentialSet {
    /// Create a credential set from the three required fields
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant: tenant.into(),
            agent: None,
            app_to_access: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Human-readable identity for logs
    ///
    /// Falls back to a truncated client id when no name is configured.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let prefix: String = self.client_id.chars().take(8).collect();
                format!("config-{}...", prefix)
            }
        }
    }

    /// Check that every required field is present and non-blank
    pub fn validate(&self) -> Result<(), CredentialFieldError> {
        for (field, value) in [
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("tenant", &self.tenant),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialFieldError { field });
            }
        }
        Ok(())
    }
}

// Manual Debug so the secret never lands in logs or panic output.
impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant", &self.tenant)
            .field("agent", &self.agent)
            .field("app_to_access", &self.app_to_access)
            .finish()
    }
}
