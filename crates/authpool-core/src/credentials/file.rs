//! Credential file loading
//!
//! The file is a JSON array of credential sets, the same layout the original
//! deployment used for `secrets.json`. Parsing and validation happen here so
//! the rest of the core only ever sees a [`CredentialStore`].

use std::fs;
use std::path::Path;

use super::set::CredentialSet;
use super::store::{CredentialError, CredentialStore};

/// Load and validate a credential file
///
/// # Errors
///
/// - [`CredentialError::Io`] if the file cannot be read
/// - [`CredentialError::Parse`] if it is not a JSON array of credential sets
/// - [`CredentialError::Empty`] if the array has no entries
/// - [`CredentialError::Invalid`] if any entry has a blank required field
///
/// # Example
///
/// ```no_run
/// use authpool_core::credentials::load_credential_file;
///
/// let store = load_credential_file("secrets.json")?;
/// # Ok::<(), authpool_core::credentials::CredentialError>(())
/// ```
pub fn load_credential_file(path: impl AsRef<Path>) -> Result<CredentialStore, CredentialError> {
    let content = fs::read_to_string(path.as_ref())?;
    let sets: Vec<CredentialSet> = serde_json::from_str(&content)?;
    CredentialStore::new(sets)
}
