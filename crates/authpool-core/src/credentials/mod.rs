//! Credential sets and the validated store they are loaded into

mod file;
mod set;
mod store;

pub use file::load_credential_file;
pub use set::{CredentialFieldError, CredentialSet};
pub use store::{CredentialError, CredentialStore};
