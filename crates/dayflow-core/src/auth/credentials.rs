use anyhow::{Context, Result};
use keyring::Entry;

use super::token_store::{origin_of, Credential, TokenStore, STORAGE_KEY};

const SERVICE_NAME: &str = "dayflow-hrms";

/// Credential kept in the OS keychain, one entry per origin
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    pub fn for_origin(origin: &str) -> Self {
        Self {
            account: format!("{}@{}", STORAGE_KEY, origin_of(origin)),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    /// Retrieve the token for this origin from the OS keychain
    fn get(&self) -> Result<Option<Credential>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(Credential::new(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    /// Store the token in the OS keychain
    fn set(&self, credential: &Credential) -> Result<()> {
        self.entry()?
            .set_password(credential.expose())
            .context("Failed to store token in keychain")
    }

    /// Delete the stored token, if any
    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
