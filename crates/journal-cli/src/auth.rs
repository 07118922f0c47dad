//! CLI session helpers with secure keychain persistence.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use journal_core::auth::{AuthClient, SessionPersistence};
pub use journal_core::auth::AuthSession;
use journal_core::config::ClientConfig;
use journal_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "journal-cli";

/// Keychain slot for one API endpoint, so switching servers never reuses a
/// token issued by another one.
#[derive(Clone)]
pub struct SessionStore {
    username: String,
}

impl SessionStore {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            username: format!("session:{api_base_url}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username).map_err(secure_storage_error)
    }
}

fn secure_storage_error(error: impl std::fmt::Display) -> Error {
    Error::SecureStorage(error.to_string())
}

impl SessionPersistence for SessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> Result<Option<AuthSession>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(secure_storage_error(error)),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> Result<Option<AuthSession>> {
        let guard = Self::test_store().lock().map_err(secure_storage_error)?;
        guard
            .get(&self.username)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(Error::from)
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &AuthSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&raw)
            .map_err(secure_storage_error)
    }

    #[cfg(test)]
    fn save_session(&self, session: &AuthSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        let mut guard = Self::test_store().lock().map_err(secure_storage_error)?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> Result<()> {
        let entry = self.entry()?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(secure_storage_error(error)),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> Result<()> {
        let mut guard = Self::test_store().lock().map_err(secure_storage_error)?;
        guard.remove(&self.username);
        Ok(())
    }
}

#[derive(Clone)]
pub struct JournalAuthService {
    inner: AuthClient<SessionStore>,
}

impl JournalAuthService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            inner: AuthClient::new(
                &config.api_base_url,
                SessionStore::new(&config.api_base_url),
            )?,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        self.inner.login(username, password).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<AuthSession> {
        self.inner.register(username, password).await
    }

    pub fn restore_session(&self) -> Result<Option<AuthSession>> {
        self.inner.restore_session()
    }

    pub fn logout(&self) -> Result<()> {
        self.inner.logout()
    }
}
