use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service under which tokens are filed.
const SERVICE_NAME: &str = "jardinbiot";

/// Keychain entry holding the short-lived access token.
const ACCESS_TOKEN_KEY: &str = "jardinbiot_access_token";

/// Keychain entry holding the long-lived refresh token.
const REFRESH_TOKEN_KEY: &str = "jardinbiot_refresh_token";

/// An access/refresh pair as issued by the token endpoint.
/// Both values are opaque bearer strings; their JWT internals are the
/// server's concern.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Persistence seam for the session token pair.
///
/// The session is usable only with both halves present, so `tokens` reads
/// a partial state (exactly one stored) as logged out. Writes go through
/// `set_tokens`/`clear_tokens`, which keep the pair together.
pub trait TokenStore: Send + Sync {
    /// Both tokens, or `None` when logged out or partially stored.
    fn tokens(&self) -> Result<Option<TokenPair>>;

    /// Persist a freshly issued pair.
    fn set_tokens(&self, access: &str, refresh: &str) -> Result<()>;

    /// Replace the access token, leaving the refresh token in place.
    fn set_access_token(&self, access: &str) -> Result<()>;

    /// Remove both tokens. Removing an absent token is not an error.
    fn clear_tokens(&self) -> Result<()>;

    /// The access token alone, for building `Authorization` headers.
    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.tokens()?.map(|pair| pair.access))
    }
}

/// Token store backed by the OS keychain.
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }

    fn read(key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn write(key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn tokens(&self) -> Result<Option<TokenPair>> {
        let access = Self::read(ACCESS_TOKEN_KEY)?;
        let refresh = Self::read(REFRESH_TOKEN_KEY)?;
        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(TokenPair { access, refresh })),
            _ => Ok(None),
        }
    }

    fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        Self::write(ACCESS_TOKEN_KEY, access)?;
        Self::write(REFRESH_TOKEN_KEY, refresh)
    }

    fn set_access_token(&self, access: &str) -> Result<()> {
        Self::write(ACCESS_TOKEN_KEY, access)
    }

    fn clear_tokens(&self) -> Result<()> {
        Self::remove(ACCESS_TOKEN_KEY)?;
        Self::remove(REFRESH_TOKEN_KEY)
    }
}

/// In-memory token store for tests and hosts that manage their own
/// persistence.
#[derive(Default)]
pub struct MemoryTokenStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    access: Option<String>,
    refresh: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn tokens(&self) -> Result<Option<TokenPair>> {
        let state = self.lock();
        match (&state.access, &state.refresh) {
            (Some(access), Some(refresh)) => Ok(Some(TokenPair {
                access: access.clone(),
                refresh: refresh.clone(),
            })),
            _ => Ok(None),
        }
    }

    fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        let mut state = self.lock();
        state.access = Some(access.to_string());
        state.refresh = Some(refresh.to_string());
        Ok(())
    }

    fn set_access_token(&self, access: &str) -> Result<()> {
        self.lock().access = Some(access.to_string());
        Ok(())
    }

    fn clear_tokens(&self) -> Result<()> {
        let mut state = self.lock();
        state.access = None;
        state.refresh = None;
        Ok(())
    }
}
