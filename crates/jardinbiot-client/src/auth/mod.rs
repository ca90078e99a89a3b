//! Session credentials and token refresh.
//!
//! This module provides:
//! - `TokenStore`: persistence seam for the access/refresh token pair
//! - `KeyringTokenStore`: OS keychain-backed store (the default)
//! - `MemoryTokenStore`: process-local store for tests and embedding hosts
//! - `RefreshCoordinator`: single-flight access token refresh
//!
//! Tokens live under the keychain service `jardinbiot` and are either both
//! present (authenticated) or both absent (logged out).

pub mod refresh;
pub mod store;

pub use refresh::RefreshCoordinator;
pub use store::{KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore};
