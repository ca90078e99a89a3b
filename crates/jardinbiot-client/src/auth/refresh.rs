//! Single-flight access token refresh.
//!
//! At most one refresh request is outstanding at any time. Callers that
//! need a token while a refresh is running await the same shared future
//! and observe the identical outcome. Any failure (rejected refresh,
//! timeout, network error, unreadable body) ends the session: both stored
//! tokens are cleared and callers get `None`.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::store::TokenStore;

/// Token refresh endpoint, relative to the API base URL.
const REFRESH_PATH: &str = "/api/auth/token/refresh/";

type SharedRefresh = Shared<BoxFuture<'static, Option<String>>>;

pub struct RefreshCoordinator {
    http: Client,
    refresh_url: String,
    store: Arc<dyn TokenStore>,
    timeout: Duration,
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, base_url: &str, store: Arc<dyn TokenStore>, timeout: Duration) -> Self {
        Self {
            http,
            refresh_url: format!("{}{}", base_url, REFRESH_PATH),
            store,
            timeout,
            in_flight: Mutex::new(None),
        }
    }

    /// Obtain a fresh access token, deduplicating concurrent callers onto
    /// a single network request. `None` means the session could not be
    /// refreshed; stored credentials have been cleared.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let fut = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.as_ref() {
                // Join the attempt already in progress. A completed future
                // still sitting in the slot means every awaiter was
                // cancelled before clearing it; start over rather than
                // serving its old result.
                Some(active) if active.peek().is_none() => active.clone(),
                _ => {
                    let fut = Self::run_refresh(
                        self.http.clone(),
                        self.refresh_url.clone(),
                        Arc::clone(&self.store),
                        self.timeout,
                    )
                    .boxed()
                    .shared();
                    *in_flight = Some(fut.clone());
                    fut
                }
            }
        };

        let token = fut.clone().await;

        // Clear only the handle we awaited; a later caller may already
        // have installed a new attempt.
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.as_ref().map(|f| f.ptr_eq(&fut)).unwrap_or(false) {
            *in_flight = None;
        }

        token
    }

    async fn run_refresh(
        http: Client,
        url: String,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Option<String> {
        let refresh = match store.tokens() {
            Ok(Some(pair)) => pair.refresh,
            Ok(None) => {
                debug!("no refresh token stored");
                clear_tokens(store.as_ref());
                return None;
            }
            Err(e) => {
                warn!(error = %e, "token store unreadable during refresh");
                return None;
            }
        };

        let body = serde_json::json!({ "refresh": refresh });
        let response = match http.post(&url).timeout(timeout).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh request failed");
                clear_tokens(store.as_ref());
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "token refresh rejected");
            clear_tokens(store.as_ref());
            return None;
        }

        let parsed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "token refresh response unreadable");
                clear_tokens(store.as_ref());
                return None;
            }
        };

        // Only the access half rotates; the refresh token stays as issued.
        // A failed write is not fatal: the token is still good for this
        // process, and the next 401 will simply refresh again.
        if let Err(e) = store.set_access_token(&parsed.access) {
            warn!(error = %e, "failed to persist refreshed access token");
        }

        debug!("access token refreshed");
        Some(parsed.access)
    }
}

fn clear_tokens(store: &dyn TokenStore) {
    if let Err(e) = store.clear_tokens() {
        warn!(error = %e, "failed to clear stored tokens");
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}
