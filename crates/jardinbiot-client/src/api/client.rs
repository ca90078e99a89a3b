//! API client for the JardinBiot REST backend.
//!
//! `ApiClient` owns the HTTP connection pool, the credential store, and
//! the refresh coordinator. Requests go out with a bearer token resolved
//! from the store (or a refresh); a 401 answer triggers one coordinated
//! refresh and one retry, after which the result stands as-is.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{KeyringTokenStore, RefreshCoordinator, TokenStore};
use crate::config::ClientConfig;
use crate::models::{
    Garden, GardenPayload, Organism, OrganismPayload, OrganismQuery, PhotoUpload, Preferences,
    PreferencesPatch, Reminder, Specimen, SpecimenPatch, SpecimenPayload, WeatherAlert,
};

use super::request::{ApiRequest, FormData, RequestBody};
use super::response::{handle_response, handle_validated_response, unwrap_paginated, Page};
use super::{ApiError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Token issue endpoint: POST `{username, password}` -> `{access, refresh}`.
const TOKEN_PATH: &str = "/api/auth/token/";

/// Token verify endpoint: POST `{token}`; 200 means the token is valid.
const VERIFY_PATH: &str = "/api/auth/token/verify/";

/// Client for the JardinBiot API.
/// Clone is cheap - the connection pool, store, and refresh state are shared.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    config: ClientConfig,
    store: Arc<dyn TokenStore>,
    refresher: RefreshCoordinator,
}

/// What the verify endpoint said about a token.
enum VerifyOutcome {
    Valid,
    Invalid,
    Unreachable,
}

impl ApiClient {
    /// Create a client backed by the OS keychain.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(KeyringTokenStore::new()))
    }

    /// Create a client with an injected token store (tests, hosts with
    /// their own persistence).
    pub fn with_store(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        // No global timeout: uploads and slow listings run until the caller
        // cancels. Refresh and verify carry their own bound.
        let http = Client::builder().build()?;
        let refresher = RefreshCoordinator::new(
            http.clone(),
            config.base_url(),
            Arc::clone(&store),
            config.auth_timeout(),
        );
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store,
                refresher,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.config.base_url(), path)
    }

    // ===== Session =====

    /// Exchange username/password for a token pair and persist it.
    /// A rejected login surfaces the server's message verbatim.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self
            .inner
            .http
            .post(self.url(TOKEN_PATH))
            .json(&body)
            .send()
            .await?;

        let pair: TokenPairResponse = handle_response(response).await?;
        self.inner
            .store
            .set_tokens(&pair.access, &pair.refresh)
            .map_err(ApiError::Storage)?;
        info!(username, "logged in");
        Ok(())
    }

    /// Drop the stored session. Local only; the server keeps no session
    /// state for token auth.
    pub fn logout(&self) -> Result<()> {
        self.inner.store.clear_tokens().map_err(ApiError::Storage)?;
        info!("logged out");
        Ok(())
    }

    /// Whether a stored token pair exists. Does not touch the network.
    pub fn has_credentials(&self) -> bool {
        self.inner
            .store
            .tokens()
            .map(|tokens| tokens.is_some())
            .unwrap_or(false)
    }

    /// Force a token refresh, deduplicated with any refresh already
    /// running. `None` means the session is gone and a login is needed.
    pub async fn refresh_access_token(&self) -> Option<String> {
        self.inner.refresher.refresh_access_token().await
    }

    /// Check whether the stored session is still usable.
    ///
    /// Verifies the stored access token against the server; a rejected
    /// token gets one refresh and one re-verify with the new token. An
    /// unreachable verify endpoint or a second rejection clears the
    /// stored credentials and yields `false`.
    pub async fn restore_session(&self) -> Result<bool> {
        let token = match self.inner.store.access_token().map_err(ApiError::Storage)? {
            Some(token) => token,
            None => return Ok(false),
        };

        match self.verify_token(&token).await {
            VerifyOutcome::Valid => Ok(true),
            VerifyOutcome::Unreachable => {
                self.clear_session("verify endpoint unreachable");
                Ok(false)
            }
            VerifyOutcome::Invalid => {
                let fresh = match self.inner.refresher.refresh_access_token().await {
                    Some(token) => token,
                    // refresh already cleared the store
                    None => return Ok(false),
                };
                match self.verify_token(&fresh).await {
                    VerifyOutcome::Valid => Ok(true),
                    _ => {
                        self.clear_session("refreshed token rejected");
                        Ok(false)
                    }
                }
            }
        }
    }

    async fn verify_token(&self, token: &str) -> VerifyOutcome {
        let body = serde_json::json!({ "token": token });
        let result = self
            .inner
            .http
            .post(self.url(VERIFY_PATH))
            .timeout(self.inner.config.auth_timeout())
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => VerifyOutcome::Valid,
            Ok(response) => {
                debug!(status = %response.status(), "token verify rejected");
                VerifyOutcome::Invalid
            }
            Err(e) => {
                warn!(error = %e, "token verify request failed");
                VerifyOutcome::Unreachable
            }
        }
    }

    fn clear_session(&self, reason: &str) {
        match self.inner.store.clear_tokens() {
            Ok(()) => info!(reason, "session cleared"),
            Err(e) => warn!(error = %e, reason, "failed to clear stored tokens"),
        }
    }

    // ===== Request execution =====

    /// Send a request with authentication, refreshing the access token and
    /// retrying exactly once if the server answers 401. A 401 on the retry
    /// is returned unchanged.
    pub async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let token = self.bearer_token().await?;
        let response = self.send_once(request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "401 response, refreshing access token");
        match self.inner.refresher.refresh_access_token().await {
            Some(fresh) => self.send_once(request, Some(&fresh)).await,
            // Refresh failed and ended the session; the caller sees the 401.
            None => Ok(response),
        }
    }

    /// Access token for the next request: the stored one, or whatever a
    /// refresh can produce. `None` sends the request unauthenticated.
    async fn bearer_token(&self) -> Result<Option<String>> {
        match self.inner.store.access_token() {
            Ok(Some(token)) => Ok(Some(token)),
            Ok(None) => Ok(self.inner.refresher.refresh_access_token().await),
            Err(e) => Err(ApiError::Storage(e)),
        }
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        // Multipart bodies get their Content-Type (with boundary) from the
        // transport; a fixed one here would clobber it.
        if !matches!(request.body, RequestBody::Multipart(_)) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        builder = builder.headers(headers);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        // Caller headers land last and win on conflicts.
        if !request.headers.is_empty() {
            builder = builder.headers(request.headers.clone());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(method = %request.method, path = %request.path, "sending request");
        Ok(builder.send().await?)
    }

    // ===== Generic decoding helpers =====

    async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(&request).await?;
        handle_response(response).await
    }

    async fn get_list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>> {
        let body: Value = self.get_json(request).await?;
        unwrap_paginated(body)
    }

    async fn get_page<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Page<T>> {
        let body: Value = self.get_json(request).await?;
        Page::from_value(body)
    }

    // ===== Gardens =====

    /// Fetch all gardens belonging to the signed-in user.
    pub async fn list_gardens(&self) -> Result<Vec<Garden>> {
        self.get_list(ApiRequest::get("/api/gardens/")).await
    }

    pub async fn get_garden(&self, id: i64) -> Result<Garden> {
        self.get_json(ApiRequest::get(format!("/api/gardens/{}/", id)))
            .await
    }

    pub async fn create_garden(&self, garden: &GardenPayload) -> Result<Garden> {
        self.get_json(ApiRequest::post("/api/gardens/").json(garden)?)
            .await
    }

    pub async fn update_garden(&self, id: i64, garden: &GardenPayload) -> Result<Garden> {
        self.get_json(ApiRequest::patch(format!("/api/gardens/{}/", id)).json(garden)?)
            .await
    }

    pub async fn delete_garden(&self, id: i64) -> Result<()> {
        self.get_json(ApiRequest::delete(format!("/api/gardens/{}/", id)))
            .await
    }

    // ===== Specimens =====

    /// Fetch specimens, optionally filtered to a single garden.
    pub async fn list_specimens(&self, garden: Option<i64>) -> Result<Vec<Specimen>> {
        let mut request = ApiRequest::get("/api/specimens/");
        if let Some(garden) = garden {
            request = request.query("garden", garden);
        }
        self.get_list(request).await
    }

    pub async fn get_specimen(&self, id: i64) -> Result<Specimen> {
        self.get_json(ApiRequest::get(format!("/api/specimens/{}/", id)))
            .await
    }

    /// Plant a specimen. Structured rejections (duplicate labels and the
    /// like) surface as [`ApiError::Validation`] with the payload intact.
    pub async fn create_specimen(&self, specimen: &SpecimenPayload) -> Result<Specimen> {
        let request = ApiRequest::post("/api/specimens/").json(specimen)?;
        let response = self.execute(&request).await?;
        handle_validated_response(response).await
    }

    /// Plant a specimen and attach a photo in one call. The create is
    /// authoritative: a failed photo upload is logged and the created
    /// specimen is returned anyway.
    pub async fn create_specimen_with_photo(
        &self,
        specimen: &SpecimenPayload,
        photo: Option<&PhotoUpload>,
    ) -> Result<Specimen> {
        let created = self.create_specimen(specimen).await?;
        if let Some(photo) = photo {
            match self.upload_specimen_photo(created.id, photo).await {
                Ok(updated) => return Ok(updated),
                Err(e) => {
                    warn!(specimen = created.id, error = %e, "photo upload failed after create");
                }
            }
        }
        Ok(created)
    }

    pub async fn update_specimen(&self, id: i64, patch: &SpecimenPatch) -> Result<Specimen> {
        self.get_json(ApiRequest::patch(format!("/api/specimens/{}/", id)).json(patch)?)
            .await
    }

    pub async fn delete_specimen(&self, id: i64) -> Result<()> {
        self.get_json(ApiRequest::delete(format!("/api/specimens/{}/", id)))
            .await
    }

    /// Upload a photo for a specimen as multipart form data. Returns the
    /// updated specimen record.
    pub async fn upload_specimen_photo(&self, id: i64, photo: &PhotoUpload) -> Result<Specimen> {
        let form = FormData::new().file(
            "photo",
            photo.file_name.as_str(),
            photo.mime_type.as_str(),
            photo.bytes.clone(),
        );
        let request = ApiRequest::post(format!("/api/specimens/{}/photo/", id)).multipart(form);
        self.get_json(request).await
    }

    // ===== Organisms =====

    /// Search the organism catalog, returning the first page of matches.
    pub async fn search_organisms(&self, query: &OrganismQuery) -> Result<Vec<Organism>> {
        Ok(self.get_organisms_page(query).await?.results)
    }

    /// Fetch one page of the organism catalog with pagination metadata,
    /// for incremental listing.
    pub async fn get_organisms_page(&self, query: &OrganismQuery) -> Result<Page<Organism>> {
        let mut request = ApiRequest::get("/api/organisms/");
        if let Some(ref search) = query.search {
            request = request.query("search", search);
        }
        if let Some(ref category) = query.category {
            request = request.query("category", category);
        }
        if let Some(page) = query.page {
            request = request.query("page", page);
        }
        self.get_page(request).await
    }

    pub async fn get_organism(&self, id: i64) -> Result<Organism> {
        self.get_json(ApiRequest::get(format!("/api/organisms/{}/", id)))
            .await
    }

    /// Add an organism to the shared catalog. The server rejects entries
    /// too close to an existing one with a `similar_organism` payload that
    /// includes the existing record; that arrives as
    /// [`ApiError::Validation`].
    pub async fn create_organism(&self, organism: &OrganismPayload) -> Result<Organism> {
        let request = ApiRequest::post("/api/organisms/").json(organism)?;
        let response = self.execute(&request).await?;
        handle_validated_response(response).await
    }

    // ===== Account =====

    /// Fetch the signed-in user's preferences.
    pub async fn get_preferences(&self) -> Result<Preferences> {
        self.get_json(ApiRequest::get("/api/me/preferences/")).await
    }

    /// Update a subset of preferences; unset fields keep their value.
    pub async fn update_preferences(&self, patch: &PreferencesPatch) -> Result<Preferences> {
        self.get_json(ApiRequest::patch("/api/me/preferences/").json(patch)?)
            .await
    }

    // ===== Alerts and reminders =====

    /// Fetch weather alerts for the user's gardens.
    pub async fn list_weather_alerts(&self) -> Result<Vec<WeatherAlert>> {
        self.get_list(ApiRequest::get("/api/weather-alerts/")).await
    }

    /// Fetch care reminders coming due.
    pub async fn upcoming_reminders(&self) -> Result<Vec<Reminder>> {
        self.get_list(ApiRequest::get("/api/reminders/upcoming/"))
            .await
    }
}

// Internal API response types for parsing

#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
}
