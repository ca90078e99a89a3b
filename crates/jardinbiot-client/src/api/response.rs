//! Response decoding, error classification, and pagination unwrapping.
//!
//! Bodies are read as text once, parsed leniently (an empty body reads as
//! JSON `null`, which covers 204s), then classified: non-JSON is a format
//! error, non-2xx carries a message pulled from the payload's `detail` or
//! `message` field, and non-2xx payloads with a `code` field become
//! validation errors with the full payload attached.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, Result};

/// Parse a body, treating an empty body as JSON `null`.
fn parse_body(status: StatusCode, text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).map_err(|_| ApiError::Format { status })
}

/// Extract a human-readable message from an error payload.
/// Django REST puts messages under `detail`; a few endpoints use `message`.
fn error_message(body: &Value, status: StatusCode) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Error {}", status.as_u16()))
}

pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
    let body = parse_body(status, text)?;
    if status.is_success() {
        Ok(serde_json::from_value(body)?)
    } else {
        Err(ApiError::Api {
            status,
            message: error_message(&body, status),
        })
    }
}

pub(crate) fn decode_validated_body<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<T> {
    let body = parse_body(status, text)?;
    if status.is_success() {
        return Ok(serde_json::from_value(body)?);
    }
    if body.get("code").map(Value::is_string).unwrap_or(false) {
        return Err(ApiError::Validation {
            status,
            payload: body,
        });
    }
    Err(ApiError::Api {
        status,
        message: error_message(&body, status),
    })
}

/// Decode a response into `T`, classifying failures.
pub async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    decode_body(status, &text)
}

/// Like [`handle_response`], but error payloads carrying a `code` field
/// surface as [`ApiError::Validation`] so callers can branch on the code.
pub async fn handle_validated_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    decode_validated_body(status, &text)
}

/// Flatten a list response into its items.
///
/// Paginated endpoints wrap results in `{count, next, previous, results}`;
/// unpaginated ones return a bare array. Anything else reads as an empty
/// list, matching how list screens consume these.
pub fn unwrap_paginated<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(mut map) => match map.remove("results") {
            Some(results @ Value::Array(_)) => Ok(serde_json::from_value(results)?),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

/// One page of a paginated listing, with the envelope metadata intact.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    // An explicit default fn keeps serde from inferring a `T: Default`
    // bound, which item types like Organism do not satisfy.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: None,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Page<T> {
    /// Whether the server reports another page after this one.
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Accept either the page envelope or a bare array (which has no
    /// following page).
    pub fn from_value(body: Value) -> Result<Self> {
        match body {
            Value::Array(_) => Ok(Self {
                results: serde_json::from_value(body)?,
                ..Self::default()
            }),
            Value::Object(_) => Ok(serde_json::from_value(body)?),
            _ => Ok(Self::default()),
        }
    }
}
