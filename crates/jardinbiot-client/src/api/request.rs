//! Request envelope.
//!
//! [`ApiRequest`] is an owned description of a request: method, path,
//! query, headers, body. The executor needs to resend a request after a
//! 401-triggered token refresh, and transport bodies (notably multipart
//! forms) are consumed on send, so the description holds its own data and
//! fresh transport parts are minted per attempt.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::error::Result;

/// A request to an API endpoint, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: RequestBody,
    pub(crate) timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header. Caller headers win over the computed defaults
    /// (including `Authorization`).
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart form body. The fixed `Content-Type` default is
    /// dropped for these; the transport supplies the boundary header.
    pub fn multipart(mut self, form: FormData) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Bound this request with a timeout. Requests without one run until
    /// the caller drops the future.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FormData),
}

/// An owned multipart form description.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

#[derive(Debug, Clone)]
enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        });
        self
    }

    /// Mint a transport form. Forms are consumed on send, so this is
    /// called once per attempt.
    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime_type)?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}
