//! REST API module for the JardinBiot backend.
//!
//! This module provides the `ApiClient` for talking to a JardinBiot
//! server: request building, bearer authentication with automatic token
//! refresh, response decoding, and pagination handling.
//!
//! The API uses JWT bearer token authentication issued by the server's
//! token endpoint and rotated through its refresh endpoint.

pub mod client;
pub mod error;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use request::{ApiRequest, FormData};
pub use response::{handle_response, handle_validated_response, unwrap_paginated, Page};
