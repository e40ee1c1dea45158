//! Typed client for the mock API. Requests go through a [`Transport`], either
//! straight into the router in-process or over HTTP to a running server.

pub mod services;
pub mod transport;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use axum::http::Method;
pub use transport::{HttpTransport, InProcessTransport, Transport};

const FALLBACK_ERROR_MESSAGE: &str = "An API error occurred";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response. `message` comes from the JSON body when there is one.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("Expected a JSON response but got something else (status {status})")]
    NonJson { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A request as handed to a transport. `path_and_query` is already encoded.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path_and_query: String,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ApiResponse {
    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Defaults to POST when a body is present, GET otherwise.
    pub method: Option<Method>,
    /// Query parameters; empty values are dropped.
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method: Some(method),
            ..Default::default()
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn param(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.params.push((key.to_string(), value.to_string()));
        }
        self
    }
}

pub struct ApiClient<T> {
    transport: T,
    prefix: String,
}

impl<T: Transport> ApiClient<T> {
    /// Client whose paths are relative to `/api/`.
    pub fn new(transport: T) -> Self {
        Self::with_prefix(transport, "/api")
    }

    /// Client rooted at `prefix`; an empty prefix addresses the server root.
    pub fn with_prefix(transport: T, prefix: &str) -> Self {
        Self {
            transport,
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Sends one request. Resolves to `None` for 204 responses.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, ClientError> {
        let method = options.method.unwrap_or(if options.body.is_some() {
            Method::POST
        } else {
            Method::GET
        });
        let path_and_query = self.build_path(path, &options.params)?;
        let body = options.body.as_ref().map(serde_json::to_vec).transpose()?;

        debug!("API request: {} {}", method.as_str(), path_and_query);
        let response = self
            .transport
            .send(ApiRequest {
                method,
                path_and_query,
                body,
            })
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(error_from_response(&response));
        }
        if response.status == 204 {
            return Ok(None);
        }
        if !response.is_json() {
            return Err(ClientError::NonJson {
                status: response.status,
            });
        }
        Ok(Some(serde_json::from_slice(&response.body)?))
    }

    /// [`request`](Self::request), decoding the body into `R`.
    pub async fn request_as<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let value = self.request(path, options).await?.unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    fn build_path(&self, path: &str, params: &[(String, String)]) -> Result<String, ClientError> {
        let full = format!("{}/{}", self.prefix, path.trim_start_matches('/'));
        let mut url = reqwest::Url::parse("http://localhost")
            .and_then(|base| base.join(&full))
            .map_err(|e| ClientError::Transport(format!("Invalid request path {full}: {e}")))?;

        let mut non_empty = params.iter().filter(|(_, v)| !v.is_empty()).peekable();
        if non_empty.peek().is_some() {
            url.query_pairs_mut().extend_pairs(non_empty);
        }

        Ok(match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        })
    }
}

fn error_from_response(response: &ApiResponse) -> ClientError {
    let message = if response.is_json() {
        serde_json::from_slice::<Value>(&response.body)
            .ok()
            .and_then(|body| body.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
    } else {
        format!("Request failed with status: {}", response.status)
    };
    ClientError::Api {
        status: response.status,
        message,
    }
}
