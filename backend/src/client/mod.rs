//! Client for the callable endpoints with idempotency keys on every request.
//!
//! Each request carries `X-Idempotency-Key`. A fresh UUID v4 is generated
//! per call unless the caller supplies a key and asks for it to be reused;
//! a key the caller already placed in the headers is never overwritten.

mod callables;

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Error, IdempotencyKey, OrgId};

pub use callables::resolve_org_id;

/// Failures surfaced by [`IdempotentClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid request path `{path}`: {message}")]
    InvalidPath { path: String, message: String },
    #[error("invalid header: {message}")]
    InvalidHeader { message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with an error payload.
    #[error("server returned {status}: {error}")]
    Api { status: StatusCode, error: Error },
    #[error("failed to decode {status} response: {message}")]
    Decode { status: StatusCode, message: String },
}

impl ClientError {
    /// Domain error carried by an API failure, if any.
    pub fn api_error(&self) -> Option<&Error> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Key to send when `reuse_key` is set.
    pub idempotency_key: Option<IdempotencyKey>,
    /// Send `idempotency_key` instead of minting a fresh one.
    pub reuse_key: bool,
    /// Extra headers; an `X-Idempotency-Key` or `Content-Type` here wins.
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Options replaying `key` on every call, for deliberate retries.
    pub fn reusing(key: IdempotencyKey) -> Self {
        Self {
            idempotency_key: Some(key),
            reuse_key: true,
            headers: HeaderMap::new(),
        }
    }
}

/// Headers sent with a request built from `options`.
pub(crate) fn request_headers(options: &RequestOptions) -> HeaderMap {
    let mut headers = options.headers.clone();
    let key_header = HeaderName::from_static("x-idempotency-key");
    if !headers.contains_key(&key_header) {
        let key = match (&options.idempotency_key, options.reuse_key) {
            (Some(key), true) => key.clone(),
            _ => IdempotencyKey::random(),
        };
        // Keys are validated to ASCII alphanumerics, `_` and `-`.
        if let Ok(value) = HeaderValue::from_str(key.as_ref()) {
            headers.insert(key_header, value);
        }
    }
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers
}

/// Response body plus whether the server replayed a cached result.
#[derive(Debug, Clone, PartialEq)]
pub struct Replayable<T> {
    pub value: T,
    pub replayed: bool,
}

/// HTTP client for the clinic newsletter API.
#[derive(Debug, Clone)]
pub struct IdempotentClient {
    client: Client,
    base_url: Url,
    default_org_id: Option<OrgId>,
}

impl IdempotentClient {
    /// Build a client with a cookie store so the login session sticks.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            default_org_id: None,
        }
    }

    /// Organisation used by [`resolve_org_id`] lookups through this client.
    #[must_use]
    pub fn with_default_org(mut self, org_id: OrgId) -> Self {
        self.default_org_id = Some(org_id);
        self
    }

    pub fn default_org_id(&self) -> Option<&OrgId> {
        self.default_org_id.as_ref()
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidPath {
                path: path.to_owned(),
                message: err.to_string(),
            })
    }

    /// Prepare a request carrying the idempotency and content-type headers.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.url(path)?;
        Ok(self
            .client
            .request(method, url)
            .headers(request_headers(options)))
    }

    /// POST `body` to the named callable and decode the JSON response.
    pub async fn call<B, T>(
        &self,
        name: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<Replayable<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, &format!("api/v1/rpc/{name}"), options)?
            .json(body)
            .send()
            .await?;
        debug!(callable = name, status = %response.status(), "callable answered");
        decode(response).await
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(
    response: Response,
) -> Result<Replayable<T>, ClientError> {
    let status = response.status();
    let replayed = response
        .headers()
        .get(crate::inbound::http::idempotency::IDEMPOTENT_REPLAYED_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(api_failure(status, &body));
    }
    let value = serde_json::from_slice(&body).map_err(|err| ClientError::Decode {
        status,
        message: err.to_string(),
    })?;
    Ok(Replayable { value, replayed })
}

pub(crate) fn api_failure(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<Error>(body) {
        Ok(error) => ClientError::Api { status, error },
        Err(err) => ClientError::Decode {
            status,
            message: err.to_string(),
        },
    }
}
