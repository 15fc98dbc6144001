//! Remote API Client
//!
//! Typed bindings to the REST collection resources behind `/api/tasks` and
//! `/api/journal`, organized around one generic `Resource` seam.

mod retry;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, Either};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

pub use retry::{retry, RetryPolicy};

use crate::config::AppConfig;
use crate::models::{Entity, EntityId};

/// Failure of a single API call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never completed
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0} ms")]
    Timeout(u32),
    /// Non-2xx response
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    /// 2xx response with an unexpected JSON shape
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("client setup failed: {0}")]
    Setup(String),
}

impl ApiError {
    /// Worth retrying without user involvement
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Decode(_) | ApiError::Setup(_) => false,
        }
    }
}

/// A remote collection resource: list/create/update/delete by id
#[async_trait(?Send)]
pub trait Resource<T: Entity> {
    async fn list(&self) -> Result<Vec<T>, ApiError>;

    async fn create(&self, draft: &T::Draft) -> Result<T, ApiError>;

    /// `Ok(None)` when the server acknowledges without a body
    async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<Option<T>, ApiError>;

    async fn delete(&self, id: EntityId) -> Result<(), ApiError>;
}

pub fn item_path(collection: &str, id: EntityId) -> String {
    format!("{}/{}", collection, id.0)
}

fn decode<D: DeserializeOwned>(body: &str) -> Result<D, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// HTTP client carrying the injected base URL and credential
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<AppConfig>,
}

impl ApiClient {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.config.secret_key)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Build and send a fresh request per attempt; returns the body text of
    /// the first 2xx response
    async fn execute(&self, policy: RetryPolicy, build: impl Fn() -> RequestBuilder) -> Result<String, ApiError> {
        retry(
            &policy,
            |attempt| {
                let request = build();
                async move {
                    if attempt > 1 {
                        log::debug!("[API] attempt {}", attempt);
                    }
                    self.send_once(request).await
                }
            },
            gloo_timers::future::TimeoutFuture::new,
        )
        .await
    }

    async fn send_once(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = self
            .with_timeout(request.send())
            .await?
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = self
            .with_timeout(response.text())
            .await?
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn with_timeout<F: Future>(&self, fut: F) -> Result<F::Output, ApiError> {
        let ms = self.config.request_timeout_ms;
        let timer = gloo_timers::future::TimeoutFuture::new(ms);
        futures::pin_mut!(fut, timer);
        match future::select(fut, timer).await {
            Either::Left((output, _)) => Ok(output),
            Either::Right(_) => Err(ApiError::Timeout(ms)),
        }
    }
}

#[async_trait(?Send)]
impl<T: Entity> Resource<T> for ApiClient {
    async fn list(&self) -> Result<Vec<T>, ApiError> {
        let body = self
            .execute(self.config.retry, || self.request(Method::GET, T::PATH))
            .await?;
        let listing: T::Listing = decode(&body)?;
        Ok(T::from_listing(listing))
    }

    async fn create(&self, draft: &T::Draft) -> Result<T, ApiError> {
        // POST is not idempotent; never retried behind the user's back
        let body = self
            .execute(RetryPolicy::once(), || self.request(Method::POST, T::PATH).json(draft))
            .await?;
        decode(&body)
    }

    async fn update(&self, id: EntityId, patch: &T::Patch) -> Result<Option<T>, ApiError> {
        let path = item_path(T::PATH, id);
        let body = self
            .execute(self.config.retry, || self.request(Method::PUT, &path).json(patch))
            .await?;
        if body.trim().is_empty() {
            Ok(None)
        } else {
            decode(&body).map(Some)
        }
    }

    async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        let path = item_path(T::PATH, id);
        match self
            .execute(self.config.retry, || self.request(Method::DELETE, &path))
            .await
        {
            Ok(_) => Ok(()),
            // Already gone, e.g. an earlier attempt landed but its response was lost
            Err(ApiError::Status { status: 404, .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
