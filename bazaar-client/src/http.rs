//! Shared HTTP plumbing for the API clients.
//!
//! One `Http` value is shared by every typed client. It attaches the bearer
//! token from the session, stamps a correlation id on each outgoing request,
//! and maps response statuses into the `ApiError` taxonomy. The single
//! cross-cutting rule lives here: a 401 clears the session and notifies
//! auth-expired subscribers before the error is returned. Nothing is
//! retried.

use std::time::Duration;

use http::Extensions;
use reqwest::{Client, Request, Response, StatusCode};
use reqwest_middleware::{ClientWithMiddleware, Middleware, Next, Result as MiddlewareResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::SessionHandle;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Middleware that stamps a correlation id on every outgoing request,
/// preserving one that was set explicitly upstream.
pub struct CorrelationMiddleware;

#[async_trait::async_trait]
impl Middleware for CorrelationMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> MiddlewareResult<Response> {
        if !req.headers().contains_key(CORRELATION_ID_HEADER) {
            let correlation_id = Uuid::new_v4().to_string();
            req.headers_mut().insert(
                CORRELATION_ID_HEADER,
                correlation_id
                    .parse()
                    .expect("correlation ID should be a valid header value"),
            );
        }
        next.run(req, extensions).await
    }
}

/// Build the shared reqwest client with the correlation middleware.
pub fn create_api_client(timeout: Duration) -> ClientWithMiddleware {
    use reqwest_middleware::ClientBuilder;

    let client = Client::builder()
        .user_agent("bazaar/0.1.0")
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    ClientBuilder::new(client).with(CorrelationMiddleware).build()
}

/// Error body shape the API uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Shared request helper. Cheap to clone.
#[derive(Clone)]
pub struct Http {
    client: ClientWithMiddleware,
    base_url: String,
    session: SessionHandle,
}

impl Http {
    pub fn new(base_url: impl Into<String>, session: SessionHandle, timeout: Duration) -> Self {
        Self {
            client: create_api_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.client.get(self.url(path));
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let builder = self.client.get(self.url(path)).query(query);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.client.post(self.url(path)).json(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// POST with no request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.client.post(self.url(path));
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// POST with no request body, ignoring any response body. For
    /// endpoints that acknowledge with 204 or an arbitrary JSON blob.
    pub async fn post_discard(&self, path: &str) -> Result<(), ApiError> {
        let builder = self.client.post(self.url(path));
        self.send(builder).await?;
        Ok(())
    }

    /// DELETE, ignoring any response body.
    pub async fn delete_discard(&self, path: &str) -> Result<(), ApiError> {
        let builder = self.client.delete(self.url(path));
        self.send(builder).await?;
        Ok(())
    }

    /// PUT with no request body.
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.client.put(self.url(path));
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.client.delete(self.url(path));
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Attach the bearer token, send, and classify the response status.
    async fn send(
        &self,
        mut builder: reqwest_middleware::RequestBuilder,
    ) -> Result<Response, ApiError> {
        if let Some(token) = self.session.token().await {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder.send().await.map_err(|e| ApiError::Network {
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = Self::error_message(response).await;

        if status == StatusCode::UNAUTHORIZED {
            info!("Received 401, expiring session");
            self.session.expire().await;
            return Err(ApiError::Unauthorized);
        }

        warn!("API call failed: {} - {}", status, message);
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ApiError::Validation { message })
            }
            StatusCode::CONFLICT => Err(ApiError::Conflict { message }),
            _ => Err(ApiError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Extract the server's error message from a non-success response.
    ///
    /// The API responds with `{"error": "..."}`; fall back to the raw body
    /// for anything else.
    async fn error_message(response: Response) -> String {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error.or(body.message).unwrap_or(text),
            Err(_) => text,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json().await.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }
}
