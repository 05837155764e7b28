//! Authentication client: login, registration, current-user lookup.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::http::Http;
use crate::session::{Session, SessionUser};

#[derive(Clone)]
pub struct AuthClient {
    http: Http,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: SessionUser,
}

impl AuthClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Log in and store the issued session.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        info!("Logging in as {}", email);

        let response: LoginResponse = self
            .http
            .post("/api/auth/login", &LoginRequest { email, password })
            .await?;

        let user = response.user.clone();
        self.http
            .session()
            .store(Session {
                token: response.token,
                user: response.user,
            })
            .await
            .map_err(|e| ApiError::Api {
                status: 0,
                message: format!("failed to persist session: {}", e),
            })?;

        info!("Logged in as {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ApiError> {
        info!("Registering account for {}", email);
        self.http
            .post(
                "/api/auth/register",
                &RegisterRequest {
                    username,
                    email,
                    password,
                },
            )
            .await
    }

    /// Fetch the authenticated user's record.
    pub async fn current_user(&self) -> Result<SessionUser, ApiError> {
        self.http.get("/api/auth/me").await
    }

    /// Explicit logout: clears the stored session without firing the
    /// auth-expired channel.
    pub async fn logout(&self) -> Result<(), ApiError> {
        info!("Logging out");
        self.http
            .session()
            .clear()
            .await
            .map_err(|e| ApiError::Api {
                status: 0,
                message: format!("failed to clear session: {}", e),
            })
    }
}
