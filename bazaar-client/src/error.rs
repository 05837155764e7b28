//! Error taxonomy for API calls.
//!
//! Four failure families exist in this client: authorization (401, handled
//! globally by clearing the session), validation (surfaced inline, form
//! stays open), conflict (duplicate review, invalid state transition -
//! surfaced as the opaque server-provided message), and network/decode
//! failures (generic "failed to ..." text). Everything is caught at the
//! flow boundary and converted to a user-visible string; nothing is retried
//! automatically.

use std::fmt;

/// A failed API call, classified by response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401. The HTTP layer has already cleared the session and notified
    /// auth-expired subscribers by the time this is returned.
    Unauthorized,
    /// 400/422 with the server's message.
    Validation { message: String },
    /// 409: duplicate review, invalid state transition, and similar.
    /// The message is opaque; the client does not disambiguate.
    Conflict { message: String },
    /// Any other non-success status.
    Api { status: u16, message: String },
    /// Transport-level failure (connect, timeout, etc.).
    Network { message: String },
    /// Response body did not match the expected shape.
    Decode { message: String },
}

impl ApiError {
    /// Converts the error into the string a flow surfaces to the user.
    ///
    /// `action` is a short verb phrase, e.g. "create transaction".
    pub fn surface(&self, action: &str) -> String {
        match self {
            Self::Unauthorized => "session expired, please log in again".to_string(),
            Self::Validation { message } | Self::Conflict { message } => message.clone(),
            Self::Api { status, message } => {
                format!("failed to {} ({}): {}", action, status, message)
            }
            Self::Network { .. } | Self::Decode { .. } => format!("failed to {}", action),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Validation { message } => write!(f, "validation failed: {}", message),
            Self::Conflict { message } => write!(f, "conflict: {}", message),
            Self::Api { status, message } => write!(f, "API error {}: {}", status, message),
            Self::Network { message } => write!(f, "network error: {}", message),
            Self::Decode { message } => write!(f, "decode error: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}
