//! HTTP client library for the Bazaar marketplace.
//!
//! Wraps the marketplace REST API with typed clients, a persistent
//! session, debounced search suggestions, and explicit state machines
//! for the multi-step flows (mark-as-sold, review submission, checkout).
//!
//! Layering, bottom up:
//! - [`config`]: environment-driven configuration
//! - [`session`]: persisted login session with expiry notification
//! - [`http`]: authenticated request plumbing and the error taxonomy
//! - [`api`]: one client per API surface
//! - [`typeahead`]: debounced, stale-discarding suggestion fetcher
//! - [`flow`]: pure state machines plus an effect interpreter

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod session;
pub mod typeahead;

pub use config::Config;
pub use error::ApiError;
pub use http::{create_api_client, Http};
pub use session::{Session, SessionHandle, SessionUser};
