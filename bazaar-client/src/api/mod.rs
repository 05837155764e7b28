//! Typed clients for the marketplace API, one per backend surface.
//!
//! These are thin request/response wrappers: every data operation is a
//! single HTTP call, with the server authoritative for all business rules.
//! Each client holds a clone of the shared [`crate::http::Http`] helper.

pub mod auth;
pub mod cart;
pub mod news;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod search;
pub mod transactions;

pub use auth::AuthClient;
pub use cart::CartClient;
pub use news::NewsClient;
pub use orders::OrderClient;
pub use products::ProductClient;
pub use reviews::ReviewClient;
pub use search::SearchClient;
pub use transactions::TransactionClient;
