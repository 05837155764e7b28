//! Product listing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProductId, UserId};

/// A marketplace listing as returned by the browse/search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub seller_id: UserId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// True once a pending or confirmed transaction exists for the listing.
    #[serde(default)]
    pub sold: bool,
    pub created_at: DateTime<Utc>,
}
