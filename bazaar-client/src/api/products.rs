//! Product browsing client.

use serde::Deserialize;

use bazaar_core::{Pagination, Product, ProductId};

use crate::error::ApiError;
use crate::http::Http;

#[derive(Clone)]
pub struct ProductClient {
    http: Http,
}

/// One page of listings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

impl ProductClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Browse listings, newest first. Pages are 1-indexed.
    pub async fn browse(&self, page: u32, limit: u32) -> Result<ProductPage, ApiError> {
        self.http
            .get_query(
                "/api/products",
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await
    }

    pub async fn get(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.http.get(&format!("/api/products/{}", id)).await
    }
}
