//! Cart client.
//!
//! Every mutation returns the full updated cart; the client never adjusts
//! a local copy.

use serde::Serialize;
use tracing::info;

use bazaar_core::{Cart, ProductId};

use crate::error::ApiError;
use crate::http::Http;

#[derive(Clone)]
pub struct CartClient {
    http: Http,
}

#[derive(Debug, Serialize)]
struct AddItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

impl CartClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn get(&self) -> Result<Cart, ApiError> {
        self.http.get("/api/cart").await
    }

    pub async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, ApiError> {
        info!("Adding product {} to cart (x{})", product_id, quantity);
        self.http
            .post(
                "/api/cart/items",
                &AddItemRequest {
                    product_id,
                    quantity,
                },
            )
            .await
    }

    pub async fn remove_item(&self, product_id: &ProductId) -> Result<Cart, ApiError> {
        info!("Removing product {} from cart", product_id);
        self.http
            .delete(&format!("/api/cart/items/{}", product_id))
            .await
    }
}
