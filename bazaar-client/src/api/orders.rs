//! Checkout/order client.

use serde::Serialize;
use tracing::info;

use bazaar_core::{Order, PaymentMethod, ShippingAddress, ShippingOption};

use crate::error::ApiError;
use crate::http::Http;

#[derive(Clone)]
pub struct OrderClient {
    http: Http,
}

#[derive(Debug, Serialize)]
struct PlaceOrderRequest<'a> {
    shipping_address: &'a ShippingAddress,
    shipping_option_id: &'a str,
    payment_method: PaymentMethod,
}

impl OrderClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Shipping options offered for the current cart.
    pub async fn shipping_options(&self) -> Result<Vec<ShippingOption>, ApiError> {
        self.http.get("/api/checkout/shipping-options").await
    }

    /// Place an order from the current cart. The response carries the
    /// server-issued `ORD-...` order number, validated at deserialization.
    pub async fn place(
        &self,
        shipping_address: &ShippingAddress,
        shipping_option_id: &str,
        payment_method: PaymentMethod,
    ) -> Result<Order, ApiError> {
        info!("Placing order");
        let order: Order = self
            .http
            .post(
                "/api/orders",
                &PlaceOrderRequest {
                    shipping_address,
                    shipping_option_id,
                    payment_method,
                },
            )
            .await?;
        info!("Placed order {}", order.order_number);
        Ok(order)
    }
}
