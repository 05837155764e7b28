//! Cart and checkout types.
//!
//! The checkout wizard collects a shipping address, a shipping option, and a
//! payment method, then places an order. Order numbers are issued by the
//! server in the `ORD-<epoch>-<seq>` shape; `OrderNumber::parse` is the
//! client-side boundary check for that format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProductId;

/// Server-issued order identifier, e.g. `ORD-1716212345-42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

/// Error returned when an order number does not match `ORD-<digits>-<digits>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOrderNumber(pub String);

impl fmt::Display for InvalidOrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed order number: {:?}", self.0)
    }
}

impl std::error::Error for InvalidOrderNumber {}

impl OrderNumber {
    /// Parse and validate an order number.
    pub fn parse(s: &str) -> Result<Self, InvalidOrderNumber> {
        let rest = s
            .strip_prefix("ORD-")
            .ok_or_else(|| InvalidOrderNumber(s.to_string()))?;
        let mut parts = rest.splitn(2, '-');
        let first = parts.next().unwrap_or("");
        let second = parts.next().unwrap_or("");
        let all_digits =
            |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
        if all_digits(first) && all_digits(second) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidOrderNumber(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = InvalidOrderNumber;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<OrderNumber> for String {
    fn from(n: OrderNumber) -> Self {
        n.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shipping address collected by the checkout wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Returns the names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.full_name.trim().is_empty() {
            missing.push("full_name");
        }
        if self.street.trim().is_empty() {
            missing.push("street");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.postal_code.trim().is_empty() {
            missing.push("postal_code");
        }
        if self.country.trim().is_empty() {
            missing.push("country");
        }
        missing
    }
}

/// A shipping option offered by the server at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub id: String,
    pub label: String,
    pub price: f64,
}

/// How the order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(Self::Card),
            "paypal" => Some(Self::Paypal),
            "cash_on_delivery" => Some(Self::CashOnDelivery),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

/// The authenticated user's cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Total item count across lines (what the cart badge shows).
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.price * f64::from(i.quantity))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A placed order as confirmed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: OrderNumber,
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub shipping_option: ShippingOption,
    pub payment_method: PaymentMethod,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_parse_valid() {
        let n = OrderNumber::parse("ORD-1716212345-42").unwrap();
        assert_eq!(n.as_str(), "ORD-1716212345-42");
    }

    #[test]
    fn test_order_number_parse_invalid() {
        for bad in [
            "ORD-",
            "ORD-123",
            "ORD-123-",
            "ORD--7",
            "ORD-12a-34",
            "ORDER-1-2",
            "ord-1-2",
            "",
        ] {
            assert!(OrderNumber::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_order_number_deserialization_validates() {
        let ok: OrderNumber = serde_json::from_str("\"ORD-1-2\"").unwrap();
        assert_eq!(ok.as_str(), "ORD-1-2");
        assert!(serde_json::from_str::<OrderNumber>("\"ORD-x-2\"").is_err());
    }

    #[test]
    fn test_address_missing_fields() {
        let address = ShippingAddress {
            full_name: "Ada Lovelace".into(),
            street: "".into(),
            city: "London".into(),
            postal_code: "  ".into(),
            country: "UK".into(),
            phone: None,
        };
        assert_eq!(address.missing_fields(), vec!["street", "postal_code"]);
    }

    #[test]
    fn test_cart_item_count_and_subtotal() {
        let cart = Cart {
            items: vec![
                CartItem {
                    product_id: ProductId::from("p1"),
                    title: "Lamp".into(),
                    price: 10.0,
                    quantity: 2,
                },
                CartItem {
                    product_id: ProductId::from("p2"),
                    title: "Chair".into(),
                    price: 40.0,
                    quantity: 1,
                },
            ],
        };
        assert_eq!(cart.item_count(), 3);
        assert!((cart.subtotal() - 60.0).abs() < f64::EPSILON);
        assert!(!cart.is_empty());
        assert_eq!(Cart::default().item_count(), 0);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(
            PaymentMethod::parse("cash_on_delivery"),
            Some(PaymentMethod::CashOnDelivery)
        );
        assert_eq!(PaymentMethod::parse("iou"), None);
    }
}
