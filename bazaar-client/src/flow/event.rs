//! Events that trigger flow transitions.
//!
//! Events are either user inputs (selections, form edits, submit presses)
//! or results of executed effects (API responses and failures). They are
//! inputs to the pure transition functions.

use bazaar_core::{
    Cart, Order, PaymentMethod, PotentialBuyer, Rating, Review, ShippingAddress, ShippingOption,
    SubRatings, Transaction, UserId,
};

use super::state::SaleTerms;

/// All events that can trigger flow transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    // =========================================================================
    // Mark-as-sold
    // =========================================================================
    /// The seller opened the mark-as-sold form.
    SaleOpened,

    /// Candidate buyers arrived. An empty list is a valid result.
    BuyersLoaded { candidates: Vec<PotentialBuyer> },

    /// The candidate fetch failed.
    BuyersLoadFailed { error: String },

    /// The seller picked a buyer from the candidate list.
    BuyerSelected { buyer_id: UserId },

    /// The seller edited the optional terms.
    TermsUpdated { terms: SaleTerms },

    /// The seller pressed submit.
    SaleSubmitted,

    /// The transaction was created.
    TransactionCreated { transaction: Transaction },

    /// Transaction creation failed.
    TransactionCreateFailed { error: String },

    // =========================================================================
    // Review
    // =========================================================================
    /// The reviewer set the overall rating.
    RatingSet { rating: Rating },

    /// The reviewer edited the optional sub-ratings.
    SubRatingsSet { sub_ratings: SubRatings },

    /// The reviewer edited the free-text body.
    ReviewTextSet { text: Option<String> },

    /// The reviewer pressed submit.
    ReviewSubmitted,

    /// The review was created.
    ReviewCreated { review: Review },

    /// Review creation failed (duplicate submissions arrive here as opaque
    /// server text; the flow does not disambiguate).
    ReviewCreateFailed { error: String },

    // =========================================================================
    // Checkout
    // =========================================================================
    /// The buyer opened checkout.
    CheckoutOpened,

    /// Cart contents arrived.
    CartLoaded { cart: Cart },

    /// The cart fetch failed.
    CartLoadFailed { error: String },

    /// The buyer proceeded from the cart step.
    CartConfirmed,

    /// The buyer submitted a shipping address.
    AddressEntered { address: ShippingAddress },

    /// Shipping options arrived from the server.
    ShippingOptionsLoaded { options: Vec<ShippingOption> },

    /// The shipping options fetch failed.
    ShippingOptionsLoadFailed { error: String },

    /// The buyer picked a shipping option by id.
    ShippingSelected { option_id: String },

    /// The buyer picked a payment method.
    PaymentSelected { method: PaymentMethod },

    /// The buyer confirmed the order review step.
    OrderReviewed,

    /// The order was placed.
    OrderPlaced { order: Order },

    /// Order placement failed.
    OrderPlaceFailed { error: String },
}

impl FlowEvent {
    /// A summary suitable for logging, avoiding large payloads.
    pub fn log_summary(&self) -> String {
        match self {
            Self::SaleOpened => "SaleOpened".to_string(),
            Self::BuyersLoaded { candidates } => {
                format!("BuyersLoaded {{ count: {} }}", candidates.len())
            }
            Self::BuyersLoadFailed { error } => {
                format!("BuyersLoadFailed {{ error: {} }}", error)
            }
            Self::BuyerSelected { buyer_id } => {
                format!("BuyerSelected {{ buyer: {} }}", buyer_id)
            }
            Self::TermsUpdated { .. } => "TermsUpdated".to_string(),
            Self::SaleSubmitted => "SaleSubmitted".to_string(),
            Self::TransactionCreated { transaction } => {
                format!("TransactionCreated {{ id: {} }}", transaction.id)
            }
            Self::TransactionCreateFailed { error } => {
                format!("TransactionCreateFailed {{ error: {} }}", error)
            }
            Self::RatingSet { rating } => format!("RatingSet {{ rating: {} }}", rating),
            Self::SubRatingsSet { .. } => "SubRatingsSet".to_string(),
            Self::ReviewTextSet { .. } => "ReviewTextSet".to_string(),
            Self::ReviewSubmitted => "ReviewSubmitted".to_string(),
            Self::ReviewCreated { review } => {
                format!("ReviewCreated {{ id: {} }}", review.id)
            }
            Self::ReviewCreateFailed { error } => {
                format!("ReviewCreateFailed {{ error: {} }}", error)
            }
            Self::CheckoutOpened => "CheckoutOpened".to_string(),
            Self::CartLoaded { cart } => {
                format!("CartLoaded {{ items: {} }}", cart.item_count())
            }
            Self::CartLoadFailed { error } => format!("CartLoadFailed {{ error: {} }}", error),
            Self::CartConfirmed => "CartConfirmed".to_string(),
            Self::AddressEntered { .. } => "AddressEntered".to_string(),
            Self::ShippingOptionsLoaded { options } => {
                format!("ShippingOptionsLoaded {{ count: {} }}", options.len())
            }
            Self::ShippingOptionsLoadFailed { error } => {
                format!("ShippingOptionsLoadFailed {{ error: {} }}", error)
            }
            Self::ShippingSelected { option_id } => {
                format!("ShippingSelected {{ option: {} }}", option_id)
            }
            Self::PaymentSelected { method } => {
                format!("PaymentSelected {{ method: {} }}", method)
            }
            Self::OrderReviewed => "OrderReviewed".to_string(),
            Self::OrderPlaced { order } => {
                format!("OrderPlaced {{ number: {} }}", order.order_number)
            }
            Self::OrderPlaceFailed { error } => {
                format!("OrderPlaceFailed {{ error: {} }}", error)
            }
        }
    }
}
