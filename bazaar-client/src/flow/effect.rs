//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of a transition. They
//! are pure data; the interpreter executes them against the API clients.
//! This separation lets the transition logic be tested without HTTP.

use bazaar_core::{
    MeetingMethod, OrderNumber, PaymentMethod, ProductId, Rating, ReviewId, ShippingAddress,
    SubRatings, TransactionId, UserId,
};

/// All effects that flow transitions can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    // =========================================================================
    // Data fetches
    // =========================================================================
    /// Fetch the candidate buyer list for a product.
    LoadPotentialBuyers { product_id: ProductId },

    /// Fetch the authenticated user's cart.
    LoadCart,

    /// Fetch the shipping options for the current cart.
    LoadShippingOptions,

    // =========================================================================
    // Submissions
    // =========================================================================
    /// Create the pending transaction (mark-as-sold).
    CreateTransaction {
        product_id: ProductId,
        buyer_id: UserId,
        agreed_price: Option<f64>,
        meeting_method: Option<MeetingMethod>,
        notes: Option<String>,
    },

    /// Submit a review for a confirmed transaction.
    SubmitReview {
        transaction_id: TransactionId,
        rating: Rating,
        sub_ratings: SubRatings,
        review_text: Option<String>,
    },

    /// Place the order collected by the checkout wizard.
    PlaceOrder {
        address: ShippingAddress,
        shipping_option_id: String,
        payment_method: PaymentMethod,
    },

    // =========================================================================
    // Signals
    // =========================================================================
    /// Signal flow completion to the caller. Flows perform no polling
    /// after this; the caller closes the form.
    NotifyCompleted { outcome: FlowOutcome },

    /// Log a message.
    Log { level: LogLevel, message: String },
}

/// What a completed flow produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    SaleRecorded { transaction_id: TransactionId },
    ReviewPosted { review_id: ReviewId },
    OrderConfirmed { order_number: OrderNumber },
}

/// Log level for logging effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
