//! State types for the flow state machines.
//!
//! Following "make illegal states unrepresentable", each flow is an enum
//! whose variants carry exactly the data valid in that state. Errors are
//! surfaced strings attached to the state the user returns to; nothing is
//! retried automatically.

use bazaar_core::{
    Cart, MeetingMethod, Order, PaymentMethod, PotentialBuyer, ProductId, Rating, Review,
    ShippingAddress, ShippingOption, SubRatings, Transaction, TransactionId, ReviewType, UserId,
};

/// Negotiated terms captured by the mark-as-sold form. All optional; the
/// only validation is that the price parsed as a number upstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaleTerms {
    pub agreed_price: Option<f64>,
    pub meeting_method: Option<MeetingMethod>,
    pub notes: Option<String>,
}

/// The mark-as-sold flow for one product.
///
/// Entry requires the product id and title; the flow fetches the candidate
/// buyer list on open. An empty candidate list is a valid display state
/// with submission disabled, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleFlowState {
    /// Flow constructed, buyer list not yet requested.
    Idle {
        product_id: ProductId,
        product_title: String,
    },

    /// Candidate buyers are being fetched.
    LoadingBuyers {
        product_id: ProductId,
        product_title: String,
    },

    /// Form is open. Submission requires a selected buyer.
    SelectingBuyer {
        product_id: ProductId,
        product_title: String,
        candidates: Vec<PotentialBuyer>,
        selected: Option<UserId>,
        terms: SaleTerms,
        error: Option<String>,
    },

    /// Transaction creation request is in flight.
    Submitting {
        product_id: ProductId,
        product_title: String,
        candidates: Vec<PotentialBuyer>,
        buyer_id: UserId,
        terms: SaleTerms,
    },

    /// Terminal: transaction created, completion signalled to the caller.
    Completed { transaction: Transaction },
}

impl SaleFlowState {
    pub fn open(product_id: ProductId, product_title: impl Into<String>) -> Self {
        Self::Idle {
            product_id,
            product_title: product_title.into(),
        }
    }

    /// True once the flow has finished successfully.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether the submit control is enabled: a buyer must be selected.
    pub fn submission_enabled(&self) -> bool {
        matches!(
            self,
            Self::SelectingBuyer {
                selected: Some(_),
                ..
            }
        )
    }

    /// True when the buyer list came back empty (the empty-state display).
    pub fn has_no_candidates(&self) -> bool {
        matches!(
            self,
            Self::SelectingBuyer { candidates, .. } if candidates.is_empty()
        )
    }

    /// The surfaced error, if the flow is showing one.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::SelectingBuyer { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

/// The review form for one transaction and one fixed direction.
///
/// `review_type` (which role is under review) is set when the flow is
/// created and never changes for the flow's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewFlowState {
    /// Form is open; the overall rating is required before submission.
    Drafting {
        transaction_id: TransactionId,
        review_type: ReviewType,
        rating: Option<Rating>,
        sub_ratings: SubRatings,
        review_text: Option<String>,
        error: Option<String>,
    },

    /// Review creation request is in flight.
    Submitting {
        transaction_id: TransactionId,
        review_type: ReviewType,
        rating: Rating,
        sub_ratings: SubRatings,
        review_text: Option<String>,
    },

    /// Terminal: review created.
    Completed { review: Review },
}

impl ReviewFlowState {
    pub fn open(transaction_id: TransactionId, review_type: ReviewType) -> Self {
        Self::Drafting {
            transaction_id,
            review_type,
            rating: None,
            sub_ratings: SubRatings::default(),
            review_text: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Submission requires the overall rating.
    pub fn submission_enabled(&self) -> bool {
        matches!(self, Self::Drafting { rating: Some(_), .. })
    }

    /// The direction this flow was opened with.
    pub fn review_type(&self) -> ReviewType {
        match self {
            Self::Drafting { review_type, .. } => *review_type,
            Self::Submitting { review_type, .. } => *review_type,
            Self::Completed { review } => review.review_type,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Drafting { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

/// Everything the checkout wizard has collected so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderDraft {
    pub cart: Cart,
    pub address: Option<ShippingAddress>,
    pub shipping: Option<ShippingOption>,
    pub payment: Option<PaymentMethod>,
}

/// The multi-step checkout wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutFlowState {
    /// Cart contents are being fetched.
    LoadingCart,

    /// Cart review step. Proceeding requires a non-empty cart.
    Cart {
        draft: OrderDraft,
        error: Option<String>,
    },

    /// Shipping address entry.
    AddressEntry {
        draft: OrderDraft,
        error: Option<String>,
    },

    /// Shipping method selection; options come from the server.
    ShippingSelection {
        draft: OrderDraft,
        options: Vec<ShippingOption>,
        error: Option<String>,
    },

    /// Payment method selection.
    PaymentSelection {
        draft: OrderDraft,
        error: Option<String>,
    },

    /// Final review before placing the order. Shows the chosen address,
    /// the items, and the totals.
    ReviewOrder {
        draft: OrderDraft,
        error: Option<String>,
    },

    /// Order placement request is in flight.
    PlacingOrder { draft: OrderDraft },

    /// Terminal: order placed.
    Confirmed { order: Order },
}

impl CheckoutFlowState {
    pub fn open() -> Self {
        Self::LoadingCart
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// The review step's summary: chosen address and cart items.
    /// Only present in `ReviewOrder`.
    pub fn order_summary(&self) -> Option<(&ShippingAddress, &Cart)> {
        match self {
            Self::ReviewOrder { draft, .. } => {
                draft.address.as_ref().map(|address| (address, &draft.cart))
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Cart { error, .. }
            | Self::AddressEntry { error, .. }
            | Self::ShippingSelection { error, .. }
            | Self::PaymentSelection { error, .. }
            | Self::ReviewOrder { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}
