//! Transaction types: a proposed or confirmed sale between two users.
//!
//! A transaction is created by the seller (mark-as-sold), starts `pending`
//! with the seller side already confirmed, and becomes `confirmed` once the
//! buyer confirms. `cancelled` and `disputed` are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ProductId, TransactionId, UserId};

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Disputed,
    Cancelled,
}

impl TransactionStatus {
    /// Returns true if no further confirmation transitions are permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Disputed | Self::Cancelled)
    }

    /// Parse from the wire/CLI representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "disputed" => Some(Self::Disputed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Disputed => "disputed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the parties agreed to hand over the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingMethod {
    InPerson,
    Shipping,
    Pickup,
    Other,
}

impl MeetingMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_person" => Some(Self::InPerson),
            "shipping" => Some(Self::Shipping),
            "pickup" => Some(Self::Pickup),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InPerson => "in_person",
            Self::Shipping => "shipping",
            Self::Pickup => "pickup",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MeetingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed or confirmed sale record linking a seller, a buyer, and
/// optionally a product (the product may be deleted after the sale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub product_id: Option<ProductId>,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub status: TransactionStatus,
    pub seller_confirmed: bool,
    pub buyer_confirmed: bool,
    pub seller_confirmed_at: Option<DateTime<Utc>>,
    pub buyer_confirmed_at: Option<DateTime<Utc>>,
    /// Set when both sides have confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    pub agreed_price: Option<f64>,
    pub meeting_method: Option<MeetingMethod>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Checks the status/confirmation invariant: `confirmed` holds exactly
    /// when both parties have confirmed.
    ///
    /// The server is authoritative for transitions; this is a consistency
    /// check applied to responses before they reach flow state.
    pub fn confirmation_consistent(&self) -> bool {
        let both = self.seller_confirmed && self.buyer_confirmed;
        match self.status {
            TransactionStatus::Confirmed => both,
            _ => !both,
        }
    }

    /// Returns true if reviews for this transaction are eligible.
    pub fn reviews_eligible(&self) -> bool {
        self.status == TransactionStatus::Confirmed
    }

    /// Returns the counterparty of `user`, or None if `user` is not a party.
    pub fn counterparty_of(&self, user: &UserId) -> Option<&UserId> {
        if &self.seller_id == user {
            Some(&self.buyer_id)
        } else if &self.buyer_id == user {
            Some(&self.seller_id)
        } else {
            None
        }
    }
}

/// A user eligible to be selected as the buyer when marking a product sold.
///
/// Candidates are derived server-side from prior contact about the product;
/// the client never computes this list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialBuyer {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}
