//! Review types: ratings left by one transaction party about the other.
//!
//! A review is scoped to exactly one transaction and one direction
//! (`review_type` names the role under review, not the reviewer). At most
//! one review per (transaction, reviewer) pair exists; that uniqueness is
//! server-enforced and duplicate submissions are an error path here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ReviewId, TransactionId, UserId};

/// A star rating in [1, 5].
///
/// Construction is the only validation point; a `Rating` value is always in
/// range, so out-of-range ratings are rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

/// Error returned when a rating falls outside [1, 5].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingOutOfRange(pub u8);

impl fmt::Display for RatingOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rating must be between 1 and 5, got {}", self.0)
    }
}

impl std::error::Error for RatingOutOfRange {}

impl Rating {
    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange(value))
        }
    }

    /// Parse an optional sub-rating where 0 means "not provided".
    pub fn optional(value: u8) -> Result<Option<Self>, RatingOutOfRange> {
        if value == 0 {
            Ok(None)
        } else {
            Self::new(value).map(Some)
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which role is being reviewed (not who is reviewing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    Seller,
    Buyer,
}

impl ReviewType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "seller" => Some(Self::Seller),
            "buyer" => Some(Self::Buyer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
        }
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional per-aspect sub-ratings, each independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubRatings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_as_described_rating: Option<Rating>,
}

impl SubRatings {
    pub fn is_empty(&self) -> bool {
        self.communication_rating.is_none()
            && self.reliability_rating.is_none()
            && self.item_as_described_rating.is_none()
    }
}

/// A rating+text record tied to one confirmed transaction and one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub transaction_id: TransactionId,
    pub reviewer_id: UserId,
    pub reviewed_user_id: UserId,
    pub review_type: ReviewType,
    pub rating: Rating,
    #[serde(flatten)]
    pub sub_ratings: SubRatings,
    #[serde(default)]
    pub review_text: Option<String>,
    /// Adjusted only via explicit mark/unmark-helpful calls; the client
    /// refetches rather than mutating this locally.
    pub helpful_count: u32,
    /// One-shot response from the reviewed party, if any.
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Returns true if the reviewed party can still respond.
    pub fn can_respond(&self) -> bool {
        self.response_text.is_none()
    }
}

/// Count of reviews at each star value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatingHistogram {
    #[serde(rename = "1")]
    pub one: u64,
    #[serde(rename = "2")]
    pub two: u64,
    #[serde(rename = "3")]
    pub three: u64,
    #[serde(rename = "4")]
    pub four: u64,
    #[serde(rename = "5")]
    pub five: u64,
}

impl RatingHistogram {
    pub fn total(&self) -> u64 {
        self.one + self.two + self.three + self.four + self.five
    }

    pub fn count_for(&self, rating: Rating) -> u64 {
        match rating.value() {
            1 => self.one,
            2 => self.two,
            3 => self.three,
            4 => self.four,
            _ => self.five,
        }
    }
}

/// Aggregate stats for one role (as seller or as buyer).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleStats {
    pub average_rating: f64,
    pub review_count: u64,
}

/// Cached, timestamped aggregate of a user's reviews.
///
/// This is a derived projection computed server-side; `last_calculated_at`
/// is the only freshness guarantee a client may assume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub user_id: UserId,
    pub overall_average: f64,
    pub total_reviews: u64,
    pub as_seller: RoleStats,
    pub as_buyer: RoleStats,
    pub histogram: RatingHistogram,
    #[serde(default)]
    pub communication_average: Option<f64>,
    #[serde(default)]
    pub reliability_average: Option<f64>,
    #[serde(default)]
    pub item_as_described_average: Option<f64>,
    pub confirmed_sales: u64,
    pub confirmed_purchases: u64,
    pub last_calculated_at: DateTime<Utc>,
}
