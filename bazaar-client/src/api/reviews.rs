//! Review client: create reviews, list them, fetch stats, vote, respond.

use serde::{Deserialize, Serialize};
use tracing::info;

use bazaar_core::{
    Pagination, Rating, Review, ReviewId, ReviewStats, ReviewType, SubRatings, TransactionId,
    UserId,
};

use crate::error::ApiError;
use crate::http::Http;

#[derive(Clone)]
pub struct ReviewClient {
    http: Http,
}

#[derive(Debug, Serialize)]
struct CreateReviewRequest<'a> {
    rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_text: Option<&'a str>,
    #[serde(flatten)]
    sub_ratings: SubRatings,
}

#[derive(Debug, Serialize)]
struct RespondRequest<'a> {
    response_text: &'a str,
}

/// One page of a user's reviews.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub pagination: Pagination,
}

impl ReviewClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Create a review for a confirmed transaction.
    ///
    /// The UI gates the entry point on `status == confirmed`, but the
    /// server is authoritative; non-confirmed transactions and duplicate
    /// submissions come back as conflict errors. `Rating` and `SubRatings`
    /// are validated at construction, so out-of-range values can never
    /// reach this call.
    pub async fn create(
        &self,
        transaction_id: &TransactionId,
        rating: Rating,
        review_text: Option<&str>,
        sub_ratings: SubRatings,
    ) -> Result<Review, ApiError> {
        info!("Submitting review for transaction {}", transaction_id);
        let review: Review = self
            .http
            .post(
                &format!("/api/reviews/transaction/{}", transaction_id),
                &CreateReviewRequest {
                    rating,
                    review_text,
                    sub_ratings,
                },
            )
            .await?;
        info!("Created review {}", review.id);
        Ok(review)
    }

    /// Paginated reviews about a user, optionally filtered by the role
    /// under review. Pages are 1-indexed.
    pub async fn user_reviews(
        &self,
        user_id: &UserId,
        review_type: Option<ReviewType>,
        page: u32,
        limit: u32,
    ) -> Result<ReviewPage, ApiError> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(t) = review_type {
            query.push(("type", t.as_str().to_string()));
        }
        self.http
            .get_query(&format!("/api/reviews/user/{}", user_id), &query)
            .await
    }

    /// The cached stats snapshot for a user. Freshness is bounded only by
    /// `last_calculated_at`.
    pub async fn user_review_stats(&self, user_id: &UserId) -> Result<ReviewStats, ApiError> {
        self.http
            .get(&format!("/api/reviews/user/{}/stats", user_id))
            .await
    }

    /// Mark a review helpful. Idempotent per caller on the server side;
    /// callers refetch the list afterwards instead of bumping a local
    /// count, so concurrent voters cannot cause drift.
    pub async fn mark_helpful(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        self.http
            .post_discard(&format!("/api/reviews/{}/helpful", review_id))
            .await
    }

    /// Remove a helpful mark. Same refetch discipline as `mark_helpful`.
    pub async fn remove_helpful(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        self.http
            .delete_discard(&format!("/api/reviews/{}/helpful", review_id))
            .await
    }

    /// Post the reviewed party's one-shot response. Fails with a conflict
    /// if a response already exists.
    pub async fn respond(
        &self,
        review_id: &ReviewId,
        response_text: &str,
    ) -> Result<Review, ApiError> {
        info!("Responding to review {}", review_id);
        self.http
            .post(
                &format!("/api/reviews/{}/respond", review_id),
                &RespondRequest { response_text },
            )
            .await
    }
}
