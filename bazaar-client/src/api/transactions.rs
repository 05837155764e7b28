//! Transaction client: create/confirm/cancel sales and list them.
//!
//! All preconditions (caller is the seller, buyer is a valid candidate, no
//! competing pending transaction, caller is the counterparty on confirm)
//! are server-enforced; this client surfaces the resulting domain errors
//! and performs no local state transitions of its own.

use serde::Serialize;
use tracing::{info, warn};

use bazaar_core::{MeetingMethod, PotentialBuyer, ProductId, Transaction, TransactionId, UserId};

use crate::error::ApiError;
use crate::http::Http;

#[derive(Clone)]
pub struct TransactionClient {
    http: Http,
}

#[derive(Debug, Serialize)]
struct CreateTransactionRequest<'a> {
    product_id: &'a ProductId,
    buyer_id: &'a UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    agreed_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meeting_method: Option<MeetingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

impl TransactionClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Create a pending transaction for a product (mark-as-sold).
    ///
    /// The new transaction starts `pending` with the seller side confirmed.
    pub async fn create(
        &self,
        product_id: &ProductId,
        buyer_id: &UserId,
        agreed_price: Option<f64>,
        meeting_method: Option<MeetingMethod>,
        notes: Option<&str>,
    ) -> Result<Transaction, ApiError> {
        info!("Creating transaction for product {}", product_id);

        let transaction: Transaction = self
            .http
            .post(
                "/api/transactions",
                &CreateTransactionRequest {
                    product_id,
                    buyer_id,
                    agreed_price,
                    meeting_method,
                    notes,
                },
            )
            .await?;

        Self::check_consistency(&transaction);
        info!("Created transaction {}", transaction.id);
        Ok(transaction)
    }

    /// Confirm a pending transaction as the counterparty.
    pub async fn confirm(&self, id: &TransactionId) -> Result<Transaction, ApiError> {
        info!("Confirming transaction {}", id);
        let transaction: Transaction = self
            .http
            .put_empty(&format!("/api/transactions/{}/confirm", id))
            .await?;
        Self::check_consistency(&transaction);
        Ok(transaction)
    }

    /// Cancel a pending transaction. Fails from terminal states.
    pub async fn cancel(&self, id: &TransactionId) -> Result<Transaction, ApiError> {
        info!("Cancelling transaction {}", id);
        self.http
            .put_empty(&format!("/api/transactions/{}/cancel", id))
            .await
    }

    /// Pending transactions where the caller is either party.
    pub async fn list_pending(&self) -> Result<Vec<Transaction>, ApiError> {
        self.http.get("/api/transactions/pending").await
    }

    /// Confirmed transactions where the caller is either party.
    pub async fn list_confirmed(&self) -> Result<Vec<Transaction>, ApiError> {
        self.http.get("/api/transactions/confirmed").await
    }

    /// Look up a transaction among the caller's confirmed ones. Review
    /// entry points gate on this: `None` means reviews are still locked
    /// (the server independently rejects reviews on non-confirmed
    /// transactions).
    pub async fn find_confirmed(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, ApiError> {
        let confirmed = self.list_confirmed().await?;
        Ok(confirmed.into_iter().find(|t| &t.id == id))
    }

    /// Users eligible to be selected as the buyer for a product.
    ///
    /// The candidate list is derived server-side from prior contact about
    /// the product. An empty list is a normal answer, not an error.
    pub async fn potential_buyers(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<PotentialBuyer>, ApiError> {
        let buyers: Vec<PotentialBuyer> = self
            .http
            .get(&format!("/api/transactions/product/{}/buyers", product_id))
            .await?;
        info!(
            "Found {} potential buyers for product {}",
            buyers.len(),
            product_id
        );
        Ok(buyers)
    }

    fn check_consistency(transaction: &Transaction) {
        if !transaction.confirmation_consistent() {
            warn!(
                "Transaction {} has inconsistent confirmation state: status={}, seller={}, buyer={}",
                transaction.id,
                transaction.status,
                transaction.seller_confirmed,
                transaction.buyer_confirmed
            );
        }
    }
}
