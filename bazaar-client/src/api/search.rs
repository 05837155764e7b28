//! Search client: full product search and typeahead suggestions.
//!
//! Ranking is entirely server-side; these calls only carry the query.

use async_trait::async_trait;
use serde::Deserialize;

use bazaar_core::{Pagination, Product};

use crate::error::ApiError;
use crate::http::Http;
use crate::typeahead::SuggestionSource;

#[derive(Clone)]
pub struct SearchClient {
    http: Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    suggestions: Vec<String>,
}

impl SearchClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Full search over product listings.
    pub async fn products(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<SearchResults, ApiError> {
        self.http
            .get_query(
                "/api/search/products",
                &[
                    ("q", query.to_string()),
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    /// Typeahead suggestions for a partial query.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let response: SuggestionsResponse = self
            .http
            .get_query("/api/search/suggestions", &[("q", query.to_string())])
            .await?;
        Ok(response.suggestions)
    }
}

#[async_trait]
impl SuggestionSource for SearchClient {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        SearchClient::suggestions(self, query).await
    }
}
