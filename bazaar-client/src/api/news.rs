//! News widget client: paginated article feeds per category.
//!
//! Aggregation happens upstream; the client just pages through feeds.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

use bazaar_core::Pagination;

use crate::error::ApiError;
use crate::http::Http;

/// Feed categories the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsCategory {
    World,
    Regional,
    Sports,
    Entertainment,
}

impl NewsCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "world" => Some(Self::World),
            "regional" => Some(Self::Regional),
            "sports" => Some(Self::Sports),
            "entertainment" => Some(Self::Entertainment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Regional => "regional",
            Self::Sports => "sports",
            Self::Entertainment => "entertainment",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct NewsClient {
    http: Http,
}

impl NewsClient {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn feed(
        &self,
        category: NewsCategory,
        page: u32,
        limit: u32,
    ) -> Result<NewsPage, ApiError> {
        self.http
            .get_query(
                &format!("/api/news/{}", category),
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await
    }
}
