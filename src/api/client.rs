//! HTTP client for the remote user directory.
//!
//! The endpoint returns the full unfiltered list on every request; any
//! search-term filtering happens client-side in [`filter_by_name`].

use reqwest::Client;
use tracing::debug;

use crate::models::User;
use crate::utils::contains_ignore_case;

use super::ApiError;

/// Fixed endpoint returning the full user list. No query parameters are
/// ever sent; filtering is client-side.
const API_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the user directory.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the user list, filtered by `term` when it is non-empty.
    ///
    /// Issues a single GET for the full list; a non-success status becomes
    /// `ApiError::Http`, an unparseable body `ApiError::Decode`.
    pub async fn fetch_users(&self, term: &str) -> Result<Vec<User>, ApiError> {
        let response = self.client.get(API_URL).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        let users: Vec<User> = serde_json::from_str(&text)?;
        debug!(count = users.len(), "User list fetched");

        if term.is_empty() {
            Ok(users)
        } else {
            Ok(filter_by_name(users, term))
        }
    }
}

/// Keep only users whose name contains `term` case-insensitively.
/// Pure; preserves the order of the input list.
pub fn filter_by_name(users: Vec<User>, term: &str) -> Vec<User> {
    let needle = term.to_lowercase();
    users
        .into_iter()
        .filter(|u| contains_ignore_case(&u.name, &needle))
        .collect()
}
