//! Shared HTTP client setup.

use crate::error::{DataError, Result};
use std::time::Duration;

/// Timeout applied to every upstream request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a `reqwest` client with the given user agent.
pub(crate) fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(DataError::Network)
}

/// Strip a trailing slash so paths can be appended with `format!`.
pub(crate) fn trim_base_url(url: impl Into<String>) -> String {
    let mut url = url.into();
    while url.ends_with('/') {
        url.pop();
    }
    url
}
