//! Request configuration and URL construction.
//!
//! A [`LoadRequest`] is a snapshot of everything that identifies one search
//! against the content API.  The loader compares requests by value: two equal
//! requests are the same logical task.
//!
//! [`build_url`] turns a request into the URL the fetcher hits.  It never
//! fails; a malformed base URL is passed through and rejected by the fetcher.

/// Search endpoint of the content API.
pub const DEFAULT_BASE_URL: &str = "https://content.guardianapis.com/search";

/// Result ordering used when the settings don't name one.
pub const DEFAULT_ORDER_BY: &str = "newest";

/// Always ask the API to include contributor tags, which feed
/// [`Article::attribution`](super::Article::attribution).
const SHOW_TAGS: &str = "contributor";

/// Configuration identifying which resource to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadRequest {
    /// Endpoint the query string is appended to.
    pub base_url: String,
    /// Free-text topic filter.  Empty means "everything".
    pub topic: String,
    /// Result ordering understood by the API (`newest`, `oldest`, `relevance`).
    pub order_by: String,
    /// Lower date bound, `YYYY-MM-DD`.
    pub from_date: String,
    /// Upper date bound, `YYYY-MM-DD`.
    pub to_date: String,
    /// API key sent with every request.
    pub api_key: String,
}

impl Default for LoadRequest {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            topic: String::new(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            from_date: "2018-01-01".to_string(),
            to_date: "2018-12-31".to_string(),
            api_key: "test".to_string(),
        }
    }
}

/// Build the fully-qualified request URL for `request`.
///
/// Parameters always appear in the same order so equal requests produce
/// byte-identical URLs.
pub fn build_url(request: &LoadRequest) -> String {
    let params = [
        ("from-date", request.from_date.as_str()),
        ("to-date", request.to_date.as_str()),
        ("show-tags", SHOW_TAGS),
        ("order-by", request.order_by.as_str()),
        ("q", request.topic.as_str()),
        ("api-key", request.api_key.as_str()),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if request.base_url.contains('?') { '&' } else { '?' };
    format!("{}{separator}{query}", request.base_url)
}
