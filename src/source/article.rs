//! The record type produced by the loading pipeline.
//!
//! `Article` is one entry of a content API search result.  It is a plain
//! value: the parser builds it, the loader caches a `Vec` of them, and the UI
//! renders them.  Nothing mutates an article after construction.

use chrono::{DateTime, Utc};

/// A single article, as returned by the content API.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Article {
    /// Headline.  Expected to be non-empty, but not enforced.
    pub title: String,

    /// Section the article was published in (e.g. "Technology").
    pub category: String,

    /// Publication timestamp in the API's own representation
    /// (ISO-8601 with time, e.g. `2018-05-01T10:00:00Z`).
    pub published_at: String,

    /// Contributor names, comma separated.  Empty when the API sent none.
    pub attribution: String,

    /// URL of the full article.
    pub link: String,
}

impl Article {
    /// Parse [`published_at`](Self::published_at) as an RFC 3339 timestamp.
    ///
    /// Returns `None` when the API sent something chrono cannot read; callers
    /// fall back to [`published_day`](Self::published_day).
    pub fn published(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The date portion of the raw timestamp (everything before the `T`).
    pub fn published_day(&self) -> &str {
        self.published_at
            .split('T')
            .next()
            .unwrap_or(&self.published_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_article(published_at: &str) -> Article {
        Article {
            title: "Title".to_string(),
            category: "tech".to_string(),
            published_at: published_at.to_string(),
            attribution: String::new(),
            link: "https://example.com/1".to_string(),
        }
    }

    #[test]
    fn published_parses_rfc3339() {
        let article = make_article("2018-05-01T10:00:00Z");
        assert_eq!(
            article.published(),
            Some(Utc.with_ymd_and_hms(2018, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn published_is_none_for_garbage() {
        assert!(make_article("yesterday-ish").published().is_none());
    }

    #[test]
    fn published_day_strips_time() {
        assert_eq!(make_article("2018-05-01T10:00:00Z").published_day(), "2018-05-01");
        assert_eq!(make_article("2018-05-01").published_day(), "2018-05-01");
        assert_eq!(make_article("").published_day(), "");
    }
}
