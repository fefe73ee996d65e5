//! Failure taxonomy for the loading pipeline.
//!
//! Every way a load can go wrong is a value, never a panic.  Fetch problems
//! are [`NetworkFailure`]s, problems with the response body are
//! [`ParseFailure`]s, and the loader caches and delivers either one wrapped in
//! a [`LoadFailure`].

use thiserror::Error;

use super::Article;

/// Outcome of one completed load: the articles, or why there are none.
pub type LoadResult = Result<Vec<Article>, LoadFailure>;

/// Errors raised while talking to the content API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out")]
    Timeout,

    #[error("server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("no network connection")]
    Offline,

    #[error("I/O error: {0}")]
    IoError(String),

    /// The owning loader gave up on this fetch.  Never cached or delivered.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Errors raised while turning a response body into [`Article`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("response body is empty")]
    Empty,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("missing field `{0}`")]
    MissingField(String),
}

/// Any failure that can end up as the cached result of a load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Network(#[from] NetworkFailure),

    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

impl LoadFailure {
    /// True when the failure means the host has no connectivity at all.
    pub fn is_offline(&self) -> bool {
        matches!(self, LoadFailure::Network(NetworkFailure::Offline))
    }
}
