//! The loading pipeline's building blocks.
//!
//! This module defines the [`Fetch`] transport trait and the pieces the
//! loader chains together for every load:
//!
//! ```text
//! LoadRequest ──build_url──► URL ──Fetch::fetch──► body ──parse──► Vec<Article>
//! ```
//!
//! * [`request`] — the request snapshot and the pure URL builder.
//! * [`http`] — the HTTP transport.
//! * [`parse`] — the pure JSON → [`Article`] deserializer.
//! * [`error`] — the failure taxonomy shared by all of the above.
//!
//! ## For contributors — pointing at another API
//!
//! The loader only talks to the [`Fetch`] trait, so tests (or an alternative
//! transport) can stand in for [`HttpFetcher`] without touching the loader.
//! A different response shape only needs a new `parse` function.

mod article;
mod error;
mod http;
mod parse;
mod request;

pub use article::Article;
pub use error::{LoadResult, NetworkFailure, ParseFailure};
pub use http::HttpFetcher;
pub use parse::parse;
pub use request::{build_url, LoadRequest, DEFAULT_BASE_URL, DEFAULT_ORDER_BY};

use tokio_util::sync::CancellationToken;

/// Transport that performs one blocking round trip.
///
/// The loader calls [`fetch()`](Fetch::fetch) on a background worker thread,
/// so implementations must be [`Send`] + [`Sync`].
pub trait Fetch: Send + Sync {
    /// Fetch `url` and return the raw response body.
    ///
    /// Once `cancel` fires, implementations should abandon any I/O in
    /// progress and return [`NetworkFailure::Cancelled`], releasing whatever
    /// they hold.
    fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, NetworkFailure>;
}
