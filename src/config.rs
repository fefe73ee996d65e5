//! Command-line configuration.
//!
//! The flags stand in for a settings screen: they decide which search the
//! loader runs.  Anything left unset falls back to the API defaults in
//! [`crate::source`].

use std::path::PathBuf;

use clap::Parser;

use crate::source::{LoadRequest, DEFAULT_BASE_URL, DEFAULT_ORDER_BY};

/// A terminal news reader backed by a content search API.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Topic to search for.  Empty shows everything.
    #[arg(short, long, default_value = "")]
    pub topic: String,

    /// Result ordering: newest, oldest or relevance.
    #[arg(short, long, default_value = DEFAULT_ORDER_BY)]
    pub order_by: String,

    /// Earliest publication date, YYYY-MM-DD.
    #[arg(long, default_value = "2018-01-01")]
    pub from_date: String,

    /// Latest publication date, YYYY-MM-DD.
    #[arg(long, default_value = "2018-12-31")]
    pub to_date: String,

    /// API key for the content API.
    #[arg(long, env = "NEWS_READER_API_KEY", default_value = "test", hide_env_values = true)]
    pub api_key: String,

    /// Search endpoint to query.
    #[arg(long, env = "NEWS_READER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Write logs to this file (filtered by RUST_LOG, default "info").
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The request described by these flags.
    pub fn load_request(&self) -> LoadRequest {
        LoadRequest {
            base_url: self.base_url.clone(),
            topic: self.topic.clone(),
            order_by: self.order_by.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
            api_key: self.api_key.clone(),
        }
    }
}
