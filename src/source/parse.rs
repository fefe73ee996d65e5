//! Response body → [`Article`]s.
//!
//! The content API answers with
//!
//! ```text
//! { "response": { "results": [ { "webPublicationDate", "webTitle",
//!                                "sectionName", "webUrl", "tags": [..] }, .. ] } }
//! ```
//!
//! Parsing is all-or-nothing: a single malformed item fails the whole batch
//! with the first problem found, and no partial list is returned.

use serde_json::{Map, Value};
use tracing::debug;

use super::{Article, ParseFailure};

const PUBLISHED: &str = "webPublicationDate";
const TITLE: &str = "webTitle";
const SECTION: &str = "sectionName";
const URL: &str = "webUrl";
const TAGS: &str = "tags";

/// Parse a raw response body into articles, preserving the API's order.
///
/// Empty and whitespace-only bodies are [`ParseFailure::Empty`], not an empty
/// success.
pub fn parse(raw: &str) -> Result<Vec<Article>, ParseFailure> {
    if raw.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let root: Value =
        serde_json::from_str(raw).map_err(|e| ParseFailure::MalformedJson(e.to_string()))?;

    let results = root
        .get("response")
        .and_then(Value::as_object)
        .ok_or_else(|| ParseFailure::MissingField("response".into()))?
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseFailure::MissingField("results".into()))?;

    let articles = results
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item = item.as_object().ok_or_else(|| {
                ParseFailure::MalformedJson(format!("result {index} is not an object"))
            })?;
            parse_item(item)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = articles.len(), "parsed response");
    Ok(articles)
}

fn parse_item(item: &Map<String, Value>) -> Result<Article, ParseFailure> {
    Ok(Article {
        published_at: required(item, PUBLISHED)?,
        title: required(item, TITLE)?,
        category: required(item, SECTION)?,
        link: required(item, URL)?,
        attribution: contributors(item),
    })
}

fn required(item: &Map<String, Value>, field: &str) -> Result<String, ParseFailure> {
    item.get(field)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| ParseFailure::MissingField(field.to_string()))
}

/// Contributor names from the item's `tags` array, or empty.
fn contributors(item: &Map<String, Value>) -> String {
    item.get(TAGS)
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| tag.get(TITLE).and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}
