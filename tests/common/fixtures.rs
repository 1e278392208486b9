//! Seed document builders for end-to-end tests
//!
//! The store holds raw JSON documents, so fixtures are plain
//! `serde_json::Value` builders. Tests seed them through
//! `TestServer::seed` and then exercise the HTTP surface.

use serde_json::{json, Value};

/// A film document with the fields the sync jobs care about.
///
/// `external_id` is the Watchmode title id; films without one are
/// invisible to the source refresh and IMDb backfill jobs.
pub fn film_document(
    id: &str,
    title: &str,
    year: Option<i32>,
    external_id: Option<&str>,
) -> Value {
    let mut document = json!({
        "id": id,
        "type": "film",
        "title": title,
        "in_library": true,
        "streaming_sources": [],
        "manual_streaming_sources": [],
    });
    if let Some(year) = year {
        document["year"] = json!(year);
    }
    if let Some(external_id) = external_id {
        document["external_id"] = json!(external_id);
    }
    document
}

/// A minimal book document. Books carry no sync state, they only exist
/// to prove the document endpoints are kind-agnostic.
pub fn book_document(id: &str, title: &str, author: &str) -> Value {
    json!({
        "id": id,
        "type": "book",
        "title": title,
        "author": author,
        "in_library": true,
    })
}
