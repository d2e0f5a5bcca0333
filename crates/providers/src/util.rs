//! Shared helpers for the serving client.

use serde_json::Value;
use st_domain::error::Error;

/// Reply used when a model answers with a body we cannot read text from.
pub const EMPTY_REPLY: &str = "I received your message but couldn't generate a response.";

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Pull the reply text out of an invocation response.
///
/// Chat-completions shape first (`choices[0].message.content`), then the
/// classic model-serving shape (`predictions[0]`), then [`EMPTY_REPLY`].
pub fn extract_reply(body: &Value) -> String {
    let chat = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    if let Some(text) = chat {
        return text.to_owned();
    }

    match body.pointer("/predictions/0") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => EMPTY_REPLY.to_owned(),
        Some(other) => other.to_string(),
    }
}
