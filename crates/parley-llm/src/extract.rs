// Reply and error text extraction from loosely conforming providers

use serde_json::Value;

/// Pull the assistant text out of a chat completions response
///
/// Providers disagree on where the text lives. Candidates are tried in
/// order and the first non-empty one wins:
/// `message.content`, `message.reasoning_content`, `message.reasoning`,
/// `text` (legacy completions), `delta.content` (stream-shaped bodies).
pub fn extract_reply(body: &Value) -> Option<String> {
    let choice = body.get("choices")?.get(0)?;
    let message = choice.get("message");

    let candidates = [
        message.and_then(|m| m.get("content")),
        message.and_then(|m| m.get("reasoning_content")),
        message.and_then(|m| m.get("reasoning")),
        choice.get("text"),
        choice.get("delta").and_then(|d| d.get("content")),
    ];

    candidates.into_iter().flatten().find_map(text_of)
}

/// Plain strings, or arrays of `{"type": "text", "text": ...}` parts
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(parts) => {
            let joined: String = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

/// Provider error text from a failed response body, if it sent one
pub fn extract_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;

    let candidates = [
        parsed.get("error").and_then(|e| e.get("message")),
        parsed.get("error"),
        parsed.get("message"),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string);
    found
}
