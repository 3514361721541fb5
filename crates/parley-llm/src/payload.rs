// Completion request payload construction

use crate::config::EndpointConfig;
use crate::types::Message;
use serde_json::{json, Map, Value};

/// Upper bound applied to `max_tokens` after coercion
pub const MAX_TOKENS_CEILING: i64 = 100_000;

/// Payload keys that sampler overrides may not replace
const RESERVED_KEYS: &[&str] = &["messages"];

/// Build the JSON body for a chat completions request
///
/// Overrides are merged last and may replace `model`, but never `messages`.
/// `max_tokens` is coerced to an integer: values below 1 drop the key,
/// values above [`MAX_TOKENS_CEILING`] are clamped.
pub fn build_payload(messages: &[Message], config: &EndpointConfig) -> Value {
    let mut payload = Map::new();

    let wire_messages: Vec<Value> = messages
        .iter()
        .map(|msg| json!({ "role": msg.role.as_str(), "content": msg.content }))
        .collect();
    payload.insert("messages".to_string(), Value::Array(wire_messages));

    if let Some(model) = config.model() {
        payload.insert("model".to_string(), json!(model));
    }

    merge_overrides(&mut payload, config.sampler_overrides.to_map());
    normalize_max_tokens(&mut payload);

    Value::Object(payload)
}

fn merge_overrides(payload: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        if RESERVED_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Ignoring sampler override for reserved payload key");
            continue;
        }
        payload.insert(key, value);
    }
}

fn normalize_max_tokens(payload: &mut Map<String, Value>) {
    let Some(raw) = payload.get("max_tokens") else {
        return;
    };

    let coerced = coerce_integer(raw);
    if coerced < 1 {
        payload.remove("max_tokens");
    } else {
        payload.insert(
            "max_tokens".to_string(),
            json!(coerced.min(MAX_TOKENS_CEILING)),
        );
    }
}

/// Lenient integer conversion for loosely typed admin input
///
/// Floats truncate toward zero, numeric strings parse (including a leading
/// numeric prefix such as `"256 tokens"`), booleans become 0/1, and anything
/// unparseable becomes 0.
pub fn coerce_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(truncate_float))
            .unwrap_or(0),
        Value::String(s) => parse_leading_integer(s),
        Value::Bool(b) => i64::from(*b),
        Value::Null => 0,
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(fields) => i64::from(!fields.is_empty()),
    }
}

fn truncate_float(f: f64) -> i64 {
    if f.is_finite() {
        // saturating cast
        f.trunc() as i64
    } else {
        0
    }
}

fn parse_leading_integer(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(f) = trimmed.parse::<f64>() {
        return truncate_float(f);
    }

    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        let sign = i == 0 && (c == '-' || c == '+');
        if c.is_ascii_digit() || sign {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse::<i64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integer_numbers() {
        assert_eq!(coerce_integer(&json!(512)), 512);
        assert_eq!(coerce_integer(&json!(99.9)), 99);
        assert_eq!(coerce_integer(&json!(-3.5)), -3);
        assert_eq!(coerce_integer(&json!(u64::MAX)), i64::MAX);
    }

    #[test]
    fn test_coerce_integer_strings() {
        assert_eq!(coerce_integer(&json!("1024")), 1024);
        assert_eq!(coerce_integer(&json!(" 256.7 ")), 256);
        assert_eq!(coerce_integer(&json!("300 tokens")), 300);
        assert_eq!(coerce_integer(&json!("-40")), -40);
        assert_eq!(coerce_integer(&json!("lots")), 0);
        assert_eq!(coerce_integer(&json!("")), 0);
    }

    #[test]
    fn test_coerce_integer_other_types() {
        assert_eq!(coerce_integer(&json!(true)), 1);
        assert_eq!(coerce_integer(&json!(false)), 0);
        assert_eq!(coerce_integer(&Value::Null), 0);
    }
}
