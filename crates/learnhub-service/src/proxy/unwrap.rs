use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

fn is_json_content_type(value: &str) -> bool {
    value.to_ascii_lowercase().contains("application/json")
}

/// Extracts a structured payload from a raw body regardless of the backend's
/// response shape. A JSON body that fails to parse degrades to `None` rather
/// than an error; a non-JSON body is wrapped as `{"message": text}`.
pub(crate) fn unwrap_parts(content_type: Option<&str>, body: &str) -> Option<Value> {
    if content_type.map(is_json_content_type).unwrap_or(false) {
        return serde_json::from_str(body).ok();
    }
    if body.is_empty() {
        None
    } else {
        Some(json!({ "message": body }))
    }
}

/// Consumes a response into (status, payload).
pub(crate) fn unwrap_response(response: Response) -> (u16, Option<Value>) {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().unwrap_or_default();
    (status, unwrap_parts(content_type.as_deref(), &body))
}

/// Pulls a human-readable message out of an error payload: a string
/// `message` field first, then a string `error` field. Callers substitute a
/// generic message when neither exists.
pub(crate) fn extract_message(payload: &Value) -> Option<&str> {
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return Some(message);
    }
    payload.get("error").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_parses_body() {
        let payload = unwrap_parts(Some("application/json"), "{\"data\":{\"id\":1}}");
        assert_eq!(payload.expect("payload")["data"]["id"], 1);
        let payload = unwrap_parts(Some("application/json; charset=utf-8"), "[1,2]");
        assert!(payload.expect("payload").is_array());
    }

    #[test]
    fn invalid_json_degrades_to_none() {
        assert!(unwrap_parts(Some("application/json"), "{not json").is_none());
    }

    #[test]
    fn plain_text_wraps_as_message() {
        let payload = unwrap_parts(Some("text/plain"), "Internal error").expect("payload");
        assert_eq!(payload["message"], "Internal error");
        assert!(unwrap_parts(Some("text/plain"), "").is_none());
        let payload = unwrap_parts(None, "oops").expect("payload");
        assert_eq!(payload["message"], "oops");
    }

    #[test]
    fn extract_message_prefers_message_over_error() {
        let value = serde_json::json!({"message": "bad status", "error": "ignored"});
        assert_eq!(extract_message(&value), Some("bad status"));
        let value = serde_json::json!({"error": "boom"});
        assert_eq!(extract_message(&value), Some("boom"));
        let value = serde_json::json!({"message": 17});
        assert_eq!(extract_message(&value), None);
        assert_eq!(extract_message(&serde_json::json!({})), None);
    }
}
