use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use super::candidates::AttemptSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NetworkErrorKind {
    Timeout,
    Connection,
    Unknown,
}

/// Classified result of a single candidate attempt. Generic over the success
/// payload so the sequencer can be driven by scripted outcomes in tests; the
/// real executor produces `AttemptOutcome<Response>`.
pub(crate) enum AttemptOutcome<R> {
    /// 2xx. The body is deliberately left unconsumed: the sequencer only
    /// needs the status to stop, and the caller unwraps the payload later.
    Success(R),
    /// The route/method shape was wrong; the next candidate should be tried.
    RetryableFailure { status: u16, body: String },
    /// The backend understood the route and rejected the request. Further
    /// candidates are assumed equally futile.
    TerminalFailure {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
    NetworkError {
        kind: NetworkErrorKind,
        message: String,
    },
}

/// Heuristic for "the backend does not know this route/method". Some backend
/// revisions answer route misses with 200-adjacent codes and an Express-style
/// text body, so the status alone is not always enough.
pub(crate) fn is_route_miss_body(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("cannot put")
        || lower.contains("cannot patch")
        || lower.contains("method not allowed")
        || lower.contains("not found")
}

/// Runs one attempt under a hard per-request timeout. reqwest tears the
/// connection down when the timeout fires, so the next candidate never
/// contends with a dangling in-flight call.
pub(crate) fn execute(
    client: &Client,
    spec: &AttemptSpec,
    timeout: Duration,
) -> AttemptOutcome<Response> {
    let mut builder = client.request(spec.method.clone(), &spec.url).timeout(timeout);
    for (name, value) in &spec.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &spec.body {
        builder = builder.body(body.clone());
    }
    let response = match builder.send() {
        Ok(response) => response,
        Err(err) => {
            let kind = if err.is_timeout() {
                NetworkErrorKind::Timeout
            } else if err.is_connect() {
                NetworkErrorKind::Connection
            } else {
                NetworkErrorKind::Unknown
            };
            let message = match kind {
                NetworkErrorKind::Timeout => "Attempt timeout".to_string(),
                _ => err.to_string(),
            };
            return AttemptOutcome::NetworkError { kind, message };
        }
    };
    classify_response(response)
}

fn classify_response(response: Response) -> AttemptOutcome<Response> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return AttemptOutcome::Success(response);
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().unwrap_or_default();
    if status == 404 || status == 405 || is_route_miss_body(&body) {
        AttemptOutcome::RetryableFailure { status, body }
    } else {
        AttemptOutcome::TerminalFailure {
            status,
            content_type,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_miss_body_matches_known_patterns() {
        assert!(is_route_miss_body("Cannot PUT /api/users/1/status"));
        assert!(is_route_miss_body("Cannot PATCH /users/1"));
        assert!(is_route_miss_body("405 Method Not Allowed"));
        assert!(is_route_miss_body("route not found"));
        assert!(is_route_miss_body("NOT FOUND"));
    }

    #[test]
    fn business_errors_are_not_route_misses() {
        assert!(!is_route_miss_body("Invalid status value"));
        assert!(!is_route_miss_body("{\"message\":\"forbidden\"}"));
        assert!(!is_route_miss_body(""));
    }
}
