pub(crate) mod backend_router;
pub(crate) mod metrics_endpoint;
pub(crate) mod server;

use serde_json::Value;
use std::io::Cursor;
use tiny_http::{Header, Request, Response};

pub(crate) fn json_response(status_code: u16, body: &Value) -> Response<Cursor<Vec<u8>>> {
    let mut response = Response::from_string(body.to_string()).with_status_code(status_code);
    if let Ok(content_type) = Header::from_bytes(b"Content-Type", b"application/json") {
        response = response.with_header(content_type);
    }
    response
}

pub(crate) fn respond_json(request: Request, status_code: u16, body: &Value) {
    let _ = request.respond(json_response(status_code, body));
}

pub(crate) fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str().trim())
        .filter(|value| !value.is_empty())
}
