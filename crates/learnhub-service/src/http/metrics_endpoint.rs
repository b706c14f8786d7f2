use tiny_http::{Header, Request, Response};

pub(crate) fn handle_metrics(request: Request) {
    let body = crate::proxy::proxy_metrics_prometheus();
    let mut response = Response::from_string(body);
    if let Ok(content_type) = Header::from_bytes(b"Content-Type", b"text/plain; version=0.0.4") {
        response = response.with_header(content_type);
    }
    let _ = request.respond(response);
}
