use serde_json::{json, Value};
use tiny_http::Request;

use crate::http::{header_value, respond_json};
use crate::proxy::sequencer::SequencerOutcome;
use crate::proxy::{self, attempt, candidates, sequencer, unwrap};
use crate::storage_helpers::open_storage;

fn error_body(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

pub(crate) fn handle_user_delete(request: Request, user_id: &str) {
    let _guard = proxy::begin_proxy_request();

    let request_path = request.url().to_string();
    let method = request.method().to_string();
    let auth = header_value(&request, "Authorization").map(|v| v.to_string());

    if user_id.trim().is_empty() {
        respond_json(request, 400, &error_body("User ID is required"));
        return;
    }

    if let Some(storage) = open_storage() {
        match storage.find_user(user_id) {
            Ok(Some(_)) => match storage.delete_user(user_id) {
                Ok(()) => {
                    proxy::write_request_log(&request_path, &method, None, Some(200), None);
                    respond_json(request, 200, &json!({ "status": "success" }));
                    return;
                }
                Err(err) => {
                    log::warn!("direct delete failed for {}: {}", user_id, err);
                }
            },
            Ok(None) => {
                proxy::write_request_log(&request_path, &method, None, Some(404), None);
                respond_json(request, 404, &error_body("User not found"));
                return;
            }
            Err(err) => {
                log::warn!("direct delete lookup failed for {}: {}", user_id, err);
            }
        }
    }

    let Some(base) = crate::config::api_base_url() else {
        respond_json(
            request,
            500,
            &error_body("Missing LEARNHUB_API_BASE_URL or LEARNHUB_DB_KEY on server"),
        );
        return;
    };

    let specs = candidates::delete_candidates(&base, user_id, auth.as_deref());
    let debug = crate::config::proxy_debug();
    let outcome = sequencer::run_candidates(&specs, proxy::global_budget(), |spec| {
        if debug {
            eprintln!("[proxy] trying {}", spec.label());
        }
        attempt::execute(proxy::proxy_client(), spec, proxy::attempt_timeout())
    });

    match outcome {
        SequencerOutcome::Completed { response, .. } => {
            let upstream_url = response.url().to_string();
            let (status_code, payload) = unwrap::unwrap_response(response);
            proxy::write_request_log(
                &request_path,
                &method,
                Some(&upstream_url),
                Some(status_code),
                None,
            );
            let body = payload.unwrap_or_else(|| json!({ "status": "success" }));
            respond_json(request, 200, &body);
        }
        SequencerOutcome::Rejected {
            status,
            content_type,
            body,
            ..
        } => {
            let payload = unwrap::unwrap_parts(content_type.as_deref(), &body);
            let message = payload
                .as_ref()
                .and_then(unwrap::extract_message)
                .unwrap_or("Request failed")
                .to_string();
            proxy::write_request_log(&request_path, &method, None, Some(status), Some(&message));
            respond_json(
                request,
                status,
                &json!({
                    "status": "error",
                    "message": message,
                    "data": payload.unwrap_or(Value::Null),
                    "statusCode": status,
                }),
            );
        }
        SequencerOutcome::Exhausted { message, tried, last_status } => {
            log::warn!(
                "delete exhausted for {} after {} candidates (last status {:?})",
                user_id,
                tried.len(),
                last_status
            );
            proxy::write_request_log(&request_path, &method, None, last_status, Some(&message));
            respond_json(
                request,
                502,
                &json!({ "status": "error", "message": message, "tried": tried }),
            );
        }
    }
}
