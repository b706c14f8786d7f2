use serde_json::{json, Value};
use std::io::Read;
use tiny_http::Request;

use crate::http::{header_value, respond_json};
use crate::proxy::sequencer::SequencerOutcome;
use crate::proxy::{self, attempt, candidates, sequencer, unwrap};
use crate::storage_helpers::open_storage;
use learnhub_core::division;
use learnhub_core::status::normalize_status;
use learnhub_core::storage::Storage;

fn error_body(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

/// Pulls the status out of a request body, tolerating the field name
/// variants older clients still send.
fn requested_status(payload: &Value) -> Option<String> {
    for key in ["status", "user_status", "Status"] {
        if let Some(value) = payload.get(key).and_then(Value::as_str) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn requested_role(payload: &Value) -> Option<String> {
    for key in ["role", "Role"] {
        if let Some(value) = payload.get(key).and_then(Value::as_str) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn user_record_json(user: &learnhub_core::storage::User) -> Value {
    let mut value = serde_json::to_value(user).unwrap_or_else(|_| json!({}));
    let label = division::display_name(&value);
    if let Some(map) = value.as_object_mut() {
        map.insert("division_name".to_string(), Value::String(label));
    }
    value
}

enum DirectOutcome {
    Handled(u16, Value),
    Unavailable,
}

/// Applies the update against local storage when it is configured. A missing
/// user is a definitive answer; a write failure falls back to the proxy path.
fn try_direct_update(storage: &Storage, user_id: &str, status: &str, role: Option<&str>) -> DirectOutcome {
    match storage.find_user(user_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return DirectOutcome::Handled(404, error_body("User not found"));
        }
        Err(err) => {
            log::warn!("direct status lookup failed for {}: {}", user_id, err);
            return DirectOutcome::Unavailable;
        }
    }

    if let Err(err) = storage.update_user_status(user_id, status) {
        log::warn!("direct status update failed for {}: {}", user_id, err);
        return DirectOutcome::Unavailable;
    }
    if let Some(role) = role {
        if let Err(err) = storage.update_user_role(user_id, role) {
            log::warn!("direct role update failed for {}: {}", user_id, err);
        }
    }

    match storage.find_user(user_id) {
        Ok(Some(user)) => DirectOutcome::Handled(
            200,
            json!({ "status": "success", "data": user_record_json(&user) }),
        ),
        Ok(None) | Err(_) => DirectOutcome::Handled(200, json!({ "status": "success" })),
    }
}

pub(crate) fn handle_status_update(mut request: Request, user_id: &str) {
    let _guard = proxy::begin_proxy_request();

    let request_path = request.url().to_string();
    let method = request.method().to_string();
    let auth = header_value(&request, "Authorization").map(|v| v.to_string());

    // 中文注释：先读完整 body 再做校验；tiny_http 的请求体不读完会阻塞同一连接上的后续请求。
    let mut body = String::new();
    if let Err(err) = request.as_reader().read_to_string(&mut body) {
        log::warn!("status update body read failed: {}", err);
        respond_json(request, 400, &error_body("Request failed"));
        return;
    }

    if user_id.trim().is_empty() {
        respond_json(request, 400, &error_body("User ID is required"));
        return;
    }

    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let Some(raw_status) = requested_status(&payload) else {
        respond_json(request, 400, &error_body("Status is required"));
        return;
    };
    let role = requested_role(&payload);
    let normalized = normalize_status(&raw_status);

    if let Some(storage) = open_storage() {
        match try_direct_update(&storage, user_id, &normalized, role.as_deref()) {
            DirectOutcome::Handled(status_code, body) => {
                proxy::write_request_log(&request_path, &method, None, Some(status_code), None);
                respond_json(request, status_code, &body);
                return;
            }
            DirectOutcome::Unavailable => {
                log::warn!("direct path unavailable for {}, trying backend", user_id);
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

    let specs = candidates::status_update_candidates(
        &base,
        user_id,
        &normalized,
        role.as_deref(),
        auth.as_deref(),
    );
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
            tried,
        } => {
            let payload = unwrap::unwrap_parts(content_type.as_deref(), &body);
            let message = payload
                .as_ref()
                .and_then(unwrap::extract_message)
                .unwrap_or("Request failed")
                .to_string();
            proxy::write_request_log(
                &request_path,
                &method,
                tried.last().map(String::as_str),
                Some(status),
                Some(&message),
            );
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
                "status update exhausted for {} after {} candidates (last status {:?})",
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
