use serde_json::{json, Value};
use tiny_http::Request;

use crate::http::respond_json;
use crate::proxy::{self, unwrap};
use learnhub_core::shapes;

fn error_body(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

fn first_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .map(|v| v.to_string())
}

/// Maps one raw upstream post onto the response shape clients expect.
/// Field names vary across backend revisions, so every field goes through
/// an alias ladder. A post with no id keeps `null` rather than a synthetic
/// one, so repeated fetches stay stable.
fn normalize_post(raw: &Value) -> Value {
    let id = ["id", "_id"]
        .iter()
        .find_map(|key| raw.get(*key))
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null);
    let title =
        first_string(raw, &["title", "name"]).unwrap_or_else(|| "Untitled Post".to_string());
    let content = first_string(raw, &["content", "description", "body"]);
    let author = first_string(raw, &["author", "createdBy"]).or_else(|| {
        raw.get("user")
            .and_then(|u| u.get("name"))
            .and_then(Value::as_str)
            .map(|v| v.to_string())
    });
    let created_at = first_string(raw, &["createdAt", "created_at", "dateCreated"]);
    let updated_at = first_string(raw, &["updatedAt", "updated_at", "dateUpdated"]);

    json!({
        "id": id,
        "title": title,
        "content": content,
        "author": author,
        "createdAt": created_at,
        "updatedAt": updated_at,
    })
}

pub(crate) fn handle_posts_feed(request: Request) {
    let _guard = proxy::begin_proxy_request();

    let Some(base) = crate::config::api_base_url() else {
        respond_json(
            request,
            500,
            &error_body("Missing LEARNHUB_API_BASE_URL or LEARNHUB_DB_KEY on server"),
        );
        return;
    };

    let url = format!("{base}/api/posts");
    let response = proxy::proxy_client()
        .get(&url)
        .header("Accept", "application/json")
        .timeout(proxy::attempt_timeout())
        .send();

    let response = match response {
        Ok(response) => response,
        Err(err) => {
            log::warn!("posts fetch failed: {}", err);
            proxy::write_request_log("/api/posts", "GET", Some(&url), None, Some(&err.to_string()));
            respond_json(request, 502, &error_body("No response from backend"));
            return;
        }
    };

    let (status_code, payload) = unwrap::unwrap_response(response);
    proxy::write_request_log("/api/posts", "GET", Some(&url), Some(status_code), None);

    if !(200..300).contains(&status_code) {
        let message = payload
            .as_ref()
            .and_then(unwrap::extract_message)
            .unwrap_or("Request failed")
            .to_string();
        respond_json(request, status_code, &error_body(&message));
        return;
    }

    let payload = payload.unwrap_or(Value::Null);
    let posts: Vec<Value> = shapes::extract_list(&payload)
        .map(|items| items.iter().map(normalize_post).collect())
        .unwrap_or_default();

    let total = posts.len();
    respond_json(request, 200, &json!({ "items": posts, "total": total }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_post_maps_aliases() {
        let raw = json!({
            "_id": "p1",
            "name": "Welcome",
            "description": "hello",
            "createdBy": "amel",
            "created_at": "2024-01-01",
        });
        let post = normalize_post(&raw);
        assert_eq!(post["id"], "p1");
        assert_eq!(post["title"], "Welcome");
        assert_eq!(post["content"], "hello");
        assert_eq!(post["author"], "amel");
        assert_eq!(post["createdAt"], "2024-01-01");
        assert_eq!(post["updatedAt"], Value::Null);
    }

    #[test]
    fn normalize_post_keeps_missing_id_null() {
        let post = normalize_post(&json!({ "title": "t" }));
        assert_eq!(post["id"], Value::Null);
    }

    #[test]
    fn normalize_post_defaults_title_and_reads_nested_author() {
        let raw = json!({ "id": 7, "user": { "name": "dina" } });
        let post = normalize_post(&raw);
        assert_eq!(post["id"], 7);
        assert_eq!(post["title"], "Untitled Post");
        assert_eq!(post["author"], "dina");
    }
}
