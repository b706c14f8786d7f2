use reqwest::Method;

/// One concrete guess at how the backend expects a logical operation to be
/// invoked. Built fresh per call, never mutated.
#[derive(Debug, Clone)]
pub(crate) struct AttemptSpec {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<String>,
}

impl AttemptSpec {
    fn json(method: Method, url: String, body: Option<String>, auth: Option<&str>) -> Self {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(auth) = auth {
            headers.push(("Authorization".to_string(), auth.to_string()));
        }
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// "METHOD path" with scheme and host stripped, for the `tried` trail.
    pub(crate) fn label(&self) -> String {
        format!("{} {}", self.method, safe_path(&self.url))
    }
}

/// Strips the scheme and host so diagnostics never leak upstream hostnames.
pub(crate) fn safe_path(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return url.to_string();
    }
    let after_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    match after_scheme.find('/') {
        Some(idx) => after_scheme[idx..].to_string(),
        None => "/".to_string(),
    }
}

/// Candidate endpoints for "set a user's status", most likely first. The tail
/// entries only exist for legacy backend revisions.
pub(crate) fn status_update_candidates(
    base: &str,
    user_id: &str,
    status: &str,
    role: Option<&str>,
    auth: Option<&str>,
) -> Vec<AttemptSpec> {
    let payload = match role {
        Some(role) => serde_json::json!({ "status": status, "role": role }),
        None => serde_json::json!({ "status": status }),
    };
    let body = payload.to_string();
    let urls = [
        format!("{base}/api/users/{user_id}/status"),
        format!("{base}/users/{user_id}"),
        format!("{base}/api/users/{user_id}"),
        format!("{base}/api/users/pending/{user_id}/status"),
        format!("{base}/v1/users/{user_id}/status"),
    ];
    urls.into_iter()
        .map(|url| AttemptSpec::json(Method::PATCH, url, Some(body.clone()), auth))
        .collect()
}

/// Candidate endpoints for "delete a user". DELETE has fewer shape variants
/// in the wild, so the list is shorter.
pub(crate) fn delete_candidates(base: &str, user_id: &str, auth: Option<&str>) -> Vec<AttemptSpec> {
    let urls = [
        format!("{base}/api/users/{user_id}"),
        format!("{base}/users/{user_id}"),
        format!("{base}/api/users/pending/{user_id}"),
    ];
    urls.into_iter()
        .map(|url| AttemptSpec::json(Method::DELETE, url, None, auth))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://backend.learnhub.dev";

    #[test]
    fn status_candidates_keep_priority_order() {
        let candidates = status_update_candidates(BASE, "u1", "APPROVED", None, None);
        let paths: Vec<String> = candidates.iter().map(|c| safe_path(&c.url)).collect();
        assert_eq!(
            paths,
            vec![
                "/api/users/u1/status",
                "/users/u1",
                "/api/users/u1",
                "/api/users/pending/u1/status",
                "/v1/users/u1/status",
            ]
        );
        assert!(candidates.iter().all(|c| c.method == Method::PATCH));
    }

    #[test]
    fn status_candidates_share_one_body() {
        let candidates = status_update_candidates(BASE, "u1", "APPROVED", Some("ADMIN"), None);
        let first = candidates[0].body.clone().expect("body");
        assert!(candidates.iter().all(|c| c.body.as_deref() == Some(first.as_str())));
        let value: serde_json::Value = serde_json::from_str(&first).expect("json body");
        assert_eq!(value["status"], "APPROVED");
        assert_eq!(value["role"], "ADMIN");
    }

    #[test]
    fn role_is_omitted_when_absent() {
        let candidates = status_update_candidates(BASE, "u1", "REJECTED", None, None);
        let body = candidates[0].body.clone().expect("body");
        let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert!(value.get("role").is_none());
    }

    #[test]
    fn authorization_is_copied_onto_every_candidate() {
        let candidates =
            status_update_candidates(BASE, "u1", "APPROVED", None, Some("Bearer tok-1"));
        for candidate in &candidates {
            assert!(candidate
                .headers
                .iter()
                .any(|(name, value)| name == "Authorization" && value == "Bearer tok-1"));
        }
        let without = delete_candidates(BASE, "u1", None);
        assert!(without
            .iter()
            .all(|c| c.headers.iter().all(|(name, _)| name != "Authorization")));
    }

    #[test]
    fn delete_candidates_are_shorter_and_bodyless() {
        let candidates = delete_candidates(BASE, "u9", None);
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.method == Method::DELETE));
        assert!(candidates.iter().all(|c| c.body.is_none()));
        assert_eq!(safe_path(&candidates[0].url), "/api/users/u9");
        assert_eq!(safe_path(&candidates[2].url), "/api/users/pending/u9");
    }

    #[test]
    fn safe_path_strips_host_only_for_absolute_urls() {
        assert_eq!(safe_path("https://host.example/api/users/1"), "/api/users/1");
        assert_eq!(safe_path("http://host.example:8080/x?y=1"), "/x?y=1");
        assert_eq!(safe_path("https://host.example"), "/");
        assert_eq!(safe_path("/already/relative"), "/already/relative");
    }
}
