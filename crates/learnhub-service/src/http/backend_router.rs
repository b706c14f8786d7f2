use serde_json::json;
use tiny_http::Request;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BackendRoute {
    /// Empty ids still route here so the handler can answer 400 instead of
    /// a shapeless 404.
    UserStatus { user_id: String },
    UserDelete { user_id: String },
    PostsFeed,
    Metrics,
    NotFound,
}

fn single_segment(id: &str) -> bool {
    !id.contains('/')
}

pub(crate) fn resolve_backend_route(method: &str, url: &str) -> BackendRoute {
    let path = url.split('?').next().unwrap_or(url);
    if method == "GET" && path == "/metrics" {
        return BackendRoute::Metrics;
    }
    if method == "GET" && path == "/api/posts" {
        return BackendRoute::PostsFeed;
    }
    if method == "PUT" || method == "PATCH" {
        if let Some(id) = path
            .strip_prefix("/api/users/")
            .and_then(|rest| rest.strip_suffix("/status"))
        {
            if single_segment(id) {
                return BackendRoute::UserStatus {
                    user_id: id.to_string(),
                };
            }
        }
    }
    if method == "DELETE" {
        if let Some(id) = path.strip_prefix("/api/users/") {
            if single_segment(id) {
                return BackendRoute::UserDelete {
                    user_id: id.to_string(),
                };
            }
        }
    }
    BackendRoute::NotFound
}

pub(crate) fn handle_backend_request(request: Request) {
    let route = resolve_backend_route(request.method().as_str(), request.url());
    match route {
        BackendRoute::UserStatus { user_id } => {
            crate::status_update::handle_status_update(request, &user_id);
        }
        BackendRoute::UserDelete { user_id } => {
            crate::user_delete::handle_user_delete(request, &user_id);
        }
        BackendRoute::PostsFeed => crate::posts_feed::handle_posts_feed(request),
        BackendRoute::Metrics => crate::http::metrics_endpoint::handle_metrics(request),
        BackendRoute::NotFound => {
            crate::http::respond_json(
                request,
                404,
                &json!({"status": "error", "message": "Not found"}),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_backend_route, BackendRoute};

    #[test]
    fn resolves_status_route_for_put_and_patch() {
        for method in ["PUT", "PATCH"] {
            assert_eq!(
                resolve_backend_route(method, "/api/users/u1/status"),
                BackendRoute::UserStatus {
                    user_id: "u1".to_string()
                }
            );
        }
    }

    #[test]
    fn status_route_keeps_empty_id_for_validation() {
        assert_eq!(
            resolve_backend_route("PUT", "/api/users//status"),
            BackendRoute::UserStatus {
                user_id: String::new()
            }
        );
    }

    #[test]
    fn nested_paths_do_not_match_status_route() {
        assert_eq!(
            resolve_backend_route("PUT", "/api/users/u1/extra/status"),
            BackendRoute::NotFound
        );
        assert_eq!(
            resolve_backend_route("GET", "/api/users/u1/status"),
            BackendRoute::NotFound
        );
    }

    #[test]
    fn resolves_delete_route() {
        assert_eq!(
            resolve_backend_route("DELETE", "/api/users/u9"),
            BackendRoute::UserDelete {
                user_id: "u9".to_string()
            }
        );
        assert_eq!(
            resolve_backend_route("DELETE", "/api/users/u9/status"),
            BackendRoute::NotFound
        );
    }

    #[test]
    fn resolves_posts_and_metrics_routes() {
        assert_eq!(
            resolve_backend_route("GET", "/api/posts"),
            BackendRoute::PostsFeed
        );
        assert_eq!(
            resolve_backend_route("GET", "/api/posts?page=2"),
            BackendRoute::PostsFeed
        );
        assert_eq!(resolve_backend_route("GET", "/metrics"), BackendRoute::Metrics);
    }

    #[test]
    fn unknown_routes_fall_through() {
        assert_eq!(resolve_backend_route("POST", "/api/users"), BackendRoute::NotFound);
        assert_eq!(resolve_backend_route("GET", "/"), BackendRoute::NotFound);
    }
}
