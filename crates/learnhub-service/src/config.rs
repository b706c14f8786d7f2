use url::Url;

/// Normalizes a configured backend base URL: trims, drops the trailing slash,
/// rejects anything that is not absolute http(s).
pub(crate) fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    Some(trimmed.to_string())
}

pub(crate) fn api_base_url() -> Option<String> {
    std::env::var("LEARNHUB_API_BASE_URL")
        .ok()
        .and_then(|raw| normalize_base_url(&raw))
}

pub(crate) fn proxy_debug() -> bool {
    std::env::var("LEARNHUB_PROXY_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
