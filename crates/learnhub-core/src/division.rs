use serde_json::Value;

// 中文注释：历史数据里 DevOps 的 division 字段只有这个裸 UUID，没有对应的主数据记录，只能硬编码映射。
const DEVOPS_DIVISION_UUID: &str = "0e5c4601-d68a-45d0-961f-b11e0472a71b";

/// Maps a division code or UUID to its display label.
pub fn division_label(code: &str) -> Option<&'static str> {
    let lower = code.trim().to_ascii_lowercase();
    match lower.as_str() {
        "uiux" | "ui-ux" | "ui/ux" | "uiux-designer" | "ui/ux designer" => Some("UI/UX Designer"),
        "fe" | "frontend" | "frontend-dev" | "frontend dev" | "frontend developer" => {
            Some("Frontend Dev")
        }
        "backend" | "backend-dev" | "backend dev" | "backend developer" => {
            Some("Backend Developer")
        }
        "devops" => Some("DevOps"),
        _ if lower == DEVOPS_DIVISION_UUID => Some("DevOps"),
        _ => None,
    }
}

fn looks_like_uuid(value: &str) -> bool {
    if value.len() != 36 {
        return false;
    }
    value.char_indices().all(|(idx, ch)| match idx {
        8 | 13 | 18 | 23 => ch == '-',
        _ => ch.is_ascii_hexdigit(),
    })
}

/// Resolves a user-friendly division name from a raw user record. The backend
/// is inconsistent about where the division lives: a `division_name` field, a
/// nested `division.name` object, or a bare `division` string that may be a
/// code or a UUID.
pub fn display_name(user: &Value) -> String {
    if let Some(name) = user.get("division_name").and_then(Value::as_str) {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    if let Some(name) = user
        .get("division")
        .and_then(|division| division.get("name"))
        .and_then(Value::as_str)
    {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    if let Some(division) = user.get("division").and_then(Value::as_str) {
        let division = division.trim();
        if looks_like_uuid(division) {
            return division_label(division)
                .unwrap_or("Unknown Division")
                .to_string();
        }
        if let Some(label) = division_label(division) {
            return label.to_string();
        }
        if !division.is_empty() {
            return division.to_string();
        }
    }

    "Unknown Division".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_codes_map_to_labels() {
        assert_eq!(division_label("uiux"), Some("UI/UX Designer"));
        assert_eq!(division_label("UI/UX"), Some("UI/UX Designer"));
        assert_eq!(division_label("FE"), Some("Frontend Dev"));
        assert_eq!(division_label("Frontend Developer"), Some("Frontend Dev"));
        assert_eq!(division_label("backend-dev"), Some("Backend Developer"));
        assert_eq!(division_label("devops"), Some("DevOps"));
        assert_eq!(division_label("marketing"), None);
    }

    #[test]
    fn devops_uuid_maps_to_label() {
        assert_eq!(division_label(DEVOPS_DIVISION_UUID), Some("DevOps"));
    }

    #[test]
    fn display_name_prefers_division_name_field() {
        let user = json!({"division_name": " Mobile ", "division": "backend"});
        assert_eq!(display_name(&user), "Mobile");
    }

    #[test]
    fn display_name_reads_nested_division_object() {
        let user = json!({"division": {"name": "Data Engineering"}});
        assert_eq!(display_name(&user), "Data Engineering");
    }

    #[test]
    fn display_name_maps_bare_uuid() {
        let user = json!({ "division": DEVOPS_DIVISION_UUID });
        assert_eq!(display_name(&user), "DevOps");
        let user = json!({"division": "11111111-2222-3333-4444-555555555555"});
        assert_eq!(display_name(&user), "Unknown Division");
    }

    #[test]
    fn display_name_falls_back_to_raw_string() {
        let user = json!({"division": "Growth"});
        assert_eq!(display_name(&user), "Growth");
        assert_eq!(display_name(&json!({})), "Unknown Division");
    }
}
