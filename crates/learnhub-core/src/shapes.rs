use serde_json::Value;

type ShapeExtractor = fn(&Value) -> Option<&Vec<Value>>;

fn bare_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array()
}

fn data_resources(value: &Value) -> Option<&Vec<Value>> {
    value.get("data")?.get("resources")?.as_array()
}

fn resources(value: &Value) -> Option<&Vec<Value>> {
    value.get("resources")?.as_array()
}

fn posts(value: &Value) -> Option<&Vec<Value>> {
    value.get("posts")?.as_array()
}

fn data(value: &Value) -> Option<&Vec<Value>> {
    value.get("data")?.as_array()
}

// Backend list payloads come in several shapes depending on which revision of
// the API answers. Extractors run in priority order; the first hit wins.
const LIST_SHAPES: &[ShapeExtractor] = &[bare_array, data_resources, resources, posts, data];

/// Finds the item array inside an arbitrarily-wrapped list payload.
pub fn extract_list(value: &Value) -> Option<&Vec<Value>> {
    LIST_SHAPES.iter().find_map(|extract| extract(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_wins() {
        let value = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(extract_list(&value).map(Vec::len), Some(2));
    }

    #[test]
    fn nested_resources_beat_plain_data() {
        let value = json!({
            "data": {"resources": [{"id": 1}]},
        });
        let items = extract_list(&value).expect("items");
        assert_eq!(items.len(), 1);

        let value = json!({
            "resources": [{"id": 1}, {"id": 2}],
            "data": [{"id": 3}],
        });
        // "resources" has priority over "data"
        assert_eq!(extract_list(&value).map(Vec::len), Some(2));
    }

    #[test]
    fn posts_and_data_shapes_extract() {
        assert_eq!(extract_list(&json!({"posts": [{}]})).map(Vec::len), Some(1));
        assert_eq!(
            extract_list(&json!({"data": [{}, {}, {}]})).map(Vec::len),
            Some(3)
        );
    }

    #[test]
    fn unknown_shape_yields_none() {
        assert!(extract_list(&json!({"items": 5})).is_none());
        assert!(extract_list(&json!("plain")).is_none());
    }
}
