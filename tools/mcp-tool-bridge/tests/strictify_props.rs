use mcp_tool_bridge::domain::schema::strictify;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
        Just(json!("object")),
    ]
}

const KEYS: &[&str] = &[
    "type",
    "properties",
    "items",
    "oneOf",
    "anyOf",
    "allOf",
    "additionalProperties",
    "required",
    "description",
];

/// JSON values biased towards schema-shaped mappings.
fn schema_like() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((prop::sample::select(KEYS), inner.clone()), 0..6).prop_map(
                |entries| {
                    let mut map = Map::new();
                    for (key, value) in entries {
                        map.insert(key.to_string(), value);
                    }
                    Value::Object(map)
                }
            ),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|entries| {
                let mut properties = Map::new();
                for (key, value) in entries {
                    properties.insert(key, value);
                }
                json!({"type": "object", "properties": properties})
            }),
        ]
    })
}

/// Every node strictify visits that declares `"type": "object"` must carry
/// `"additionalProperties": false`.
fn objects_are_closed(node: &Value) -> bool {
    let Value::Object(map) = node else {
        return true;
    };
    if map.get("type") == Some(&json!("object"))
        && map.get("additionalProperties") != Some(&Value::Bool(false))
    {
        return false;
    }
    let properties_ok = match map.get("properties") {
        Some(Value::Object(properties)) => properties.values().all(objects_are_closed),
        _ => true,
    };
    let items_ok = map.get("items").is_none_or(objects_are_closed);
    let combinators_ok = ["oneOf", "anyOf", "allOf"].iter().all(|key| match map.get(*key) {
        Some(Value::Array(options)) => options.iter().all(objects_are_closed),
        _ => true,
    });
    properties_ok && items_ok && combinators_ok
}

proptest! {
    #[test]
    fn strictify_is_idempotent(schema in schema_like()) {
        let once = strictify(&schema);
        prop_assert_eq!(strictify(&once), once);
    }

    #[test]
    fn strictify_closes_every_reachable_object(schema in schema_like()) {
        prop_assert!(objects_are_closed(&strictify(&schema)));
    }

    #[test]
    fn strictify_leaves_input_alone(schema in schema_like()) {
        let before = schema.clone();
        let _ = strictify(&schema);
        prop_assert_eq!(schema, before);
    }

    #[test]
    fn non_mappings_pass_through(value in leaf()) {
        prop_assert_eq!(strictify(&value), value);
    }
}
