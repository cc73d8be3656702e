use serde_json::{Map, Value};

const COMBINATOR_KEYS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

/// Rewrite a JSON Schema fragment into the strict form expected by
/// function-calling providers: every object-typed node gets
/// `"additionalProperties": false`.
///
/// Recurses through `properties`, a single-schema `items` and the
/// `oneOf`/`anyOf`/`allOf` combinators. Anything else, including tuple-form
/// `items` and non-object inputs, is returned as is. The input is never
/// mutated and property order is preserved.
pub fn strictify(schema: &Value) -> Value {
    let Value::Object(source) = schema else {
        return schema.clone();
    };

    let mut strict = source.clone();

    if strict.get("type").and_then(Value::as_str) == Some("object") {
        strict.insert("additionalProperties".into(), Value::Bool(false));
    }

    if let Some(Value::Object(properties)) = strict.get("properties") {
        let properties: Map<String, Value> = properties
            .iter()
            .map(|(name, sub_schema)| (name.clone(), strictify(sub_schema)))
            .collect();
        strict.insert("properties".into(), Value::Object(properties));
    }

    // tuple-form items is an array and falls through unchanged
    if let Some(items) = strict.get("items") {
        let items = strictify(items);
        strict.insert("items".into(), items);
    }

    for key in COMBINATOR_KEYS {
        if let Some(Value::Array(variants)) = strict.get(key) {
            let variants = variants.iter().map(strictify).collect();
            strict.insert(key.into(), Value::Array(variants));
        }
    }

    Value::Object(strict)
}
