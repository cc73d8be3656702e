use serde::Serialize;
use serde_json::Value;

/// Flatten a tool-call result into the single observation string an LLM
/// function call expects.
///
/// One content item: primitives become their plain text, anything else is
/// JSON. Several items: the whole array as JSON. No usable `content` array:
/// the entire result as JSON.
pub fn flatten_call_result(result: &Value) -> String {
    match result.get("content").and_then(Value::as_array) {
        Some(items) if items.len() == 1 => flatten_item(&items[0]),
        Some(items) if items.len() > 1 => to_json_or_debug(items),
        _ => to_json_or_debug(result),
    }
}

fn flatten_item(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => to_json_or_debug(other),
    }
}

fn to_json_or_debug<T>(value: &T) -> String
where
    T: Serialize + std::fmt::Debug + ?Sized,
{
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}
