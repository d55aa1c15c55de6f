//! Derivation of JSON Schemas from OpenAPI parameter lists.
//!
//! Path and query parameters carry their constraints inline (`type`,
//! `format`, `enum`, `pattern`), so each location is folded into a single
//! object schema. The body parameter already holds a full schema.

use serde_json::{json, Map, Value};

use crate::types::{Location, SCHEMA_KEYS, UUID_PATTERN};

/// Filter a parameter definition down to the keys JSON Schema understands.
///
/// `format: uuid` is not part of the JSON Schema vocabulary, so it is
/// replaced by an equivalent `pattern`.
pub fn schema_property(parameter: &Value) -> Value {
    let mut property: Map<String, Value> = parameter
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter(|(key, _)| SCHEMA_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    if property.get("format").and_then(Value::as_str) == Some("uuid") {
        property.remove("format");
        property.insert("pattern".into(), Value::String(UUID_PATTERN.into()));
    }

    Value::Object(property)
}

/// Build the object schema for every parameter `in` the given location.
///
/// `required` is omitted entirely when no matching parameter is required.
/// For [`Location::Body`] this defers to [`body_schema`].
pub fn location_schema(parameters: &[Value], location: Location) -> Value {
    if location == Location::Body {
        return body_schema(parameters);
    }

    let mut properties = Map::new();
    let mut required = Vec::new();

    for parameter in parameters.iter().filter(|p| is_in(p, location)) {
        let Some(name) = parameter.get("name").and_then(Value::as_str) else {
            continue;
        };
        properties.insert(name.to_string(), schema_property(parameter));
        if parameter.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(Value::String(name.to_string()));
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}

/// Schema for route variables.
pub fn path_param_schema(parameters: &[Value]) -> Value {
    location_schema(parameters, Location::Path)
}

/// Schema for the parsed query string.
pub fn query_schema(parameters: &[Value]) -> Value {
    location_schema(parameters, Location::Query)
}

/// Nested schema of the first `in: body` parameter, or `{}` when there is none.
pub fn body_schema(parameters: &[Value]) -> Value {
    parameters
        .iter()
        .find(|p| is_in(p, Location::Body))
        .and_then(|p| p.get("schema"))
        .cloned()
        .unwrap_or_else(|| json!({}))
}

/// Parameter list stored under `parameters`, or empty when absent.
pub fn parameter_list(node: &Value) -> &[Value] {
    node.get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn is_in(parameter: &Value, location: Location) -> bool {
    parameter.get("in").and_then(Value::as_str) == Some(location.as_str())
}
