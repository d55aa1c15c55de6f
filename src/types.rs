//! Core types shared by the request and response pipelines.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys copied from a path/query parameter definition into its derived schema.
pub const SCHEMA_KEYS: &[&str] = &["type", "format", "enum", "pattern"];

/// Pattern substituted for the non-standard `format: uuid`.
pub const UUID_PATTERN: &str =
    "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

/// Methods whose request body is validated.
pub const BODY_METHODS: &[&str] = &["post", "put", "patch"];

/// Response key consulted when no entry matches the status code.
pub const DEFAULT_RESPONSE_KEY: &str = "default";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Where a parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Location {
    /// Value of the parameter's `in` key for this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Body => "body",
        }
    }

    /// Parse an `in` value. Returns `None` for locations this crate ignores
    /// (`header`, `formData`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Location::Path),
            "query" => Some(Location::Query),
            "body" => Some(Location::Body),
            _ => None,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reactions to a response that fails validation.
///
/// Every enabled reaction fires; enabling `emit_error` does not suppress
/// the warning or the log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseOptions {
    /// Raise a response validation error.
    pub emit_error: bool,
    /// Emit a non-fatal warning.
    pub emit_warning: bool,
    /// Emit an error-level log record.
    pub emit_log: bool,
}

impl Default for ResponseOptions {
    /// Observe-only: warn, never raise.
    fn default() -> Self {
        Self {
            emit_error: false,
            emit_warning: true,
            emit_log: false,
        }
    }
}

impl ResponseOptions {
    /// All reactions disabled.
    pub fn silent() -> Self {
        Self {
            emit_error: false,
            emit_warning: false,
            emit_log: false,
        }
    }

    pub fn emit_error(mut self, enabled: bool) -> Self {
        self.emit_error = enabled;
        self
    }

    pub fn emit_warning(mut self, enabled: bool) -> Self {
        self.emit_warning = enabled;
        self
    }

    pub fn emit_log(mut self, enabled: bool) -> Self {
        self.emit_log = enabled;
        self
    }
}
