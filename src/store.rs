//! Read-only holder of the dereferenced specification document.

use std::path::Path;

use serde_json::{Map, Value};

use crate::config::GuardConfig;
use crate::error::ConfigError;
use crate::loader::{load_spec, load_spec_auto};
use crate::path::path_key;
use crate::types::json_type_name;

/// The specification document, loaded once and shared between requests.
///
/// Wrap it in an `Arc` and hand it to each guard; nothing mutates it after
/// construction.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    document: Value,
}

impl SchemaStore {
    /// Wrap an already dereferenced document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSchema` if the root, `paths` or
    /// `basePath` have the wrong JSON type.
    pub fn from_value(document: Value) -> Result<Self, ConfigError> {
        let Some(root) = document.as_object() else {
            return Err(ConfigError::InvalidSchema {
                message: format!(
                    "specification root must be an object, got {}",
                    json_type_name(&document)
                ),
            });
        };
        if let Some(paths) = root.get("paths").filter(|p| !p.is_object()) {
            return Err(ConfigError::InvalidSchema {
                message: format!("paths must be an object, got {}", json_type_name(paths)),
            });
        }
        if let Some(base) = root.get("basePath").filter(|b| !b.is_string()) {
            return Err(ConfigError::InvalidSchema {
                message: format!("basePath must be a string, got {}", json_type_name(base)),
            });
        }
        Ok(Self { document })
    }

    /// Load and dereference a specification file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_value(load_spec(path)?)
    }

    /// Load the specification named by `config`.
    pub fn from_config(config: &GuardConfig) -> Result<Self, ConfigError> {
        Self::from_value(load_spec_auto(&config.oas_file)?)
    }

    /// The whole document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Prefix stripped from route templates before lookup.
    pub fn base_path(&self) -> Option<&str> {
        self.document.get("basePath").and_then(Value::as_str)
    }

    /// Path-item table keyed by brace-syntax templates.
    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.document.get("paths").and_then(Value::as_object)
    }

    /// Path-item for an exact brace-syntax key.
    pub fn path_item(&self, key: &str) -> Result<&Value, ConfigError> {
        self.paths()
            .and_then(|paths| paths.get(key))
            .ok_or_else(|| ConfigError::PathNotFound {
                path: key.to_string(),
            })
    }

    /// Operation object for `method` (any case) under `key`.
    pub fn operation(&self, key: &str, method: &str) -> Result<&Value, ConfigError> {
        let method = method.to_lowercase();
        self.path_item(key)?
            .get(&method)
            .filter(|op| op.is_object())
            .ok_or_else(|| ConfigError::OperationNotFound {
                path: key.to_string(),
                method,
            })
    }

    /// Look up the path-item matching a framework route template.
    ///
    /// Returns the translated key along with the path-item.
    pub fn resolve_route(&self, route_template: &str) -> Result<(String, &Value), ConfigError> {
        let key = path_key(route_template, self.base_path());
        let item = self.path_item(&key)?;
        tracing::debug!(route = route_template, key = %key, "resolved path-item");
        Ok((key, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SchemaStore {
        SchemaStore::from_value(json!({
            "basePath": "/v1",
            "paths": {
                "/health": { "get": { "responses": {} } },
                "/books/{isbn}": { "put": {}, "parameters": [] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn accessors() {
        let store = store();
        assert_eq!(store.base_path(), Some("/v1"));
        assert_eq!(store.paths().unwrap().len(), 2);
        assert!(store.document().get("paths").is_some());
    }

    #[test]
    fn path_item_lookup() {
        let store = store();
        assert!(store.path_item("/health").is_ok());
        assert!(matches!(
            store.path_item("/missing"),
            Err(ConfigError::PathNotFound { .. })
        ));
    }

    #[test]
    fn operation_lookup_is_case_insensitive() {
        let store = store();
        assert!(store.operation("/health", "GET").is_ok());
        match store.operation("/health", "DELETE") {
            Err(ConfigError::OperationNotFound { method, .. }) => assert_eq!(method, "delete"),
            other => panic!("expected OperationNotFound, got {:?}", other),
        }
    }

    #[test]
    fn path_level_parameters_are_not_operations() {
        let store = store();
        assert!(store.operation("/books/{isbn}", "parameters").is_err());
    }

    #[test]
    fn resolve_route_strips_base_path() {
        let store = store();
        let (key, item) = store.resolve_route("/v1/health").unwrap();
        assert_eq!(key, "/health");
        assert!(item.get("get").is_some());

        let (key, _) = store.resolve_route("/v1/books/<isbn>").unwrap();
        assert_eq!(key, "/books/{isbn}");
    }

    #[test]
    fn missing_paths_table() {
        let store = SchemaStore::from_value(json!({})).unwrap();
        assert!(store.paths().is_none());
        assert!(store.base_path().is_none());
        assert!(store.resolve_route("/health").is_err());
    }

    #[test]
    fn rejects_malformed_roots() {
        assert!(SchemaStore::from_value(json!([])).is_err());
        assert!(SchemaStore::from_value(json!({ "paths": [] })).is_err());
        assert!(SchemaStore::from_value(json!({ "basePath": 1 })).is_err());
    }
}
