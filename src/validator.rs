//! Instance validation against derived or declared schemas.

use serde_json::Value;

use crate::error::{ConfigError, SchemaError};

/// Validate an instance and report its first violation, if any.
///
/// Only the first error is reported so that a failure message stays short
/// and stable across validator upgrades.
///
/// # Errors
///
/// Returns `ConfigError::InvalidSchema` if `schema` itself does not compile.
pub fn validate_against_schema(
    schema: &Value,
    instance: &Value,
) -> Result<Option<SchemaError>, ConfigError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ConfigError::InvalidSchema {
        message: e.to_string(),
    })?;

    let first = validator.iter_errors(instance).next().map(|e| SchemaError {
        path: e.instance_path.to_string(),
        message: e.to_string(),
    });
    Ok(first)
}
