//! Error types for specification loading and request/response validation.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Location;

/// Deployment or specification authoring problems.
///
/// These are never the client's fault and cannot be fixed by retrying.
#[derive(Debug, Error)]
pub enum ConfigError {
    // IO errors (exit code 3)
    #[error("specification file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot resolve $ref: {message}")]
    RefError { message: String },

    // Lookup errors (exit code 2)
    #[error("no schema defined for route {path}")]
    PathNotFound { path: String },

    #[error("no schema defined for {method} {path}")]
    OperationNotFound { path: String, method: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::FileNotFound { .. } | ConfigError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ConfigError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// The incoming request does not match the specification.
#[derive(Debug, Error)]
pub enum RequestValidationError {
    #[error("invalid {location}: {}", join_errors(errors))]
    Invalid {
        location: Location,
        errors: Vec<SchemaError>,
    },

    #[error("invalid body: malformed JSON: {source}")]
    MalformedBody {
        #[source]
        source: serde_json::Error,
    },
}

impl RequestValidationError {
    /// Request location that failed validation.
    pub fn location(&self) -> Location {
        match self {
            Self::Invalid { location, .. } => *location,
            Self::MalformedBody { .. } => Location::Body,
        }
    }
}

/// The handler produced a response that contradicts its declared schema.
#[derive(Debug, Error)]
pub enum ResponseValidationError {
    #[error("response schemas not found for operation {method} {path}")]
    NoResponseSchemas { path: String, method: String },

    #[error("Cannot locate response schema for status code {status}")]
    MissingStatusSchema { status: u16 },

    #[error("response for status code {status} is invalid: {}", join_errors(errors))]
    Invalid { status: u16, errors: Vec<SchemaError> },
}

/// Any failure raised by the validation middleware.
///
/// Hosts map each kind to its own HTTP status via [`GuardError::status_code`].
#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] RequestValidationError),

    #[error(transparent)]
    Response(#[from] ResponseValidationError),
}

impl GuardError {
    /// Conventional HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Request(_) => 400,
            GuardError::Config(_) | GuardError::Response(_) => 500,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GuardError::Config(e) => e.exit_code(),
            GuardError::Request(_) | GuardError::Response(_) => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
