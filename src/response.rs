//! Response-side validation against the operation's declared `responses`.
//!
//! A mismatch can raise, warn and/or log. Each reaction is switched
//! independently, which allows running observe-only before enforcing.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{GuardError, ResponseValidationError};
use crate::request::RequestContext;
use crate::store::SchemaStore;
use crate::types::{ResponseOptions, DEFAULT_RESPONSE_KEY};
use crate::validator::validate_against_schema;

/// Prefix of every warning and log record about a failed response.
pub const RESPONSE_FAILURE_PREFIX: &str = "Validation of response failed";

/// Body produced by a handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Json(Value),
}

/// A framework-independent response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self { status, body }
    }

    /// Plain-text response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, ResponseBody::Text(body.into()))
    }

    /// JSON response.
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, ResponseBody::Json(body))
    }

    /// The instance validated against the response schema.
    ///
    /// Text bodies validate as JSON strings, empty bodies as `null`.
    pub fn payload(&self) -> Value {
        match &self.body {
            ResponseBody::Empty => Value::Null,
            ResponseBody::Text(text) => Value::String(text.clone()),
            ResponseBody::Json(value) => value.clone(),
        }
    }
}

/// Sink for the non-fatal reactions.
pub trait ResponseReporter: Send + Sync {
    /// Non-fatal warning.
    fn warning(&self, message: &str);

    /// Error-level log record.
    fn log(&self, message: &str);
}

/// Reports through `tracing`: warnings at WARN, log records at ERROR.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ResponseReporter for TracingReporter {
    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn log(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Find the schema declared for `status`, falling back to `default`.
///
/// A response entry without a `schema` constrains nothing and yields `{}`.
/// Returns `None` when neither key is present.
pub fn response_schema(responses: &Map<String, Value>, status: u16) -> Option<Value> {
    responses
        .get(&status.to_string())
        .or_else(|| responses.get(DEFAULT_RESPONSE_KEY))
        .map(|response| {
            response
                .get("schema")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()))
        })
}

/// Checks handler output and applies the configured reactions.
#[derive(Clone)]
pub struct ResponseValidator {
    options: ResponseOptions,
    reporter: Arc<dyn ResponseReporter>,
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ResponseValidator {
    /// Validator reporting through [`TracingReporter`].
    pub fn new(options: ResponseOptions) -> Self {
        Self::with_reporter(options, Arc::new(TracingReporter))
    }

    pub fn with_reporter(options: ResponseOptions, reporter: Arc<dyn ResponseReporter>) -> Self {
        Self { options, reporter }
    }

    /// Validate `response` against the operation matched by `request`.
    ///
    /// # Errors
    ///
    /// `GuardError::Config` when the route has no path-item. A response
    /// failure is returned only when `emit_error` is enabled; otherwise it
    /// is reported and `Ok(())` comes back.
    pub fn validate<R>(
        &self,
        store: &SchemaStore,
        request: &R,
        response: &HttpResponse,
    ) -> Result<(), GuardError>
    where
        R: RequestContext + ?Sized,
    {
        let method = request.method().to_lowercase();
        let (key, path_item) = store.resolve_route(request.route_template())?;

        let responses = path_item
            .get(&method)
            .and_then(|operation| operation.get("responses"))
            .and_then(Value::as_object)
            .filter(|responses| !responses.is_empty());

        let Some(responses) = responses else {
            return self.react(ResponseValidationError::NoResponseSchemas {
                path: key,
                method,
            });
        };

        let Some(schema) = response_schema(responses, response.status) else {
            return self.react(ResponseValidationError::MissingStatusSchema {
                status: response.status,
            });
        };

        match validate_against_schema(&schema, &response.payload())? {
            None => {
                tracing::debug!(
                    method = %method,
                    path = %key,
                    status = response.status,
                    "response validated"
                );
                Ok(())
            }
            Some(error) => self.react(ResponseValidationError::Invalid {
                status: response.status,
                errors: vec![error],
            }),
        }
    }

    /// Fire every enabled reaction, raising last.
    fn react(&self, error: ResponseValidationError) -> Result<(), GuardError> {
        let message = format!("{}: {}", RESPONSE_FAILURE_PREFIX, error);
        if self.options.emit_warning {
            self.reporter.warning(&message);
        }
        if self.options.emit_log {
            self.reporter.log(&message);
        }
        if self.options.emit_error {
            return Err(error.into());
        }
        Ok(())
    }
}
