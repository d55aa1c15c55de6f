//! Request-side validation: path variables, query string and JSON body.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{GuardError, RequestValidationError};
use crate::params::{body_schema, parameter_list, path_param_schema, query_schema};
use crate::store::SchemaStore;
use crate::types::{Location, BODY_METHODS};
use crate::validator::validate_against_schema;

/// What the validator needs to know about the request being served.
///
/// Implement this for the host framework's request type.
pub trait RequestContext {
    /// HTTP method, any case.
    fn method(&self) -> &str;

    /// Raw request URL; only its query string is used.
    fn url(&self) -> &str;

    /// Route template the framework matched, in `<param>` syntax.
    fn route_template(&self) -> &str;

    /// Route variables already extracted by the framework.
    fn view_args(&self) -> &BTreeMap<String, String>;

    /// Parsed JSON body; `Value::Null` when there is no body.
    fn json_body(&self) -> Result<Value, RequestValidationError>;
}

/// A framework-independent request.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub route_template: String,
    pub view_args: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        route_template: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            route_template: route_template.into(),
            ..Self::default()
        }
    }

    /// Add a route variable.
    pub fn view_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.view_args.insert(name.into(), value.into());
        self
    }

    /// Set the raw body bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the body to the serialized form of `value`.
    pub fn json(self, value: &Value) -> Self {
        self.body(value.to_string())
    }
}

impl RequestContext for HttpRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn route_template(&self) -> &str {
        &self.route_template
    }

    fn view_args(&self) -> &BTreeMap<String, String> {
        &self.view_args
    }

    fn json_body(&self) -> Result<Value, RequestValidationError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
            .map_err(|source| RequestValidationError::MalformedBody { source })
    }
}

/// Parse the query string of `url` into a flat string map.
///
/// Values are percent-decoded but never coerced, so `title=1234` stays the
/// string `"1234"`. The first occurrence of a repeated key wins and
/// parameters with blank values are dropped.
pub fn query_params(url: &str) -> Map<String, Value> {
    let Some((_, query)) = url.split_once('?') else {
        return Map::new();
    };
    let query = query.split_once('#').map_or(query, |(q, _)| q);

    let mut params = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_insert_with(|| Value::String(value.into_owned()));
    }
    params
}

/// Validate a request against its path-item and operation.
///
/// Runs the path, query and body checks in that order and stops at the
/// first failing location.
///
/// # Errors
///
/// `GuardError::Config` when the route or method has no entry in the
/// specification, `GuardError::Request` when the request doesn't match it.
pub fn validate_request<R>(store: &SchemaStore, request: &R) -> Result<(), GuardError>
where
    R: RequestContext + ?Sized,
{
    let method = request.method().to_lowercase();
    let (key, path_item) = store.resolve_route(request.route_template())?;

    if let Some(parameters) = path_item.get("parameters").and_then(Value::as_array) {
        let schema = path_param_schema(parameters);
        let instance: Map<String, Value> = request
            .view_args()
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        check(Location::Path, &schema, &Value::Object(instance))?;
    }

    let operation = store.operation(&key, &method)?;
    let parameters = parameter_list(operation);

    if !parameters.is_empty() {
        let schema = query_schema(parameters);
        let instance = Value::Object(query_params(request.url()));
        check(Location::Query, &schema, &instance)?;
    }

    if BODY_METHODS.contains(&method.as_str()) {
        let body = request.json_body()?;
        check(Location::Body, &body_schema(parameters), &body)?;
    }

    tracing::debug!(method = %method, path = %key, "request validated");
    Ok(())
}

fn check(location: Location, schema: &Value, instance: &Value) -> Result<(), GuardError> {
    match validate_against_schema(schema, instance)? {
        None => Ok(()),
        Some(error) => {
            tracing::debug!(%location, %error, "request validation failed");
            Err(RequestValidationError::Invalid {
                location,
                errors: vec![error],
            }
            .into())
        }
    }
}
