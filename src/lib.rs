//! OpenAPI Request/Response Validation
//!
//! Validates live HTTP traffic against a pre-loaded OpenAPI (Swagger 2.0
//! style) specification document, so route handlers can assume their
//! inputs are shape-correct and contract drift in their outputs is caught.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use oas_schema::{Guards, HttpRequest, HttpResponse, ResponseOptions, SchemaStore};
//! use serde_json::json;
//!
//! let store = SchemaStore::from_value(json!({
//!     "paths": {
//!         "/books/by-title": {
//!             "get": {
//!                 "parameters": [
//!                     { "name": "title", "in": "query", "type": "string", "required": true }
//!                 ],
//!                 "responses": { "200": { "schema": { "type": "array" } } }
//!             }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let guards = Guards::new(Arc::new(store), ResponseOptions::default());
//! let chain = guards.chain(ResponseOptions::default().emit_error(true));
//!
//! let request = HttpRequest::new("GET", "/books/by-title?title=1234", "/books/by-title");
//! let response = chain.apply(&request, |_| HttpResponse::json(200, json!([])));
//! assert!(response.is_ok());
//!
//! let request = HttpRequest::new("GET", "/books/by-title", "/books/by-title");
//! let err = chain.apply(&request, |_| HttpResponse::json(200, json!([]))).unwrap_err();
//! assert_eq!(err.status_code(), 400);
//! ```
//!
//! # Pipeline
//!
//! | Step | Schema | Instance |
//! |------|--------|----------|
//! | path | path-item `parameters` with `in: path` | route variables |
//! | query | operation `parameters` with `in: query` | parsed query string |
//! | body (`post`, `put`, `patch`) | `schema` of the `in: body` parameter | JSON body |
//! | response | `responses[status]`, else `responses.default` | handler output |
//!
//! Request validation stops at the first failing step. Response failures
//! raise, warn and/or log depending on [`ResponseOptions`].

mod config;
mod error;
mod loader;
mod middleware;
mod params;
mod path;
mod request;
mod response;
mod store;
mod types;
mod validator;

pub use config::{GuardConfig, OAS_FILE_ENV};
pub use error::{
    ConfigError, GuardError, RequestValidationError, ResponseValidationError, SchemaError,
};
pub use loader::{
    default_spec_path, dereference, is_url, load_spec, load_spec_auto, load_spec_str,
    navigate_fragment, read_json,
};
pub use middleware::{GuardChain, Guards, Middleware, Next, RequestGuard, ResponseGuard};
pub use params::{
    body_schema, location_schema, parameter_list, path_param_schema, query_schema,
    schema_property,
};
pub use path::path_key;
pub use request::{query_params, validate_request, HttpRequest, RequestContext};
pub use response::{
    response_schema, HttpResponse, ResponseBody, ResponseReporter, ResponseValidator,
    TracingReporter, RESPONSE_FAILURE_PREFIX,
};
pub use store::SchemaStore;
pub use types::{Location, ResponseOptions, BODY_METHODS, DEFAULT_RESPONSE_KEY, UUID_PATTERN};
pub use validator::validate_against_schema;

#[cfg(feature = "remote")]
pub use loader::load_spec_url;
