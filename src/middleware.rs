//! Interceptors that run the validators around a route handler.

use std::sync::Arc;

use crate::config::GuardConfig;
use crate::error::{ConfigError, GuardError};
use crate::request::{validate_request, RequestContext};
use crate::response::{HttpResponse, ResponseReporter, ResponseValidator, TracingReporter};
use crate::store::SchemaStore;
use crate::types::ResponseOptions;

/// The rest of the chain, ending in the route handler.
pub type Next<'a, R> = &'a dyn Fn(&R) -> Result<HttpResponse, GuardError>;

/// A request interceptor.
pub trait Middleware<R: RequestContext + ?Sized>: Send + Sync {
    /// Process the request and optionally pass it to `next`.
    fn handle(&self, request: &R, next: Next<'_, R>) -> Result<HttpResponse, GuardError>;
}

/// Rejects requests that don't match the specification before the handler runs.
#[derive(Debug, Clone)]
pub struct RequestGuard {
    store: Arc<SchemaStore>,
}

impl RequestGuard {
    pub fn new(store: Arc<SchemaStore>) -> Self {
        Self { store }
    }
}

impl<R: RequestContext + ?Sized> Middleware<R> for RequestGuard {
    fn handle(&self, request: &R, next: Next<'_, R>) -> Result<HttpResponse, GuardError> {
        validate_request(&self.store, request)?;
        next(request)
    }
}

/// Checks the handler's response once it has run.
#[derive(Debug, Clone)]
pub struct ResponseGuard {
    store: Arc<SchemaStore>,
    validator: ResponseValidator,
}

impl ResponseGuard {
    pub fn new(store: Arc<SchemaStore>, validator: ResponseValidator) -> Self {
        Self { store, validator }
    }
}

impl<R: RequestContext + ?Sized> Middleware<R> for ResponseGuard {
    fn handle(&self, request: &R, next: Next<'_, R>) -> Result<HttpResponse, GuardError> {
        let response = next(request)?;
        self.validator.validate(&self.store, request, &response)?;
        Ok(response)
    }
}

/// Middleware executed in insertion order around a handler.
pub struct GuardChain<R: RequestContext + ?Sized> {
    middlewares: Vec<Arc<dyn Middleware<R>>>,
}

impl<R: RequestContext + ?Sized> GuardChain<R> {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware; earlier entries wrap later ones.
    pub fn with<M: Middleware<R> + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run the chain with `handler` at its end.
    ///
    /// On success the handler's response comes back unchanged.
    pub fn apply<H>(&self, request: &R, handler: H) -> Result<HttpResponse, GuardError>
    where
        H: Fn(&R) -> HttpResponse,
    {
        tracing::trace!(middleware_count = self.middlewares.len(), "executing guard chain");
        self.execute_from(0, request, &|req: &R| -> Result<HttpResponse, GuardError> {
            Ok(handler(req))
        })
    }

    fn execute_from(
        &self,
        index: usize,
        request: &R,
        handler: Next<'_, R>,
    ) -> Result<HttpResponse, GuardError> {
        match self.middlewares.get(index) {
            None => handler(request),
            Some(middleware) => middleware.handle(request, &|req: &R| {
                self.execute_from(index + 1, req, handler)
            }),
        }
    }
}

impl<R: RequestContext + ?Sized> Default for GuardChain<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds guards that share one loaded specification.
#[derive(Clone)]
pub struct Guards {
    store: Arc<SchemaStore>,
    defaults: ResponseOptions,
    reporter: Arc<dyn ResponseReporter>,
}

impl std::fmt::Debug for Guards {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guards")
            .field("store", &self.store)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Guards {
    /// Guards over `store` with the given response defaults.
    pub fn new(store: Arc<SchemaStore>, defaults: ResponseOptions) -> Self {
        Self {
            store,
            defaults,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Load the specification named by `config` and use its response defaults.
    pub fn from_config(config: &GuardConfig) -> Result<Self, ConfigError> {
        let store = SchemaStore::from_config(config)?;
        Ok(Self::new(Arc::new(store), config.response))
    }

    /// Route warnings and log records to `reporter` instead of `tracing`.
    pub fn reporter(mut self, reporter: Arc<dyn ResponseReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn request(&self) -> RequestGuard {
        RequestGuard::new(self.store.clone())
    }

    /// Response guard using the application defaults.
    pub fn response(&self) -> ResponseGuard {
        self.response_with(self.defaults)
    }

    /// Response guard with per-route reactions.
    pub fn response_with(&self, options: ResponseOptions) -> ResponseGuard {
        let validator = ResponseValidator::with_reporter(options, self.reporter.clone());
        ResponseGuard::new(self.store.clone(), validator)
    }

    /// Request guard followed by a response guard with `options`.
    pub fn chain<R: RequestContext + ?Sized>(&self, options: ResponseOptions) -> GuardChain<R> {
        GuardChain::new()
            .with(self.request())
            .with(self.response_with(options))
    }
}
