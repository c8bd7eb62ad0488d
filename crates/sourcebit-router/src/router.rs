//! Main router implementation.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{install_panic_hook, Result, RouterError};
use crate::handler::{Handler, HandlerChain};
use crate::middleware::MiddlewareEntry;
use crate::path::{PathPattern, RoutePattern};
use crate::request::Method;
use crate::table::{Route, RouteTable};

/// Methods covered by [`Router::all`].
const ALL_METHODS: [Method; 5] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Patch,
];

/// The main router for handling HTTP requests.
///
/// All registration happens during setup through `&mut self`; dispatch
/// only needs `&self`, so a configured router can be shared across tasks
/// (for example behind an `Arc`) without locking.
#[derive(Debug, Default)]
pub struct Router {
    /// Prefix used by [`Router::nest`].
    prefix: String,
    /// Registered routes.
    table: RouteTable,
    /// Middleware run before route matching.
    middleware: Vec<MiddlewareEntry>,
    /// Named routes for reverse URL lookup.
    named_routes: HashMap<String, PathPattern>,
    /// Render diagnostic pages for handler errors.
    debug: bool,
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router meant to be nested under `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Returns the router's prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Adds a GET route.
    pub fn get(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Get, pattern, HandlerChain::new(handler))
    }

    /// Adds a POST route.
    pub fn post(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Post, pattern, HandlerChain::new(handler))
    }

    /// Adds a PUT route.
    pub fn put(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Put, pattern, HandlerChain::new(handler))
    }

    /// Adds a PATCH route.
    pub fn patch(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Patch, pattern, HandlerChain::new(handler))
    }

    /// Adds a DELETE route.
    pub fn delete(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Delete, pattern, HandlerChain::new(handler))
    }

    /// Adds a HEAD route.
    pub fn head(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Head, pattern, HandlerChain::new(handler))
    }

    /// Adds an OPTIONS route.
    pub fn options(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.route(Method::Options, pattern, HandlerChain::new(handler))
    }

    /// Adds the same handler under GET, POST, PUT, DELETE and PATCH.
    pub fn all(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        let pattern = PathPattern::from_pattern(pattern.into())?;
        let chain = HandlerChain::new(handler);
        for method in ALL_METHODS {
            self.insert(method, pattern.clone(), chain.clone(), None);
        }
        Ok(self)
    }

    /// Adds a route with any method and a full handler chain.
    ///
    /// Fails if the template does not compile; nothing is registered in
    /// that case.
    pub fn route(
        &mut self,
        method: Method,
        pattern: impl Into<RoutePattern>,
        chain: HandlerChain,
    ) -> Result<&mut Self> {
        let pattern = PathPattern::from_pattern(pattern.into())?;
        self.insert(method, pattern, chain, None);
        Ok(self)
    }

    /// Adds a named route, available to [`Router::url_for`].
    pub fn named(
        &mut self,
        name: &str,
        method: Method,
        template: &str,
        chain: HandlerChain,
    ) -> Result<&mut Self> {
        if self.named_routes.contains_key(name) {
            return Err(RouterError::DuplicateRouteName(name.to_string()));
        }
        let pattern = PathPattern::compile(template)?;
        self.named_routes.insert(name.to_string(), pattern.clone());
        self.insert(method, pattern, chain, Some(name.to_string()));
        Ok(self)
    }

    fn insert(&mut self, method: Method, pattern: PathPattern, chain: HandlerChain, name: Option<String>) {
        let route = self.table.add(method, pattern, chain, name);
        debug!(
            method = %route.method,
            template = route.template(),
            specificity = route.specificity(),
            "registered route"
        );
    }

    /// Adds middleware that runs for every request.
    pub fn middleware(&mut self, handler: impl Handler) -> &mut Self {
        self.middleware.push(MiddlewareEntry::unconditional(handler));
        self
    }

    /// Adds middleware that runs when the request path starts with
    /// `prefix`.
    pub fn scoped_middleware(&mut self, prefix: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.middleware.push(MiddlewareEntry::scoped(prefix, handler));
        self
    }

    /// Copies `child`'s routes into this router under `prefix`.
    ///
    /// The copy happens now; routes added to `child` afterwards are not
    /// seen. The child's middleware is not copied: register shared
    /// middleware on this router if it should apply. Named routes keep
    /// their names under the combined template.
    pub fn mount(&mut self, prefix: &str, child: &Self) -> Result<&mut Self> {
        // Compile everything first so a failure leaves this router untouched.
        let mut names = Vec::with_capacity(child.named_routes.len());
        for (name, pattern) in &child.named_routes {
            if self.named_routes.contains_key(name) {
                return Err(RouterError::DuplicateRouteName(name.clone()));
            }
            names.push((name.clone(), pattern.prefixed(prefix)?));
        }
        let mut mounted = Vec::with_capacity(child.table.len());
        for route in child.table.iter() {
            mounted.push((route.method, route.pattern.prefixed(prefix)?, route));
        }

        self.named_routes.extend(names);
        for (method, pattern, route) in mounted {
            self.insert(method, pattern, route.chain.clone(), route.name.clone());
        }

        debug!(prefix, routes = child.table.len(), "mounted router");
        Ok(self)
    }

    /// Mounts `child` under its own prefix.
    pub fn nest(&mut self, child: &Self) -> Result<&mut Self> {
        let prefix = child.prefix.clone();
        self.mount(&prefix, child)
    }

    /// Builds a child router with `build` and mounts it under `prefix`.
    ///
    /// ```
    /// use sourcebit_router::{handler, Router};
    ///
    /// let mut router = Router::new();
    /// router
    ///     .group("/api", |api| {
    ///         api.get("/health", handler(|_req, res| Box::pin(async move {
    ///             res.text("ok");
    ///             Ok(())
    ///         })))?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    /// assert_eq!(router.routes(sourcebit_router::Method::Get)[0].template(), "/api/health");
    /// ```
    pub fn group<F>(&mut self, prefix: &str, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut child = Self::with_prefix(prefix);
        build(&mut child)?;
        self.nest(&child)
    }

    /// Enables or disables diagnostic error pages.
    ///
    /// Enabling it also installs a process-wide panic hook so that pages
    /// for panicking handlers show where the panic happened.
    pub fn set_debug_mode(&mut self, enabled: bool) -> &mut Self {
        if enabled {
            install_panic_hook();
        }
        self.debug = enabled;
        self
    }

    /// Returns whether diagnostic error pages are enabled.
    pub fn debug_mode(&self) -> bool {
        self.debug
    }

    /// Returns whether any route has been registered or mounted.
    pub fn has_routes(&self) -> bool {
        !self.table.is_empty()
    }

    /// Returns the routes for one method in match order.
    pub fn routes(&self, method: Method) -> &[Route] {
        self.table.routes(method)
    }

    /// Returns the route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Returns the middleware chain.
    pub fn middleware_chain(&self) -> &[MiddlewareEntry] {
        &self.middleware
    }

    /// Generates a URL for a named route.
    pub fn url_for(&self, name: &str, params: &HashMap<String, String>) -> Option<String> {
        self.named_routes.get(name).and_then(|p| p.reverse(params))
    }
}
