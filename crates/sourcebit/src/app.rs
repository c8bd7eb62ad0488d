//! The application: a router, its parameter rules and configuration.

use std::sync::Arc;

use sourcebit_router::{
    Handler, HandlerChain, Method, ParamGuard, RequestLogger, RoutePattern, Router, RuleRegistry,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::server;

/// An application under construction.
///
/// Registration methods forward to the inner [`Router`]. Once the routes
/// are in place, [`App::serve`] binds the configured address and runs
/// until the listener fails.
///
/// ```
/// use sourcebit::App;
/// use sourcebit_router::{handler, HandlerChain, Method, Request};
///
/// let mut app = App::new();
/// let guard = app.guard(&[("id", "int")]).unwrap();
/// app.route(
///     Method::Get,
///     "/users/:id",
///     HandlerChain::new(guard).then(handler(|req, res| Box::pin(async move {
///         let id = req.params.get("id").unwrap_or_default().to_string();
///         res.text(id);
///         Ok(())
///     }))),
/// )
/// .unwrap();
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let res = rt.block_on(app.router().handle(Request::get("/users/abc")));
/// assert_eq!(res.status, 400);
/// ```
#[derive(Debug)]
pub struct App {
    router: Router,
    rules: RuleRegistry,
    config: Config,
}

impl App {
    /// Creates an application with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an application from a configuration.
    ///
    /// `debug` turns on diagnostic error pages and `request_log` installs
    /// [`RequestLogger`] as the first middleware.
    pub fn with_config(config: Config) -> Self {
        let mut router = Router::new();
        router.set_debug_mode(config.debug);
        if config.request_log {
            router.middleware(RequestLogger);
        }
        Self {
            router,
            rules: RuleRegistry::new(),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the router for direct registration.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Consumes the application, returning its router.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Adds a GET route.
    pub fn get(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.router.get(pattern, handler)?;
        Ok(self)
    }

    /// Adds a POST route.
    pub fn post(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.router.post(pattern, handler)?;
        Ok(self)
    }

    /// Adds a PUT route.
    pub fn put(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.router.put(pattern, handler)?;
        Ok(self)
    }

    /// Adds a PATCH route.
    pub fn patch(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.router.patch(pattern, handler)?;
        Ok(self)
    }

    /// Adds a DELETE route.
    pub fn delete(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.router.delete(pattern, handler)?;
        Ok(self)
    }

    /// Adds a route for GET, POST, PUT, DELETE and PATCH.
    pub fn all(&mut self, pattern: impl Into<RoutePattern>, handler: impl Handler) -> Result<&mut Self> {
        self.router.all(pattern, handler)?;
        Ok(self)
    }

    /// Adds a route with a full handler chain.
    pub fn route(
        &mut self,
        method: Method,
        pattern: impl Into<RoutePattern>,
        chain: HandlerChain,
    ) -> Result<&mut Self> {
        self.router.route(method, pattern, chain)?;
        Ok(self)
    }

    /// Adds a named route.
    pub fn named(
        &mut self,
        name: &str,
        method: Method,
        template: &str,
        chain: HandlerChain,
    ) -> Result<&mut Self> {
        self.router.named(name, method, template, chain)?;
        Ok(self)
    }

    /// Adds middleware that runs for every request.
    pub fn middleware(&mut self, handler: impl Handler) -> &mut Self {
        self.router.middleware(handler);
        self
    }

    /// Adds middleware scoped to a path prefix.
    pub fn scoped_middleware(&mut self, prefix: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.router.scoped_middleware(prefix, handler);
        self
    }

    /// Mounts a child router under `prefix`.
    pub fn mount(&mut self, prefix: &str, child: &Router) -> Result<&mut Self> {
        self.router.mount(prefix, child)?;
        Ok(self)
    }

    /// Builds a child router and mounts it under `prefix`.
    pub fn group<F>(&mut self, prefix: &str, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Router) -> sourcebit_router::Result<()>,
    {
        self.router.group(prefix, build)?;
        Ok(self)
    }

    /// Enables or disables diagnostic error pages.
    pub fn set_debug_mode(&mut self, enabled: bool) -> &mut Self {
        self.router.set_debug_mode(enabled);
        self
    }

    /// Returns the parameter rules.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Registers a parameter rule.
    pub fn add_rule<F>(&mut self, name: impl Into<String>, rule: F) -> Result<&mut Self>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.add(name, rule)?;
        Ok(self)
    }

    /// Builds a guard handler from registered rules.
    pub fn guard(&self, checks: &[(&str, &str)]) -> Result<ParamGuard> {
        Ok(self.rules.guard(checks)?)
    }

    /// Binds the configured address and serves requests.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.address()).await?;
        info!(
            "SourceBit running at http://{}",
            listener.local_addr()?
        );
        server::serve(listener, Arc::new(self.router)).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
