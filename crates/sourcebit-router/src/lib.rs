//! # sourcebit-router
//!
//! HTTP routing and middleware dispatch.
//!
//! This crate provides:
//! - Path templates with `:param` and trailing `*` segments
//! - Per-method route tables ordered by specificity
//! - Unconditional and prefix-scoped middleware
//! - Mounting of child routers under a prefix
//! - A dispatcher with exactly-once response semantics, a JSON 404,
//!   and generic or diagnostic 500 pages
//! - Named routes for reverse URL lookup
//! - A registry of named parameter rules and guards built from it
//!
//! ## Quick Start
//!
//! ```
//! use sourcebit_router::{handler, BoxFuture, HandlerResult, Request, Response, Router};
//!
//! fn user<'a>(req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
//!     Box::pin(async move {
//!         let id = req.params.require("id")?.to_string();
//!         res.json(&serde_json::json!({ "id": id }))?;
//!         Ok(())
//!     })
//! }
//!
//! # fn main() -> sourcebit_router::Result<()> {
//! let mut router = Router::new();
//! router
//!     .get("/", handler(|_req, res| Box::pin(async move {
//!         res.text("Hello, World!");
//!         Ok(())
//!     })))?
//!     .get("/users/:id", user)?;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let response = rt.block_on(router.handle(Request::get("/users/123")));
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Matching order
//!
//! Routes are tried from most to least specific, where specificity is the
//! number of literal segments. Routes of equal specificity are tried in
//! registration order, so `GET /:id` registered before `GET /:name` always
//! wins for `/42`. Raw regex routes have specificity 0.
//!
//! ## Handler chains
//!
//! Each handler returns `Ok(())` to continue or `Err` to abort. Committing
//! the response (`send`, `json`, `html`, `text`, `redirect`, `end`) stops
//! the chain; so does a middleware that commits, before any route is
//! matched.
//!
//! ```
//! use sourcebit_router::{handler, Router};
//!
//! let mut router = Router::new();
//! router.scoped_middleware("/api", handler(|req, res| Box::pin(async move {
//!     if req.get_header("Authorization").is_none() {
//!         res.status(401).text("Unauthorized");
//!     }
//!     Ok(())
//! })));
//! ```
//!
//! ## Mounting
//!
//! ```
//! use sourcebit_router::{handler, Router};
//!
//! let mut blog = Router::new();
//! blog.get("/posts", handler(|_req, res| Box::pin(async move {
//!     res.text("posts");
//!     Ok(())
//! }))).unwrap();
//!
//! let mut app = Router::new();
//! app.mount("/blog", &blog).unwrap();
//! assert_eq!(app.routes(sourcebit_router::Method::Get)[0].template(), "/blog/posts");
//! ```
//!
//! Only routes are copied. Middleware registered on `blog` does not run
//! for `/blog/posts`; register it on `app` instead.

mod dispatch;
mod error;
mod handler;
mod middleware;
mod pages;
mod path;
mod request;
mod response;
mod router;
mod table;
mod validate;

pub use dispatch::run_handler;
pub use error::{HandlerError, HandlerResult, Result, RouterError};
pub use handler::{handler, BoxFuture, BoxedHandler, Handler, HandlerChain};
pub use middleware::{MiddlewareEntry, RequestLogger};
pub use path::{PathPattern, PathSegment, RoutePattern, WILDCARD};
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::Router;
pub use table::{Route, RouteTable};
pub use validate::{ParamGuard, Rule, RuleRegistry};
