//! Handlers and handler chains.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::{HandlerError, HandlerResult};
use crate::request::Request;
use crate::response::Response;

/// A boxed future for async handler operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of work in a middleware chain or a route's handler chain.
///
/// A handler receives the request and the response for the duration of the
/// call. Returning `Ok(())` passes control to the next link; returning
/// `Err` aborts the chain and hands the error to the dispatcher. A handler
/// that commits the response ends the chain as well.
///
/// Closures and functions with the right shape implement this trait. Wrap
/// closures in [`handler`] so their argument lifetimes are inferred:
///
/// ```
/// use sourcebit_router::{handler, BoxFuture, HandlerResult, Request, Response};
///
/// let hello = handler(|_req, res| {
///     Box::pin(async move {
///         res.text("Hello, World!");
///         Ok(())
///     })
/// });
///
/// fn user<'a>(req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
///     Box::pin(async move {
///         let id = req.params.require("id")?;
///         res.text(format!("User: {id}"));
///         Ok(())
///     })
/// }
/// # let _ = (hello, user);
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Runs the handler.
    fn call<'a>(&'a self, req: &'a mut Request, res: &'a mut Response)
        -> BoxFuture<'a, HandlerResult>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        self(req, res)
    }
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Pins down the signature of a handler closure.
pub fn handler<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    f
}

/// Runs one handler, turning a panic into a [`HandlerError`].
pub(crate) async fn invoke(
    handler: &dyn Handler,
    req: &mut Request,
    res: &mut Response,
) -> HandlerResult {
    match AssertUnwindSafe(async { handler.call(req, res).await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::from_panic(&*payload)),
    }
}

/// The ordered handlers run for a matched route. Never empty.
#[derive(Clone)]
pub struct HandlerChain {
    handlers: Vec<BoxedHandler>,
}

impl HandlerChain {
    /// Starts a chain with its first handler.
    pub fn new(first: impl Handler) -> Self {
        Self {
            handlers: vec![Arc::new(first)],
        }
    }

    /// Appends a handler.
    #[must_use]
    pub fn then(mut self, next: impl Handler) -> Self {
        self.handlers.push(Arc::new(next));
        self
    }

    /// Returns the handlers in execution order.
    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}
