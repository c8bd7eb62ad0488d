//! Per-request dispatch: middleware, matching, handlers, fallbacks.

use serde_json::json;
use tracing::{debug, debug_span, error, warn, Instrument};

use crate::error::{HandlerError, HandlerResult};
use crate::handler::invoke;
use crate::pages;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// How a dispatch ended, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// A middleware committed the response.
    ShortCircuited,
    /// A route matched and its chain ran.
    Handled,
    /// No route matched.
    NotFound,
}

impl Router {
    /// Dispatches one request.
    ///
    /// Runs the middleware chain, matches a route and runs its handlers,
    /// stopping as soon as the response is committed. Unmatched requests
    /// get a JSON 404, or the built-in placeholder page on `/` while no
    /// route is registered. The first error from any handler is logged and
    /// turned into a 500 (a diagnostic page in debug mode) unless the
    /// response was already committed.
    ///
    /// The response is always committed when this returns.
    pub async fn dispatch(&self, req: &mut Request, res: &mut Response) {
        let span = debug_span!("dispatch", method = %req.method, path = %req.path);
        async {
            match self.run(req, res).await {
                Ok(outcome) => debug!(?outcome, status = res.status, "dispatch finished"),
                Err(err) => self.recover(&err, req, res),
            }
            if !res.is_committed() {
                warn!("handler chain finished without committing a response");
                res.end();
            }
        }
        .instrument(span)
        .await;
    }

    /// Dispatches a request and returns the committed response.
    pub async fn handle(&self, mut req: Request) -> Response {
        let mut res = Response::new();
        self.dispatch(&mut req, &mut res).await;
        res
    }

    async fn run(&self, req: &mut Request, res: &mut Response) -> Result<Outcome, HandlerError> {
        for entry in self.middleware_chain() {
            if !entry.applies_to(&req.path) {
                continue;
            }
            invoke(entry.handler().as_ref(), req, res).await?;
            if res.is_committed() {
                return Ok(Outcome::ShortCircuited);
            }
        }

        let Some(route) = self.table().find(req.method, &req.path) else {
            self.not_found(req, res);
            return Ok(Outcome::NotFound);
        };
        debug!(template = route.template(), "matched route");

        if let Some(values) = route.pattern.extract(&req.path) {
            for (name, value) in route.pattern.param_names().iter().zip(values) {
                req.params.insert(name.clone(), value);
            }
        }

        for handler in route.chain.handlers() {
            invoke(handler.as_ref(), req, res).await?;
            if res.is_committed() {
                break;
            }
        }
        Ok(Outcome::Handled)
    }

    fn not_found(&self, req: &Request, res: &mut Response) {
        if (req.path == "/" || req.path.is_empty()) && !self.has_routes() {
            res.status(200).html(pages::welcome_page());
        } else {
            res.status(404)
                .header("Content-Type", "application/json")
                .send(json!({ "error": "Not Found" }).to_string());
        }
    }

    fn recover(&self, err: &HandlerError, req: &Request, res: &mut Response) {
        if res.is_committed() {
            error!(error = %err, "handler failed after the response was committed");
            return;
        }
        error!(error = %err, "handler failed");

        if self.debug_mode() {
            res.status(500).html(pages::debug_page(err, req));
        } else {
            res.status(500)
                .header("Content-Type", "application/json")
                .send(json!({ "error": "Internal Server Error" }).to_string());
        }
    }
}

/// Runs a single handler outside of a router, e.g. to unit test it.
///
/// Behaves like one link of a dispatch: panics become errors.
pub async fn run_handler(
    handler: &dyn crate::handler::Handler,
    req: &mut Request,
    res: &mut Response,
) -> HandlerResult {
    invoke(handler, req, res).await
}
