//! Middleware entries run before route matching.

use std::sync::Arc;

use tracing::info;

use crate::error::HandlerResult;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// An entry in a router's middleware chain.
///
/// Middleware uses the same contract as route handlers: it may inspect or
/// modify the request, set response headers, commit the response to stop
/// dispatch, or fail with an error.
#[derive(Clone)]
pub enum MiddlewareEntry {
    /// Runs for every request.
    Unconditional(BoxedHandler),
    /// Runs when the request path starts with `prefix` (plain string
    /// comparison, not pattern matching).
    Scoped {
        /// Literal path prefix.
        prefix: String,
        /// The middleware handler.
        handler: BoxedHandler,
    },
}

impl MiddlewareEntry {
    /// Creates an unconditional entry.
    pub fn unconditional(handler: impl Handler) -> Self {
        Self::Unconditional(Arc::new(handler))
    }

    /// Creates a prefix-scoped entry.
    pub fn scoped(prefix: impl Into<String>, handler: impl Handler) -> Self {
        Self::Scoped {
            prefix: prefix.into(),
            handler: Arc::new(handler),
        }
    }

    /// Returns whether this entry runs for the given path.
    pub fn applies_to(&self, path: &str) -> bool {
        match self {
            Self::Unconditional(_) => true,
            Self::Scoped { prefix, .. } => path.starts_with(prefix.as_str()),
        }
    }

    /// Returns the handler.
    pub fn handler(&self) -> &BoxedHandler {
        match self {
            Self::Unconditional(handler) | Self::Scoped { handler, .. } => handler,
        }
    }
}

impl std::fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unconditional(_) => f.write_str("Unconditional"),
            Self::Scoped { prefix, .. } => f.debug_struct("Scoped").field("prefix", prefix).finish(),
        }
    }
}

/// Middleware that logs each incoming request line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

impl Handler for RequestLogger {
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        _res: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            info!("--> {} {}", req.method, req.url);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_prefix_is_plain_string_compare() {
        let mw = MiddlewareEntry::scoped("/api", RequestLogger);
        assert!(mw.applies_to("/api/users"));
        assert!(mw.applies_to("/api"));
        assert!(mw.applies_to("/apiary"));
        assert!(!mw.applies_to("/other"));
        assert!(!mw.applies_to("/v1/api"));
    }

    #[test]
    fn test_unconditional_always_applies() {
        let mw = MiddlewareEntry::unconditional(RequestLogger);
        assert!(mw.applies_to("/"));
        assert!(mw.applies_to(""));
    }

    #[tokio::test]
    async fn test_request_logger_continues() {
        let mut req = Request::get("/x");
        let mut res = Response::new();
        RequestLogger.call(&mut req, &mut res).await.unwrap();
        assert!(!res.is_committed());
    }
}
