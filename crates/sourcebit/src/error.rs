//! Error types for the application server.

use sourcebit_router::RouterError;

/// Errors that can occur while setting up or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or accepting on the listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A route, rule or mount was rejected.
    #[error("Router error: {0}")]
    Router(#[from] RouterError),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
