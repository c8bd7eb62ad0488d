//! Error types for routing.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::fmt;
use std::sync::Once;

use thiserror::Error;

/// Router-specific errors.
///
/// These surface at setup time (registration, mounting, rule lookup) and
/// never during dispatch.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The path template could not be compiled.
    #[error("invalid path template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// A generated matcher was rejected by the regex engine.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A route name was registered twice.
    #[error("route name already registered: {0}")]
    DuplicateRouteName(String),

    /// A parameter rule was registered twice.
    #[error("validation rule '{0}' already exists")]
    DuplicateRule(String),

    /// A guard referenced a rule that was never registered.
    #[error("unknown validation rule: {0}")]
    UnknownRule(String),
}

impl RouterError {
    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

/// An error raised by a handler while a request is being dispatched.
///
/// Returning `Err(HandlerError)` from a handler is how a chain reports a
/// failure to the dispatcher. Panics inside handlers are converted into
/// this type as well.
pub struct HandlerError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    location: Option<String>,
    backtrace: Backtrace,
}

/// Where the most recent panic on this thread happened, recorded by the
/// hook from [`install_panic_hook`].
struct PanicSite {
    location: Option<String>,
    backtrace: Backtrace,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Installs a panic hook that records the panic location and a backtrace
/// taken at the panic site, then defers to the previous hook.
///
/// Handler futures are polled on the thread that catches their panic, so
/// the record is picked up by [`HandlerError::from_panic`] right after.
pub(crate) fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::force_capture(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(site));
            previous(info);
        }));
    });
}

impl HandlerError {
    /// Creates an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
            location: None,
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Wraps another error, keeping it as the source.
    pub fn wrap<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
            location: None,
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Builds an error from a caught panic payload.
    ///
    /// Uses the location and backtrace recorded at the panic site when the
    /// panic hook is installed.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        let mut err = Self::new(format!("handler panicked: {detail}"));
        if let Some(site) = LAST_PANIC.with(|slot| slot.borrow_mut().take()) {
            err.location = site.location;
            err.backtrace = site.backtrace;
        }
        err
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the source location of the panic this error was built from.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the backtrace captured when the error was created, or at
    /// the panic site for converted panics.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Renders the message, the panic location, the source chain and the
    /// backtrace.
    pub fn trace(&self) -> String {
        let mut out = self.message.clone();
        if let Some(location) = &self.location {
            out.push_str("\npanicked at ");
            out.push_str(location);
        }
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            out.push_str("\ncaused by: ");
            out.push_str(&cause.to_string());
            current = cause.source();
        }
        out.push_str("\n\n");
        out.push_str(&self.backtrace.to_string());
        out
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("message", &self.message)
            .field("source", &self.source)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::wrap(err)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::wrap(err)
    }
}

impl From<RouterError> for HandlerError {
    fn from(err: RouterError) -> Self {
        Self::wrap(err)
    }
}

/// Result returned by every handler in a chain.
///
/// `Ok(())` hands control to the next link; `Err` aborts the chain.
pub type HandlerResult = std::result::Result<(), HandlerError>;
