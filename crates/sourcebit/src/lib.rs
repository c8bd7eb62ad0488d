//! # sourcebit
//!
//! Application shell for [`sourcebit_router`]: an [`App`] that owns a
//! router, its parameter rules and a [`Config`], and an HTTP/1 server loop
//! built on hyper and tokio.
//!
//! ```no_run
//! use sourcebit::{App, Config};
//! use sourcebit_router::handler;
//!
//! # async fn run() -> sourcebit::Result<()> {
//! let mut app = App::with_config(Config { port: 8080, ..Config::default() });
//! app.get("/", handler(|_req, res| Box::pin(async move {
//!     res.text("Hello, World!");
//!     Ok(())
//! })))?;
//! app.serve().await
//! # }
//! ```

mod app;
mod config;
mod error;
mod server;

pub use app::App;
pub use config::Config;
pub use error::{Result, ServerError};
pub use server::serve;
