//! sourcebit server
//!
//! Runs a small demo application.

use clap::Parser;
use serde_json::json;
use sourcebit::{App, Config};
use sourcebit_router::{BoxFuture, HandlerChain, HandlerResult, Method, Request, Response};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn index<'a>(_req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        res.text("Hello from SourceBit!");
        Ok(())
    })
}

fn show_user<'a>(req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let id: i64 = req
            .params
            .parse("id")
            .ok_or("id must be an integer")?;
        res.json(&json!({ "id": id }))?;
        Ok(())
    })
}

fn create_user<'a>(req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let user: serde_json::Value = req.json()?;
        res.status(201).json(&user)?;
        Ok(())
    })
}

fn serve_file<'a>(req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let path = req.params.wildcard().unwrap_or_default().to_string();
        res.json(&json!({ "file": path }))?;
        Ok(())
    })
}

fn health<'a>(_req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        res.json(&json!({ "status": "ok" }))?;
        Ok(())
    })
}

fn build_app(config: Config) -> sourcebit::Result<App> {
    let mut app = App::with_config(config);
    let id_is_int = app.guard(&[("id", "int")])?;

    app.get("/", index)?
        .route(
            Method::Get,
            "/users/:id",
            HandlerChain::new(id_is_int).then(show_user),
        )?
        .post("/users", create_user)?
        .get("/files/*", serve_file)?
        .group("/api", |api| {
            api.get("/health", health)?;
            Ok(())
        })?;
    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Setup logging
    let log_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    build_app(config)?.serve().await?;
    Ok(())
}
