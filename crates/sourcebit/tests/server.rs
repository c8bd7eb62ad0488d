//! End-to-end tests over a real socket.

mod common;
use common::*;

use serde_json::json;
use sourcebit::{App, Config};
use sourcebit_router::{handler, HandlerChain, HandlerError, Method};

fn demo_app(config: Config) -> App {
    let mut app = App::with_config(config);
    let guard = app.guard(&[("id", "int")]).unwrap();
    app.get(
        "/",
        handler(|_req, res| {
            Box::pin(async move {
                res.text("home");
                Ok(())
            })
        }),
    )
    .unwrap()
    .route(
        Method::Get,
        "/users/:id",
        HandlerChain::new(guard).then(handler(|req, res| {
            Box::pin(async move {
                let id = req.params.get("id").unwrap_or_default().to_string();
                let page = req.get_query("page").unwrap_or("1").to_string();
                res.json(&json!({ "id": id, "page": page }))?;
                Ok(())
            })
        })),
    )
    .unwrap()
    .get(
        "/tags/:tag",
        handler(|req, res| {
            Box::pin(async move {
                let tag = req.params.get("tag").unwrap_or_default().to_string();
                res.text(tag);
                Ok(())
            })
        }),
    )
    .unwrap()
    .post(
        "/echo",
        handler(|req, res| {
            Box::pin(async move {
                let agent = req.get_header("x-agent").unwrap_or("none").to_string();
                let body = req.body.clone();
                res.header("X-Agent", agent).send(body);
                Ok(())
            })
        }),
    )
    .unwrap()
    .get(
        "/boom",
        handler(|_req, _res| Box::pin(async move { Err(HandlerError::new("exploded")) })),
    )
    .unwrap();
    app
}

#[tokio::test]
async fn serves_text_route() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = get(addr, "/").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(res.body, "home");
}

#[tokio::test]
async fn path_params_and_query_reach_handler() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = get(addr, "/users/42?page=3").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json(), json!({"id": "42", "page": "3"}));
}

#[tokio::test]
async fn path_is_percent_decoded() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = get(addr, "/tags/hello%20world").await;
    assert_eq!(res.body, "hello world");
}

#[tokio::test]
async fn guard_rejects_bad_param() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = get(addr, "/users/abc").await;
    assert_eq!(res.status, 400);
    assert_eq!(
        res.json(),
        json!({"error": "Invalid type for parameter id. Expected int."})
    );
}

#[tokio::test]
async fn body_and_headers_are_forwarded() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = send(addr, "POST /echo HTTP/1.1\r\nX-Agent: probe", "payload").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("x-agent"), Some("probe"));
    assert_eq!(res.body, "payload");
}

#[tokio::test]
async fn unmatched_request_is_json_404() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = get(addr, "/nowhere").await;
    assert_eq!(res.status, 404);
    assert_eq!(res.json(), json!({"error": "Not Found"}));
}

#[tokio::test]
async fn unknown_method_is_405() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = send(addr, "BREW / HTTP/1.1", "").await;
    assert_eq!(res.status, 405);
    assert_eq!(res.json(), json!({"error": "Method Not Allowed"}));
}

#[tokio::test]
async fn handler_error_is_generic_500() {
    let addr = spawn(demo_app(Config::default())).await;
    let res = get(addr, "/boom").await;
    assert_eq!(res.status, 500);
    assert_eq!(res.json(), json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn debug_config_renders_diagnostic_page() {
    let config = Config {
        debug: true,
        ..Config::default()
    };
    let addr = spawn(demo_app(config)).await;
    let res = get(addr, "/boom").await;
    assert_eq!(res.status, 500);
    assert!(res.header("content-type").unwrap().starts_with("text/html"));
    assert!(res.body.contains("exploded"));
}

#[tokio::test]
async fn empty_app_serves_placeholder() {
    let addr = spawn(App::new()).await;
    let res = get(addr, "/").await;
    assert_eq!(res.status, 200);
    assert!(res.body.contains("It works!"));

    let res = get(addr, "/other").await;
    assert_eq!(res.status, 404);
}
