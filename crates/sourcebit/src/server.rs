//! HTTP/1 server loop and the wire adapter.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use sourcebit_router::{Method, Request, Response, Router};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Result;

/// Accepts connections on `listener` and dispatches every request to
/// `router`, one task per connection.
///
/// Returns only when accepting a connection fails.
pub async fn serve(listener: TcpListener, router: Arc<Router>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = Arc::clone(&router);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = Arc::clone(&router);
                handle_request(req, router)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(%peer, "error serving connection: {err}");
            }
        });
    }
}

async fn handle_request(
    req: HyperRequest<Incoming>,
    router: Arc<Router>,
) -> std::result::Result<HyperResponse<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        warn!(method = %req.method(), "unsupported method");
        return Ok(error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    };
    let url = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());

    let mut request = Request::from_url(method, url);
    for (key, value) in req.headers() {
        let Ok(value) = value.to_str() else {
            continue;
        };
        request
            .headers
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    match req.into_body().collect().await {
        Ok(collected) => request.body = collected.to_bytes().to_vec(),
        Err(err) => {
            warn!("failed to read request body: {err}");
            return Ok(error_response(StatusCode::BAD_REQUEST, "Bad Request"));
        }
    }

    let url = request.url.clone();
    let response = router.handle(request).await;
    info!("<-- {} {}", response.status, url);

    Ok(into_hyper(response))
}

/// Converts a committed engine response into a hyper response.
fn into_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HyperResponse::builder().status(status);
    for (key, value) in &res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    match builder.body(Full::new(Bytes::from(res.body))) {
        Ok(response) => response,
        Err(err) => {
            error!("invalid response from handler: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> HyperResponse<Full<Bytes>> {
    let body = json!({ "error": message }).to_string();
    let mut response = HyperResponse::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_hyper_copies_status_headers_and_body() {
        let mut res = Response::new();
        res.status(201).header("X-Id", "9").text("made");
        let hyper_res = into_hyper(res);
        assert_eq!(hyper_res.status(), StatusCode::CREATED);
        assert_eq!(hyper_res.headers()["x-id"], "9");
        assert_eq!(
            hyper_res.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_into_hyper_rejects_bad_status() {
        let mut res = Response::new();
        res.status(42).end();
        assert_eq!(into_hyper(res).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_hyper_rejects_bad_header() {
        let mut res = Response::new();
        res.header("Bad Header", "x").end();
        assert_eq!(into_hyper(res).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_is_json() {
        let res = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()["content-type"], "application/json");
    }
}
