//! Built-in HTML pages: the root placeholder and the debug error page.

use std::collections::BTreeMap;

use ironhtml::typed::Document;
use ironhtml_elements::{Body, Code, Div, Head, Html, Meta, Style, Title, H1, H4, P};

use crate::error::HandlerError;
use crate::request::Request;

const CSS: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; \
background: #f6f7f9; color: #1f2328; }\n\
.card { max-width: 880px; margin: 3rem auto; background: #fff; \
border: 1px solid #d0d7de; border-radius: 8px; padding: 2rem; }\n\
.muted { color: #57606a; }\n\
.error { border-left: 4px solid #cf222e; }\n\
.block { white-space: pre-wrap; font-family: ui-monospace, monospace; \
font-size: 0.85rem; background: #f6f8fa; padding: 1rem; \
border-radius: 6px; overflow-x: auto; }";

/// The page served on `/` before any route has been registered.
pub fn welcome_page() -> String {
    Document::new()
        .doctype()
        .root::<Html, _>(|html_el| {
            html_el
                .attr("lang", "en")
                .child::<Head, _>(|head| {
                    head.child::<Meta, _>(|m| m.attr("charset", "UTF-8"))
                        .child::<Title, _>(|t| t.text("SourceBit"))
                        .child::<Style, _>(|s| s.raw(CSS))
                })
                .child::<Body, _>(|body| {
                    body.child::<Div, _>(|card| {
                        card.class("card")
                            .child::<H1, _>(|h| h.text("It works!"))
                            .child::<P, _>(|p| {
                                p.class("muted")
                                    .text("The server is running but no routes are registered yet.")
                            })
                            .child::<Div, _>(|d| {
                                d.text("Register a route for ")
                                    .child::<Code, _>(|c| c.text("/"))
                                    .text(" to replace this page.")
                            })
                    })
                })
        })
        .build()
}

/// The diagnostic page rendered for handler errors in debug mode.
///
/// Echoes the error, its trace and the request back to the client.
pub fn debug_page(err: &HandlerError, req: &Request) -> String {
    let trace = err.trace();
    let request_line = format!("{} {}", req.method, req.url);
    let headers = render_headers(req);
    let body = render_body(req);

    Document::new()
        .doctype()
        .root::<Html, _>(|html_el| {
            html_el
                .attr("lang", "en")
                .child::<Head, _>(|head| {
                    head.child::<Meta, _>(|m| m.attr("charset", "UTF-8"))
                        .child::<Title, _>(|t| t.text("Internal Server Error"))
                        .child::<Style, _>(|s| s.raw(CSS))
                })
                .child::<Body, _>(|body_el| {
                    body_el.child::<Div, _>(|card| {
                        card.class("card error")
                            .child::<H1, _>(|h| h.text("Internal Server Error"))
                            .child::<P, _>(|p| p.text(err.message()))
                            .child::<H4, _>(|h| h.text("Stack trace"))
                            .child::<Div, _>(|d| d.class("block").text(&trace))
                            .child::<H4, _>(|h| h.text("Request"))
                            .child::<Div, _>(|d| d.class("block").text(&request_line))
                            .child::<H4, _>(|h| h.text("Headers"))
                            .child::<Div, _>(|d| d.class("block").text(&headers))
                            .child::<H4, _>(|h| h.text("Body"))
                            .child::<Div, _>(|d| d.class("block").text(&body))
                    })
                })
        })
        .build()
}

fn render_headers(req: &Request) -> String {
    let sorted: BTreeMap<&str, &str> = req
        .headers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    serde_json::to_string_pretty(&sorted).unwrap_or_default()
}

fn render_body(req: &Request) -> String {
    if req.body.is_empty() {
        return "null".to_string();
    }
    match serde_json::from_slice::<serde_json::Value>(&req.body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_default(),
        Err(_) => String::from_utf8_lossy(&req.body).into_owned(),
    }
}
