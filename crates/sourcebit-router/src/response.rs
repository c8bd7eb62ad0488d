//! HTTP response type.

use std::collections::HashMap;

use tracing::warn;

/// An HTTP response under construction.
///
/// Handlers set the status and headers, then commit the response with one
/// of [`send`](Self::send), [`json`](Self::json), [`html`](Self::html),
/// [`text`](Self::text), [`redirect`](Self::redirect) or
/// [`end`](Self::end). Once committed, the dispatcher stops running the
/// chain and later sends are ignored.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
    committed: bool,
}

impl Response {
    /// Creates an uncommitted 200 response.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
            committed: false,
        }
    }

    /// Returns whether the status and headers have been committed.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Sets the status code. Ignored once committed.
    pub fn status(&mut self, status: u16) -> &mut Self {
        if self.committed {
            warn!(status, "response already committed; ignoring status");
            return self;
        }
        self.status = status;
        self
    }

    /// Sets a header, replacing any value under the same name
    /// (compared case-insensitively). Ignored once committed.
    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        if self.committed {
            warn!(header = %key, "response already committed; ignoring header");
            return self;
        }
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Commits the response with the given body.
    ///
    /// Defaults the content type to `text/plain`. Does nothing but log if
    /// the response was already committed.
    pub fn send(&mut self, body: impl Into<Vec<u8>>) {
        if self.committed {
            warn!("response already committed; ignoring send");
            return;
        }
        if self.get_header("Content-Type").is_none() {
            self.header("Content-Type", "text/plain; charset=utf-8");
        }
        self.body = body.into();
        self.committed = true;
    }

    /// Commits the response without a body.
    pub fn end(&mut self) {
        if self.committed {
            warn!("response already committed; ignoring end");
            return;
        }
        self.body.clear();
        self.committed = true;
    }

    /// Commits a JSON body.
    pub fn json<T: serde::Serialize>(&mut self, data: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(data)?;
        self.header("Content-Type", "application/json");
        self.send(body);
        Ok(())
    }

    /// Commits an HTML body.
    pub fn html(&mut self, body: impl Into<String>) {
        self.header("Content-Type", "text/html; charset=utf-8");
        self.send(body.into());
    }

    /// Commits a plain text body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.header("Content-Type", "text/plain; charset=utf-8");
        self.send(body.into());
    }

    /// Commits a 302 redirect.
    pub fn redirect(&mut self, url: impl Into<String>) {
        self.redirect_with(url, 302);
    }

    /// Commits a redirect with the given status.
    pub fn redirect_with(&mut self, url: impl Into<String>, status: u16) {
        self.status(status).header("Location", url);
        self.end();
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_html() {
        let mut res = Response::new();
        res.html("<h1>Hello</h1>");
        assert!(res.is_committed());
        assert_eq!(res.status, 200);
        assert_eq!(
            res.get_header("content-type"),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(res.body_string(), Some("<h1>Hello</h1>".to_string()));
    }

    #[test]
    fn test_response_json() {
        let mut res = Response::new();
        res.status(201)
            .json(&serde_json::json!({"name": "test"}))
            .unwrap();
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
        assert_eq!(res.body_json(), Some(serde_json::json!({"name": "test"})));
    }

    #[test]
    fn test_response_redirect() {
        let mut res = Response::new();
        res.redirect("/login");
        assert!(res.is_committed());
        assert_eq!(res.status, 302);
        assert_eq!(res.get_header("Location"), Some("/login"));
    }

    #[test]
    fn test_second_send_is_ignored() {
        let mut res = Response::new();
        res.text("first");
        res.status(500).text("second");
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("first".to_string()));
    }

    #[test]
    fn test_headers_do_not_commit() {
        let mut res = Response::new();
        res.header("X-Custom", "value").header("x-custom", "other");
        assert!(!res.is_committed());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("X-CUSTOM"), Some("other"));
    }

    #[test]
    fn test_send_defaults_content_type() {
        let mut res = Response::new();
        res.send("plain");
        assert_eq!(
            res.get_header("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
    }
}
