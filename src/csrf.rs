// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::fmt;

use reqwest::{
    header::{HeaderName, HeaderValue},
    Method, Request,
};
use scraper::{Html, Selector};

use crate::{client::RequestInterceptor, config::csrf::Csrf};

/// Methods that never carry the token.
const SAFE_METHODS: [&str; 2] = ["GET", "HEAD"];

/// Anti-forgery token as served in the page metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// An empty token is treated as no token. Whitespace is kept as served.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        match token.is_empty() {
            true => None,
            false => Some(Self(token)),
        }
    }

    /// Read `<meta name="{meta_name}" content="...">` from a page.
    ///
    /// The first matching element of the parsed document wins. Names compare
    /// ASCII case-insensitively.
    pub fn from_page(html: &str, meta_name: &str) -> Option<Self> {
        let doc = Html::parse_document(html);
        let meta_sel = Selector::parse("meta[name]").ok()?;

        doc.select(&meta_sel)
            .find(|meta| {
                meta.value()
                    .attr("name")
                    .is_some_and(|name| name.eq_ignore_ascii_case(meta_name))
            })
            .and_then(|meta| meta.value().attr("content"))
            .and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

pub fn is_safe_method(method: &Method) -> bool {
    SAFE_METHODS
        .iter()
        .any(|safe| method.as_str().eq_ignore_ascii_case(safe))
}

/// Adds the token header to every state-changing request.
#[derive(Debug, Clone)]
pub struct CsrfInterceptor {
    header: HeaderName,
    token: Option<HeaderValue>,
}

impl CsrfInterceptor {
    pub fn new(header: &str, token: Option<CsrfToken>) -> eyre::Result<Self> {
        let header = HeaderName::from_bytes(header.as_bytes())
            .map_err(|e| eyre::eyre!("invalid CSRF header name `{}`: {}", header, e))?;
        let token = match token {
            Some(token) => {
                let mut value = HeaderValue::from_str(token.as_str())
                    .map_err(|e| eyre::eyre!("CSRF token is not a valid header value: {}", e))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };
        Ok(Self { header, token })
    }

    /// Build from configuration and the page the token was served with.
    pub fn from_page(config: &Csrf, html: &str) -> eyre::Result<Self> {
        let token = CsrfToken::from_page(html, &config.meta_name);
        match &token {
            Some(_) => tracing::info!(meta = %config.meta_name, "found CSRF token"),
            None => tracing::warn!(meta = %config.meta_name, "no CSRF token in page"),
        }
        Self::new(&config.header, token)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl RequestInterceptor for CsrfInterceptor {
    fn intercept(&self, request: &mut Request) {
        if is_safe_method(request.method()) {
            return;
        }
        if let Some(token) = &self.token {
            request.headers_mut().insert(self.header.clone(), token.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width">
  <meta content="a&amp;b-123" name="csrf-token" />
</head>
<body></body>
</html>"#;

    fn request(method: &str) -> Request {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        Request::new(method, "http://localhost/comment".parse().unwrap())
    }

    fn interceptor(token: Option<&str>) -> CsrfInterceptor {
        CsrfInterceptor::new("X-CSRFToken", token.and_then(CsrfToken::new)).unwrap()
    }

    #[test]
    fn test_token_from_page() {
        let token = CsrfToken::from_page(PAGE, "csrf-token").unwrap();
        assert_eq!(token.as_str(), "a&b-123");
    }

    #[test]
    fn test_token_single_quotes_and_case() {
        let html = "<META NAME='CSRF-Token' CONTENT='xyz'>";
        let token = CsrfToken::from_page(html, "csrf-token").unwrap();
        assert_eq!(token.as_str(), "xyz");
    }

    #[test]
    fn test_token_absent() {
        assert!(CsrfToken::from_page("<html></html>", "csrf-token").is_none());
        assert!(CsrfToken::from_page(PAGE, "other").is_none());
        assert!(CsrfToken::from_page(r#"<meta name="csrf-token" content="">"#, "csrf-token").is_none());
    }

    #[test]
    fn test_token_skips_commented_meta() {
        let html = r#"<head>
  <!-- <meta name="csrf-token" content="stale"> -->
  <meta name="csrf-token" content="real">
</head>"#;
        let token = CsrfToken::from_page(html, "csrf-token").unwrap();
        assert_eq!(token.as_str(), "real");
    }

    #[test]
    fn test_token_skips_script_text() {
        let html = r#"<head>
  <script>var tpl = '<meta name="csrf-token" content="fake">';</script>
  <meta name="csrf-token" content="real">
</head>"#;
        let token = CsrfToken::from_page(html, "csrf-token").unwrap();
        assert_eq!(token.as_str(), "real");
    }

    #[test]
    fn test_token_with_angle_bracket() {
        let html = r#"<meta name="csrf-token" content="a>b">"#;
        let token = CsrfToken::from_page(html, "csrf-token").unwrap();
        assert_eq!(token.as_str(), "a>b");
    }

    #[test]
    fn test_whitespace_token_is_kept() {
        assert!(CsrfToken::new("").is_none());
        assert_eq!(CsrfToken::new(" ").unwrap().as_str(), " ");
        let html = r#"<meta name="csrf-token" content=" t ">"#;
        assert_eq!(CsrfToken::from_page(html, "csrf-token").unwrap().as_str(), " t ");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = CsrfToken::new("secret").unwrap();
        assert!(!format!("{:?}", token).contains("secret"));
    }

    #[test]
    fn test_post_gets_header() {
        let mut req = request("POST");
        interceptor(Some("tok")).intercept(&mut req);
        assert_eq!(req.headers()["x-csrftoken"], "tok");
    }

    #[test]
    fn test_unsafe_methods_get_header() {
        for method in ["PUT", "DELETE", "PATCH", "post"] {
            let mut req = request(method);
            interceptor(Some("tok")).intercept(&mut req);
            assert!(req.headers().contains_key("x-csrftoken"), "{method}");
        }
    }

    #[test]
    fn test_safe_methods_untouched() {
        for method in ["GET", "HEAD", "get", "head"] {
            let mut req = request(method);
            interceptor(Some("tok")).intercept(&mut req);
            assert!(req.headers().is_empty(), "{method}");
        }
    }

    #[test]
    fn test_post_without_token() {
        let mut req = request("POST");
        let interceptor = interceptor(None);
        assert!(!interceptor.has_token());
        interceptor.intercept(&mut req);
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_from_page_config() {
        let config = Csrf::default();
        assert!(CsrfInterceptor::from_page(&config, PAGE).unwrap().has_token());
        assert!(!CsrfInterceptor::from_page(&config, "").unwrap().has_token());
    }

    async fn one_shot_server() -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 201 Created\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                .await
                .unwrap();
            String::from_utf8_lossy(&buf[..n]).to_ascii_lowercase()
        });
        (format!("http://{}/comment", addr), handle)
    }

    #[tokio::test]
    async fn test_client_sends_header_and_returns_response() {
        use crate::client::InterceptedClient;

        let (url, server) = one_shot_server().await;
        let inner = reqwest::Client::builder().no_proxy().build().unwrap();
        let client = InterceptedClient::new(inner).with(interceptor(Some("tok")));

        let response = client.send(client.post(&url).body("x")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        assert_eq!(response.text().await.unwrap(), "ok");

        let seen = server.await.unwrap();
        assert!(seen.starts_with("post /comment"));
        assert!(seen.contains("x-csrftoken: tok"));
    }

    #[tokio::test]
    async fn test_client_get_has_no_header() {
        use crate::client::InterceptedClient;

        let (url, server) = one_shot_server().await;
        let inner = reqwest::Client::builder().no_proxy().build().unwrap();
        let client = InterceptedClient::new(inner).with(interceptor(Some("tok")));

        let response = client.send(client.get(&url)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let seen = server.await.unwrap();
        assert!(seen.starts_with("get /comment"));
        assert!(!seen.contains("x-csrftoken"));
    }

    #[test]
    fn test_invalid_header_name() {
        assert!(CsrfInterceptor::new("bad header", None).is_err());
    }
}
