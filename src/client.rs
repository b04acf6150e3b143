// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::sync::Arc;

use reqwest::{IntoUrl, Method, Request, RequestBuilder, Response};

/// A cross-cutting change applied to every outgoing request.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: &mut Request);
}

/// A [`reqwest::Client`] that runs its interceptors over every request
/// before sending it. The response is handed back untouched.
#[derive(Clone, Default)]
pub struct InterceptedClient {
    inner: reqwest::Client,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self {
            inner,
            interceptors: Vec::new(),
        }
    }

    pub fn with(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.inner.request(method, url)
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Apply every interceptor, in registration order.
    pub fn prepare(&self, mut request: Request) -> Request {
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }
        request
    }

    pub async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        let request = self.prepare(request);
        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");
        self.inner.execute(request).await
    }

    /// Build the request and send it through [`InterceptedClient::execute`].
    pub async fn send(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        self.execute(builder.build()?).await
    }
}
