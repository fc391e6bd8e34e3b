//! Browser `fetch` transport via `gloo-net`.
//!
//! `fetch` has no timeout of its own; the request races a `gloo-timers`
//! timeout and the loser is dropped.

use std::time::Duration;

use futures::future::{Either, select};
use gloo_net::http::{Request, RequestBuilder};

use super::error::TransportError;
use super::http::{HttpRequest, HttpResponse, Method, Transport};

#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn send(&self, url: &str, request: &HttpRequest, timeout_ms: u32) -> Result<HttpResponse, TransportError> {
        let fetch = std::pin::pin!(fetch(url, request));
        let timeout = std::pin::pin!(gloo_timers::future::sleep(Duration::from_millis(u64::from(timeout_ms))));
        match select(fetch, timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(TransportError::Timeout(timeout_ms)),
        }
    }
}

async fn fetch(url: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = builder_for(request.method, url);
    for (name, value) in request.headers() {
        builder = builder.header(name, value);
    }
    let prepared = match &request.body {
        Some(body) => builder.body(body.to_string()),
        None => builder.build(),
    }
    .map_err(|e| TransportError::Network(e.to_string()))?;

    let resp = prepared.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
    let status = resp.status();
    let body = resp.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
    Ok(HttpResponse { status, body })
}

fn builder_for(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
    }
}
