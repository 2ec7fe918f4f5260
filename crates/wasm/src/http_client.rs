//! HTTP transport for the OrderCo REST API
//!
//! Uses gloo-net for browser fetch API

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::{select, Either};
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use orderco_core::{HttpRequest, HttpResponse, Method, RemoteError, Transport};

/// Browser `fetch` with a per-request deadline
pub struct FetchTransport {
    timeout: Duration,
}

impl FetchTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RemoteError> {
        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let exchange = Box::pin(fetch(request));
        let deadline = Box::pin(TimeoutFuture::new(millis));

        match select(exchange, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(RemoteError::Timeout),
        }
    }
}

async fn fetch(request: HttpRequest) -> Result<HttpResponse, RemoteError> {
    let mut builder: RequestBuilder = match request.method {
        Method::Get => Request::get(&request.url),
        Method::Post => Request::post(&request.url),
        Method::Put => Request::put(&request.url),
        Method::Delete => Request::delete(&request.url),
    };
    if let Some(token) = &request.bearer {
        builder = builder.header("Authorization", &format!("Bearer {}", token));
    }

    let prepared = match request.body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(body),
        None => builder.build(),
    }
    .map_err(|e| RemoteError::Network(format!("Failed to build request: {}", e)))?;

    let response = prepared
        .send()
        .await
        .map_err(|e| RemoteError::Network(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    // An unreadable body on an error status still reports the status
    let body = match response.text().await {
        Ok(text) => text,
        Err(_) if !(200..300).contains(&status) => String::new(),
        Err(e) => return Err(RemoteError::Network(format!("Failed to read response: {}", e))),
    };

    Ok(HttpResponse { status, body })
}
