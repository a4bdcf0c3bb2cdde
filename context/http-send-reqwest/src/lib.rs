// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Reqwest-based transport for reqclient.
//!
//! `ReqwestHttpSend` implements [`reqclient_core::HttpSend`] with a
//! [`reqwest::Client`]. A [`reqclient_core::HttpOptions`] found in the request
//! extensions is applied to the outgoing request.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqclient_core::{Error, HttpOptions, HttpSend, Result};
use reqwest::{Client, Request};

/// Transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let options = req
            .extensions()
            .get::<HttpOptions>()
            .copied()
            .unwrap_or_default();
        let uri = req.uri().to_string();

        let mut req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert request for reqwest")
                .with_source(e)
                .with_context(format!("uri: {uri}"))
        })?;
        if let Some(timeout) = options.timeout {
            *req.timeout_mut() = Some(timeout);
        }

        debug!("sending {} {uri}", req.method());
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| {
                Error::unexpected("failed to send http request")
                    .with_source(e)
                    .with_context(format!("uri: {uri}"))
            })?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| {
                Error::unexpected("failed to read http response body")
                    .with_source(e)
                    .with_context(format!("uri: {uri}"))
            })?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one connection with a canned response.
    async fn serve_once(response: &'static str) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        Ok(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_send_collects_body() -> anyhow::Result<()> {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 7\r\nconnection: close\r\n\r\n{\"A\":1}",
        )
        .await?;

        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri(format!("{base}/"))
            .body(Bytes::new())?;
        let resp = ReqwestHttpSend::default().http_send(req).await?;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(resp.body().as_ref(), b"{\"A\":1}");
        Ok(())
    }

    #[tokio::test]
    async fn test_send_honors_timeout() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            // Accept and never answer.
            if let Ok((stream, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(stream);
            }
        });

        let mut req = http::Request::builder()
            .uri(format!("http://{addr}/"))
            .body(Bytes::new())?;
        req.extensions_mut()
            .insert(HttpOptions::default().with_timeout(Duration::from_millis(100)));

        let err = ReqwestHttpSend::default()
            .http_send(req)
            .await
            .expect_err("request must time out");
        assert_eq!(err.kind(), reqclient_core::ErrorKind::Unexpected);
        Ok(())
    }
}
