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

use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::TimeDelta;
use http::header::CONTENT_LENGTH;
use http::{Method, StatusCode};
use log::debug;
use reqclient_core::time::{now, parse_rfc3339, DateTime};
use reqclient_core::utils::Redact;
use reqclient_core::{Context, Error, ProvideCredential, Result};
use serde::Deserialize;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
/// 21600s (6h) is recommended by AWS.
const TOKEN_TTL_SECONDS: i64 = 21600;

/// IMDSv2CredentialProvider loads role credentials from the EC2 instance metadata service.
///
/// The session token is cached and re-fetched ten minutes before it expires.
/// Setting `AWS_EC2_METADATA_DISABLED=true` turns this provider off.
#[derive(Clone, Default)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
    token: Arc<Mutex<Option<(String, DateTime)>>>,
}

impl Debug for IMDSv2CredentialProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let token = self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(token, _)| token.clone());
        f.debug_struct("IMDSv2CredentialProvider")
            .field("endpoint", &self.endpoint)
            .field("token", &Redact::from(&token))
            .finish()
    }
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some((token, expires_in)) if *expires_in > now() => Some(token.clone()),
            _ => None,
        }
    }

    async fn load_token(&self, ctx: &Context) -> Result<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let url = format!("{}/latest/api/token", self.endpoint(ctx));
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            .header(
                "x-aws-ec2-metadata-token-ttl-seconds",
                TOKEN_TTL_SECONDS.to_string(),
            )
            .body(Bytes::new())?;

        let token = send(ctx, req, "fetch_token").await?;
        // Refresh ten minutes early.
        let expires_in =
            now() + TimeDelta::seconds(TOKEN_TTL_SECONDS) - TimeDelta::seconds(600);
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((token.clone(), expires_in));

        Ok(token)
    }
}

/// Send a metadata request and return the body of a 200 response.
async fn send(ctx: &Context, req: http::Request<Bytes>, operation: &str) -> Result<String> {
    let resp = ctx.http_send_as_string(req).await.map_err(|e| {
        Error::unexpected("failed to connect to IMDS")
            .with_source(e)
            .with_context(format!("operation: {operation}"))
    })?;

    match resp.status() {
        StatusCode::OK => Ok(resp.into_body()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::credential_denied(
            format!("IMDS denied {operation} with {}", resp.status()),
        )),
        status => Err(Error::unexpected(format!(
            "IMDS returned {status} for {operation}"
        ))
        .with_context(format!("body: {}", resp.body()))),
    }
}

#[async_trait]
impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if ctx.env_var(AWS_EC2_METADATA_DISABLED).as_deref() == Some("true") {
            debug!("IMDS is disabled by {AWS_EC2_METADATA_DISABLED}");
            return Ok(None);
        }

        let token = self.load_token(ctx).await?;
        let base = format!(
            "{}/latest/meta-data/iam/security-credentials/",
            self.endpoint(ctx)
        );

        // List the role attached to this instance.
        let req = http::Request::builder()
            .uri(&base)
            .method(Method::GET)
            .header("x-aws-ec2-metadata-token", &token)
            .body(Bytes::new())?;
        let role = send(ctx, req, "list_roles").await?;
        let Some(role) = role.lines().map(str::trim).find(|v| !v.is_empty()) else {
            return Err(Error::config_invalid("no IAM role attached to EC2 instance"));
        };

        let req = http::Request::builder()
            .uri(format!("{base}{role}"))
            .method(Method::GET)
            .header("x-aws-ec2-metadata-token", &token)
            .body(Bytes::new())?;
        let content = send(ctx, req, "fetch_credentials").await?;

        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_source(e)
                    .with_context(format!("role: {role}"))
            })?;
        if resp.code != "Success" {
            return Err(Error::credential_invalid(format!(
                "IMDS returned error: [{}] {}",
                resp.code, resp.message
            ))
            .with_context(format!("role: {role}")));
        }

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(parse_rfc3339(&resp.expiration)?),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}
