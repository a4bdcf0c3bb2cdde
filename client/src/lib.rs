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

//! A credential-aware client actor for region/service cloud APIs.
//!
//! [`Client`] is a handle to a tokio task that owns the credential, the region
//! and the collaborators. Each request walks a fixed sequence of steps:
//! check the credential, refresh it once if it expired, sign, dispatch and
//! decode the response by its declared media type.
//!
//! ## Example
//!
//! ```no_run
//! use http::Method;
//! use reqclient::{default_context, Body, Client, Request};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Client::new(default_context()).await;
//! client.refresh_credentials().await??;
//!
//! let req = Request::new("dynamodb", Method::POST, "/")
//!     .with_header(
//!         http::header::CONTENT_TYPE,
//!         http::HeaderValue::from_static("application/x-amz-json-1.0"),
//!     )
//!     .with_header(
//!         http::HeaderName::from_static("x-amz-target"),
//!         http::HeaderValue::from_static("DynamoDB_20120810.ListTables"),
//!     )
//!     .with_body("{}");
//!
//! if let Body::Json(tables) = client.request(req).await??.body {
//!     println!("{tables}");
//! }
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod actor;
pub use actor::{Client, StateSnapshot};

mod endpoint;
pub use endpoint::{build_endpoint, build_endpoint_in, default_domain, CN_DOMAIN, DEFAULT_DOMAIN};

mod error;
pub use error::{ClientError, Outcome, RequestError, Response};

mod negotiate;
pub use negotiate::{
    classify, decode, Body, DecodeError, MediaType, XmlElement, DEFAULT_MEDIA_TYPE,
};

mod orchestrator;

mod request;
pub use request::Request;

mod store;
pub use store::{CredentialFailure, CredentialStore};

pub use reqclient_aws_v4::{Config, Credential};
pub use reqclient_core::{Context, HttpOptions};

use reqclient_core::OsEnv;
use reqclient_file_read_tokio::TokioFileRead;
use reqclient_http_send_reqwest::ReqwestHttpSend;

/// A [`Context`] wired to the process environment, tokio file reads and reqwest.
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::default())
}
