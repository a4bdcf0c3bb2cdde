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

use crate::{Context, Result};
use bytes::Bytes;
use http::request::Parts;
use http::HeaderMap;
use std::fmt::Debug;

/// ProvideCredential is the trait used to load credentials from one source.
///
/// Returning `Ok(None)` means "this source has nothing for us", which lets a
/// [`crate::ProvideCredentialChain`] move on to the next source. Returning an
/// error means the source exists but could not be used.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load credential from current env.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// Region and service a request is signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningScope {
    /// Region name, for example `us-east-1`.
    pub region: String,
    /// Service name, for example `dynamodb`.
    pub service: String,
}

impl SigningScope {
    /// Create a new scope.
    pub fn new(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }
}

/// SignRequest computes the headers that authenticate a request.
///
/// The request parts are not modified: implementations return only the
/// headers to add. Callers merge them into the outgoing request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Compute the additional headers for `req` carrying `body`.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &Parts,
        body: &Bytes,
        scope: &SigningScope,
        credential: &Self::Credential,
    ) -> Result<HeaderMap>;
}
