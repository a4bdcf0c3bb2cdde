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

use log::{debug, warn};
use reqclient_aws_v4::Credential;
use reqclient_core::time::DateTime;
use reqclient_core::{Context, Error, ErrorKind, ProvideCredential};

/// Why the store holds no usable credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialFailure {
    /// Nothing was ever loaded or set.
    #[error("no credentials loaded")]
    Absent,
    /// Every provider in the chain came back empty.
    #[error("no credential provider returned credentials")]
    NotFound,
    /// A provider failed to load credentials.
    #[error("credential provider failed: {message}")]
    Provider {
        /// Kind of the provider error.
        kind: ErrorKind,
        /// Rendered provider error.
        message: String,
    },
}

impl From<&Error> for CredentialFailure {
    fn from(err: &Error) -> Self {
        CredentialFailure::Provider {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// CredentialStore owns the current credential and the last load failure.
///
/// At most one of them is set; both are empty before the first load.
#[derive(Debug)]
pub struct CredentialStore {
    provider: Box<dyn ProvideCredential<Credential = Credential>>,
    material: Option<Credential>,
    failure: Option<CredentialFailure>,
}

impl CredentialStore {
    /// Create an empty store loading from `provider`.
    pub fn new(provider: impl ProvideCredential<Credential = Credential>) -> Self {
        Self {
            provider: Box::new(provider),
            material: None,
            failure: None,
        }
    }

    /// Whether a credential with an access key is held and no failure is recorded.
    ///
    /// Expiry is not checked here.
    pub fn is_usable(&self) -> bool {
        self.failure.is_none() && self.material.as_ref().is_some_and(|c| c.has_access_key())
    }

    /// Whether the held credential has expired at `now`.
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.material.as_ref().is_some_and(|c| c.is_expired(now))
    }

    /// The held credential.
    pub fn material(&self) -> Option<&Credential> {
        self.material.as_ref()
    }

    /// Load a credential from the provider, replacing whatever is held.
    ///
    /// A credential without access key is recorded as a failure.
    pub async fn refresh(&mut self, ctx: &Context) -> Result<Credential, CredentialFailure> {
        let loaded = match self.provider.provide_credential(ctx).await {
            Ok(Some(cred)) if !cred.has_access_key() => Err(CredentialFailure::Provider {
                kind: ErrorKind::CredentialInvalid,
                message: "credential provider returned no access key".to_string(),
            }),
            Ok(Some(cred)) => Ok(cred),
            Ok(None) => Err(CredentialFailure::NotFound),
            Err(err) => Err(CredentialFailure::from(&err)),
        };

        match loaded {
            Ok(cred) => {
                debug!("credential refreshed: {cred:?}");
                self.material = Some(cred.clone());
                self.failure = None;
                Ok(cred)
            }
            Err(failure) => {
                warn!("credential refresh failed: {failure}");
                self.material = None;
                self.failure = Some(failure.clone());
                Err(failure)
            }
        }
    }

    /// Install a caller-provided credential without token or expiry.
    pub fn set_explicit(
        &mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) {
        self.material = Some(Credential::new(access_key_id, secret_access_key));
        self.failure = None;
    }

    /// The recorded failure, or [`CredentialFailure::Absent`].
    pub fn failure_reason(&self) -> CredentialFailure {
        self.failure.clone().unwrap_or(CredentialFailure::Absent)
    }

    /// Copies of the held credential and failure.
    pub fn snapshot(&self) -> (Option<Credential>, Option<CredentialFailure>) {
        (self.material.clone(), self.failure.clone())
    }
}
