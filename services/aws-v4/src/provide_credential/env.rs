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

use crate::{constants::*, Credential};
use async_trait::async_trait;
use reqclient_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads AWS credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `AWS_ACCESS_KEY_ID`: The AWS access key ID
/// - `AWS_SECRET_ACCESS_KEY`: The AWS secret access key
/// - `AWS_SESSION_TOKEN`: The AWS session token (optional)
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(ak), Some(sk)) = (
            ctx.env_var(AWS_ACCESS_KEY_ID).filter(|v| !v.is_empty()),
            ctx.env_var(AWS_SECRET_ACCESS_KEY).filter(|v| !v.is_empty()),
        ) else {
            return Ok(None);
        };

        Ok(Some(Credential {
            access_key_id: ak,
            secret_access_key: sk,
            session_token: ctx.env_var(AWS_SESSION_TOKEN).filter(|v| !v.is_empty()),
            expires_in: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqclient_core::StaticEnv;
    use std::collections::HashMap;
    use test_case::test_case;

    fn context_with(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[tokio::test]
    async fn test_env_credential_provider() -> anyhow::Result<()> {
        let ctx = context_with(&[
            (AWS_ACCESS_KEY_ID, "test_access_key"),
            (AWS_SECRET_ACCESS_KEY, "test_secret_key"),
            (AWS_SESSION_TOKEN, "test_session_token"),
        ]);

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key_id, "test_access_key");
        assert_eq!(cred.secret_access_key, "test_secret_key");
        assert_eq!(cred.session_token.as_deref(), Some("test_session_token"));
        assert!(cred.expires_in.is_none());

        Ok(())
    }

    #[test_case(&[] ; "missing both")]
    #[test_case(&[(AWS_ACCESS_KEY_ID, "test_access_key")] ; "missing secret")]
    #[test_case(&[(AWS_SECRET_ACCESS_KEY, "test_secret_key")] ; "missing access key")]
    #[test_case(&[(AWS_ACCESS_KEY_ID, ""), (AWS_SECRET_ACCESS_KEY, "test_secret_key")] ; "empty access key")]
    #[tokio::test]
    async fn test_env_credential_provider_incomplete(envs: &[(&str, &str)]) -> anyhow::Result<()> {
        let cred = EnvCredentialProvider::new()
            .provide_credential(&context_with(envs))
            .await?;
        assert!(cred.is_none());

        Ok(())
    }
}
