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

use crate::provide_credential::{
    EnvCredentialProvider, IMDSv2CredentialProvider, ProfileCredentialProvider,
};
use crate::Credential;
use async_trait::async_trait;
use reqclient_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider tries to load credential via the default chain.
///
/// Resolution order:
///
/// 1. Environment variables
/// 2. Shared files (`~/.aws/credentials`, `~/.aws/config`)
/// 3. EC2 IMDSv2
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ProfileCredentialProvider::new())
            .push(IMDSv2CredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::StaticCredentialProvider;
    use pretty_assertions::assert_eq;
    use reqclient_core::StaticEnv;
    use reqclient_file_read_tokio::TokioFileRead;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn context(envs: HashMap<String, String>) -> Context {
        let _ = env_logger::builder().is_test(true).try_init();

        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            })
    }

    #[tokio::test]
    async fn test_with_chain_uses_custom_chain() -> anyhow::Result<()> {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(StaticCredentialProvider::new("static_ak", "static_sk"));
        let provider = DefaultCredentialProvider::with_chain(chain);

        // Nothing in env, so the static member answers and IMDS is never tried.
        let cred = provider
            .provide_credential(&context(HashMap::new()))
            .await?
            .expect("static credential must load");
        assert_eq!(cred.access_key_id, "static_ak");
        assert_eq!(cred.secret_access_key, "static_sk");

        Ok(())
    }

    #[tokio::test]
    async fn test_default_without_any_source() {
        let ctx = context(HashMap::from([
            (
                AWS_SHARED_CREDENTIALS_FILE.to_string(),
                "/non/existent/path".to_string(),
            ),
            (AWS_CONFIG_FILE.to_string(), "/non/existent/path".to_string()),
        ]));

        // IMDS is unreachable without an http client, its failure is reported.
        let err = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .expect_err("chain must fail");
        assert!(err.to_string().contains("IMDS"));
    }

    #[tokio::test]
    async fn test_default_prefers_env_over_profile() -> anyhow::Result<()> {
        let tmp_dir = tempdir()?;
        let file_path = tmp_dir.path().join("credentials");
        let mut tmp_file = File::create(&file_path)?;
        writeln!(tmp_file, "[default]")?;
        writeln!(tmp_file, "aws_access_key_id = shared_access_key_id")?;
        writeln!(tmp_file, "aws_secret_access_key = shared_secret_access_key")?;

        let shared = (
            AWS_SHARED_CREDENTIALS_FILE.to_string(),
            file_path.to_string_lossy().to_string(),
        );

        let ctx = context(HashMap::from([
            shared.clone(),
            (AWS_ACCESS_KEY_ID.to_string(), "env_access_key_id".to_string()),
            (
                AWS_SECRET_ACCESS_KEY.to_string(),
                "env_secret_access_key".to_string(),
            ),
        ]));
        let cred = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("env credential must load");
        assert_eq!(cred.access_key_id, "env_access_key_id");

        let ctx = context(HashMap::from([
            shared,
            (AWS_EC2_METADATA_DISABLED.to_string(), "true".to_string()),
        ]));
        let cred = DefaultCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("shared credential must load");
        assert_eq!(cred.access_key_id, "shared_access_key_id");
        assert_eq!(cred.secret_access_key, "shared_secret_access_key");

        Ok(())
    }
}
