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

use crate::config::profile_section;
use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use ini::{Ini, Properties};
use log::debug;
use reqclient_core::{Context, Error, ProvideCredential, Result};

/// ProfileCredentialProvider loads AWS credentials from the shared files.
///
/// This provider loads credentials from, in order:
/// - `~/.aws/credentials` (or the path specified by `AWS_SHARED_CREDENTIALS_FILE`)
/// - `~/.aws/config` (or the path specified by `AWS_CONFIG_FILE`)
///
/// The profile to use is determined by:
/// 1. The `AWS_PROFILE` environment variable
/// 2. The profile specified via `with_profile()`
/// 3. Default to "default"
///
/// Missing files or profiles yield no credential; a file that exists but
/// cannot be parsed is an error.
#[derive(Debug, Clone)]
pub struct ProfileCredentialProvider {
    profile: String,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

impl Default for ProfileCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self {
            profile: "default".to_string(),
            config_file: None,
            credentials_file: None,
        }
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Read and parse an ini file, `None` if it can't be read.
    async fn load_ini(&self, ctx: &Context, path: &str) -> Result<Option<Ini>> {
        let Some(expanded) = ctx.expand_home_dir(path) else {
            debug!("failed to expand homedir for path: {path}");
            return Ok(None);
        };

        let content = match ctx.file_read_as_string(&expanded).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read profile file {expanded}: {err}");
                return Ok(None);
            }
        };

        Ini::load_from_str(&content).map(Some).map_err(|e| {
            Error::config_invalid("failed to parse profile file")
                .with_source(e)
                .with_context(format!("path: {expanded}"))
        })
    }

    async fn load_section(
        &self,
        ctx: &Context,
        path: &str,
        section: &str,
    ) -> Result<Option<Credential>> {
        let Some(conf) = self.load_ini(ctx, path).await? else {
            return Ok(None);
        };

        match conf.section(Some(section)) {
            Some(props) => Ok(credential_from_props(props)),
            None => {
                debug!("section {section} not found in {path}");
                Ok(None)
            }
        }
    }
}

fn credential_from_props(props: &Properties) -> Option<Credential> {
    let ak = props.get("aws_access_key_id")?;
    let sk = props.get("aws_secret_access_key")?;

    Some(Credential {
        access_key_id: ak.to_string(),
        secret_access_key: sk.to_string(),
        session_token: props.get("aws_session_token").map(|s| s.to_string()),
        expires_in: None,
    })
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let profile = ctx
            .env_var(AWS_PROFILE)
            .unwrap_or_else(|| self.profile.clone());

        let credentials_file = self
            .credentials_file
            .clone()
            .or_else(|| ctx.env_var(AWS_SHARED_CREDENTIALS_FILE))
            .unwrap_or_else(|| "~/.aws/credentials".to_string());
        if let Some(cred) = self.load_section(ctx, &credentials_file, &profile).await? {
            return Ok(Some(cred));
        }

        let config_file = self
            .config_file
            .clone()
            .or_else(|| ctx.env_var(AWS_CONFIG_FILE))
            .unwrap_or_else(|| "~/.aws/config".to_string());
        self.load_section(ctx, &config_file, &profile_section(&profile))
            .await
    }
}
