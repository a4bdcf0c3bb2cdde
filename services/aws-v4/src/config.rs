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
use ini::Ini;
use log::debug;
use reqclient_core::{Context, Error, Result};

/// Region used when nothing else is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Config carries the client settings for AWS services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `config_file` will be loaded from
    ///
    /// - this field if it's changed
    /// - env value: [`AWS_CONFIG_FILE`]
    /// - default to: `~/.aws/config`
    pub config_file: String,
    /// `shared_credentials_file` will be loaded from
    ///
    /// - this field if it's changed
    /// - env value: [`AWS_SHARED_CREDENTIALS_FILE`]
    /// - default to: `~/.aws/credentials`
    pub shared_credentials_file: String,
    /// `profile` will be loaded from
    ///
    /// - env value: [`AWS_PROFILE`]
    /// - default to `default`
    pub profile: String,
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`], then [`AWS_DEFAULT_REGION`]
    /// - profile config: `region`
    pub region: Option<String>,
    /// Domain appended to `{service}.{region}.` when building endpoints.
    ///
    /// Derived from the region when unset.
    pub endpoint_domain: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: "~/.aws/config".to_string(),
            shared_credentials_file: "~/.aws/credentials".to_string(),
            profile: "default".to_string(),
            region: None,
            endpoint_domain: None,
        }
    }
}

impl Config {
    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Pin the endpoint domain.
    pub fn with_endpoint_domain(mut self, domain: impl Into<String>) -> Self {
        self.endpoint_domain = Some(domain.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(AWS_CONFIG_FILE) {
            self.config_file = v;
        }
        if let Some(v) = ctx.env_var(AWS_SHARED_CREDENTIALS_FILE) {
            self.shared_credentials_file = v;
        }
        if let Some(v) = ctx.env_var(AWS_PROFILE) {
            self.profile = v;
        }
        if let Some(v) = ctx
            .env_var(AWS_REGION)
            .or_else(|| ctx.env_var(AWS_DEFAULT_REGION))
        {
            self.region.get_or_insert(v);
        }

        self
    }

    /// Load region from the profile section of the shared config file.
    ///
    /// A missing or unreadable file leaves the config untouched.
    pub async fn from_profile(mut self, ctx: &Context) -> Self {
        if self.region.is_some() {
            return self;
        }

        match self.load_profile_region(ctx).await {
            Ok(Some(region)) => self.region = Some(region),
            Ok(None) => debug!("no region found in profile {}", self.profile),
            Err(err) => debug!("load region from profile failed: {err}"),
        }

        self
    }

    /// The configured region, or [`DEFAULT_REGION`].
    pub fn region_or_default(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    async fn load_profile_region(&self, ctx: &Context) -> Result<Option<String>> {
        let path = ctx.expand_home_dir(&self.config_file).ok_or_else(|| {
            Error::config_invalid("failed to expand home dir")
                .with_context(format!("path: {}", self.config_file))
        })?;
        let content = ctx.file_read_as_string(&path).await?;
        let conf = Ini::load_from_str(&content).map_err(|e| {
            Error::config_invalid("failed to parse config file")
                .with_source(e)
                .with_context(format!("path: {path}"))
        })?;

        Ok(conf
            .section(Some(profile_section(&self.profile)))
            .and_then(|props| props.get("region"))
            .map(|v| v.to_string()))
    }
}

/// Section name of `profile` inside the shared config file.
pub(crate) fn profile_section(profile: &str) -> String {
    match profile {
        "default" => "default".to_string(),
        x => format!("profile {x}"),
    }
}
