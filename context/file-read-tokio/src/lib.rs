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

//! Tokio-based file reading for reqclient.
//!
//! `TokioFileRead` implements [`reqclient_core::FileRead`] on top of
//! `tokio::fs`, so profile based credential providers can load
//! `~/.aws/credentials` and `~/.aws/config` without blocking the runtime.
//!
//! ```no_run
//! use reqclient_core::{Context, OsEnv};
//! use reqclient_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> reqclient_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_env(OsEnv);
//! let content = ctx.file_read_as_string("/etc/hosts").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqclient_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            Error::unexpected("failed to read file")
                .with_source(e)
                .with_context(format!("path: {path}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_existing_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "[default]\nregion = eu-west-1\n")?;

        let path = file.path().to_string_lossy().to_string();
        let content = TokioFileRead.file_read(&path).await?;
        assert_eq!(content, b"[default]\nregion = eu-west-1\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = TokioFileRead
            .file_read("/definitely/not/here")
            .await
            .expect_err("missing file must fail");
        assert!(err.to_string().contains("/definitely/not/here"));
    }
}
