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

//! Core components shared by the reqclient crates.
//!
//! This crate defines the seams between the client actor and the outside world.
//! Every collaborator the client talks to lives behind a small trait here, so
//! service crates and tests can plug in their own implementations.
//!
//! ## Overview
//!
//! - **Context**: a container holding implementations for file reading, HTTP sending and environment access
//! - **Traits**: credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Chain**: `ProvideCredentialChain` tries providers in order, first success wins
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use reqclient_core::{Context, ProvideCredential, ProvideCredentialChain, Result};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! #[derive(Debug)]
//! struct FromEnv;
//!
//! #[async_trait]
//! impl ProvideCredential for FromEnv {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<MyCredential>> {
//!         Ok(ctx.env_var("MY_KEY").map(|key| MyCredential { key }))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let chain = ProvideCredentialChain::new().push(FromEnv);
//! let cred = chain.provide_credential(&ctx).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: asynchronous file reading
//! - [`HttpSend`]: sending HTTP requests, the client transport
//! - [`Env`]: environment variable access
//! - [`ProvideCredential`]: loading credentials from various sources
//! - [`SignRequest`]: computing authentication headers for a request

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::Context;
mod fs;
pub use fs::FileRead;
mod http;
pub use self::http::{HttpOptions, HttpSend};
mod env;
pub use env::{Env, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningScope};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::SigningRequest;
