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

//! AWS Signature V4 support for reqclient.
//!
//! This crate provides the AWS flavoured collaborators used by the client:
//!
//! - [`Credential`]: access key, secret key, optional session token and expiry
//! - credential providers for environment variables, shared profile files and EC2 IMDSv2,
//!   combined by [`DefaultCredentialProvider`] in that precedence
//! - [`RequestSigner`]: computes SigV4 authentication headers
//! - [`Config`]: region and profile settings loaded from env and the shared config file

mod constants;
pub use constants::*;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;
