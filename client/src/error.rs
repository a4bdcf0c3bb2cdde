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

use crate::{Body, CredentialFailure, MediaType};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use reqclient_core::Error;

/// Result of one request.
pub type Outcome = std::result::Result<Response, RequestError>;

/// A successful response with its body decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Response status, always 2xx.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body.
    pub body: Body,
}

/// Why a request did not produce a [`Response`].
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// No usable credential, or refreshing it failed. Nothing was sent.
    #[error("credentials unavailable: {0}")]
    Credentials(CredentialFailure),
    /// The service answered with a non-success status.
    ///
    /// `body` is decoded when possible and raw otherwise.
    #[error("remote service returned {status}: {message}")]
    Remote {
        /// Response status.
        status: StatusCode,
        /// Status reason.
        message: String,
        /// Response headers.
        headers: HeaderMap,
        /// Best-effort decoded body.
        body: Body,
    },
    /// A success response whose body doesn't match its declared type.
    #[error("failed to decode {media_type} response: {message}")]
    Decode {
        /// Declared media type.
        media_type: MediaType,
        /// Decoder message.
        message: String,
        /// Undecoded body.
        raw: Bytes,
    },
    /// The transport could not complete the exchange.
    #[error("transport failed: {0}")]
    Transport(#[source] Error),
    /// The request could not be built or signed.
    #[error("failed to build request: {0}")]
    Build(#[source] Error),
}

/// The client actor is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The actor task has stopped and no longer accepts commands.
    #[error("client actor has stopped")]
    Closed,
}
