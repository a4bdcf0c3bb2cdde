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

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use reqclient_core::HttpOptions;

/// What a caller wants sent to a service.
///
/// The client only adds signing headers to it.
///
/// ```
/// use http::Method;
/// use reqclient::Request;
///
/// let req = Request::new("dynamodb", Method::POST, "/")
///     .with_header(
///         http::HeaderName::from_static("x-amz-target"),
///         http::HeaderValue::from_static("DynamoDB_20120810.ListTables"),
///     )
///     .with_body("{}");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    service: String,
    method: Method,
    path: String,
    body: Bytes,
    headers: HeaderMap,
    options: HttpOptions,
    host: Option<String>,
}

impl Request {
    /// Create a request for `service` with an empty body.
    ///
    /// `path` includes the query string, if any.
    pub fn new(service: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method,
            path: path.into(),
            body: Bytes::new(),
            headers: HeaderMap::new(),
            options: HttpOptions::default(),
            host: None,
        }
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set transport options.
    pub fn with_options(mut self, options: HttpOptions) -> Self {
        self.options = options;
        self
    }

    /// Send to `host` instead of the regional endpoint.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Service name, also used as signing scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path and query.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Caller headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Transport options.
    pub fn options(&self) -> &HttpOptions {
        &self.options
    }

    /// Host override.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}
