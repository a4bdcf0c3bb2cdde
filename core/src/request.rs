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

use crate::{Error, Result};
use http::request::Parts;
use http::uri::Authority;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;

/// A decomposed view of a request, ready to be canonicalized by a signer.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing request from [`Parts`] without touching them.
    pub fn build(parts: &Parts) -> Result<Self> {
        let uri = &parts.uri;
        let authority = uri.authority().cloned().ok_or_else(|| {
            Error::request_invalid("request without authority is invalid for signing")
                .with_context(format!("uri: {uri}"))
        })?;

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTPS),
            authority,
            path: match uri.path() {
                "" => "/".to_string(),
                p => p.to_string(),
            },
            query: uri
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            headers: parts.headers.clone(),
        })
    }

    /// Trim leading and trailing spaces of a header value.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();

        let starting_index = bs.iter().position(|b| *b != b' ').unwrap_or(0);
        let ending_offset = bs.iter().rev().position(|b| *b != b' ').unwrap_or(0);
        let ending_index = bs.len() - ending_offset;

        // Trimming spaces off a valid value always yields a valid value.
        if let Ok(trimmed) = HeaderValue::from_bytes(&bs[starting_index..ending_index]) {
            *v = trimmed;
        }
    }

    /// Get header names as sorted vector.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_keeps_parts_untouched() -> Result<()> {
        let (parts, _) = http::Request::builder()
            .method(Method::POST)
            .uri("https://dynamodb.us-east-1.amazonaws.com/?b=2&a=1")
            .header("x-amz-target", "DynamoDB_20120810.ListTables")
            .body(())?
            .into_parts();

        let req = SigningRequest::build(&parts)?;
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.authority.as_str(), "dynamodb.us-east-1.amazonaws.com");
        assert_eq!(req.path, "/");
        assert_eq!(
            req.query,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string())
            ]
        );
        assert_eq!(req.header_name_to_vec_sorted(), vec!["x-amz-target"]);
        assert_eq!(parts.headers.len(), 1);

        Ok(())
    }

    #[test]
    fn test_build_requires_authority() -> Result<()> {
        let (parts, _) = http::Request::builder().uri("/relative").body(())?.into_parts();
        assert!(SigningRequest::build(&parts).is_err());
        Ok(())
    }

    #[test]
    fn test_header_value_normalize() {
        let mut v = HeaderValue::from_static("  a value  ");
        SigningRequest::header_value_normalize(&mut v);
        assert_eq!(v, "a value");
    }
}
