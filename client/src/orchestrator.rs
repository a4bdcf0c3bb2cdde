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

//! The per-request state walk.
//!
//! ```text
//! CheckCredentials -> CheckExpiry -> [Refresh] -> Sign -> Dispatch -> Format
//! ```
//!
//! Every step either moves on or finishes the request with an [`Outcome`].

use crate::endpoint::build_endpoint_in;
use crate::negotiate::{classify, decode, Body};
use crate::{CredentialStore, Outcome, Request, RequestError, Response};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method};
use log::debug;
use reqclient_aws_v4::Credential;
use reqclient_core::time::now;
use reqclient_core::{Context, SignRequest, SigningScope};

enum Step {
    CheckCredentials,
    CheckExpiry,
    Refresh,
    Sign(Credential),
    Dispatch(Parts),
    Format(http::Response<Bytes>),
}

/// How a signed request goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchPlan {
    /// No body and no body headers.
    Bodyless,
    /// Body sent with its length, under the caller's content type if any.
    WithBody,
}

/// Only PUT and POST carry a body unless the caller supplied one or a content type.
pub(crate) fn plan_dispatch(method: &Method, headers: &HeaderMap, body: &Bytes) -> DispatchPlan {
    let body_method = matches!(*method, Method::PUT | Method::POST);
    if !body_method && body.is_empty() && !headers.contains_key(CONTENT_TYPE) {
        DispatchPlan::Bodyless
    } else {
        DispatchPlan::WithBody
    }
}

/// Runs one request against the actor's state.
pub(crate) struct Orchestrator<'a> {
    pub ctx: &'a Context,
    pub store: &'a mut CredentialStore,
    pub signer: &'a dyn SignRequest<Credential = Credential>,
    pub region: &'a str,
    pub domain: &'a str,
}

impl Orchestrator<'_> {
    pub async fn run(&mut self, req: &Request) -> Outcome {
        let mut step = Step::CheckCredentials;

        loop {
            step = match step {
                Step::CheckCredentials => {
                    if !self.store.is_usable() {
                        return Err(RequestError::Credentials(self.store.failure_reason()));
                    }
                    Step::CheckExpiry
                }
                Step::CheckExpiry => match self.store.material() {
                    Some(cred) if !cred.is_expired(now()) => Step::Sign(cred.clone()),
                    _ => Step::Refresh,
                },
                Step::Refresh => {
                    debug!("credential expired, refreshing before {}", req.service());
                    match self.store.refresh(self.ctx).await {
                        Ok(cred) => Step::Sign(cred),
                        Err(failure) => return Err(RequestError::Credentials(failure)),
                    }
                }
                Step::Sign(cred) => match self.sign(req, &cred).await {
                    Ok(parts) => Step::Dispatch(parts),
                    Err(err) => return Err(RequestError::Build(err)),
                },
                Step::Dispatch(parts) => {
                    let plan = plan_dispatch(&parts.method, &parts.headers, req.body());
                    debug!("dispatching {} {} as {plan:?}", parts.method, parts.uri);

                    match self.ctx.http_send(build_http_request(parts, req.body(), plan)).await {
                        Ok(resp) => Step::Format(resp),
                        Err(err) => return Err(RequestError::Transport(err)),
                    }
                }
                Step::Format(resp) => return format_response(resp),
            }
        }
    }

    async fn sign(&self, req: &Request, cred: &Credential) -> reqclient_core::Result<Parts> {
        let url = build_endpoint_in(
            self.domain,
            self.region,
            req.service(),
            req.path(),
            req.host(),
        );
        let (mut parts, ()) = http::Request::builder()
            .method(req.method().clone())
            .uri(url)
            .body(())?
            .into_parts();
        parts.headers = req.headers().clone();

        let scope = SigningScope::new(self.region, req.service());
        let signed = self
            .signer
            .sign_request(self.ctx, &parts, req.body(), &scope, cred)
            .await?;
        parts.headers.extend(signed);
        parts.extensions.insert(*req.options());

        Ok(parts)
    }
}

fn build_http_request(
    mut parts: Parts,
    body: &Bytes,
    plan: DispatchPlan,
) -> http::Request<Bytes> {
    match plan {
        DispatchPlan::Bodyless => {
            parts.headers.remove(CONTENT_LENGTH);
            http::Request::from_parts(parts, Bytes::new())
        }
        DispatchPlan::WithBody => {
            parts
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            http::Request::from_parts(parts, body.clone())
        }
    }
}

/// Map a transport response into an [`Outcome`].
///
/// Every 2xx status is a success, not only 200, so an empty 204 decodes to
/// [`Body::Empty`]. Anything that is neither 2xx nor an error status is
/// reported as a remote error so it can't pass for success.
pub(crate) fn format_response(resp: http::Response<Bytes>) -> Outcome {
    let (parts, raw) = resp.into_parts();
    let status = parts.status;
    let media_type = classify(&parts.headers);

    if status.is_success() {
        return match decode(&media_type, &raw) {
            Ok(body) => Ok(Response {
                status,
                headers: parts.headers,
                body,
            }),
            Err(err) => Err(RequestError::Decode {
                media_type: err.media_type,
                message: err.message,
                raw,
            }),
        };
    }

    let body = decode(&media_type, &raw).unwrap_or_else(|err| {
        debug!("error body kept raw: {err}");
        Body::Raw(raw.clone())
    });
    let message = if status.is_client_error() || status.is_server_error() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        format!("unexpected status {}", status.as_u16())
    };

    Err(RequestError::Remote {
        status,
        message,
        headers: parts.headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn response(status: u16, content_type: Option<&str>, body: &'static [u8]) -> http::Response<Bytes> {
        let mut builder = http::Response::builder().status(status);
        if let Some(v) = content_type {
            builder = builder.header(CONTENT_TYPE, v);
        }
        builder
            .body(Bytes::from_static(body))
            .expect("response must be valid")
    }

    #[test_case(Method::GET, None, b"", DispatchPlan::Bodyless ; "plain get")]
    #[test_case(Method::DELETE, None, b"", DispatchPlan::Bodyless ; "plain delete")]
    #[test_case(Method::POST, None, b"", DispatchPlan::WithBody ; "empty post")]
    #[test_case(Method::PUT, None, b"data", DispatchPlan::WithBody ; "put")]
    #[test_case(Method::GET, Some("application/json"), b"", DispatchPlan::WithBody ; "get with content type")]
    #[test_case(Method::PATCH, None, b"{}", DispatchPlan::WithBody ; "patch with body")]
    fn test_plan_dispatch(
        method: Method,
        content_type: Option<&'static str>,
        body: &'static [u8],
        expected: DispatchPlan,
    ) {
        let mut headers = HeaderMap::new();
        if let Some(v) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(v));
        }
        assert_eq!(
            plan_dispatch(&method, &headers, &Bytes::from_static(body)),
            expected
        );
    }

    #[test]
    fn test_build_http_request() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("https://dynamodb.us-east-1.amazonaws.com/")
            .body(())
            .expect("request must be valid")
            .into_parts();
        let req = build_http_request(parts, &Bytes::from_static(b"{}"), DispatchPlan::WithBody);
        assert_eq!(req.headers()[CONTENT_LENGTH], "2");
        assert_eq!(req.body(), &Bytes::from_static(b"{}"));

        let (mut parts, ()) = http::Request::builder()
            .uri("https://dynamodb.us-east-1.amazonaws.com/")
            .body(())
            .expect("request must be valid")
            .into_parts();
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(0));
        let req = build_http_request(parts, &Bytes::new(), DispatchPlan::Bodyless);
        assert!(req.headers().get(CONTENT_LENGTH).is_none());
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_format_success_json() {
        let resp = format_response(response(200, Some("application/x-amz-json-1.0"), br#"{"A":1}"#))
            .expect("must succeed");
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, Body::Json(json!({"A": 1})));
    }

    #[test]
    fn test_format_success_empty() {
        let resp = format_response(response(204, None, b"")).expect("must succeed");
        assert_eq!(resp.body, Body::Empty);
    }

    #[test]
    fn test_format_success_with_bad_body() {
        let err = format_response(response(200, Some("application/json"), b"{oops"))
            .expect_err("must fail");
        let RequestError::Decode { media_type, raw, .. } = err else {
            panic!("expected decode error");
        };
        assert_eq!(media_type.to_string(), "application/json");
        assert_eq!(raw, Bytes::from_static(b"{oops"));
    }

    #[test]
    fn test_format_remote_xml() {
        let err = format_response(response(
            404,
            None,
            b"<Error><Code>NoSuchKey</Code></Error>",
        ))
        .expect_err("must fail");
        let RequestError::Remote {
            status,
            message,
            body: Body::Xml(root),
            ..
        } = err
        else {
            panic!("expected remote error with xml body");
        };
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Not Found");
        assert_eq!(root.child_text("Code"), Some("NoSuchKey"));
    }

    #[test]
    fn test_format_remote_keeps_undecodable_body() {
        let err = format_response(response(503, Some("application/json"), b"<html>"))
            .expect_err("must fail");
        let RequestError::Remote { message, body, .. } = err else {
            panic!("expected remote error");
        };
        assert_eq!(message, "Service Unavailable");
        assert_eq!(body, Body::Raw(Bytes::from_static(b"<html>")));
    }

    #[test_case(301 ; "moved permanently")]
    #[test_case(304 ; "not modified")]
    #[test_case(101 ; "switching protocols")]
    fn test_format_unexpected_status(code: u16) {
        let err = format_response(response(code, None, b"")).expect_err("must fail");
        let RequestError::Remote { status, message, .. } = err else {
            panic!("expected remote error");
        };
        assert_eq!(status.as_u16(), code);
        assert_eq!(message, format!("unexpected status {code}"));
    }
}
