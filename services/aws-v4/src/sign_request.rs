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

use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
    X_AMZ_SECURITY_TOKEN,
};
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use http::request::Parts;
use http::{header, HeaderMap, HeaderName, HeaderValue};
use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use reqclient_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use reqclient_core::time::{format_date, format_iso8601, now, DateTime};
use reqclient_core::{Context, Error, Result, SignRequest, SigningRequest, SigningScope};
use std::fmt::Write;

/// RequestSigner implements AWS SigV4 header signing.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The payload is always hashed into the canonical request. The hash is only
/// sent as `x-amz-content-sha256` for S3, which requires it.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new AWS V4 signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

/// Headers computed while signing, mirrored into the canonical request.
struct Signed<'a> {
    req: &'a mut SigningRequest,
    extra: HeaderMap,
}

impl Signed<'_> {
    fn add(&mut self, name: HeaderName, value: HeaderValue) {
        self.req.headers.insert(name.clone(), value.clone());
        self.extra.insert(name, value);
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &Parts,
        body: &Bytes,
        scope: &SigningScope,
        cred: &Self::Credential,
    ) -> Result<HeaderMap> {
        let now = self.time.unwrap_or_else(now);
        let mut signing_req = SigningRequest::build(req)?;
        for (_, value) in signing_req.headers.iter_mut() {
            SigningRequest::header_value_normalize(value)
        }

        let mut signed = Signed {
            req: &mut signing_req,
            extra: HeaderMap::new(),
        };

        if !signed.req.headers.contains_key(header::HOST) {
            let host = HeaderValue::from_str(signed.req.authority.as_str())?;
            signed.add(header::HOST, host);
        }
        if !signed.req.headers.contains_key(X_AMZ_DATE) {
            let date = HeaderValue::try_from(format_iso8601(now).to_string())?;
            signed.add(HeaderName::from_static(X_AMZ_DATE), date);
        }
        let payload_hash = match signed.req.headers.get(X_AMZ_CONTENT_SHA_256) {
            Some(v) => v.to_str()?.to_string(),
            None => {
                let hash = hex_sha256(body);
                if scope.service == "s3" {
                    signed.add(
                        HeaderName::from_static(X_AMZ_CONTENT_SHA_256),
                        HeaderValue::from_str(&hash)?,
                    );
                }
                hash
            }
        };
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Keep the token out of logs.
            value.set_sensitive(true);
            signed.add(HeaderName::from_static(X_AMZ_SECURITY_TOKEN), value);
        }

        let Signed { req: signing_req, mut extra } = signed;
        canonicalize_query(signing_req);

        let creq = canonical_request_string(signing_req, &payload_hash)?;
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let credential_scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            scope.region,
            scope.service
        );
        debug!("calculated scope: {credential_scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{credential_scope}\n{encoded_req}",
            format_iso8601(now)
        );
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &scope.region, &scope.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "AWS4-HMAC-SHA256 Credential={}/{credential_scope}, SignedHeaders={}, Signature={signature}",
            cred.access_key_id,
            signing_req.header_name_to_vec_sorted().join(";"),
        ))?;
        authorization.set_sensitive(true);
        extra.insert(header::AUTHORIZATION, authorization);

        Ok(extra)
    }
}

fn canonical_request_string(req: &SigningRequest, payload_hash: &str) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", req.method)?;
    let path = percent_decode_str(&req.path).decode_utf8().map_err(|e| {
        Error::request_invalid("request path is not valid utf-8").with_source(e)
    })?;
    writeln!(f, "{}", utf8_percent_encode(&path, &AWS_URI_ENCODE_SET))?;
    writeln!(
        f,
        "{}",
        req.query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    )?;

    let signed_headers = req.header_name_to_vec_sorted();
    for name in signed_headers.iter() {
        let values = req
            .headers
            .get_all(*name)
            .iter()
            .map(|v| v.to_str())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        writeln!(f, "{name}:{}", values.join(","))?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}

/// Percent-encode query pairs and sort them by encoded name, then value.
fn canonicalize_query(req: &mut SigningRequest) {
    let mut query = req
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    query.sort();
    req.query = query;
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).to_string().as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
