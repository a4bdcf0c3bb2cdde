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

/// Domain of the global partition.
pub const DEFAULT_DOMAIN: &str = "amazonaws.com";
/// Domain of the China partition, used by `cn-` regions.
pub const CN_DOMAIN: &str = "amazonaws.com.cn";

/// Domain that services of `region` live under.
pub fn default_domain(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        CN_DOMAIN
    } else {
        DEFAULT_DOMAIN
    }
}

/// Build the URL a request is sent to, using the partition domain of `region`.
///
/// - With `host`: `https://{host}{path}`
/// - Otherwise: `https://{service}.{region}.{domain}{path}`
///
/// Inputs are used verbatim.
pub fn build_endpoint(region: &str, service: &str, path: &str, host: Option<&str>) -> String {
    build_endpoint_in(default_domain(region), region, service, path, host)
}

/// Same as [`build_endpoint`] with an explicit domain.
pub fn build_endpoint_in(
    domain: &str,
    region: &str,
    service: &str,
    path: &str,
    host: Option<&str>,
) -> String {
    match host {
        Some(host) => format!("https://{host}{path}"),
        None => format!("https://{service}.{region}.{domain}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("us-east-1", "dynamodb", "/", None, "https://dynamodb.us-east-1.amazonaws.com/" ; "regional")]
    #[test_case("us-east-1", "dynamodb", "/", Some("localhost:8000"), "https://localhost:8000/" ; "host override")]
    #[test_case("cn-north-1", "s3", "/bucket/key", None, "https://s3.cn-north-1.amazonaws.com.cn/bucket/key" ; "china partition")]
    #[test_case("eu-west-1", "sqs", "/?Action=ListQueues", None, "https://sqs.eu-west-1.amazonaws.com/?Action=ListQueues" ; "query kept verbatim")]
    fn test_build_endpoint(
        region: &str,
        service: &str,
        path: &str,
        host: Option<&str>,
        expected: &str,
    ) {
        assert_eq!(build_endpoint(region, service, path, host), expected);
    }

    #[test]
    fn test_build_endpoint_in_custom_domain() {
        assert_eq!(
            build_endpoint_in("example.internal", "us-east-1", "kinesis", "/", None),
            "https://kinesis.us-east-1.example.internal/"
        );
    }
}
