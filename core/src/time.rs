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

//! Time related utils.

use crate::{Error, Result};
use chrono::format::{DelayedFormat, StrftimeItems};
use chrono::Utc;

/// DateTime is the alias of `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime with current time.
#[inline]
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
#[inline]
pub fn format_date(t: DateTime) -> DelayedFormat<StrftimeItems<'static>> {
    t.format("%Y%m%d")
}

/// Format time into ISO8601: `20220313T072004Z`
#[inline]
pub fn format_iso8601(t: DateTime) -> DelayedFormat<StrftimeItems<'static>> {
    t.format("%Y%m%dT%H%M%SZ")
}

/// Format time into RFC3339: `2022-03-13T07:20:04Z`
#[inline]
pub fn format_rfc3339(t: DateTime) -> DelayedFormat<StrftimeItems<'static>> {
    t.format("%Y-%m-%dT%H:%M:%SZ")
}

/// Parse time from RFC3339.
///
/// All input time SHOULD follow [RFC3339](https://datatracker.ietf.org/doc/html/rfc3339).
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|v| v.with_timezone(&Utc))
        .map_err(|e| {
            Error::unexpected("failed to parse rfc3339 time")
                .with_source(e)
                .with_context(format!("value: {s}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn test_time() -> DateTime {
        Utc.with_ymd_and_hms(2022, 3, 1, 8, 12, 34)
            .single()
            .expect("time must be valid")
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(test_time()).to_string(), "20220301");
    }

    #[test]
    fn test_format_iso8601() {
        assert_eq!(format_iso8601(test_time()).to_string(), "20220301T081234Z");
    }

    #[test]
    fn test_format_rfc3339() {
        assert_eq!(
            format_rfc3339(test_time()).to_string(),
            "2022-03-01T08:12:34Z"
        );
    }

    #[test]
    fn test_parse_rfc3339() {
        for input in [
            "2022-03-01T08:12:34Z",
            "2022-03-01T08:12:34+00:00",
            "2022-03-01T08:12:34.00+00:00",
        ] {
            assert_eq!(parse_rfc3339(input).expect("must parse"), test_time());
        }
        assert!(parse_rfc3339("yesterday").is_err());
    }
}
