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

//! Response content negotiation: pick a media type, then decode by it.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// Media type assumed when a response carries no `content-type`.
pub const DEFAULT_MEDIA_TYPE: &str = "text/xml";

/// A declared media type with its parameters dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    /// Top level type, for example `application`.
    pub type_: String,
    /// Subtype, for example `json` or `x-amz-json-1.0`.
    pub subtype: String,
}

impl MediaType {
    /// Create a media type, lowercasing both parts.
    pub fn new(type_: &str, subtype: &str) -> Self {
        Self {
            type_: type_.trim().to_ascii_lowercase(),
            subtype: subtype.trim().to_ascii_lowercase(),
        }
    }

    /// Parse a `content-type` value like `application/json; charset=utf-8`.
    ///
    /// A value without `/` becomes the type with an empty subtype.
    pub fn parse(value: &str) -> Self {
        let essence = value.split(';').next().unwrap_or_default();
        match essence.split_once('/') {
            Some((type_, subtype)) => Self::new(type_, subtype),
            None => Self::new(essence, ""),
        }
    }

    /// Whether the subtype belongs to the JSON family, vendor subtypes included.
    pub fn is_json(&self) -> bool {
        self.subtype.contains("json")
    }

    /// Whether the subtype belongs to the XML family.
    pub fn is_xml(&self) -> bool {
        self.subtype.contains("xml")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subtype.is_empty() {
            write!(f, "{}", self.type_)
        } else {
            write!(f, "{}/{}", self.type_, self.subtype)
        }
    }
}

/// Determine the declared media type of a response.
///
/// Header lookup is case-insensitive. Missing or non-text values fall back
/// to [`DEFAULT_MEDIA_TYPE`].
pub fn classify(headers: &HeaderMap) -> MediaType {
    let value = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_MEDIA_TYPE);
    MediaType::parse(value)
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The response had no body.
    Empty,
    /// A JSON document.
    Json(serde_json::Value),
    /// An XML document.
    Xml(XmlElement),
    /// A body of a type we don't decode, returned untouched.
    Raw(Bytes),
}

/// One element of a decoded XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated, unescaped text content.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }
}

/// A body that its declared decoder rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode {media_type} body: {message}")]
pub struct DecodeError {
    /// The declared media type.
    pub media_type: MediaType,
    /// What the decoder complained about.
    pub message: String,
}

/// Decode `raw` according to `media_type`.
///
/// An empty body is [`Body::Empty`] whatever the declared type. Types that are
/// neither JSON nor XML come back as [`Body::Raw`].
pub fn decode(media_type: &MediaType, raw: &Bytes) -> Result<Body, DecodeError> {
    if raw.is_empty() {
        return Ok(Body::Empty);
    }

    let decoded = if media_type.is_json() {
        serde_json::from_slice(raw)
            .map(Body::Json)
            .map_err(|e| e.to_string())
    } else if media_type.is_xml() {
        parse_xml(raw).map(Body::Xml)
    } else {
        return Ok(Body::Raw(raw.clone()));
    };

    decoded.map_err(|message| DecodeError {
        media_type: media_type.clone(),
        message,
    })
}

fn parse_xml(raw: &[u8]) -> Result<XmlElement, String> {
    let mut reader = Reader::from_reader(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without opening tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err("text outside of root element".to_string()),
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element: {}", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement, String> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            value.to_string(),
        ));
    }

    Ok(XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).to_string(),
        attributes,
        ..Default::default()
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err("multiple root elements".to_string()),
        None => *root = Some(element),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Some("application/json; charset=utf-8"), "application", "json" ; "json with charset")]
    #[test_case(Some("application/x-amz-json-1.0"), "application", "x-amz-json-1.0" ; "vendor json")]
    #[test_case(Some("Text/XML"), "text", "xml" ; "mixed case")]
    #[test_case(Some(" application / xml ;q=1"), "application", "xml" ; "padded")]
    #[test_case(Some("binary"), "binary", "" ; "without subtype")]
    #[test_case(None, "text", "xml" ; "absent")]
    fn test_classify(value: Option<&str>, type_: &str, subtype: &str) {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(v).expect("must be valid"));
        }

        assert_eq!(classify(&headers), MediaType::new(type_, subtype));
    }

    #[test]
    fn test_classify_ignores_header_name_casing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::HeaderName::from_bytes(b"Content-Type").expect("must be valid"),
            HeaderValue::from_static("application/json"),
        );
        assert!(classify(&headers).is_json());
    }

    #[test]
    fn test_decode_json() {
        let body = decode(
            &MediaType::new("application", "vnd.api+json"),
            &Bytes::from_static(br#"{"A":1}"#),
        );
        assert_eq!(body, Ok(Body::Json(json!({"A": 1}))));
    }

    #[test]
    fn test_decode_xml() {
        let raw = Bytes::from_static(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Error xmlns="urn:test"><Code>NoSuchKey</Code><Message>a &amp; b</Message><Empty/><Data><![CDATA[<raw>]]></Data></Error>"#,
        );
        let Ok(Body::Xml(root)) = decode(&MediaType::new("text", "xml"), &raw) else {
            panic!("body must decode as xml");
        };

        assert_eq!(root.name, "Error");
        assert_eq!(
            root.attributes,
            vec![("xmlns".to_string(), "urn:test".to_string())]
        );
        assert_eq!(root.child_text("Code"), Some("NoSuchKey"));
        assert_eq!(root.child_text("Message"), Some("a & b"));
        assert_eq!(root.child_text("Empty"), Some(""));
        assert_eq!(root.child_text("Data"), Some("<raw>"));
        assert_eq!(root.children.len(), 4);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let media_type = MediaType::new("application", "xml");
        let raw = Bytes::from_static(b"<A><B>1</B><B>2</B></A>");
        assert_eq!(decode(&media_type, &raw), decode(&media_type, &raw));
    }

    #[test_case("application", "json", b"{not json" ; "bad json")]
    #[test_case("text", "xml", b"<A><B></A>" ; "mismatched xml")]
    #[test_case("text", "xml", b"<A>" ; "unclosed xml")]
    #[test_case("text", "xml", b"plain text" ; "xml without root")]
    fn test_decode_rejects(type_: &str, subtype: &str, raw: &'static [u8]) {
        let media_type = MediaType::new(type_, subtype);
        let err = decode(&media_type, &Bytes::from_static(raw)).expect_err("must fail");
        assert_eq!(err.media_type, media_type);
    }

    #[test]
    fn test_decode_empty_and_raw() {
        assert_eq!(
            decode(&MediaType::new("application", "json"), &Bytes::new()),
            Ok(Body::Empty)
        );
        assert_eq!(
            decode(
                &MediaType::new("application", "octet-stream"),
                &Bytes::from_static(b"\x00\x01")
            ),
            Ok(Body::Raw(Bytes::from_static(b"\x00\x01")))
        );
    }
}
