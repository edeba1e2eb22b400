// MinIO Rust Library for Amazon S3 Compatible Cloud Storage
// Copyright 2025 MinIO, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Request parameters and response parsing for the ListObjectsV2 S3 API

use crate::s3::error::Error;
use crate::s3::utils::{Multimap, get_option_text, get_text, urldecode};
use bytes::{Buf, Bytes};
use xmltree::Element;

/// Builds query parameters of a single ListObjectsV2 page request.
///
/// Keys are requested URL encoded so that names containing control characters survive the
/// XML round trip; they are decoded again by [`ListObjectsV2Response::parse`].
pub fn list_objects_v2_query(
    prefix: &str,
    continuation_token: Option<&str>,
    max_keys: u16,
) -> Multimap {
    let mut query = Multimap::new();
    query.insert("list-type".into(), "2".into());
    query.insert("encoding-type".into(), "url".into());
    query.insert("max-keys".into(), max_keys.to_string());
    query.insert("prefix".into(), prefix.to_string());
    if let Some(token) = continuation_token {
        query.insert("continuation-token".into(), token.to_string());
    }
    query
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Object entry of a listing page
pub struct ListEntry {
    pub name: String,
    pub size: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Parsed response of one ListObjectsV2 page
pub struct ListObjectsV2Response {
    pub name: String,
    pub prefix: Option<String>,
    pub key_count: Option<u32>,
    pub is_truncated: bool,
    pub continuation_token: Option<String>,
    pub next_continuation_token: Option<String>,
    pub contents: Vec<ListEntry>,
}

fn url_decode(encoding_type: &Option<String>, value: String) -> Result<String, Error> {
    match encoding_type.as_deref() {
        Some("url") => urldecode(&value),
        _ => Ok(value),
    }
}

impl ListObjectsV2Response {
    pub fn parse(body: Bytes) -> Result<ListObjectsV2Response, Error> {
        let root = Element::parse(body.reader())?;
        let encoding_type = get_option_text(&root, "EncodingType");

        let prefix = get_option_text(&root, "Prefix")
            .map(|v| url_decode(&encoding_type, v))
            .transpose()?;
        let key_count = get_option_text(&root, "KeyCount")
            .map(|v| v.parse::<u32>())
            .transpose()?;
        let is_truncated = get_option_text(&root, "IsTruncated")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mut contents = Vec::new();
        for content in root
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .filter(|e| e.name == "Contents")
        {
            contents.push(ListEntry {
                name: url_decode(&encoding_type, get_text(content, "Key")?)?,
                size: get_option_text(content, "Size")
                    .map(|v| v.parse::<u64>())
                    .transpose()?,
                etag: get_option_text(content, "ETag"),
                last_modified: get_option_text(content, "LastModified"),
            });
        }

        Ok(ListObjectsV2Response {
            name: get_text(&root, "Name")?,
            prefix,
            key_count,
            is_truncated,
            continuation_token: get_option_text(&root, "ContinuationToken")
                .filter(|v| !v.is_empty()),
            next_continuation_token: get_option_text(&root, "NextContinuationToken")
                .filter(|v| !v.is_empty()),
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>data</Name>
  <Prefix>people%2F</Prefix>
  <KeyCount>3</KeyCount>
  <MaxKeys>1000</MaxKeys>
  <EncodingType>url</EncodingType>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>tok-2</NextContinuationToken>
  <Contents><Key>people%2F</Key><Size>0</Size></Contents>
  <Contents><Key>people%2Fpart%201.csv</Key><Size>42</Size><ETag>"abc"</ETag></Contents>
  <Contents><Key>people%2Fpart-2.csv</Key><Size>7</Size></Contents>
</ListBucketResult>"#;

    #[test]
    fn test_parse_page() {
        let resp = ListObjectsV2Response::parse(Bytes::from(PAGE)).unwrap();
        assert_eq!(resp.name, "data");
        assert_eq!(resp.prefix.as_deref(), Some("people/"));
        assert_eq!(resp.key_count, Some(3));
        assert!(resp.is_truncated);
        assert_eq!(resp.next_continuation_token.as_deref(), Some("tok-2"));
        let names: Vec<&str> = resp.contents.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["people/", "people/part 1.csv", "people/part-2.csv"]);
        assert_eq!(resp.contents[1].size, Some(42));
    }

    #[test]
    fn test_parse_last_page() {
        let body = "<ListBucketResult><Name>data</Name><IsTruncated>false</IsTruncated>\
                    <NextContinuationToken></NextContinuationToken></ListBucketResult>";
        let resp = ListObjectsV2Response::parse(Bytes::from(body)).unwrap();
        assert!(!resp.is_truncated);
        assert!(resp.next_continuation_token.is_none());
        assert!(resp.contents.is_empty());
    }

    #[test]
    fn test_query() {
        let query = list_objects_v2_query("people/", Some("tok"), 1000);
        assert_eq!(query.get("list-type").map(String::as_str), Some("2"));
        assert_eq!(query.get("max-keys").map(String::as_str), Some("1000"));
        assert_eq!(
            query.get("continuation-token").map(String::as_str),
            Some("tok")
        );
        assert!(
            !list_objects_v2_query("", None, 10).contains_key("continuation-token")
        );
    }
}
