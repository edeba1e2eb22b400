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

//! Various utility and helper functions

use crate::s3::error::Error;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use crc_fast::{CrcAlgorithm, Digest as CrcFastDigest};
use lazy_static::lazy_static;
use multimap::MultiMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use xmltree::Element;

/// Date and time with UTC timezone
pub type UtcTime = DateTime<Utc>;

/// Multimap for string key and string value
pub type Multimap = MultiMap<String, String>;

// Unreserved characters per RFC 3986 are left as-is.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const OBJECT_KEY_ENCODE_SET: &AsciiSet = &URI_ENCODE_SET.remove(b'/');

/// Encodes data using base64 algorithm
pub fn b64encode<T: AsRef<[u8]>>(input: T) -> String {
    BASE64.encode(input)
}

/// Computes CRC32 (ISO-HDLC) of given data.
pub fn crc32(data: &[u8]) -> u32 {
    let mut digest = CrcFastDigest::new(CrcAlgorithm::Crc32IsoHdlc);
    digest.update(data);
    digest.finalize() as u32
}

/// Converts the first four bytes of data into a big endian 32 bit unsigned int
pub fn uint32(data: &[u8]) -> Result<u32, Error> {
    match data.get(..4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(Error::InsufficientData(4, data.len() as u64)),
    }
}

/// Gets hex encoded SHA256 hash of given data
pub fn sha256_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Gets base64 encoded MD5 hash of given data
pub fn md5sum_hash(data: &[u8]) -> String {
    b64encode(md5::compute(data).as_slice())
}

/// Gets current UTC time
pub fn utc_now() -> UtcTime {
    chrono::offset::Utc::now()
}

/// Gets signer date value of given time
pub fn to_signer_date(time: UtcTime) -> String {
    time.format("%Y%m%d").to_string()
}

/// Gets AMZ date value of given time
pub fn to_amz_date(time: UtcTime) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// URI-encodes given string per AWS SigV4 rules
pub fn urlencode(s: &str) -> String {
    utf8_percent_encode(s, URI_ENCODE_SET).to_string()
}

/// URI-encodes object key, keeping '/' separators
pub fn urlencode_object_key(key: &str) -> String {
    utf8_percent_encode(key, OBJECT_KEY_ENCODE_SET).to_string()
}

/// Decodes URL encoded string
pub fn urldecode(s: &str) -> Result<String, Error> {
    urlencoding::decode(s)
        .map(|v| v.into_owned())
        .map_err(Error::Utf8)
}

/// Converts multimap to HTTP query string
pub fn to_query_string(map: &Multimap) -> String {
    get_canonical_query_string(map)
}

/// Converts multimap to canonical query string
pub fn get_canonical_query_string(map: &Multimap) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, values) in map.iter_all() {
        for value in values {
            pairs.push((urlencode(key), urlencode(value)));
        }
    }
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<String>>()
        .join("&")
}

/// Converts multimap to signed headers and canonical headers
pub fn get_canonical_headers(map: &Multimap) -> (String, String) {
    lazy_static! {
        static ref MULTI_SPACE_REGEX: Regex = Regex::new("( +)").unwrap();
    }
    let mut btmap: BTreeMap<String, String> = BTreeMap::new();

    for (k, values) in map.iter_all() {
        let key = k.to_lowercase();
        if "authorization" == key || "user-agent" == key {
            continue;
        }

        let mut vs = values.clone();
        vs.sort();

        let value = vs
            .iter()
            .map(|v| MULTI_SPACE_REGEX.replace_all(v, " ").trim().to_string())
            .collect::<Vec<String>>()
            .join(",");
        btmap.insert(key, value);
    }

    let signed_headers = btmap.keys().cloned().collect::<Vec<String>>().join(";");
    let canonical_headers = btmap
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<String>>()
        .join("\n");

    (signed_headers, canonical_headers)
}

/// Validates given bucket name
pub fn check_bucket_name(bucket_name: &str, strict: bool) -> Result<(), Error> {
    if bucket_name.trim().is_empty() {
        return Err(Error::InvalidBucketName(String::from(
            "bucket name cannot be empty",
        )));
    }

    if bucket_name.len() < 3 {
        return Err(Error::InvalidBucketName(String::from(
            "bucket name cannot be less than 3 characters",
        )));
    }

    if bucket_name.len() > 63 {
        return Err(Error::InvalidBucketName(String::from(
            "bucket name cannot be greater than 63 characters",
        )));
    }

    lazy_static! {
        static ref IPV4_REGEX: Regex = Regex::new(
            r"^((25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])$"
        )
        .unwrap();
        static ref VALID_BUCKET_NAME_REGEX: Regex =
            Regex::new("^[A-Za-z0-9][A-Za-z0-9\\.\\-_:]{1,61}[A-Za-z0-9]$").unwrap();
        static ref VALID_BUCKET_NAME_STRICT_REGEX: Regex =
            Regex::new("^[a-z0-9][a-z0-9\\.\\-]{1,61}[a-z0-9]$").unwrap();
    }

    if IPV4_REGEX.is_match(bucket_name) {
        return Err(Error::InvalidBucketName(String::from(
            "bucket name cannot be an IP address",
        )));
    }

    if bucket_name.contains("..") || bucket_name.contains(".-") || bucket_name.contains("-.") {
        return Err(Error::InvalidBucketName(String::from(
            "bucket name contains invalid successive characters '..', '.-' or '-.'",
        )));
    }

    if strict {
        if !VALID_BUCKET_NAME_STRICT_REGEX.is_match(bucket_name) {
            return Err(Error::InvalidBucketName(String::from(
                "bucket name does not follow S3 standards strictly",
            )));
        }
    } else if !VALID_BUCKET_NAME_REGEX.is_match(bucket_name) {
        return Err(Error::InvalidBucketName(String::from(
            "bucket name does not follow S3 standards",
        )));
    }

    Ok(())
}

/// Escapes text for embedding inside an XML element
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Gets text value of given XML element for given tag.
pub fn get_text(element: &Element, tag: &str) -> Result<String, Error> {
    Ok(element
        .get_child(tag)
        .ok_or(Error::Xml(format!("<{tag}> tag not found")))?
        .get_text()
        .ok_or(Error::Xml(format!("text of <{tag}> tag not found")))?
        .to_string())
}

/// Gets optional text value of given XML element for given tag.
pub fn get_option_text(element: &Element, tag: &str) -> Option<String> {
    element
        .get_child(tag)
        .map(|v| v.get_text().unwrap_or_default().to_string())
}

/// Gets default text value of given XML element for given tag.
pub fn get_default_text(element: &Element, tag: &str) -> String {
    get_option_text(element, tag).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_uint32() {
        assert_eq!(uint32(&[0, 0, 1, 2]).unwrap(), 258);
        assert!(matches!(
            uint32(&[0, 1]),
            Err(Error::InsufficientData(4, 2))
        ));
    }

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            sha256_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("a b/c~d"), "a%20b%2Fc~d");
        assert_eq!(urlencode_object_key("dir/a b.csv"), "dir/a%20b.csv");
        assert_eq!(urldecode("dir%2Fa%20b.csv").unwrap(), "dir/a b.csv");
    }

    #[test]
    fn test_canonical_query_string_sorted() {
        let mut query = Multimap::new();
        query.insert("prefix".into(), "logs/".into());
        query.insert("list-type".into(), "2".into());
        query.insert("continuation-token".into(), "a=b".into());
        assert_eq!(
            get_canonical_query_string(&query),
            "continuation-token=a%3Db&list-type=2&prefix=logs%2F"
        );
    }

    #[test]
    fn test_canonical_headers() {
        let mut headers = Multimap::new();
        headers.insert("X-Amz-Date".into(), "20250101T000000Z".into());
        headers.insert("Host".into(), "play.min.io".into());
        headers.insert("User-Agent".into(), "ignored".into());
        let (signed, canonical) = get_canonical_headers(&headers);
        assert_eq!(signed, "host;x-amz-date");
        assert_eq!(canonical, "host:play.min.io\nx-amz-date:20250101T000000Z");
    }

    #[test]
    fn test_check_bucket_name() {
        assert!(check_bucket_name("my-bucket", true).is_ok());
        assert!(check_bucket_name("ab", true).is_err());
        assert!(check_bucket_name("192.168.1.1", true).is_err());
        assert!(check_bucket_name("my..bucket", true).is_err());
        assert!(check_bucket_name("My_Bucket", true).is_err());
        assert!(check_bucket_name("My_Bucket", false).is_ok());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape("a < 'b' & c"),
            "a &lt; &apos;b&apos; &amp; c"
        );
    }
}
