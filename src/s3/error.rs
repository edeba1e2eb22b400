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

//! Error definitions for S3 transport operations

use crate::s3::utils::get_default_text;
use bytes::{Buf, Bytes};
use thiserror::Error;
use xmltree::Element;

#[derive(Clone, Debug, Default, PartialEq)]
/// Error response returned by the server for a failed S3 request
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub resource: String,
    pub request_id: String,
    pub host_id: String,
    pub bucket_name: String,
    pub object_name: String,
}

impl ErrorResponse {
    pub fn parse(body: Bytes) -> Result<ErrorResponse, Error> {
        let root = Element::parse(body.reader())?;

        Ok(ErrorResponse {
            code: get_default_text(&root, "Code"),
            message: get_default_text(&root, "Message"),
            resource: get_default_text(&root, "Resource"),
            request_id: get_default_text(&root, "RequestId"),
            host_id: get_default_text(&root, "HostId"),
            bucket_name: get_default_text(&root, "BucketName"),
            object_name: get_default_text(&root, "Key"),
        })
    }
}

/// Error definitions
#[derive(Debug, Error)]
pub enum Error {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("xml parse error: {0}")]
    XmlParse(#[from] xmltree::ParseError),

    #[error("{0}")]
    Xml(String),

    #[error("invalid utf-8 data: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid integer: {0}")]
    Int(#[from] std::num::ParseIntError),

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid bucket name: {0}")]
    InvalidBucketName(String),

    #[error(
        "s3 operation failed; code: {}, message: {}, resource: {}, request_id: {}, host_id: {}, bucket_name: {}, object_name: {}",
        .0.code, .0.message, .0.resource, .0.request_id, .0.host_id, .0.bucket_name, .0.object_name
    )]
    S3Error(ErrorResponse),

    #[error("server failed with HTTP status code {0}")]
    ServerError(u16),

    #[error("not enough data in the stream; expected: {0}, got: {1} bytes")]
    InsufficientData(u64, u64),

    #[error("invalid header value type {0}")]
    InvalidHeaderValueType(u8),

    #[error("{0} CRC mismatch; expected: {1}, got: {2}")]
    CrcMismatch(String, u32, u32),

    #[error("unknown event type {0}")]
    UnknownEventType(String),

    #[error("invalid event stream message: {0}")]
    InvalidMessage(String),

    #[error("select response ended without an End event")]
    MissingEndEvent,

    #[error("error code: {0}, error message: {1}")]
    SelectError(String, String),

    #[error("invalid select expression: {0}")]
    InvalidSelectExpression(String),
}
