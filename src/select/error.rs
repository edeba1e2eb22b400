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

//! Error definitions for select scans.
//!
//! Every variant is terminal for the scan that raised it; nothing is retried inside the crate.

use crate::s3::error::Error as S3Error;
use crate::select::cast::CastError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    /// Missing or invalid schema, location, scan parameter or storage option
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("listing s3://{bucket}/{prefix} failed: {source}")]
    List {
        bucket: String,
        prefix: String,
        #[source]
        source: S3Error,
    },

    /// A filter that cannot be expressed in S3 Select SQL
    #[error("cannot push down filter {filter}: {reason}")]
    QueryTranslation { filter: String, reason: String },

    #[error("reading select response of '{key}' failed: {source}")]
    Stream {
        key: String,
        #[source]
        source: S3Error,
    },

    #[error("record {line} of '{key}' has {actual} fields, expected {expected}")]
    MalformedRecord {
        key: String,
        line: u64,
        expected: usize,
        actual: usize,
    },

    #[error("record {line} of '{key}', field '{field}': {source}")]
    Cast {
        key: String,
        line: u64,
        field: String,
        #[source]
        source: CastError,
    },

    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },
}

impl SelectError {
    pub(crate) fn translation(filter: impl ToString, reason: impl Into<String>) -> Self {
        SelectError::QueryTranslation {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}
