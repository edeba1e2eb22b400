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

//! Storage collaborator used by the select pipeline.
//!
//! The pipeline never builds HTTP requests itself; it lists keys and runs select queries through
//! a [`StorageClient`]. [`crate::s3::S3Client`] is the production implementation; tests use an
//! in-memory one.

use crate::s3::error::Error;
use crate::select::query::RemoteQuery;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;

/// Page size of every listing request.
pub const LIST_PAGE_SIZE: u16 = 1000;

/// Record bytes of a select response, already stripped of event-stream framing.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// One page request of a bucket listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListPageRequest {
    pub bucket: String,
    pub prefix: String,
    pub continuation_token: Option<String>,
    pub max_keys: u16,
}

/// One page of a bucket listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Token for the next page; `None` on the last page.
    pub next_continuation_token: Option<String>,
    pub is_truncated: bool,
}

/// Listing and select access to object storage.
///
/// Implementations are shared across concurrent object fetches and scans, hence `Send + Sync`.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn list_objects_page(&self, request: ListPageRequest) -> Result<ListPage, Error>;

    /// Runs `query` and returns the record payload as it arrives.
    async fn select_object_content(&self, query: &RemoteQuery) -> Result<ByteStream, Error>;
}
