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

//! Paginated listing of the keys under a prefix

use crate::select::error::SelectError;
use crate::select::storage::{LIST_PAGE_SIZE, ListPageRequest, StorageClient};
use async_stream::try_stream;
use futures_util::Stream;
use log::{debug, warn};
use std::sync::Arc;

/// Lists every key under `prefix`, following continuation tokens page by page.
///
/// Nothing is requested until the stream is polled, and every call starts a fresh listing.
/// Folder markers (keys ending in `/`) are skipped. A failed page ends the stream with
/// [`SelectError::List`]; pages are not retried.
pub fn list_objects<C>(
    client: Arc<C>,
    bucket: String,
    prefix: String,
) -> impl Stream<Item = Result<String, SelectError>> + Send + 'static
where
    C: StorageClient + ?Sized + 'static,
{
    try_stream! {
        let mut continuation_token: Option<String> = None;
        let mut page_number = 0_u32;
        let mut total = 0_u64;

        loop {
            let request = ListPageRequest {
                bucket: bucket.clone(),
                prefix: prefix.clone(),
                continuation_token: continuation_token.take(),
                max_keys: LIST_PAGE_SIZE,
            };
            let page = client
                .list_objects_page(request)
                .await
                .map_err(|source| SelectError::List {
                    bucket: bucket.clone(),
                    prefix: prefix.clone(),
                    source,
                })?;
            page_number += 1;
            debug!(
                "listed page {page_number} of s3://{bucket}/{prefix}: {} keys, truncated: {}",
                page.keys.len(),
                page.is_truncated
            );

            for key in page.keys {
                if key.ends_with('/') {
                    warn!("skipping folder marker s3://{bucket}/{key}");
                    continue;
                }
                total += 1;
                yield key;
            }

            match page.next_continuation_token {
                Some(token) if !token.is_empty() => continuation_token = Some(token),
                _ => break,
            }
        }

        debug!("listing of s3://{bucket}/{prefix} done: {total} keys in {page_number} pages");
    }
}
