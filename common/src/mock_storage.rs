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

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use minio_select::s3::error::{Error, ErrorResponse};
use minio_select::select::{ByteStream, ListPage, ListPageRequest, RemoteQuery, StorageClient};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
struct MockObject {
    body: String,
    delay: Option<Duration>,
    select_failure: Option<u16>,
}

/// In-memory bucket serving listings and canned select responses.
///
/// Select requests are not evaluated: every object answers with the body it was given,
/// split into chunks of `chunk_size` bytes. Continuation tokens are key offsets.
#[derive(Debug)]
pub struct MockStorage {
    bucket: String,
    objects: Mutex<BTreeMap<String, MockObject>>,
    chunk_size: usize,
    list_failure: Option<u16>,
    list_requests: Mutex<Vec<ListPageRequest>>,
    queries: Mutex<Vec<RemoteQuery>>,
    list_calls: AtomicUsize,
    select_calls: AtomicUsize,
}

impl MockStorage {
    pub fn new(bucket: &str) -> Self {
        MockStorage {
            bucket: bucket.to_string(),
            objects: Mutex::new(BTreeMap::new()),
            chunk_size: usize::MAX,
            list_failure: None,
            list_requests: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            select_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_object(self, key: &str, body: &str) -> Self {
        self.put_object(key, body);
        self
    }

    /// Adds `count` objects named `{prefix}{index:05}` with the same body.
    pub fn with_objects(self, prefix: &str, count: usize, body: &str) -> Self {
        for i in 0..count {
            self.put_object(&format!("{prefix}{i:05}"), body);
        }
        self
    }

    /// Delays the select response of `key`.
    pub fn with_delay(self, key: &str, delay: Duration) -> Self {
        self.update(key, |o| o.delay = Some(delay));
        self
    }

    /// Makes the select request of `key` fail with `status`.
    pub fn with_select_failure(self, key: &str, status: u16) -> Self {
        self.update(key, |o| o.select_failure = Some(status));
        self
    }

    pub fn with_list_failure(mut self, status: u16) -> Self {
        self.list_failure = Some(status);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn put_object(&self, key: &str, body: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            MockObject {
                body: body.to_string(),
                ..Default::default()
            },
        );
    }

    fn update(&self, key: &str, f: impl FnOnce(&mut MockObject)) {
        let mut objects = self.objects.lock().unwrap();
        f(objects.entry(key.to_string()).or_default());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    /// Total number of storage calls of any kind.
    pub fn calls(&self) -> usize {
        self.list_calls() + self.select_calls()
    }

    pub fn list_requests(&self) -> Vec<ListPageRequest> {
        self.list_requests.lock().unwrap().clone()
    }

    /// Select queries in the order they were received.
    pub fn queries(&self) -> Vec<RemoteQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn no_such_bucket(&self, bucket: &str) -> Error {
        Error::S3Error(ErrorResponse {
            code: "NoSuchBucket".into(),
            message: "The specified bucket does not exist".into(),
            bucket_name: bucket.to_string(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl StorageClient for MockStorage {
    async fn list_objects_page(&self, request: ListPageRequest) -> Result<ListPage, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_requests.lock().unwrap().push(request.clone());

        if let Some(status) = self.list_failure {
            return Err(Error::ServerError(status));
        }
        if request.bucket != self.bucket {
            return Err(self.no_such_bucket(&request.bucket));
        }

        let offset: usize = match &request.continuation_token {
            Some(token) => token.parse()?,
            None => 0,
        };
        let objects = self.objects.lock().unwrap();
        let matching: Vec<&String> = objects
            .keys()
            .filter(|k| k.starts_with(&request.prefix))
            .collect();

        let end = (offset + request.max_keys as usize).min(matching.len());
        let keys: Vec<String> = matching[offset.min(end)..end]
            .iter()
            .map(|k| k.to_string())
            .collect();
        let is_truncated = end < matching.len();

        Ok(ListPage {
            keys,
            next_continuation_token: is_truncated.then(|| end.to_string()),
            is_truncated,
        })
    }

    async fn select_object_content(&self, query: &RemoteQuery) -> Result<ByteStream, Error> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if query.bucket != self.bucket {
            return Err(self.no_such_bucket(&query.bucket));
        }
        let object = self.objects.lock().unwrap().get(&query.key).cloned();
        let Some(object) = object else {
            return Err(Error::S3Error(ErrorResponse {
                code: "NoSuchKey".into(),
                message: "The specified key does not exist.".into(),
                bucket_name: query.bucket.clone(),
                object_name: query.key.clone(),
                ..Default::default()
            }));
        };

        if let Some(delay) = object.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = object.select_failure {
            return Err(Error::ServerError(status));
        }

        let chunks: Vec<Result<Bytes, Error>> = object
            .body
            .as_bytes()
            .chunks(self.chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}
