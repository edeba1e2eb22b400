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

//! S3 client implementing [`StorageClient`]

use crate::s3::creds::Provider;
use crate::s3::error::{Error, ErrorResponse};
use crate::s3::event_stream::records_stream;
use crate::s3::http::{BaseUrl, Url};
use crate::s3::list_objects::{ListObjectsV2Response, list_objects_v2_query};
use crate::s3::signer::sign_v4_s3;
use crate::s3::utils::{Multimap, md5sum_hash, sha256_hash, to_amz_date, utc_now};
use crate::select::config::StorageConfig;
use crate::select::query::RemoteQuery;
use crate::select::storage::{ByteStream, ListPage, ListPageRequest, StorageClient};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use log::debug;

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const USER_AGENT: &str = concat!("minio-select/", env!("CARGO_PKG_VERSION"));

impl From<ListObjectsV2Response> for ListPage {
    fn from(resp: ListObjectsV2Response) -> Self {
        ListPage {
            keys: resp.contents.into_iter().map(|e| e.name).collect(),
            next_continuation_token: if resp.is_truncated {
                resp.next_continuation_token
            } else {
                None
            },
            is_truncated: resp.is_truncated,
        }
    }
}

/// Turns a non-2xx response into an error; bodies that are not an S3 error document
/// yield [`Error::ServerError`].
fn error_from_response(status: u16, body: Bytes, bucket: &str, object: Option<&str>) -> Error {
    if body.is_empty() {
        return Error::ServerError(status);
    }
    match ErrorResponse::parse(body) {
        Ok(mut resp) => {
            if resp.bucket_name.is_empty() {
                resp.bucket_name = bucket.to_string();
            }
            if resp.object_name.is_empty() {
                resp.object_name = object.unwrap_or_default().to_string();
            }
            Error::S3Error(resp)
        }
        Err(_) => Error::ServerError(status),
    }
}

/// Simple Storage Service (aka S3) client for listing and select requests.
///
/// Requests are signed with AWS Signature Version 4 when a credential provider is given and
/// sent anonymously otherwise.
#[derive(Debug)]
pub struct S3Client {
    base_url: BaseUrl,
    region: String,
    provider: Option<Box<dyn Provider + Send + Sync>>,
    http_client: reqwest::Client,
}

impl S3Client {
    /// Returns a client for the endpoint, region and addressing style of `config`.
    pub fn new(
        config: &StorageConfig,
        provider: Option<Box<dyn Provider + Send + Sync>>,
    ) -> Result<S3Client, Error> {
        let mut base_url: BaseUrl = config.endpoint.parse()?;
        base_url.virtual_style = !config.path_style_access;

        let http_client = reqwest::Client::builder()
            .no_gzip()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(S3Client {
            base_url,
            region: config.region.clone(),
            provider,
            http_client,
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn build_headers(
        &self,
        headers: &mut Multimap,
        query: &Multimap,
        region: &str,
        url: &Url,
        method: &Method,
        data: &[u8],
    ) {
        headers.insert("Host".into(), url.host_header_value());

        let sha256 = match *method {
            Method::PUT | Method::POST => {
                headers.insert("Content-Length".into(), data.len().to_string());
                headers.insert("Content-MD5".into(), md5sum_hash(data));
                sha256_hash(data)
            }
            _ => EMPTY_SHA256.to_string(),
        };

        let date = utc_now();
        headers.insert("x-amz-date".into(), to_amz_date(date));

        if let Some(provider) = &self.provider {
            let creds = provider.fetch();
            headers.insert("x-amz-content-sha256".into(), sha256.clone());
            if let Some(token) = creds.session_token {
                headers.insert("X-Amz-Security-Token".into(), token);
            }
            sign_v4_s3(
                method,
                &url.path,
                region,
                headers,
                query,
                &creds.access_key,
                &creds.secret_key,
                &sha256,
                date,
            );
        }
    }

    async fn execute(
        &self,
        method: Method,
        base_url: &BaseUrl,
        region: &str,
        query: Multimap,
        bucket: &str,
        object: Option<&str>,
        data: Option<Bytes>,
    ) -> Result<reqwest::Response, Error> {
        let body = data.unwrap_or_default();
        let url = base_url.build_url(&query, bucket, object);
        let mut headers = Multimap::new();
        self.build_headers(&mut headers, &query, region, &url, &method, &body);

        debug!("{method} {url}");
        let mut req = self.http_client.request(method.clone(), url.to_string());
        for (key, values) in headers.iter_all() {
            for value in values {
                req = req.header(key, value);
            }
        }
        if method == Method::PUT || method == Method::POST {
            req = req.body(body);
        }

        let resp = req.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Err(error_from_response(status, body, bucket, object))
    }
}

#[async_trait]
impl StorageClient for S3Client {
    async fn list_objects_page(&self, request: ListPageRequest) -> Result<ListPage, Error> {
        let query = list_objects_v2_query(
            &request.prefix,
            request.continuation_token.as_deref(),
            request.max_keys,
        );
        let resp = self
            .execute(
                Method::GET,
                &self.base_url,
                &self.region,
                query,
                &request.bucket,
                None,
                None,
            )
            .await?;

        let page = ListObjectsV2Response::parse(resp.bytes().await?)?;
        Ok(page.into())
    }

    async fn select_object_content(&self, query: &RemoteQuery) -> Result<ByteStream, Error> {
        let mut base_url = self.base_url.clone();
        base_url.virtual_style = !query.path_style;

        let mut params = Multimap::new();
        params.insert("select".into(), String::new());
        params.insert("select-type".into(), "2".into());

        let resp = self
            .execute(
                Method::POST,
                &base_url,
                &query.region,
                params,
                &query.bucket,
                Some(&query.key),
                Some(Bytes::from(query.request.to_xml())),
            )
            .await?;

        Ok(Box::pin(records_stream(resp.bytes_stream())))
    }
}
