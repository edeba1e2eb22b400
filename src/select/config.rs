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

//! Storage connection options

use crate::select::error::SelectError;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use typed_builder::TypedBuilder;

pub const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";
pub const DEFAULT_REGION: &str = "us-east-1";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Endpoint, region and addressing style of the storage service.
///
/// # Examples
///
/// ```
/// use minio_select::select::StorageConfig;
///
/// let config = StorageConfig::builder()
///     .endpoint("http://localhost:9000")
///     .path_style_access(true)
///     .build();
/// assert_eq!(config.region, "us-east-1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, TypedBuilder)]
pub struct StorageConfig {
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    #[serde(default)]
    #[builder(default = false)]
    pub path_style_access: bool,

    #[serde(default = "default_endpoint")]
    #[builder(default = default_endpoint(), setter(into))]
    pub endpoint: String,

    #[serde(default = "default_region")]
    #[builder(default = default_region(), setter(into))]
    pub region: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::builder().build()
    }
}

impl StorageConfig {
    /// Reads `path_style_access`, `endpoint` and `region` from an options map; absent keys keep
    /// their defaults.
    pub fn from_options(options: &HashMap<String, String>) -> Result<StorageConfig, SelectError> {
        let mut config = StorageConfig::default();
        for (key, value) in options {
            match key.as_str() {
                "path_style_access" => {
                    config.path_style_access = value.parse::<bool>().map_err(|_| {
                        SelectError::Config(format!(
                            "path_style_access must be true or false, got '{value}'"
                        ))
                    })?
                }
                "endpoint" => {
                    if value.is_empty() {
                        return Err(SelectError::Config("endpoint cannot be empty".into()));
                    }
                    config.endpoint = value.clone();
                }
                "region" => config.region = value.clone(),
                _ => debug!("ignoring unrecognized storage option '{key}'"),
            }
        }
        Ok(config)
    }
}
