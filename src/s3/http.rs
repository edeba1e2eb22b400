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

//! HTTP URL definitions

use crate::s3::error::Error;
use crate::s3::utils::{Multimap, to_query_string, urlencode_object_key};
use http::Uri;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug)]
/// Represents HTTP URL
pub struct Url {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Multimap,
}

impl Url {
    pub fn host_header_value(&self) -> String {
        if self.port > 0 {
            return format!("{}:{}", self.host, self.port);
        }
        self.host.clone()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.host.is_empty() {
            return Err(std::fmt::Error);
        }

        if self.https {
            f.write_str("https://")?;
        } else {
            f.write_str("http://")?;
        }

        f.write_str(&self.host_header_value())?;

        if !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;

        if !self.query.is_empty() {
            f.write_str("?")?;
            f.write_str(&to_query_string(&self.query))?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug)]
/// Base URL of S3 endpoint
pub struct BaseUrl {
    pub https: bool,
    host: String,
    port: u16,
    pub virtual_style: bool,
}

impl FromStr for BaseUrl {
    type Err = Error;

    /// Convert a string to a BaseUrl.
    ///
    /// # Examples
    ///
    /// ```
    /// use minio_select::s3::http::BaseUrl;
    ///
    /// let base_url: BaseUrl = "http://localhost:9000".parse().unwrap();
    /// let base_url: BaseUrl = "https://s3.amazonaws.com".parse().unwrap();
    /// ```
    fn from_str(s: &str) -> Result<Self, Error> {
        let url = s
            .parse::<Uri>()
            .map_err(|e| Error::InvalidBaseUrl(e.to_string()))?;

        let https = match url.scheme_str() {
            None | Some("https") => true,
            Some("http") => false,
            Some(_) => {
                return Err(Error::InvalidBaseUrl(
                    "scheme must be http or https".into(),
                ));
            }
        };

        let host = match url.host() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => {
                return Err(Error::InvalidBaseUrl(
                    "valid host must be provided".into(),
                ));
            }
        };

        let mut port = url.port_u16().unwrap_or(0);
        if (https && port == 443) || (!https && port == 80) {
            port = 0u16;
        }

        if url.path() != "/" && !url.path().is_empty() {
            return Err(Error::InvalidBaseUrl(
                "path must be empty for base URL".into(),
            ));
        }

        if url.query().is_some() {
            return Err(Error::InvalidBaseUrl(
                "query must be none for base URL".into(),
            ));
        }

        Ok(BaseUrl {
            https,
            host,
            port,
            virtual_style: true,
        })
    }
}

impl BaseUrl {
    /// Builds URL for given bucket, object and query parameters
    pub fn build_url(
        &self,
        query: &Multimap,
        bucket_name: &str,
        object_name: Option<&str>,
    ) -> Url {
        // Bucket names with '.' break TLS certificate validation in virtual host style.
        let enforce_path_style = bucket_name.contains('.') && self.https;

        let mut host = self.host.clone();
        let mut path = String::new();

        if enforce_path_style || !self.virtual_style {
            path.push('/');
            path.push_str(bucket_name);
        } else {
            host = format!("{bucket_name}.{}", self.host);
        }

        if let Some(v) = object_name {
            if !v.starts_with('/') {
                path.push('/');
            }
            path.push_str(&urlencode_object_key(v));
        }
        if path.is_empty() {
            path.push('/');
        }

        Url {
            https: self.https,
            host,
            port: self.port,
            path,
            query: query.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_parse() {
        let base: BaseUrl = "http://localhost:9000".parse().unwrap();
        assert!(!base.https);
        assert_eq!(base.port, 9000);

        let base: BaseUrl = "https://s3.amazonaws.com:443".parse().unwrap();
        assert!(base.https);
        assert_eq!(base.port, 0);

        assert!("ftp://localhost".parse::<BaseUrl>().is_err());
        assert!("http://localhost:9000/some/path".parse::<BaseUrl>().is_err());
    }

    #[test]
    fn test_build_url_path_style() {
        let mut base: BaseUrl = "http://localhost:9000".parse().unwrap();
        base.virtual_style = false;
        let mut query = Multimap::new();
        query.insert("select".into(), "".into());
        query.insert("select-type".into(), "2".into());

        let url = base.build_url(&query, "data", Some("dir/a b.csv"));
        assert_eq!(
            url.to_string(),
            "http://localhost:9000/data/dir/a%20b.csv?select=&select-type=2"
        );
    }

    #[test]
    fn test_build_url_virtual_style() {
        let base: BaseUrl = "https://s3.amazonaws.com".parse().unwrap();
        let url = base.build_url(&Multimap::new(), "data", None);
        assert_eq!(url.to_string(), "https://data.s3.amazonaws.com/");

        let url = base.build_url(&Multimap::new(), "my.data", Some("k.csv"));
        assert_eq!(url.to_string(), "https://s3.amazonaws.com/my.data/k.csv");
    }
}
