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

use crate::s3::utils::check_bucket_name;
use crate::select::error::SelectError;
use std::fmt;
use std::str::FromStr;

/// Bucket and key prefix addressed by a relation, parsed from `s3://bucket/prefix*`.
///
/// `s3a://` and `s3n://` are accepted as aliases. A trailing `*` marks "every object under
/// this prefix" and is stripped; the rest of the prefix is used verbatim as the listing filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocationPointer {
    pub bucket: String,
    pub prefix: String,
}

impl LocationPointer {
    pub fn parse(uri: &str) -> Result<Self, SelectError> {
        let (scheme, remainder) = uri.split_once("://").ok_or_else(|| {
            SelectError::Config(format!("invalid location (missing '://'): {uri}"))
        })?;

        match scheme.to_ascii_lowercase().as_str() {
            "s3" | "s3a" | "s3n" => {}
            other => {
                return Err(SelectError::Config(format!(
                    "unsupported location scheme '{other}' in {uri}"
                )));
            }
        }

        let (bucket, key) = remainder.split_once('/').unwrap_or((remainder, ""));
        check_bucket_name(bucket, false)
            .map_err(|e| SelectError::Config(format!("invalid location {uri}: {e}")))?;

        let prefix = key.strip_suffix('*').unwrap_or(key);

        Ok(LocationPointer {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

impl FromStr for LocationPointer {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationPointer::parse(s)
    }
}

impl fmt::Display for LocationPointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wildcard() {
        let loc = LocationPointer::parse("s3://my-bucket/people/*").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.prefix, "people/");
        assert_eq!(loc.to_string(), "s3://my-bucket/people/");
    }

    #[test]
    fn test_parse_variants() {
        let loc: LocationPointer = "s3a://data/part-".parse().unwrap();
        assert_eq!(loc.prefix, "part-");

        let loc = LocationPointer::parse("s3n://data").unwrap();
        assert_eq!(loc.bucket, "data");
        assert_eq!(loc.prefix, "");

        let loc = LocationPointer::parse("s3://data/*").unwrap();
        assert_eq!(loc.prefix, "");
    }

    #[test]
    fn test_parse_errors() {
        for uri in ["my-bucket/people", "gs://bucket/x", "s3://", "s3://ab/x", "s3://a..b/x"] {
            assert!(
                matches!(LocationPointer::parse(uri), Err(SelectError::Config(_))),
                "{uri}"
            );
        }
    }
}
