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

//! Input format directives of a relation, parsed from a string map.
//!
//! | key | values | default |
//! | --- | --- | --- |
//! | `format` | `csv`, `json`, `parquet` | `csv` |
//! | `header` | `true`, `false` | `true` |
//! | `delimiter` | one character | `,` |
//! | `quote` | one character | server default |
//! | `escape` | one character | server default |
//! | `comment` | one character | none |
//! | `recordDelimiter` | one or two characters | `\n` |
//! | `compression` | `none`, `gzip`, `bzip2` | `none` |
//! | `multiline` | `true` (JSON `DOCUMENT`), `false` (JSON `LINES`) | `false` |
//!
//! Keys are matched case-insensitively. Control characters may be written escaped (`\t`).

use crate::s3::select_request::{
    CompressionType, CsvInputSerialization, FileHeaderInfo, InputSerialization,
    JsonInputSerialization, JsonType,
};
use crate::select::error::SelectError;
use log::debug;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    #[default]
    Csv,
    Json,
    Parquet,
}

/// Scan parameters of a relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanParams {
    pub format: InputFormat,
    pub header: bool,
    pub delimiter: Option<char>,
    pub quote: Option<char>,
    pub escape: Option<char>,
    pub comment: Option<char>,
    pub record_delimiter: Option<String>,
    pub compression: CompressionType,
    pub multiline: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        ScanParams {
            format: InputFormat::Csv,
            header: true,
            delimiter: None,
            quote: None,
            escape: None,
            comment: None,
            record_delimiter: None,
            compression: CompressionType::NONE,
            multiline: false,
        }
    }
}

fn unescape(value: &str) -> String {
    match value {
        "\\t" => "\t".to_string(),
        "\\n" => "\n".to_string(),
        "\\r" => "\r".to_string(),
        "\\r\\n" => "\r\n".to_string(),
        _ => value.to_string(),
    }
}

fn parse_char(key: &str, value: &str) -> Result<char, SelectError> {
    let value = unescape(value);
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SelectError::Config(format!(
            "'{key}' must be a single character, got '{value}'"
        ))),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SelectError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(SelectError::Config(format!(
            "'{key}' must be true or false, got '{value}'"
        )))
    }
}

impl ScanParams {
    /// Parses the recognized keys of `params`; unknown keys are ignored.
    pub fn from_map(params: &HashMap<String, String>) -> Result<ScanParams, SelectError> {
        let mut out = ScanParams::default();

        for (key, value) in params {
            match key.to_ascii_lowercase().as_str() {
                "format" => {
                    out.format = match value.to_ascii_lowercase().as_str() {
                        "csv" => InputFormat::Csv,
                        "json" => InputFormat::Json,
                        "parquet" => InputFormat::Parquet,
                        _ => {
                            return Err(SelectError::Config(format!(
                                "unsupported format '{value}'"
                            )));
                        }
                    }
                }
                "header" => out.header = parse_bool(key, value)?,
                "delimiter" => out.delimiter = Some(parse_char(key, value)?),
                "quote" => out.quote = Some(parse_char(key, value)?),
                "escape" => out.escape = Some(parse_char(key, value)?),
                "comment" => out.comment = Some(parse_char(key, value)?),
                "recorddelimiter" => {
                    let v = unescape(value);
                    if v.is_empty() || v.chars().count() > 2 {
                        return Err(SelectError::Config(format!(
                            "'{key}' must be one or two characters, got '{value}'"
                        )));
                    }
                    out.record_delimiter = Some(v);
                }
                "compression" => {
                    out.compression = match value.to_ascii_lowercase().as_str() {
                        "none" | "" => CompressionType::NONE,
                        "gzip" => CompressionType::GZIP,
                        "bzip2" => CompressionType::BZIP2,
                        _ => {
                            return Err(SelectError::Config(format!(
                                "unsupported compression '{value}'"
                            )));
                        }
                    }
                }
                "multiline" => out.multiline = parse_bool(key, value)?,
                _ => debug!("ignoring unrecognized scan parameter '{key}'"),
            }
        }

        Ok(out)
    }

    /// True when the server can address columns by name, false for header-less CSV where
    /// columns are positional.
    pub fn has_column_names(&self) -> bool {
        !(self.format == InputFormat::Csv && !self.header)
    }

    /// Input serialization of the select request.
    pub fn input_serialization(&self) -> InputSerialization {
        let compression_type = match self.compression {
            CompressionType::NONE => None,
            c => Some(c),
        };

        match self.format {
            InputFormat::Csv => InputSerialization::Csv(CsvInputSerialization {
                compression_type,
                allow_quoted_record_delimiter: false,
                comments: self.comment,
                field_delimiter: self.delimiter,
                file_header_info: Some(if self.header {
                    FileHeaderInfo::USE
                } else {
                    FileHeaderInfo::NONE
                }),
                quote_character: self.quote,
                quote_escape_character: self.escape,
                record_delimiter: self.record_delimiter.clone(),
            }),
            InputFormat::Json => InputSerialization::Json(JsonInputSerialization {
                compression_type,
                json_type: Some(if self.multiline {
                    JsonType::DOCUMENT
                } else {
                    JsonType::LINES
                }),
            }),
            InputFormat::Parquet => InputSerialization::Parquet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let params = ScanParams::from_map(&HashMap::new()).unwrap();
        assert_eq!(params, ScanParams::default());
        assert!(params.has_column_names());
        match params.input_serialization() {
            InputSerialization::Csv(c) => {
                assert_eq!(c.file_header_info, Some(FileHeaderInfo::USE));
                assert_eq!(c.compression_type, None);
            }
            other => panic!("unexpected input serialization: {other:?}"),
        }
    }

    #[test]
    fn test_csv_options() {
        let params = ScanParams::from_map(&map(&[
            ("header", "FALSE"),
            ("delimiter", "\\t"),
            ("recordDelimiter", "\\r\\n"),
            ("compression", "gzip"),
            ("comment", "#"),
            ("someOtherOption", "ignored"),
        ]))
        .unwrap();
        assert!(!params.header);
        assert!(!params.has_column_names());
        assert_eq!(params.delimiter, Some('\t'));
        assert_eq!(params.record_delimiter.as_deref(), Some("\r\n"));

        match params.input_serialization() {
            InputSerialization::Csv(c) => {
                assert_eq!(c.file_header_info, Some(FileHeaderInfo::NONE));
                assert_eq!(c.compression_type, Some(CompressionType::GZIP));
                assert_eq!(c.comments, Some('#'));
            }
            other => panic!("unexpected input serialization: {other:?}"),
        }
    }

    #[test]
    fn test_json_and_parquet() {
        let params =
            ScanParams::from_map(&map(&[("format", "JSON"), ("multiline", "true")])).unwrap();
        assert!(params.has_column_names());
        assert_eq!(
            params.input_serialization(),
            InputSerialization::Json(JsonInputSerialization {
                compression_type: None,
                json_type: Some(JsonType::DOCUMENT),
            })
        );

        let params = ScanParams::from_map(&map(&[("format", "parquet")])).unwrap();
        assert_eq!(params.input_serialization(), InputSerialization::Parquet);
    }

    #[test]
    fn test_invalid_values() {
        for pairs in [
            [("format", "avro")],
            [("header", "yes")],
            [("delimiter", ";;")],
            [("compression", "zstd")],
            [("recordDelimiter", "")],
        ] {
            assert!(
                matches!(ScanParams::from_map(&map(&pairs)), Err(SelectError::Config(_))),
                "{pairs:?}"
            );
        }
    }
}
