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

//! Select request types for S3 Select operations

use crate::s3::error::Error;
use crate::s3::utils::xml_escape;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Compression format of the input object
pub enum CompressionType {
    #[default]
    NONE,
    GZIP,
    BZIP2,
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompressionType::NONE => write!(f, "NONE"),
            CompressionType::GZIP => write!(f, "GZIP"),
            CompressionType::BZIP2 => write!(f, "BZIP2"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How the first line of a CSV object is treated
pub enum FileHeaderInfo {
    USE,
    IGNORE,
    NONE,
}

impl fmt::Display for FileHeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileHeaderInfo::USE => write!(f, "USE"),
            FileHeaderInfo::IGNORE => write!(f, "IGNORE"),
            FileHeaderInfo::NONE => write!(f, "NONE"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Layout of a JSON object
pub enum JsonType {
    DOCUMENT,
    LINES,
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JsonType::DOCUMENT => write!(f, "DOCUMENT"),
            JsonType::LINES => write!(f, "LINES"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// CSV input serialization definitions
pub struct CsvInputSerialization {
    pub compression_type: Option<CompressionType>,
    pub allow_quoted_record_delimiter: bool,
    pub comments: Option<char>,
    pub field_delimiter: Option<char>,
    pub file_header_info: Option<FileHeaderInfo>,
    pub quote_character: Option<char>,
    pub quote_escape_character: Option<char>,
    pub record_delimiter: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// JSON input serialization definitions
pub struct JsonInputSerialization {
    pub compression_type: Option<CompressionType>,
    pub json_type: Option<JsonType>,
}

#[derive(Clone, Debug, PartialEq)]
/// Input serialization of a select request
pub enum InputSerialization {
    Csv(CsvInputSerialization),
    Json(JsonInputSerialization),
    Parquet,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// CSV output serialization definitions
pub struct CsvOutputSerialization {
    pub field_delimiter: Option<char>,
    pub quote_character: Option<char>,
    pub quote_escape_character: Option<char>,
    pub record_delimiter: Option<char>,
}

#[derive(Clone, Debug, PartialEq)]
/// Body of a SelectObjectContent request
pub struct SelectRequest {
    pub expr: String,
    pub input: InputSerialization,
    pub csv_output: CsvOutputSerialization,
    pub request_progress: bool,
}

fn push_tag(data: &mut String, tag: &str, value: &str) {
    data.push('<');
    data.push_str(tag);
    data.push('>');
    data.push_str(&xml_escape(value));
    data.push_str("</");
    data.push_str(tag);
    data.push('>');
}

fn push_char_tag(data: &mut String, tag: &str, value: Option<char>) {
    if let Some(v) = value {
        push_tag(data, tag, v.encode_utf8(&mut [0u8; 4]));
    }
}

impl SelectRequest {
    pub fn new(
        expr: &str,
        input: InputSerialization,
        csv_output: CsvOutputSerialization,
    ) -> Result<SelectRequest, Error> {
        if expr.is_empty() {
            return Err(Error::InvalidSelectExpression(
                "select expression cannot be empty".into(),
            ));
        }

        Ok(SelectRequest {
            expr: expr.to_string(),
            input,
            csv_output,
            request_progress: false,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut data = String::from("<SelectObjectContentRequest>");

        push_tag(&mut data, "Expression", &self.expr);
        data.push_str("<ExpressionType>SQL</ExpressionType>");

        data.push_str("<InputSerialization>");
        match &self.input {
            InputSerialization::Csv(c) => {
                if let Some(v) = &c.compression_type {
                    push_tag(&mut data, "CompressionType", &v.to_string());
                }
                data.push_str("<CSV>");
                if c.allow_quoted_record_delimiter {
                    data.push_str("<AllowQuotedRecordDelimiter>true</AllowQuotedRecordDelimiter>");
                }
                push_char_tag(&mut data, "Comments", c.comments);
                push_char_tag(&mut data, "FieldDelimiter", c.field_delimiter);
                if let Some(v) = &c.file_header_info {
                    push_tag(&mut data, "FileHeaderInfo", &v.to_string());
                }
                push_char_tag(&mut data, "QuoteCharacter", c.quote_character);
                push_char_tag(&mut data, "QuoteEscapeCharacter", c.quote_escape_character);
                if let Some(v) = &c.record_delimiter {
                    push_tag(&mut data, "RecordDelimiter", v);
                }
                data.push_str("</CSV>");
            }
            InputSerialization::Json(j) => {
                if let Some(v) = &j.compression_type {
                    push_tag(&mut data, "CompressionType", &v.to_string());
                }
                data.push_str("<JSON>");
                if let Some(v) = &j.json_type {
                    push_tag(&mut data, "Type", &v.to_string());
                }
                data.push_str("</JSON>");
            }
            InputSerialization::Parquet => data.push_str("<Parquet></Parquet>"),
        }
        data.push_str("</InputSerialization>");

        data.push_str("<OutputSerialization><CSV>");
        let c = &self.csv_output;
        push_char_tag(&mut data, "FieldDelimiter", c.field_delimiter);
        push_char_tag(&mut data, "QuoteCharacter", c.quote_character);
        push_char_tag(&mut data, "QuoteEscapeCharacter", c.quote_escape_character);
        push_char_tag(&mut data, "RecordDelimiter", c.record_delimiter);
        data.push_str("</CSV></OutputSerialization>");

        if self.request_progress {
            data.push_str("<RequestProgress><Enabled>true</Enabled></RequestProgress>");
        }

        data.push_str("</SelectObjectContentRequest>");
        data
    }
}
