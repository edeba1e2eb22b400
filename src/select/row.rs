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

//! Raw and typed rows of a scan

use crate::select::cast::{TypedValue, cast};
use crate::select::error::SelectError;
use crate::select::schema::DeclaredSchema;

/// One decoded response line, split into positional text fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number within the object's select response
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Splits `text` on commas; no quoting is recognized.
    pub fn from_line(line: u64, text: &str) -> Self {
        RawRecord {
            line,
            fields: text.split(',').map(str::to_string).collect(),
        }
    }

    /// Coerces every field to the type of the schema field at the same position.
    ///
    /// The record must have exactly one field per schema field.
    pub fn into_typed(self, schema: &DeclaredSchema, key: &str) -> Result<TypedRow, SelectError> {
        if self.fields.len() != schema.len() {
            return Err(SelectError::MalformedRecord {
                key: key.to_string(),
                line: self.line,
                expected: schema.len(),
                actual: self.fields.len(),
            });
        }

        let values = self
            .fields
            .iter()
            .zip(schema.fields())
            .map(|(text, field)| {
                cast(Some(text.as_str()), &field.data_type, field.nullable).map_err(|source| {
                    SelectError::Cast {
                        key: key.to_string(),
                        line: self.line,
                        field: field.name.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<TypedValue>, SelectError>>()?;

        Ok(TypedRow { values })
    }
}

/// A row whose values are positionally aligned with the effective schema.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedRow {
    pub values: Vec<TypedValue>,
}

impl TypedRow {
    pub fn new(values: Vec<TypedValue>) -> Self {
        TypedRow { values }
    }

    pub fn get(&self, index: usize) -> Option<&TypedValue> {
        self.values.get(index)
    }

    /// Canonical comma-delimited text of the row.
    pub fn to_line(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<String>>()
            .join(",")
    }
}

/// Result of a scan: all rows of all objects, with the schema they are aligned to.
///
/// Rows of one object keep their response order; there is no order across objects.
#[derive(Clone, Debug, PartialEq)]
pub struct RowCollection {
    pub schema: DeclaredSchema,
    pub rows: Vec<TypedRow>,
}

impl RowCollection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the named column, one per row; `None` for a row too short to hold it.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&TypedValue>>> {
        let index = self.schema.index_of(name)?;
        Some(self.rows.iter().map(|r| r.get(index)).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypedRow> {
        self.rows.iter()
    }
}

impl IntoIterator for RowCollection {
    type Item = TypedRow;
    type IntoIter = std::vec::IntoIter<TypedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
