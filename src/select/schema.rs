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

//! Declared schema of a relation and column pruning.
//!
//! The schema is always supplied by the caller; it is never inferred from object contents.

use crate::select::error::SelectError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Largest precision representable by the unscaled `i128` of a decimal value.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Semantic type of a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Decimal { precision: u8, scale: u8 },
    Date,
    Timestamp,
}

impl SemanticType {
    /// Returns true for the integral and floating point types.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Byte
                | SemanticType::Short
                | SemanticType::Integer
                | SemanticType::Long
                | SemanticType::Float
                | SemanticType::Double
                | SemanticType::Decimal { .. }
        )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemanticType::String => write!(f, "string"),
            SemanticType::Byte => write!(f, "byte"),
            SemanticType::Short => write!(f, "short"),
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Long => write!(f, "long"),
            SemanticType::Float => write!(f, "float"),
            SemanticType::Double => write!(f, "double"),
            SemanticType::Boolean => write!(f, "boolean"),
            SemanticType::Decimal { precision, scale } => {
                write!(f, "decimal({precision},{scale})")
            }
            SemanticType::Date => write!(f, "date"),
            SemanticType::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl FromStr for SemanticType {
    type Err = SelectError;

    /// Parses type names such as `int`, `string` or `decimal(10,2)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref DECIMAL_REGEX: Regex =
                Regex::new(r"^decimal\(\s*(\d+)\s*,\s*(\d+)\s*\)$").unwrap();
        }

        let name = s.trim().to_ascii_lowercase();
        let t = match name.as_str() {
            "string" | "varchar" | "text" => SemanticType::String,
            "byte" | "tinyint" => SemanticType::Byte,
            "short" | "smallint" => SemanticType::Short,
            "int" | "integer" => SemanticType::Integer,
            "long" | "bigint" => SemanticType::Long,
            "float" | "real" => SemanticType::Float,
            "double" => SemanticType::Double,
            "bool" | "boolean" => SemanticType::Boolean,
            "date" => SemanticType::Date,
            "timestamp" => SemanticType::Timestamp,
            "decimal" => SemanticType::Decimal {
                precision: 10,
                scale: 0,
            },
            _ => {
                let caps = DECIMAL_REGEX
                    .captures(&name)
                    .ok_or_else(|| SelectError::Config(format!("unknown type '{s}'")))?;
                let parse = |i: usize| {
                    caps[i]
                        .parse::<u8>()
                        .map_err(|e| SelectError::Config(format!("invalid type '{s}': {e}")))
                };
                SemanticType::Decimal {
                    precision: parse(1)?,
                    scale: parse(2)?,
                }
            }
        };

        if let SemanticType::Decimal { precision, scale } = t {
            if precision == 0 || precision > MAX_DECIMAL_PRECISION || scale > precision {
                return Err(SelectError::Config(format!(
                    "invalid decimal precision/scale in '{s}'"
                )));
            }
        }
        Ok(t)
    }
}

/// A named, typed column of a declared schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub data_type: SemanticType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: SemanticType, nullable: bool) -> Self {
        Field {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Ordered, non-empty list of fields with unique names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredSchema {
    fields: Vec<Field>,
}

impl DeclaredSchema {
    /// Validates and wraps the given fields.
    ///
    /// Fails with [`SelectError::Config`] when the list is empty, a name is empty or a name is
    /// repeated.
    pub fn new(fields: Vec<Field>) -> Result<Self, SelectError> {
        if fields.is_empty() {
            return Err(SelectError::Config("schema must have at least one field".into()));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.is_empty() {
                return Err(SelectError::Config("field name cannot be empty".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SelectError::Config(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        Ok(DeclaredSchema { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reduces the schema to the requested columns.
    ///
    /// The result keeps this schema's field order, not the order of `columns`, and repeated
    /// names collapse into one field. Any name missing from the schema fails with
    /// [`SelectError::UnknownColumn`]. An empty request gives an empty schema, which scans
    /// count rows without returning values.
    pub fn prune(&self, columns: &[&str]) -> Result<DeclaredSchema, SelectError> {
        let mut wanted = HashSet::with_capacity(columns.len());
        for column in columns {
            if self.index_of(column).is_none() {
                return Err(SelectError::UnknownColumn {
                    column: column.to_string(),
                });
            }
            wanted.insert(*column);
        }

        let fields: Vec<Field> = self
            .fields
            .iter()
            .filter(|f| wanted.contains(f.name.as_str()))
            .cloned()
            .collect();

        Ok(DeclaredSchema { fields })
    }
}

impl fmt::Display for DeclaredSchema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.data_type)?;
            if !field.nullable {
                f.write_str(" not null")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    fn people() -> DeclaredSchema {
        DeclaredSchema::new(vec![
            Field::new("id", SemanticType::Integer, false),
            Field::new("name", SemanticType::String, true),
            Field::new("score", SemanticType::Double, true),
            Field::new("joined", SemanticType::Date, true),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(matches!(
            DeclaredSchema::new(vec![]),
            Err(SelectError::Config(_))
        ));
        assert!(matches!(
            DeclaredSchema::new(vec![
                Field::new("a", SemanticType::Integer, true),
                Field::new("a", SemanticType::String, true),
            ]),
            Err(SelectError::Config(_))
        ));
        assert!(matches!(
            DeclaredSchema::new(vec![Field::new("", SemanticType::Integer, true)]),
            Err(SelectError::Config(_))
        ));
    }

    #[test]
    fn test_prune_keeps_declared_order() {
        let pruned = people().prune(&["joined", "id"]).unwrap();
        assert_eq!(pruned.names().collect::<Vec<_>>(), ["id", "joined"]);
    }

    #[test]
    fn test_prune_collapses_duplicates() {
        let pruned = people().prune(&["name", "name"]).unwrap();
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned.fields()[0], Field::new("name", SemanticType::String, true));
    }

    #[test]
    fn test_prune_to_nothing() {
        let pruned = people().prune(&[]).unwrap();
        assert!(pruned.is_empty());
        assert_eq!(pruned.to_string(), "");
    }

    #[test]
    fn test_prune_unknown_column() {
        match people().prune(&["id", "missing"]) {
            Err(SelectError::UnknownColumn { column }) => assert_eq!(column, "missing"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_semantic_type_from_str() {
        assert_eq!("INT".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("bigint".parse::<SemanticType>().unwrap(), SemanticType::Long);
        assert_eq!(
            "decimal(12, 3)".parse::<SemanticType>().unwrap(),
            SemanticType::Decimal {
                precision: 12,
                scale: 3
            }
        );
        assert!("decimal(2,5)".parse::<SemanticType>().is_err());
        assert!("decimal(39,0)".parse::<SemanticType>().is_err());
        assert!("uuid".parse::<SemanticType>().is_err());
    }

    quickcheck! {
        fn prop_prune_matches_restriction(mask: Vec<bool>) -> TestResult {
            let schema = people();
            let columns: Vec<&str> = schema
                .names()
                .zip(mask.iter().cycle())
                .filter(|(_, keep)| **keep)
                .map(|(name, _)| name)
                .collect();

            // Request in reverse order; output must still follow the schema.
            let mut requested = columns.clone();
            requested.reverse();
            let pruned = schema.prune(&requested).unwrap();
            TestResult::from_bool(
                pruned.len() == columns.len() && pruned.names().eq(columns.iter().copied()),
            )
        }

        fn prop_prune_unknown_fails(name: String) -> TestResult {
            let schema = people();
            if schema.index_of(&name).is_some() {
                return TestResult::discard();
            }
            TestResult::from_bool(matches!(
                schema.prune(&["id", name.as_str()]),
                Err(SelectError::UnknownColumn { .. })
            ))
        }
    }
}
