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

//! Construction of the per-object S3 Select request.
//!
//! The projection lists exactly the columns of the effective schema. Filters become the
//! `WHERE` clause; a filter that cannot be expressed fails the whole scan instead of being
//! dropped, because rows are not re-checked after the server returns them.
//!
//! # Translation rules
//!
//! - Columns are `s."name"`, or `s._N` (1-based declared position) for header-less CSV.
//! - Numeric and boolean columns are compared through `CAST(.. AS INT|FLOAT|DECIMAL|BOOL)`,
//!   dates compare as `YYYY-MM-DD` text, and timestamp columns only support null checks.
//! - For CSV input an empty field is null: `IS NULL` also matches `''` and casts go through
//!   `NULLIF(.., '')`.
//! - Null-safe equality with a value is `(<col> IS NOT NULL AND <col> = <value>)`, which is
//!   FALSE rather than UNKNOWN for a null field and so stays correct under `NOT`.
//! - String patterns become `LIKE .. ESCAPE '\'`.

use crate::s3::select_request::{CsvOutputSerialization, SelectRequest};
use crate::select::cast::DATE_FORMAT;
use crate::select::config::StorageConfig;
use crate::select::error::SelectError;
use crate::select::filter::{ComparisonOp, Filter, Literal};
use crate::select::params::{InputFormat, ScanParams};
use crate::select::schema::{DeclaredSchema, Field, SemanticType};
use chrono::NaiveDate;

/// Select request for a single object
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteQuery {
    pub bucket: String,
    pub key: String,
    pub expression: String,
    pub request: SelectRequest,
    pub region: String,
    pub path_style: bool,
}

/// Builds the [`RemoteQuery`] of every object of one scan.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    request: SelectRequest,
    region: String,
    path_style: bool,
}

impl QueryBuilder {
    /// Translates projection and filters once for the whole scan.
    ///
    /// `declared` resolves filter columns and positional references, `effective` is the
    /// projection. Fails with [`SelectError::QueryTranslation`] before any request is sent.
    pub fn new(
        declared: &DeclaredSchema,
        effective: &DeclaredSchema,
        filters: Option<&[Filter]>,
        params: &ScanParams,
        config: &StorageConfig,
    ) -> Result<QueryBuilder, SelectError> {
        let translator = Translator {
            schema: declared,
            named: params.has_column_names(),
            empty_is_null: params.format == InputFormat::Csv,
        };

        // A count-only scan still needs one column to make the server emit a record per row.
        let projected = if effective.is_empty() {
            declared.fields().get(..1).unwrap_or_default()
        } else {
            effective.fields()
        };
        let projection = projected
            .iter()
            .map(|f| translator.column_ref(&f.name).map(|(r, _)| r))
            .collect::<Result<Vec<String>, SelectError>>()?
            .join(", ");

        let mut expression = format!("SELECT {projection} FROM S3Object s");

        let conditions = filters
            .unwrap_or_default()
            .iter()
            .map(|f| translator.translate(f))
            .collect::<Result<Vec<String>, SelectError>>()?;
        if !conditions.is_empty() {
            expression.push_str(" WHERE ");
            expression.push_str(&conditions.join(" AND "));
        }

        let output = CsvOutputSerialization {
            field_delimiter: Some(','),
            record_delimiter: Some('\n'),
            ..Default::default()
        };
        let request = SelectRequest::new(&expression, params.input_serialization(), output)
            .map_err(|e| SelectError::translation(&expression, e.to_string()))?;

        Ok(QueryBuilder {
            request,
            region: config.region.clone(),
            path_style: config.path_style_access,
        })
    }

    /// The S3 Select SQL expression shared by every object of the scan.
    pub fn expression(&self) -> &str {
        &self.request.expr
    }

    pub fn build(&self, bucket: &str, key: &str) -> RemoteQuery {
        RemoteQuery {
            bucket: bucket.to_string(),
            key: key.to_string(),
            expression: self.request.expr.clone(),
            request: self.request.clone(),
            region: self.region.clone(),
            path_style: self.path_style,
        }
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn like_pattern(prefix: &str, value: &str, suffix: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    quote_string(&format!("{prefix}{escaped}{suffix}"))
}

struct Translator<'a> {
    schema: &'a DeclaredSchema,
    named: bool,
    empty_is_null: bool,
}

impl<'a> Translator<'a> {
    fn column_ref(&self, name: &str) -> Result<(String, &'a Field), SelectError> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| SelectError::UnknownColumn {
                column: name.to_string(),
            })?;
        let field = &self.schema.fields()[index];
        let reference = if self.named {
            format!("s.\"{}\"", name.replace('"', "\"\""))
        } else {
            format!("s._{}", index + 1)
        };
        Ok((reference, field))
    }

    fn translate(&self, filter: &Filter) -> Result<String, SelectError> {
        match filter {
            Filter::Comparison { column, op, value } => self
                .comparison(column, *op, value)
                .map_err(|reason| SelectError::translation(filter, reason)),
            Filter::And(l, r) => Ok(format!("({} AND {})", self.translate(l)?, self.translate(r)?)),
            Filter::Or(l, r) => Ok(format!("({} OR {})", self.translate(l)?, self.translate(r)?)),
            Filter::Not(inner) => Ok(format!("(NOT {})", self.translate(inner)?)),
        }
    }

    fn comparison(&self, column: &str, op: ComparisonOp, value: &Literal) -> Result<String, String> {
        let (reference, field) = self
            .column_ref(column)
            .map_err(|_| format!("column '{column}' is not in the schema"))?;

        match op {
            ComparisonOp::IsNull => Ok(self.null_check(&reference, true)),
            ComparisonOp::NotNull => Ok(self.null_check(&reference, false)),
            ComparisonOp::EqNullSafe if *value == Literal::Null => {
                Ok(self.null_check(&reference, true))
            }
            // Never UNKNOWN: a null field is FALSE, so the negation keeps it.
            ComparisonOp::EqNullSafe => {
                let present = if self.empty_is_null {
                    format!("{reference} IS NOT NULL AND {reference} <> ''")
                } else {
                    format!("{reference} IS NOT NULL")
                };
                Ok(format!(
                    "({present} AND {} = {})",
                    self.typed_ref(field, &reference)?,
                    render_literal(field, value)?
                ))
            }
            ComparisonOp::Eq
            | ComparisonOp::Lt
            | ComparisonOp::Lte
            | ComparisonOp::Gt
            | ComparisonOp::Gte => {
                let symbol = match op {
                    ComparisonOp::Lt => "<",
                    ComparisonOp::Lte => "<=",
                    ComparisonOp::Gt => ">",
                    ComparisonOp::Gte => ">=",
                    _ => "=",
                };
                Ok(format!(
                    "{} {symbol} {}",
                    self.typed_ref(field, &reference)?,
                    render_literal(field, value)?
                ))
            }
            ComparisonOp::In => {
                let Literal::List(values) = value else {
                    return Err("IN requires a list of values".into());
                };
                if values.is_empty() {
                    return Err("IN list is empty".into());
                }
                let rendered = values
                    .iter()
                    .map(|v| render_literal(field, v))
                    .collect::<Result<Vec<String>, String>>()?;
                Ok(format!(
                    "{} IN ({})",
                    self.typed_ref(field, &reference)?,
                    rendered.join(", ")
                ))
            }
            ComparisonOp::StartsWith | ComparisonOp::EndsWith | ComparisonOp::Contains => {
                if field.data_type != SemanticType::String {
                    return Err(format!(
                        "string pattern on {} column '{column}'",
                        field.data_type
                    ));
                }
                let Literal::String(s) = value else {
                    return Err(format!("pattern {value} is not a string"));
                };
                let pattern = match op {
                    ComparisonOp::StartsWith => like_pattern("", s, "%"),
                    ComparisonOp::EndsWith => like_pattern("%", s, ""),
                    _ => like_pattern("%", s, "%"),
                };
                Ok(format!("{reference} LIKE {pattern} ESCAPE '\\'"))
            }
        }
    }

    fn null_check(&self, reference: &str, is_null: bool) -> String {
        match (self.empty_is_null, is_null) {
            (true, true) => format!("({reference} IS NULL OR {reference} = '')"),
            (true, false) => format!("({reference} IS NOT NULL AND {reference} <> '')"),
            (false, true) => format!("{reference} IS NULL"),
            (false, false) => format!("{reference} IS NOT NULL"),
        }
    }

    /// Column reference as compared in SQL; CSV fields are text until cast, and an empty
    /// field casts as NULL.
    fn typed_ref(&self, field: &Field, reference: &str) -> Result<String, String> {
        let cast_to = match field.data_type {
            SemanticType::String | SemanticType::Date => return Ok(reference.to_string()),
            SemanticType::Byte
            | SemanticType::Short
            | SemanticType::Integer
            | SemanticType::Long => "INT",
            SemanticType::Float | SemanticType::Double => "FLOAT",
            SemanticType::Decimal { .. } => "DECIMAL",
            SemanticType::Boolean => "BOOL",
            SemanticType::Timestamp => {
                return Err(format!(
                    "comparisons on timestamp column '{}' are not supported",
                    field.name
                ));
            }
        };
        if self.empty_is_null {
            Ok(format!("CAST(NULLIF({reference}, '') AS {cast_to})"))
        } else {
            Ok(format!("CAST({reference} AS {cast_to})"))
        }
    }
}

fn render_literal(field: &Field, value: &Literal) -> Result<String, String> {
    let mismatch = || format!("{value} does not match {} column '{}'", field.data_type, field.name);

    match (&field.data_type, value) {
        (_, Literal::Null) => Err("comparison with NULL never matches".into()),
        (SemanticType::String, Literal::String(s)) => Ok(quote_string(s)),
        (
            SemanticType::Byte | SemanticType::Short | SemanticType::Integer | SemanticType::Long,
            Literal::Integer(v),
        ) => Ok(v.to_string()),
        (
            SemanticType::Float | SemanticType::Double | SemanticType::Decimal { .. },
            Literal::Integer(v),
        ) => Ok(v.to_string()),
        (
            SemanticType::Float | SemanticType::Double | SemanticType::Decimal { .. },
            Literal::Float(v),
        ) => {
            if v.is_finite() {
                Ok(v.to_string())
            } else {
                Err(format!("non-finite literal {v}"))
            }
        }
        (SemanticType::Decimal { .. }, Literal::Decimal { .. }) => Ok(value.to_string()),
        (SemanticType::Boolean, Literal::Boolean(b)) => {
            Ok(if *b { "TRUE" } else { "FALSE" }.to_string())
        }
        (SemanticType::Date, Literal::Date(d)) => Ok(quote_string(&d.format(DATE_FORMAT).to_string())),
        (SemanticType::Date, Literal::String(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(|d| quote_string(&d.format(DATE_FORMAT).to_string()))
            .map_err(|_| mismatch()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::select_request::{FileHeaderInfo, InputSerialization};
    use crate::select::filter::FilterBuilder;
    use std::collections::HashMap;

    fn schema() -> DeclaredSchema {
        DeclaredSchema::new(vec![
            Field::new("id", SemanticType::Integer, false),
            Field::new("name", SemanticType::String, true),
            Field::new("score", SemanticType::Double, true),
            Field::new("active", SemanticType::Boolean, true),
            Field::new("joined", SemanticType::Date, true),
            Field::new("seen", SemanticType::Timestamp, true),
        ])
        .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> ScanParams {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScanParams::from_map(&map).unwrap()
    }

    fn expression(columns: Option<&[&str]>, filters: &[Filter], params: &ScanParams) -> String {
        let declared = schema();
        let effective = match columns {
            Some(c) => declared.prune(c).unwrap(),
            None => declared.clone(),
        };
        QueryBuilder::new(
            &declared,
            &effective,
            Some(filters),
            params,
            &StorageConfig::default(),
        )
        .unwrap()
        .expression()
        .to_string()
    }

    fn translation_error(filter: Filter) -> String {
        let declared = schema();
        match QueryBuilder::new(
            &declared,
            &declared,
            Some(&[filter]),
            &ScanParams::default(),
            &StorageConfig::default(),
        ) {
            Err(SelectError::QueryTranslation { filter, .. }) => filter,
            other => panic!("expected translation error, got {other:?}"),
        }
    }

    #[test]
    fn test_projection_only() {
        let p = ScanParams::default();
        assert_eq!(
            expression(Some(&["name"]), &[], &p),
            r#"SELECT s."name" FROM S3Object s"#
        );
        assert_eq!(
            expression(Some(&["joined", "id"]), &[], &p),
            r#"SELECT s."id", s."joined" FROM S3Object s"#
        );
    }

    #[test]
    fn test_count_only_projects_first_column() {
        assert_eq!(
            expression(Some(&[]), &[FilterBuilder::column("score").gt(1)], &ScanParams::default()),
            "SELECT s.\"id\" FROM S3Object s WHERE CAST(NULLIF(s.\"score\", '') AS FLOAT) > 1"
        );
    }

    #[test]
    fn test_positional_projection_without_header() {
        let p = params(&[("header", "false")]);
        assert_eq!(
            expression(Some(&["name", "joined"]), &[], &p),
            "SELECT s._2, s._5 FROM S3Object s"
        );
    }

    #[test]
    fn test_absent_filters_select_everything() {
        let declared = schema();
        let builder = QueryBuilder::new(
            &declared,
            &declared,
            None,
            &ScanParams::default(),
            &StorageConfig::default(),
        )
        .unwrap();
        assert!(!builder.expression().contains("WHERE"));
    }

    #[test]
    fn test_comparisons() {
        let p = ScanParams::default();
        let e = expression(
            Some(&["id"]),
            &[
                FilterBuilder::column("id").gt(10),
                FilterBuilder::column("name").eq("O'Brien"),
                FilterBuilder::column("score").lte(2.5),
                FilterBuilder::column("active").eq(true),
                FilterBuilder::column("joined").gte(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
            ],
            &p,
        );
        assert_eq!(
            e,
            "SELECT s.\"id\" FROM S3Object s WHERE CAST(NULLIF(s.\"id\", '') AS INT) > 10 \
             AND s.\"name\" = 'O''Brien' AND CAST(NULLIF(s.\"score\", '') AS FLOAT) <= 2.5 \
             AND CAST(NULLIF(s.\"active\", '') AS BOOL) = TRUE AND s.\"joined\" >= '2024-01-31'"
        );
    }

    #[test]
    fn test_logical_and_null_checks() {
        let p = params(&[("header", "false")]);
        let filter = FilterBuilder::column("name")
            .is_null()
            .or(!FilterBuilder::column("id").is_in([1, 2, 3]));
        assert_eq!(
            expression(Some(&["id"]), &[filter], &p),
            "SELECT s._1 FROM S3Object s WHERE ((s._2 IS NULL OR s._2 = '') \
             OR (NOT CAST(NULLIF(s._1, '') AS INT) IN (1, 2, 3)))"
        );

        let p = params(&[("format", "json")]);
        assert_eq!(
            expression(Some(&["id"]), &[FilterBuilder::column("seen").is_not_null()], &p),
            "SELECT s.\"id\" FROM S3Object s WHERE s.\"seen\" IS NOT NULL"
        );
    }

    #[test]
    fn test_eq_null_safe() {
        let p = params(&[("format", "parquet")]);
        assert_eq!(
            expression(Some(&["id"]), &[FilterBuilder::column("name").eq_null_safe(None::<&str>)], &p),
            "SELECT s.\"id\" FROM S3Object s WHERE s.\"name\" IS NULL"
        );
        assert_eq!(
            expression(Some(&["id"]), &[FilterBuilder::column("id").eq_null_safe(7)], &p),
            "SELECT s.\"id\" FROM S3Object s WHERE (s.\"id\" IS NOT NULL AND CAST(s.\"id\" AS INT) = 7)"
        );
    }

    #[test]
    fn test_negated_eq_null_safe_keeps_nulls() {
        let p = params(&[("format", "parquet")]);
        assert_eq!(
            expression(None, &[!FilterBuilder::column("id").eq_null_safe(7)], &p),
            "SELECT s.\"id\", s.\"name\", s.\"score\", s.\"active\", s.\"joined\", s.\"seen\" \
             FROM S3Object s WHERE (NOT (s.\"id\" IS NOT NULL AND CAST(s.\"id\" AS INT) = 7))"
        );

        let p = ScanParams::default();
        assert_eq!(
            expression(Some(&["id"]), &[!FilterBuilder::column("name").eq_null_safe("bob")], &p),
            "SELECT s.\"id\" FROM S3Object s WHERE \
             (NOT (s.\"name\" IS NOT NULL AND s.\"name\" <> '' AND s.\"name\" = 'bob'))"
        );
    }

    #[test]
    fn test_csv_casts_treat_empty_as_null() {
        let p = ScanParams::default();
        assert_eq!(
            expression(Some(&["id"]), &[FilterBuilder::column("score").gt(5)], &p),
            "SELECT s.\"id\" FROM S3Object s WHERE CAST(NULLIF(s.\"score\", '') AS FLOAT) > 5"
        );

        let p = params(&[("format", "json")]);
        assert_eq!(
            expression(Some(&["id"]), &[FilterBuilder::column("score").gt(5)], &p),
            "SELECT s.\"id\" FROM S3Object s WHERE CAST(s.\"score\" AS FLOAT) > 5"
        );
    }

    #[test]
    fn test_like_escaping() {
        let p = ScanParams::default();
        let e = expression(
            Some(&["id"]),
            &[
                FilterBuilder::column("name").starts_with("50%_a"),
                FilterBuilder::column("name").ends_with("x\\y"),
                FilterBuilder::column("name").contains("it's"),
            ],
            &p,
        );
        assert_eq!(
            e,
            "SELECT s.\"id\" FROM S3Object s WHERE s.\"name\" LIKE '50\\%\\_a%' ESCAPE '\\' \
             AND s.\"name\" LIKE '%x\\\\y' ESCAPE '\\' AND s.\"name\" LIKE '%it''s%' ESCAPE '\\'"
        );
    }

    #[test]
    fn test_untranslatable_filters_fail() {
        assert_eq!(
            translation_error(FilterBuilder::column("seen").gt(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )),
            "seen > TIMESTAMP '2024-01-01 00:00:00'"
        );
        assert_eq!(
            translation_error(FilterBuilder::column("id").eq(None::<i32>)),
            "id = NULL"
        );
        assert_eq!(
            translation_error(FilterBuilder::column("id").is_in(Vec::<i32>::new())),
            "id IN ()"
        );
        assert_eq!(
            translation_error(FilterBuilder::column("id").starts_with("1")),
            "id starts with '1'"
        );
        assert_eq!(
            translation_error(FilterBuilder::column("id").eq("one")),
            "id = 'one'"
        );
        // Only the failing leaf is reported.
        assert_eq!(
            translation_error(
                FilterBuilder::column("id")
                    .eq(1)
                    .and(FilterBuilder::column("missing").eq(1))
            ),
            "missing = 1"
        );
    }

    #[test]
    fn test_build_per_object() {
        let declared = schema();
        let config = StorageConfig::builder()
            .region("eu-west-1")
            .path_style_access(true)
            .build();
        let builder = QueryBuilder::new(
            &declared,
            &declared.prune(&["name"]).unwrap(),
            Some(&[]),
            &ScanParams::default(),
            &config,
        )
        .unwrap();

        let q = builder.build("data", "people/part-1.csv");
        assert_eq!(q.bucket, "data");
        assert_eq!(q.key, "people/part-1.csv");
        assert_eq!(q.expression, r#"SELECT s."name" FROM S3Object s"#);
        assert_eq!(q.region, "eu-west-1");
        assert!(q.path_style);
        assert_eq!(q.request.csv_output.field_delimiter, Some(','));
        assert_eq!(q.request.csv_output.record_delimiter, Some('\n'));
        match &q.request.input {
            InputSerialization::Csv(c) => {
                assert_eq!(c.file_header_info, Some(FileHeaderInfo::USE))
            }
            other => panic!("unexpected input serialization: {other:?}"),
        }
        assert_eq!(builder.build("data", "people/part-2.csv").key, "people/part-2.csv");
    }
}
