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

//! Conversion of declared schemas and typed rows to Arrow.

use crate::select::cast::TypedValue;
use crate::select::row::{RowCollection, TypedRow};
use crate::select::schema::{DeclaredSchema, Field, SemanticType};
use arrow::array::{
    ArrayRef, BooleanBuilder, Date32Builder, Decimal128Builder, Float32Builder, Float64Builder,
    Int8Builder, Int16Builder, Int32Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field as ArrowField, Schema, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::NaiveDate;
use std::sync::Arc;

pub fn to_arrow_type(data_type: &SemanticType) -> DataType {
    match data_type {
        SemanticType::String => DataType::Utf8,
        SemanticType::Byte => DataType::Int8,
        SemanticType::Short => DataType::Int16,
        SemanticType::Integer => DataType::Int32,
        SemanticType::Long => DataType::Int64,
        SemanticType::Float => DataType::Float32,
        SemanticType::Double => DataType::Float64,
        SemanticType::Boolean => DataType::Boolean,
        SemanticType::Decimal { precision, scale } => DataType::Decimal128(*precision, *scale as i8),
        SemanticType::Date => DataType::Date32,
        SemanticType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

pub fn to_arrow_schema(schema: &DeclaredSchema) -> SchemaRef {
    let fields: Vec<ArrowField> = schema
        .fields()
        .iter()
        .map(|f| ArrowField::new(&f.name, to_arrow_type(&f.data_type), f.nullable))
        .collect();
    Arc::new(Schema::new(fields))
}

fn mismatch(field: &Field, value: &TypedValue) -> ArrowError {
    ArrowError::InvalidArgumentError(format!(
        "column '{}' of type {} cannot hold {value:?}",
        field.name, field.data_type
    ))
}

macro_rules! build_array {
    ($builder:expr, $rows:expr, $index:expr, $field:expr, $($pattern:pat => $value:expr),+) => {{
        let mut builder = $builder;
        for row in $rows {
            match row.values.get($index) {
                Some(TypedValue::Null) => builder.append_null(),
                $(Some($pattern) => builder.append_value($value),)+
                Some(other) => return Err(mismatch($field, other)),
                None => {
                    return Err(ArrowError::InvalidArgumentError(format!(
                        "row has no value for column '{}'",
                        $field.name
                    )))
                }
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

fn build_column(rows: &[TypedRow], index: usize, field: &Field) -> Result<ArrayRef, ArrowError> {
    let n = rows.len();
    let array = match field.data_type {
        SemanticType::String => build_array!(
            StringBuilder::with_capacity(n, n * 16), rows, index, field,
            TypedValue::String(v) => v
        ),
        SemanticType::Byte => build_array!(
            Int8Builder::with_capacity(n), rows, index, field,
            TypedValue::Byte(v) => *v
        ),
        SemanticType::Short => build_array!(
            Int16Builder::with_capacity(n), rows, index, field,
            TypedValue::Short(v) => *v
        ),
        SemanticType::Integer => build_array!(
            Int32Builder::with_capacity(n), rows, index, field,
            TypedValue::Integer(v) => *v
        ),
        SemanticType::Long => build_array!(
            Int64Builder::with_capacity(n), rows, index, field,
            TypedValue::Long(v) => *v
        ),
        SemanticType::Float => build_array!(
            Float32Builder::with_capacity(n), rows, index, field,
            TypedValue::Float(v) => *v
        ),
        SemanticType::Double => build_array!(
            Float64Builder::with_capacity(n), rows, index, field,
            TypedValue::Double(v) => *v
        ),
        SemanticType::Boolean => build_array!(
            BooleanBuilder::with_capacity(n), rows, index, field,
            TypedValue::Boolean(v) => *v
        ),
        SemanticType::Decimal { precision, scale } => build_array!(
            Decimal128Builder::with_capacity(n).with_precision_and_scale(precision, scale as i8)?,
            rows, index, field,
            TypedValue::Decimal { unscaled, .. } => *unscaled
        ),
        SemanticType::Date => build_array!(
            Date32Builder::with_capacity(n), rows, index, field,
            TypedValue::Date(d) => d.signed_duration_since(NaiveDate::default()).num_days() as i32
        ),
        SemanticType::Timestamp => build_array!(
            TimestampMicrosecondBuilder::with_capacity(n), rows, index, field,
            TypedValue::Timestamp(ts) => ts.and_utc().timestamp_micros()
        ),
    };
    Ok(array)
}

/// Builds one batch holding every row of `rows`, columns in effective-schema order.
pub fn rows_to_record_batch(rows: &RowCollection) -> Result<RecordBatch, ArrowError> {
    let schema = to_arrow_schema(&rows.schema);
    let columns = rows
        .schema
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| build_column(&rows.rows, index, field))
        .collect::<Result<Vec<ArrayRef>, ArrowError>>()?;
    RecordBatch::try_new(schema, columns)
}

/// A batch without columns that only carries a row count, as needed by `COUNT(*)`.
pub fn row_count_batch(num_rows: usize) -> Result<RecordBatch, ArrowError> {
    RecordBatch::try_new_with_options(
        Arc::new(Schema::empty()),
        vec![],
        &RecordBatchOptions::new().with_row_count(Some(num_rows)),
    )
}
