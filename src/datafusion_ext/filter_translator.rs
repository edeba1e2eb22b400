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

//! Translator for converting DataFusion expressions to select filters.
//!
//! # Supported Expressions
//!
//! - `=`, `!=`, `<`, `<=`, `>`, `>=` between a column and a literal, in either order
//! - `IS NOT DISTINCT FROM` / `IS DISTINCT FROM`
//! - `IN` / `NOT IN` with literal lists
//! - `BETWEEN` / `NOT BETWEEN` with literal bounds
//! - `LIKE` / `NOT LIKE` with `abc`, `abc%`, `%abc` and `%abc%` patterns
//! - `IS NULL`, `IS NOT NULL`
//! - `AND`, `OR`, `NOT`
//!
//! Everything else (functions, casts, arithmetic, `ILIKE`, timestamps) is left to DataFusion.

use crate::select::filter::{Filter, FilterBuilder, Literal};
use chrono::{NaiveDate, TimeDelta};
use datafusion::logical_expr::expr::{Between, InList, Like};
use datafusion::logical_expr::{BinaryExpr, Expr, Operator};
use datafusion::scalar::ScalarValue;

/// Converts a DataFusion expression to a select filter.
///
/// Returns `None` if the expression has no filter counterpart.
///
/// # Example
///
/// ```ignore
/// use datafusion::logical_expr::{col, lit};
/// use minio_select::datafusion_ext::expr_to_filter;
///
/// // age > 18
/// let filter = expr_to_filter(&col("age").gt(lit(18))).unwrap();
/// ```
pub fn expr_to_filter(expr: &Expr) -> Option<Filter> {
    match expr {
        Expr::BinaryExpr(bin_expr) => translate_binary_expr(bin_expr),
        Expr::Not(inner) => expr_to_filter(inner).map(|f| !f),
        Expr::IsNull(inner) => column_name(inner).map(|c| FilterBuilder::column(c).is_null()),
        Expr::IsNotNull(inner) => {
            column_name(inner).map(|c| FilterBuilder::column(c).is_not_null())
        }
        Expr::InList(in_list) => translate_in_list(in_list),
        Expr::Between(between) => translate_between(between),
        Expr::Like(like) => translate_like(like),
        _ => None,
    }
}

fn translate_binary_expr(bin_expr: &BinaryExpr) -> Option<Filter> {
    match bin_expr.op {
        Operator::And => {
            let left = expr_to_filter(&bin_expr.left)?;
            let right = expr_to_filter(&bin_expr.right)?;
            Some(left.and(right))
        }
        Operator::Or => {
            let left = expr_to_filter(&bin_expr.left)?;
            let right = expr_to_filter(&bin_expr.right)?;
            Some(left.or(right))
        }
        op => translate_comparison(&bin_expr.left, op, &bin_expr.right).or_else(|| {
            translate_comparison(&bin_expr.right, flip(op)?, &bin_expr.left)
        }),
    }
}

/// Operator with its operands swapped: `5 < col` is `col > 5`.
fn flip(op: Operator) -> Option<Operator> {
    match op {
        Operator::Lt => Some(Operator::Gt),
        Operator::LtEq => Some(Operator::GtEq),
        Operator::Gt => Some(Operator::Lt),
        Operator::GtEq => Some(Operator::LtEq),
        Operator::Eq | Operator::NotEq | Operator::IsDistinctFrom | Operator::IsNotDistinctFrom => {
            Some(op)
        }
        _ => None,
    }
}

fn translate_comparison(col_expr: &Expr, op: Operator, value_expr: &Expr) -> Option<Filter> {
    let column = column_name(col_expr)?;
    let value = expr_to_literal(value_expr)?;
    let builder = FilterBuilder::column(column);

    match op {
        Operator::Eq => Some(builder.eq(value)),
        Operator::NotEq => Some(builder.neq(value)),
        Operator::Lt => Some(builder.lt(value)),
        Operator::LtEq => Some(builder.lte(value)),
        Operator::Gt => Some(builder.gt(value)),
        Operator::GtEq => Some(builder.gte(value)),
        Operator::IsNotDistinctFrom => Some(builder.eq_null_safe(value)),
        Operator::IsDistinctFrom => Some(!builder.eq_null_safe(value)),
        _ => None,
    }
}

fn translate_in_list(in_list: &InList) -> Option<Filter> {
    let column = column_name(&in_list.expr)?;
    let values = in_list
        .list
        .iter()
        .map(expr_to_literal)
        .collect::<Option<Vec<Literal>>>()?;

    let builder = FilterBuilder::column(column);
    Some(if in_list.negated {
        builder.not_in(values)
    } else {
        builder.is_in(values)
    })
}

fn translate_between(between: &Between) -> Option<Filter> {
    let column = column_name(&between.expr)?;
    let low = expr_to_literal(&between.low)?;
    let high = expr_to_literal(&between.high)?;

    let filter = FilterBuilder::column(column).between(low, high);
    Some(if between.negated { !filter } else { filter })
}

/// Handles the patterns that map onto a single string operator.
///
/// `_` wildcards, inner `%` and escapes are not translated.
fn translate_like(like: &Like) -> Option<Filter> {
    if like.case_insensitive || like.escape_char.is_some() {
        return None;
    }
    let column = column_name(&like.expr)?;
    let Literal::String(pattern) = expr_to_literal(&like.pattern)? else {
        return None;
    };
    if pattern.contains('_') {
        return None;
    }

    let builder = FilterBuilder::column(column);
    let leading = pattern.starts_with('%');
    let trailing = pattern.len() > 1 && pattern.ends_with('%');
    let start = usize::from(leading);
    let end = pattern.len() - usize::from(trailing);
    if start > end {
        return None;
    }
    let inner = &pattern[start..end];
    if inner.contains('%') || (inner.is_empty() && (leading || trailing)) {
        return None;
    }

    let filter = match (leading, trailing) {
        (false, false) => builder.eq(inner),
        (false, true) => builder.starts_with(inner),
        (true, false) => builder.ends_with(inner),
        (true, true) => builder.contains(inner),
    };
    Some(if like.negated { !filter } else { filter })
}

fn column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Column(col) => Some(col.name.clone()),
        _ => None,
    }
}

fn expr_to_literal(expr: &Expr) -> Option<Literal> {
    match expr {
        Expr::Literal(value, _) => scalar_to_literal(value),
        _ => None,
    }
}

/// Converts a non-null scalar to a literal.
///
/// Nulls are not comparable in a WHERE clause and yield `None`.
pub fn scalar_to_literal(value: &ScalarValue) -> Option<Literal> {
    match value {
        ScalarValue::Boolean(Some(v)) => Some(Literal::Boolean(*v)),
        ScalarValue::Int8(Some(v)) => Some(Literal::Integer(*v as i64)),
        ScalarValue::Int16(Some(v)) => Some(Literal::Integer(*v as i64)),
        ScalarValue::Int32(Some(v)) => Some(Literal::Integer(*v as i64)),
        ScalarValue::Int64(Some(v)) => Some(Literal::Integer(*v)),
        ScalarValue::UInt8(Some(v)) => Some(Literal::Integer(*v as i64)),
        ScalarValue::UInt16(Some(v)) => Some(Literal::Integer(*v as i64)),
        ScalarValue::UInt32(Some(v)) => Some(Literal::Integer(*v as i64)),
        ScalarValue::UInt64(Some(v)) => i64::try_from(*v).ok().map(Literal::Integer),
        ScalarValue::Float32(Some(v)) if v.is_finite() => Some(Literal::Float(*v as f64)),
        ScalarValue::Float64(Some(v)) if v.is_finite() => Some(Literal::Float(*v)),
        ScalarValue::Decimal128(Some(v), _, scale) => u8::try_from(*scale)
            .ok()
            .map(|scale| Literal::Decimal { unscaled: *v, scale }),
        ScalarValue::Utf8(Some(v))
        | ScalarValue::LargeUtf8(Some(v))
        | ScalarValue::Utf8View(Some(v)) => Some(Literal::String(v.clone())),
        ScalarValue::Date32(Some(days)) => NaiveDate::from_ymd_opt(1970, 1, 1)?
            .checked_add_signed(TimeDelta::try_days(*days as i64)?)
            .map(Literal::Date),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::logical_expr::{col, lit};

    fn translated(expr: Expr) -> String {
        expr_to_filter(&expr).unwrap().to_string()
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(translated(col("age").gt(lit(18))), "age > 18");
        assert_eq!(translated(lit(18).lt_eq(col("age"))), "age >= 18");
        assert_eq!(translated(col("name").eq(lit("bob"))), "name = 'bob'");
        assert_eq!(
            translated(col("a").eq(lit(1)).and(col("b").lt(lit(2.5)))),
            "(a = 1 AND b < 2.5)"
        );
    }

    #[test]
    fn test_null_checks_and_lists() {
        assert_eq!(translated(col("name").is_null()), "name IS NULL");
        assert_eq!(
            translated(col("id").in_list(vec![lit(1), lit(2)], false)),
            "id IN (1, 2)"
        );
        assert!(expr_to_filter(&col("id").in_list(vec![lit(1), col("x")], false)).is_none());
    }

    #[test]
    fn test_like_patterns() {
        assert_eq!(translated(col("c").like(lit("x%"))), "c starts with 'x'");
        assert!(expr_to_filter(&col("c").like(lit("%x%"))).is_some());
        assert!(expr_to_filter(&col("c").like(lit("a%b"))).is_none());
        assert!(expr_to_filter(&col("c").like(lit("a_"))).is_none());
        assert!(expr_to_filter(&col("c").like(lit("%"))).is_none());
        assert!(expr_to_filter(&col("c").ilike(lit("x%"))).is_none());
    }

    #[test]
    fn test_untranslatable() {
        assert!(expr_to_filter(&col("a").eq(col("b"))).is_none());
        assert!(expr_to_filter(&(col("a") + lit(1)).gt(lit(2))).is_none());
        assert!(expr_to_filter(&col("a").eq(lit(ScalarValue::Int32(None)))).is_none());
    }

    #[test]
    fn test_is_distinct_from_keeps_null_rows() {
        use crate::select::{
            DeclaredSchema, Field, InputFormat, QueryBuilder, ScanParams, SemanticType,
            StorageConfig,
        };
        use datafusion::logical_expr::Operator::IsDistinctFrom;
        use datafusion::logical_expr::binary_expr;

        let filter = expr_to_filter(&binary_expr(col("count"), IsDistinctFrom, lit(0))).unwrap();
        let schema =
            DeclaredSchema::new(vec![Field::new("count", SemanticType::Long, true)]).unwrap();
        let params = ScanParams {
            format: InputFormat::Parquet,
            ..Default::default()
        };
        let builder = QueryBuilder::new(
            &schema,
            &schema,
            Some(&[filter]),
            &params,
            &StorageConfig::default(),
        )
        .unwrap();

        // A null count is distinct from 0, so it must survive the server-side filter.
        assert_eq!(
            builder.expression(),
            "SELECT s.\"count\" FROM S3Object s \
             WHERE (NOT (s.\"count\" IS NOT NULL AND CAST(s.\"count\" AS INT) = 0))"
        );
    }

    #[test]
    fn test_scalar_to_literal() {
        assert_eq!(
            scalar_to_literal(&ScalarValue::Date32(Some(19_723))),
            Some(Literal::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );
        assert_eq!(
            scalar_to_literal(&ScalarValue::Decimal128(Some(1234), 10, 2)),
            Some(Literal::Decimal {
                unscaled: 1234,
                scale: 2
            })
        );
        assert_eq!(scalar_to_literal(&ScalarValue::UInt64(Some(u64::MAX))), None);
    }
}
