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

//! Row filter expressions for select pushdown.
//!
//! Filters are built with a fluent API and handed to [`Relation::scan`], which translates them
//! into the `WHERE` clause of every S3 Select request. A slice of filters is combined with AND.
//!
//! # Example
//!
//! ```
//! use minio_select::select::filter::FilterBuilder;
//!
//! // Build: age >= 18 AND status = 'active'
//! let filter = FilterBuilder::column("age")
//!     .gte(18)
//!     .and(FilterBuilder::column("status").eq("active"));
//!
//! assert_eq!(filter.to_string(), "(age >= 18 AND status = 'active')");
//! ```
//!
//! [`Relation::scan`]: crate::select::Relation::scan

use crate::select::cast::{DATE_FORMAT, TIMESTAMP_FORMAT, format_decimal};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::ops::Not;

/// Comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal to
    Eq,
    /// Equal to, where two nulls compare equal
    EqNullSafe,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// String starts with (LIKE 'prefix%')
    StartsWith,
    /// String ends with (LIKE '%suffix')
    EndsWith,
    /// String contains substring (LIKE '%middle%')
    Contains,
    /// Value is contained in set
    In,
    /// Is null
    IsNull,
    /// Is not null
    NotNull,
}

impl ComparisonOp {
    fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::EqNullSafe => "<=>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::StartsWith => "starts with",
            ComparisonOp::EndsWith => "ends with",
            ComparisonOp::Contains => "contains",
            ComparisonOp::In => "IN",
            ComparisonOp::IsNull => "IS NULL",
            ComparisonOp::NotNull => "IS NOT NULL",
        }
    }
}

/// Literal operand of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal { unscaled: i128, scale: u8 },
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    /// Operand list of an IN filter
    List(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Boolean(v) => write!(f, "{v}"),
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Decimal { unscaled, scale } => {
                f.write_str(&format_decimal(*unscaled, *scale))
            }
            Literal::String(v) => write!(f, "'{v}'"),
            Literal::Date(v) => write!(f, "DATE '{}'", v.format(DATE_FORMAT)),
            Literal::Timestamp(v) => write!(f, "TIMESTAMP '{}'", v.format(TIMESTAMP_FORMAT)),
            Literal::List(values) => {
                f.write_str("(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

macro_rules! literal_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Literal {
                fn from(v: $t) -> Self {
                    Literal::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

literal_from!(Integer, i64, i8, i16, i32, i64, u8, u16, u32);
literal_from!(Float, f64, f32, f64);
literal_from!(Boolean, bool, bool);
literal_from!(String, String, &str, String);
literal_from!(Date, NaiveDate, NaiveDate);
literal_from!(Timestamp, NaiveDateTime, NaiveDateTime);

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(v: Option<T>) -> Self {
        v.map_or(Literal::Null, Into::into)
    }
}

/// Filter expression over the columns of a relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Comparison: column op value
    Comparison {
        column: String,
        op: ComparisonOp,
        value: Literal,
    },
    /// Logical AND of two filters
    And(Box<Filter>, Box<Filter>),
    /// Logical OR of two filters
    Or(Box<Filter>, Box<Filter>),
    /// Logical NOT of a filter
    Not(Box<Filter>),
}

impl Filter {
    /// Combines this filter with another using AND.
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Combines this filter with another using OR.
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Names of all columns referenced by this filter, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Filter::Comparison { column, .. } => out.push(column),
            Filter::And(l, r) | Filter::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Filter::Not(inner) => inner.collect_columns(out),
        }
    }
}

impl Not for Filter {
    type Output = Filter;

    /// Negates this filter using the `!` operator.
    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Filter::Comparison { column, op, value } => match op {
                ComparisonOp::IsNull | ComparisonOp::NotNull => {
                    write!(f, "{column} {}", op.as_str())
                }
                _ => write!(f, "{column} {} {value}", op.as_str()),
            },
            Filter::And(l, r) => write!(f, "({l} AND {r})"),
            Filter::Or(l, r) => write!(f, "({l} OR {r})"),
            Filter::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

/// Fluent builder for constructing filter expressions.
pub struct FilterBuilder {
    column: String,
}

impl FilterBuilder {
    /// Starts building a filter for the given column.
    ///
    /// # Example
    ///
    /// ```
    /// use minio_select::select::filter::FilterBuilder;
    ///
    /// let filter = FilterBuilder::column("age").gte(18);
    /// ```
    pub fn column(name: impl Into<String>) -> Self {
        FilterBuilder {
            column: name.into(),
        }
    }

    fn comparison(self, op: ComparisonOp, value: Literal) -> Filter {
        Filter::Comparison {
            column: self.column,
            op,
            value,
        }
    }

    /// Creates an equality filter: column = value
    pub fn eq<V: Into<Literal>>(self, value: V) -> Filter {
        self.comparison(ComparisonOp::Eq, value.into())
    }

    /// Creates a null-safe equality filter: column <=> value
    pub fn eq_null_safe<V: Into<Literal>>(self, value: V) -> Filter {
        self.comparison(ComparisonOp::EqNullSafe, value.into())
    }

    /// Creates a not-equal filter: NOT (column = value)
    pub fn neq<V: Into<Literal>>(self, value: V) -> Filter {
        !self.eq(value)
    }

    /// Creates a less-than filter: column < value
    pub fn lt<V: Into<Literal>>(self, value: V) -> Filter {
        self.comparison(ComparisonOp::Lt, value.into())
    }

    /// Creates a less-than-or-equal filter: column <= value
    pub fn lte<V: Into<Literal>>(self, value: V) -> Filter {
        self.comparison(ComparisonOp::Lte, value.into())
    }

    /// Creates a greater-than filter: column > value
    pub fn gt<V: Into<Literal>>(self, value: V) -> Filter {
        self.comparison(ComparisonOp::Gt, value.into())
    }

    /// Creates a greater-than-or-equal filter: column >= value
    pub fn gte<V: Into<Literal>>(self, value: V) -> Filter {
        self.comparison(ComparisonOp::Gte, value.into())
    }

    /// Creates a "starts with" filter for string columns
    pub fn starts_with(self, value: impl Into<String>) -> Filter {
        self.comparison(ComparisonOp::StartsWith, Literal::String(value.into()))
    }

    /// Creates an "ends with" filter for string columns
    pub fn ends_with(self, value: impl Into<String>) -> Filter {
        self.comparison(ComparisonOp::EndsWith, Literal::String(value.into()))
    }

    /// Creates a "contains" filter for string columns
    pub fn contains(self, value: impl Into<String>) -> Filter {
        self.comparison(ComparisonOp::Contains, Literal::String(value.into()))
    }

    /// Creates an IN filter: column IN (values...)
    ///
    /// # Example
    ///
    /// ```
    /// use minio_select::select::filter::FilterBuilder;
    ///
    /// let filter = FilterBuilder::column("status").is_in(["active", "pending"]);
    /// ```
    pub fn is_in<I, V>(self, values: I) -> Filter
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.comparison(ComparisonOp::In, Literal::List(values))
    }

    /// Creates a NOT IN filter: NOT (column IN (values...))
    pub fn not_in<I, V>(self, values: I) -> Filter
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        !self.is_in(values)
    }

    /// Creates an IS NULL filter: column IS NULL
    pub fn is_null(self) -> Filter {
        self.comparison(ComparisonOp::IsNull, Literal::Null)
    }

    /// Creates an IS NOT NULL filter: column IS NOT NULL
    pub fn is_not_null(self) -> Filter {
        self.comparison(ComparisonOp::NotNull, Literal::Null)
    }

    /// Creates a BETWEEN filter: column >= lower AND column <= upper
    pub fn between<V: Into<Literal>>(self, lower: V, upper: V) -> Filter {
        let column = self.column.clone();
        self.gte(lower).and(FilterBuilder::column(column).lte(upper))
    }
}

/// Combines filters with AND; `None` for an empty list.
pub fn and_all(filters: Vec<Filter>) -> Option<Filter> {
    let mut iter = filters.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, f| acc.and(f)))
}

/// Combines filters with OR; `None` for an empty list.
pub fn or_all(filters: Vec<Filter>) -> Option<Filter> {
    let mut iter = filters.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, f| acc.or(f)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_comparisons() {
        let f = FilterBuilder::column("id").gt(10);
        assert_eq!(
            f,
            Filter::Comparison {
                column: "id".into(),
                op: ComparisonOp::Gt,
                value: Literal::Integer(10),
            }
        );
        assert_eq!(f.to_string(), "id > 10");
    }

    #[test]
    fn test_neq_and_not_in_are_negations() {
        assert!(matches!(FilterBuilder::column("a").neq(1), Filter::Not(_)));
        assert_eq!(
            FilterBuilder::column("a").not_in([1, 2]).to_string(),
            "(NOT a IN (1, 2))"
        );
    }

    #[test]
    fn test_between() {
        let f = FilterBuilder::column("age").between(18, 65);
        assert_eq!(f.to_string(), "(age >= 18 AND age <= 65)");
        assert_eq!(f.columns(), ["age", "age"]);
    }

    #[test]
    fn test_option_literal() {
        assert_eq!(Literal::from(None::<i32>), Literal::Null);
        assert_eq!(Literal::from(Some("x")), Literal::String("x".into()));
    }

    #[test]
    fn test_and_all_or_all() {
        assert!(and_all(vec![]).is_none());
        let f = and_all(vec![
            FilterBuilder::column("a").eq(1),
            FilterBuilder::column("b").is_null(),
            FilterBuilder::column("c").starts_with("x"),
        ])
        .unwrap();
        assert_eq!(f.to_string(), "((a = 1 AND b IS NULL) AND c starts with 'x')");

        let f = or_all(vec![
            FilterBuilder::column("a").eq(true),
            FilterBuilder::column("a").is_null(),
        ])
        .unwrap();
        assert_eq!(f.to_string(), "(a = true OR a IS NULL)");
    }
}
