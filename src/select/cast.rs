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

//! Coercion of textual field values into typed values.

use crate::select::schema::{MAX_DECIMAL_PRECISION, SemanticType};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A field value coerced to its declared semantic type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    Null,
    String(String),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    /// Unscaled value; the represented number is `unscaled * 10^-scale`.
    Decimal { unscaled: i128, scale: u8 },
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }
}

/// Writes the canonical text form, the same form [`cast`] accepts. Null renders as empty text.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypedValue::Null => Ok(()),
            TypedValue::String(v) => f.write_str(v),
            TypedValue::Byte(v) => write!(f, "{v}"),
            TypedValue::Short(v) => write!(f, "{v}"),
            TypedValue::Integer(v) => write!(f, "{v}"),
            TypedValue::Long(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::Double(v) => write!(f, "{v}"),
            TypedValue::Boolean(v) => write!(f, "{v}"),
            TypedValue::Decimal { unscaled, scale } => {
                write!(f, "{}", format_decimal(*unscaled, *scale))
            }
            TypedValue::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            TypedValue::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
        }
    }
}

/// Field coercion failure
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CastError {
    #[error("cannot parse '{value}' as {target}")]
    Parse { value: String, target: SemanticType },

    #[error("missing value for non-nullable {target} field")]
    TypeMismatch { target: SemanticType },
}

/// Converts a textual value to `target`.
///
/// Missing or empty text is null for nullable fields and a [`CastError::TypeMismatch`]
/// otherwise, for every type including strings. The text is not trimmed.
pub fn cast(
    value: Option<&str>,
    target: &SemanticType,
    nullable: bool,
) -> Result<TypedValue, CastError> {
    let text = match value {
        Some(v) if !v.is_empty() => v,
        _ if nullable => return Ok(TypedValue::Null),
        _ => return Err(CastError::TypeMismatch { target: *target }),
    };

    let parse_err = || CastError::Parse {
        value: text.to_string(),
        target: *target,
    };

    Ok(match target {
        SemanticType::String => TypedValue::String(text.to_string()),
        SemanticType::Byte => TypedValue::Byte(text.parse().map_err(|_| parse_err())?),
        SemanticType::Short => TypedValue::Short(text.parse().map_err(|_| parse_err())?),
        SemanticType::Integer => TypedValue::Integer(text.parse().map_err(|_| parse_err())?),
        SemanticType::Long => TypedValue::Long(text.parse().map_err(|_| parse_err())?),
        SemanticType::Float => match text.parse::<f32>() {
            Ok(v) if v.is_finite() => TypedValue::Float(v),
            _ => return Err(parse_err()),
        },
        SemanticType::Double => match text.parse::<f64>() {
            Ok(v) if v.is_finite() => TypedValue::Double(v),
            _ => return Err(parse_err()),
        },
        SemanticType::Boolean => {
            if text.eq_ignore_ascii_case("true") {
                TypedValue::Boolean(true)
            } else if text.eq_ignore_ascii_case("false") {
                TypedValue::Boolean(false)
            } else {
                return Err(parse_err());
            }
        }
        SemanticType::Decimal { precision, scale } => TypedValue::Decimal {
            unscaled: parse_decimal(text, *precision, *scale).ok_or_else(parse_err)?,
            scale: *scale,
        },
        SemanticType::Date => TypedValue::Date(
            NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| parse_err())?,
        ),
        SemanticType::Timestamp => TypedValue::Timestamp(
            NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|_| parse_err())?,
        ),
    })
}

/// Parses plain decimal text (`-12.50`) into its unscaled value at `scale`.
///
/// Returns `None` on malformed text, on more fractional digits than `scale` and on more
/// significant digits than `precision`; values are never rounded.
pub fn parse_decimal(text: &str, precision: u8, scale: u8) -> Option<i128> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac_part.len() > scale as usize {
        return None;
    }

    let significant = int_part.trim_start_matches('0');
    if significant.len() + scale as usize > precision.min(MAX_DECIMAL_PRECISION) as usize {
        return None;
    }

    let mut unscaled: i128 = 0;
    let padding = scale as usize - frac_part.len();
    for b in significant
        .bytes()
        .chain(frac_part.bytes())
        .chain(std::iter::repeat_n(b'0', padding))
    {
        unscaled = unscaled.checked_mul(10)?.checked_add((b - b'0') as i128)?;
    }

    Some(if negative { -unscaled } else { unscaled })
}

/// Renders an unscaled decimal with exactly `scale` fractional digits.
pub fn format_decimal(unscaled: i128, scale: u8) -> String {
    let digits = unscaled.unsigned_abs().to_string();
    let sign = if unscaled < 0 { "-" } else { "" };
    let scale = scale as usize;
    if scale == 0 {
        return format!("{sign}{digits}");
    }

    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    format!("{sign}{int_part}.{frac_part}")
}
