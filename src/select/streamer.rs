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

//! Line splitting of one object's select response

use crate::s3::error::Error;
use crate::select::error::SelectError;
use crate::select::query::RemoteQuery;
use crate::select::row::RawRecord;
use crate::select::storage::{ByteStream, StorageClient};
use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use log::debug;
use std::sync::Arc;

/// Owns an open response body; dropping it closes the body however the scan ends.
struct OpenBody {
    key: String,
    body: ByteStream,
    records: u64,
}

impl Drop for OpenBody {
    fn drop(&mut self) {
        debug!(
            "closed select response of '{}' after {} records",
            self.key, self.records
        );
    }
}

fn decode_line(key: &str, line: u64, bytes: &[u8]) -> Result<RawRecord, SelectError> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let text = String::from_utf8(bytes.to_vec()).map_err(|e| SelectError::Stream {
        key: key.to_string(),
        source: Error::Utf8(e),
    })?;
    Ok(RawRecord::from_line(line, &text))
}

/// Runs `query` and yields one [`RawRecord`] per `\n`-terminated line of the response.
///
/// A trailing `\r` is stripped from each line and a final line without terminator is still a
/// record. Empty lines are records too: a single nullable column renders null as an empty line.
/// Line numbers start at 1.
pub fn stream_records<C>(
    client: Arc<C>,
    query: RemoteQuery,
) -> impl Stream<Item = Result<RawRecord, SelectError>> + Send + 'static
where
    C: StorageClient + ?Sized + 'static,
{
    try_stream! {
        let key = query.key.clone();
        let body = client
            .select_object_content(&query)
            .await
            .map_err(|source| SelectError::Stream { key: key.clone(), source })?;
        debug!("opened select response of s3://{}/{}", query.bucket, key);

        let mut open = OpenBody { key: key.clone(), body, records: 0 };
        let mut buf: Vec<u8> = Vec::new();

        while let Some(chunk) = open.body.next().await {
            let chunk = chunk.map_err(|source| SelectError::Stream { key: key.clone(), source })?;
            buf.extend_from_slice(&chunk);

            let mut start = 0;
            while let Some(pos) = buf[start..].iter().position(|&b| b == b'\n') {
                let end = start + pos;
                open.records += 1;
                let record = decode_line(&key, open.records, &buf[start..end])?;
                start = end + 1;
                yield record;
            }
            buf.drain(..start);
        }

        if !buf.is_empty() {
            open.records += 1;
            let record = decode_line(&key, open.records, &buf)?;
            yield record;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::select_request::{CsvOutputSerialization, InputSerialization, SelectRequest};
    use crate::select::storage::{ListPage, ListPageRequest};
    use crate::select::cast::TypedValue;
    use crate::select::row::TypedRow;
    use crate::select::schema::{DeclaredSchema, Field, SemanticType};
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{NaiveDate, NaiveTime};
    use futures_util::{TryStreamExt, future, stream};
    use quickcheck::{Arbitrary, Gen};

    struct Chunks(Vec<Result<&'static [u8], u16>>);

    #[async_trait]
    impl StorageClient for Chunks {
        async fn list_objects_page(&self, _request: ListPageRequest) -> Result<ListPage, Error> {
            Ok(ListPage::default())
        }

        async fn select_object_content(&self, _query: &RemoteQuery) -> Result<ByteStream, Error> {
            let chunks: Vec<Result<Bytes, Error>> = self
                .0
                .iter()
                .map(|c| match c {
                    Ok(bytes) => Ok(Bytes::from_static(*bytes)),
                    Err(status) => Err(Error::ServerError(*status)),
                })
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    fn ok(bytes: &'static [u8]) -> Result<&'static [u8], u16> {
        Ok(bytes)
    }

    fn query() -> RemoteQuery {
        let request = SelectRequest::new(
            "SELECT * FROM S3Object s",
            InputSerialization::Parquet,
            CsvOutputSerialization::default(),
        )
        .unwrap();
        RemoteQuery {
            bucket: "data".into(),
            key: "a.csv".into(),
            expression: request.expr.clone(),
            request,
            region: "us-east-1".into(),
            path_style: true,
        }
    }

    async fn collect(
        chunks: Vec<Result<&'static [u8], u16>>,
    ) -> Result<Vec<RawRecord>, SelectError> {
        stream_records(Arc::new(Chunks(chunks)), query())
            .try_collect()
            .await
    }

    #[tokio::test]
    async fn test_lines_across_chunks() {
        let records = collect(vec![ok(b"1,al"), ok(b"ice\r\n2,bob\n"), ok(b"3,carol")])
            .await
            .unwrap();
        assert_eq!(
            records,
            [
                RawRecord::from_line(1, "1,alice"),
                RawRecord::from_line(2, "2,bob"),
                RawRecord::from_line(3, "3,carol"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_lines_are_records() {
        let records = collect(vec![ok(b"a\n\nb\n")]).await.unwrap();
        let fields: Vec<Vec<String>> = records.into_iter().map(|r| r.fields).collect();
        assert_eq!(fields, [vec!["a"], vec![""], vec!["b"]]);
    }

    #[tokio::test]
    async fn test_empty_response() {
        assert!(collect(vec![]).await.unwrap().is_empty());
        assert!(collect(vec![ok(b"")]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let err = collect(vec![ok(b"ok\n\xff\xfe\n")]).await.unwrap_err();
        assert!(matches!(
            err,
            SelectError::Stream {
                source: Error::Utf8(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_after_records() {
        let mut stream = Box::pin(stream_records(
            Arc::new(Chunks(vec![ok(b"1\n"), Err(500)])),
            query(),
        ));
        assert_eq!(stream.try_next().await.unwrap().unwrap().line, 1);
        match stream.try_next().await {
            Err(SelectError::Stream { key, source }) => {
                assert_eq!(key, "a.csv");
                assert!(matches!(source, Error::ServerError(500)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// Response body cut into chunks of `chunk_size` bytes.
    struct Body {
        text: String,
        chunk_size: usize,
    }

    #[async_trait]
    impl StorageClient for Body {
        async fn list_objects_page(&self, _request: ListPageRequest) -> Result<ListPage, Error> {
            Ok(ListPage::default())
        }

        async fn select_object_content(&self, _query: &RemoteQuery) -> Result<ByteStream, Error> {
            let chunks: Vec<Result<Bytes, Error>> = self
                .text
                .as_bytes()
                .chunks(self.chunk_size)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    fn all_types() -> DeclaredSchema {
        DeclaredSchema::new(vec![
            Field::new("s", SemanticType::String, true),
            Field::new("b", SemanticType::Byte, true),
            Field::new("sh", SemanticType::Short, true),
            Field::new("i", SemanticType::Integer, true),
            Field::new("l", SemanticType::Long, true),
            Field::new("f", SemanticType::Float, true),
            Field::new("d", SemanticType::Double, true),
            Field::new("bool", SemanticType::Boolean, true),
            Field::new(
                "dec",
                SemanticType::Decimal {
                    precision: 38,
                    scale: 2,
                },
                true,
            ),
            Field::new("day", SemanticType::Date, true),
            Field::new("ts", SemanticType::Timestamp, true),
        ])
        .unwrap()
    }

    /// A row of [`all_types`]; strings hold no delimiters and an empty string is null.
    #[derive(Clone, Debug)]
    struct AnyRow(TypedRow);

    impl Arbitrary for AnyRow {
        fn arbitrary(g: &mut Gen) -> Self {
            let text: String = String::arbitrary(g)
                .chars()
                .filter(|c| !matches!(c, ',' | '\n' | '\r'))
                .collect();
            let float = f32::arbitrary(g);
            let double = f64::arbitrary(g);
            let day = NaiveDate::from_num_days_from_ce_opt(1 + (u32::arbitrary(g) % 3_652_059) as i32)
                .unwrap_or_default();
            let time = NaiveTime::from_num_seconds_from_midnight_opt(
                u32::arbitrary(g) % 86_400,
                (u32::arbitrary(g) % 1_000_000) * 1_000,
            )
            .unwrap_or_default();

            let values = vec![
                if text.is_empty() {
                    TypedValue::Null
                } else {
                    TypedValue::String(text)
                },
                TypedValue::Byte(i8::arbitrary(g)),
                TypedValue::Short(i16::arbitrary(g)),
                TypedValue::Integer(i32::arbitrary(g)),
                TypedValue::Long(i64::arbitrary(g)),
                TypedValue::Float(if float.is_finite() { float } else { 0.5 }),
                TypedValue::Double(if double.is_finite() { double } else { -0.25 }),
                TypedValue::Boolean(bool::arbitrary(g)),
                TypedValue::Decimal {
                    unscaled: i64::arbitrary(g) as i128,
                    scale: 2,
                },
                TypedValue::Date(day),
                TypedValue::Timestamp(day.and_time(time)),
            ];
            let values = values
                .into_iter()
                .map(|v| if u8::arbitrary(g) % 4 == 0 { TypedValue::Null } else { v })
                .collect();
            AnyRow(TypedRow::new(values))
        }
    }

    quickcheck! {
        fn prop_rows_round_trip_through_stream(rows: Vec<AnyRow>, chunk: u8) -> bool {
            let schema = all_types();
            let rows: Vec<TypedRow> = rows.into_iter().map(|r| r.0).collect();
            let text: String = rows.iter().map(|r| format!("{}\n", r.to_line())).collect();
            let client = Arc::new(Body {
                text,
                chunk_size: chunk as usize % 16 + 1,
            });

            let decoded: Result<Vec<TypedRow>, SelectError> =
                tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap()
                    .block_on(
                        stream_records(client, query())
                            .and_then(|record| future::ready(record.into_typed(&schema, "a.csv")))
                            .try_collect(),
                    );
            match decoded {
                Ok(decoded) => decoded == rows,
                Err(_) => false,
            }
        }
    }
}
