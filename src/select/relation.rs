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

//! Relation over every object under an S3 prefix.
//!
//! A [`Relation`] binds a location, a declared schema and input-format parameters. Each scan
//! prunes the schema to the requested columns, translates the filters once, lists the objects
//! under the prefix and runs one select query per object. Rows are cast to the effective
//! schema as they arrive; the first error aborts the whole scan.

use crate::select::config::StorageConfig;
use crate::select::error::SelectError;
use crate::select::filter::Filter;
use crate::select::lister::list_objects;
use crate::select::location::LocationPointer;
use crate::select::params::ScanParams;
use crate::select::query::{QueryBuilder, RemoteQuery};
use crate::select::row::{RowCollection, TypedRow};
use crate::select::schema::DeclaredSchema;
use crate::select::storage::StorageClient;
use crate::select::streamer::stream_records;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt, TryStreamExt, future, stream};
use log::{debug, info};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Lazily produced rows of one scan, aligned with [`ScanStream::schema`].
pub struct ScanStream {
    schema: DeclaredSchema,
    rows: BoxStream<'static, Result<TypedRow, SelectError>>,
}

impl ScanStream {
    /// The effective schema of the scan.
    pub fn schema(&self) -> &DeclaredSchema {
        &self.schema
    }

    /// Drains the stream; fails on the first error.
    pub async fn collect_rows(self) -> Result<RowCollection, SelectError> {
        let ScanStream { schema, rows } = self;
        let rows: Vec<TypedRow> = rows.try_collect().await?;
        Ok(RowCollection { schema, rows })
    }
}

impl Stream for ScanStream {
    type Item = Result<TypedRow, SelectError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rows.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ScanStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanStream")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Relation<C: StorageClient + ?Sized> {
    client: Arc<C>,
    location: LocationPointer,
    params: ScanParams,
    schema: DeclaredSchema,
    config: StorageConfig,
    concurrency: usize,
}

impl<C: StorageClient + ?Sized + 'static> Relation<C> {
    /// Creates a relation over `location` (`s3://bucket/prefix*`).
    ///
    /// `params` holds input-format directives such as `header` and `delimiter`. A schema is
    /// required; it is never inferred from the data.
    pub fn try_new(
        client: Arc<C>,
        location: &str,
        params: &HashMap<String, String>,
        schema: Option<DeclaredSchema>,
        config: StorageConfig,
    ) -> Result<Self, SelectError> {
        let schema = schema.ok_or_else(|| {
            SelectError::Config(format!("a schema is required for {location}"))
        })?;
        let location = LocationPointer::parse(location)?;
        let params = ScanParams::from_map(params)?;

        debug!(
            "created relation over {location} ({:?}) with schema {schema}",
            params.format
        );
        Ok(Relation {
            client,
            location,
            params,
            schema,
            config,
            concurrency: 1,
        })
    }

    /// Number of objects fetched at once; at least 1.
    ///
    /// Rows of each object stay contiguous and in order whatever the value.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The declared schema.
    pub fn schema(&self) -> &DeclaredSchema {
        &self.schema
    }

    pub fn location(&self) -> &LocationPointer {
        &self.location
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Effective schema and translated query. Runs before any network access.
    fn plan(
        &self,
        columns: Option<&[&str]>,
        filters: Option<&[Filter]>,
    ) -> Result<(DeclaredSchema, QueryBuilder), SelectError> {
        let effective = match columns {
            Some(columns) => self.schema.prune(columns)?,
            None => self.schema.clone(),
        };
        let builder = QueryBuilder::new(
            &self.schema,
            &effective,
            filters,
            &self.params,
            &self.config,
        )?;
        debug!("scan of {} uses '{}'", self.location, builder.expression());
        Ok((effective, builder))
    }

    /// Starts a scan whose rows are produced as the objects are read.
    ///
    /// Projection and filter errors are returned here; listing, transport and record errors
    /// end the stream.
    pub fn scan_stream(
        &self,
        columns: Option<&[&str]>,
        filters: Option<&[Filter]>,
    ) -> Result<ScanStream, SelectError> {
        let (effective, builder) = self.plan(columns, filters)?;

        let client = self.client.clone();
        let bucket = self.location.bucket.clone();
        let schema = effective.clone();
        let rows = list_objects(
            self.client.clone(),
            self.location.bucket.clone(),
            self.location.prefix.clone(),
        )
        .map_ok(move |key| {
            object_rows(client.clone(), builder.build(&bucket, &key), schema.clone())
        })
        .try_buffered(self.concurrency)
        .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<TypedRow, SelectError>)))
        .try_flatten()
        .boxed();

        Ok(ScanStream {
            schema: effective,
            rows,
        })
    }

    /// Scans every object under the location and returns all matching rows.
    ///
    /// `columns` restricts the result to those columns, kept in declared order.
    /// `filters` are combined with AND and evaluated by the storage service.
    pub async fn scan(
        &self,
        columns: Option<&[&str]>,
        filters: Option<&[Filter]>,
    ) -> Result<RowCollection, SelectError> {
        let rows = self.scan_stream(columns, filters)?.collect_rows().await?;
        info!(
            "scan of {} returned {} rows of {} columns",
            self.location,
            rows.len(),
            rows.schema.len()
        );
        Ok(rows)
    }
}

/// Reads and casts all rows of one object.
async fn object_rows<C>(
    client: Arc<C>,
    query: RemoteQuery,
    schema: DeclaredSchema,
) -> Result<Vec<TypedRow>, SelectError>
where
    C: StorageClient + ?Sized + 'static,
{
    let key = query.key.clone();
    let rows: Vec<TypedRow> = stream_records(client, query)
        .and_then(|record| {
            // Count-only scans receive a placeholder column that is not part of the row.
            future::ready(if schema.is_empty() {
                Ok(TypedRow::new(Vec::new()))
            } else {
                record.into_typed(&schema, &key)
            })
        })
        .try_collect()
        .await?;
    debug!("read {} rows from '{key}'", rows.len());
    Ok(rows)
}
