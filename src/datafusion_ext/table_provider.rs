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

//! DataFusion `TableProvider` over a [`Relation`].
//!
//! 1. **Filter Classification**: filters with a select counterpart that the relation can
//!    translate are reported as `Inexact`; DataFusion re-applies them on the returned rows
//! 2. **Projection**: the projected columns are passed to [`Relation::scan`]
//! 3. **Materialization**: rows are converted to one Arrow `RecordBatch` and served from a
//!    `MemTable`; `limit` truncates that batch
//!
//! # Example
//!
//! ```ignore
//! use datafusion::prelude::SessionContext;
//! use minio_select::datafusion_ext::SelectTableProvider;
//! use std::sync::Arc;
//!
//! let ctx = SessionContext::new();
//! ctx.register_table("people", Arc::new(SelectTableProvider::new(Arc::new(relation))))?;
//! let df = ctx.sql("SELECT name FROM people WHERE id > 10").await?;
//! ```

use super::expr_to_filter;
use super::record_batch::{row_count_batch, rows_to_record_batch, to_arrow_schema};
use crate::select::filter::Filter;
use crate::select::query::QueryBuilder;
use crate::select::relation::Relation;
use crate::select::storage::StorageClient;
use async_trait::async_trait;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::catalog::Session;
use datafusion::datasource::{MemTable, TableProvider, TableType};
use datafusion::error::{DataFusionError, Result as DataFusionResult};
use datafusion::logical_expr::{Expr, TableProviderFilterPushDown};
use datafusion::physical_plan::ExecutionPlan;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub struct SelectTableProvider<C: StorageClient + ?Sized> {
    relation: Arc<Relation<C>>,
    schema: SchemaRef,
}

impl<C: StorageClient + ?Sized> Clone for SelectTableProvider<C> {
    fn clone(&self) -> Self {
        Self {
            relation: Arc::clone(&self.relation),
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<C: StorageClient + ?Sized> fmt::Debug for SelectTableProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectTableProvider")
            .field("schema", &self.schema)
            .field("client", &"<StorageClient>")
            .finish()
    }
}

impl<C: StorageClient + ?Sized + 'static> SelectTableProvider<C> {
    /// The Arrow schema is derived from the relation's declared schema.
    pub fn new(relation: Arc<Relation<C>>) -> Self {
        let schema = to_arrow_schema(relation.schema());
        Self { relation, schema }
    }

    pub fn relation(&self) -> &Arc<Relation<C>> {
        &self.relation
    }

    /// The select filter for `expr`, if the relation can push it down.
    fn pushable_filter(&self, expr: &Expr) -> Option<Filter> {
        let filter = expr_to_filter(expr)?;
        let schema = self.relation.schema();
        QueryBuilder::new(
            schema,
            schema,
            Some(std::slice::from_ref(&filter)),
            self.relation.params(),
            self.relation.config(),
        )
        .ok()?;
        Some(filter)
    }
}

#[async_trait]
impl<C: StorageClient + ?Sized + 'static> TableProvider for SelectTableProvider<C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn table_type(&self) -> TableType {
        TableType::Base
    }

    fn supports_filters_pushdown(
        &self,
        filters: &[&Expr],
    ) -> DataFusionResult<Vec<TableProviderFilterPushDown>> {
        let support: Vec<TableProviderFilterPushDown> = filters
            .iter()
            .map(|expr| match self.pushable_filter(expr) {
                Some(_) => TableProviderFilterPushDown::Inexact,
                None => TableProviderFilterPushDown::Unsupported,
            })
            .collect();

        log::debug!(
            "supports_filters_pushdown: {} filters, {} pushable",
            filters.len(),
            support
                .iter()
                .filter(|s| matches!(s, TableProviderFilterPushDown::Inexact))
                .count()
        );
        Ok(support)
    }

    async fn scan(
        &self,
        state: &dyn Session,
        projection: Option<&Vec<usize>>,
        filters: &[Expr],
        limit: Option<usize>,
    ) -> DataFusionResult<Arc<dyn ExecutionPlan>> {
        let pushed: Vec<Filter> = filters
            .iter()
            .filter_map(|expr| self.pushable_filter(expr))
            .collect();

        let declared = self.relation.schema();
        let names: Option<Vec<&str>> = projection
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| {
                        declared.fields().get(i).map(|f| f.name.as_str()).ok_or_else(|| {
                            DataFusionError::Plan(format!("projection index {i} out of range"))
                        })
                    })
                    .collect::<DataFusionResult<Vec<&str>>>()
            })
            .transpose()?;
        let count_only = names.as_ref().is_some_and(|n| n.is_empty());
        let columns = names.as_deref();

        let rows = self
            .relation
            .scan(columns, (!pushed.is_empty()).then_some(pushed.as_slice()))
            .await
            .map_err(|e| DataFusionError::External(Box::new(e)))?;

        let mut batch = if count_only {
            row_count_batch(rows.len())?
        } else {
            let batch = rows_to_record_batch(&rows)?;
            match columns {
                // Scanned columns come back in declared order.
                Some(names) => {
                    let order = names
                        .iter()
                        .map(|name| {
                            rows.schema.index_of(name).ok_or_else(|| {
                                DataFusionError::Internal(format!("column '{name}' not scanned"))
                            })
                        })
                        .collect::<DataFusionResult<Vec<usize>>>()?;
                    batch.project(&order)?
                }
                None => batch,
            }
        };
        if let Some(limit) = limit {
            if batch.num_rows() > limit {
                batch = batch.slice(0, limit);
            }
        }

        log::debug!(
            "select scan produced {} rows with {} pushed filters",
            batch.num_rows(),
            pushed.len()
        );
        let table = MemTable::try_new(batch.schema(), vec![vec![batch]])?;
        table.scan(state, None, &[], None).await
    }
}
