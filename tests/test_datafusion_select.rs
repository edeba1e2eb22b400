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

//! SQL over a select relation through DataFusion.

#![cfg(feature = "datafusion")]

use datafusion::arrow::array::{Array, Int64Array, StringArray};
use datafusion::arrow::datatypes::DataType;
use datafusion::datasource::TableProvider;
use datafusion::execution::context::SessionContext;
use datafusion::logical_expr::{TableProviderFilterPushDown, col, lit};
use minio_select::datafusion_ext::SelectTableProvider;
use minio_select::select::Relation;
use minio_select_common::example::{
    BUCKET, LOCATION, create_csv_params, create_people_schema, create_storage_config,
};
use minio_select_common::{MockStorage, init_logger};
use std::sync::Arc;

fn people_provider(storage: &Arc<MockStorage>) -> SelectTableProvider<MockStorage> {
    let relation = Relation::try_new(
        storage.clone(),
        LOCATION,
        &create_csv_params(),
        Some(create_people_schema()),
        create_storage_config(),
    )
    .unwrap();
    SelectTableProvider::new(Arc::new(relation))
}

#[test]
fn provider_schema_and_pushdown_support() {
    let storage = Arc::new(MockStorage::new(BUCKET));
    let provider = people_provider(&storage);

    let schema = provider.schema();
    assert_eq!(schema.field(0).data_type(), &DataType::Int32);
    assert!(!schema.field(0).is_nullable());
    assert_eq!(schema.field(1).data_type(), &DataType::Utf8);

    let pushable = col("id").gt(lit(1));
    let case_insensitive = col("name").ilike(lit("a%"));
    let wrong_type = col("id").like(lit("1%"));
    let support = provider
        .supports_filters_pushdown(&[&pushable, &case_insensitive, &wrong_type])
        .unwrap();
    assert!(matches!(
        support.as_slice(),
        [
            TableProviderFilterPushDown::Inexact,
            TableProviderFilterPushDown::Unsupported,
            TableProviderFilterPushDown::Unsupported,
        ]
    ));
}

#[tokio::test]
async fn sql_query_scans_relation() {
    init_logger();
    let storage = Arc::new(
        MockStorage::new(BUCKET)
            .with_object("people/a.csv", "1,alice\n2,bob\n")
            .with_object("people/b.csv", "3,\n"),
    );

    let ctx = SessionContext::new();
    ctx.register_table("people", Arc::new(people_provider(&storage)))
        .unwrap();

    let batches = ctx
        .sql("SELECT name FROM people WHERE id >= 2")
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();

    let mut names: Vec<Option<String>> = vec![];
    for batch in &batches {
        let column = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        for i in 0..column.len() {
            names.push((!column.is_null(i)).then(|| column.value(i).to_string()));
        }
    }
    names.sort();
    assert_eq!(names, [None, Some("bob".to_string())]);

    let queries = storage.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries.iter().all(|q| q.expression.contains(" WHERE ")));
}

#[tokio::test]
async fn count_star_uses_row_count() {
    init_logger();
    let storage = Arc::new(
        MockStorage::new(BUCKET)
            .with_object("people/a.csv", "1,alice\n2,bob\n")
            .with_object("people/b.csv", "3,carol\n"),
    );

    let ctx = SessionContext::new();
    ctx.register_table("people", Arc::new(people_provider(&storage)))
        .unwrap();

    let batches = ctx
        .sql("SELECT COUNT(*) FROM people")
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();

    let count = batches[0]
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap()
        .value(0);
    assert_eq!(count, 3);
}
