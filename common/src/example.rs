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

use minio_select::select::{DeclaredSchema, Field, SemanticType, StorageConfig};
use std::collections::HashMap;

pub const BUCKET: &str = "people-data";
pub const LOCATION: &str = "s3://people-data/people/*";

/// `id: int not null, name: string`
pub fn create_people_schema() -> DeclaredSchema {
    DeclaredSchema::new(vec![
        Field::new("id", SemanticType::Integer, false),
        Field::new("name", SemanticType::String, true),
    ])
    .unwrap()
}

pub fn create_orders_schema() -> DeclaredSchema {
    DeclaredSchema::new(vec![
        Field::new("order_id", SemanticType::Long, false),
        Field::new("customer", SemanticType::String, true),
        Field::new(
            "amount",
            SemanticType::Decimal {
                precision: 10,
                scale: 2,
            },
            true,
        ),
        Field::new("shipped", SemanticType::Boolean, true),
        Field::new("ordered_on", SemanticType::Date, true),
    ])
    .unwrap()
}

pub fn create_storage_config() -> StorageConfig {
    StorageConfig::builder()
        .endpoint("http://localhost:9000")
        .path_style_access(true)
        .build()
}

pub fn create_csv_params() -> HashMap<String, String> {
    HashMap::from([
        ("format".to_string(), "csv".to_string()),
        ("header".to_string(), "true".to_string()),
    ])
}
