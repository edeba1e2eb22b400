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

//! # S3 Select pushdown (`minio-select`)
//!
//! This crate reads delimited, JSON or Parquet objects from S3 compatible storage by pushing
//! column projection and row filters down to the `SelectObjectContent` API, instead of
//! downloading whole objects and decoding them locally.
//!
//! A [`select::Relation`] is built once from a location pointer (`s3://bucket/prefix*`),
//! scan parameters and a declared schema. Every call to [`select::Relation::scan`] lists the
//! objects under the prefix, sends one SELECT request per object and coerces the
//! comma-delimited response into typed rows.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use minio_select::s3::S3Client;
//! use minio_select::s3::creds::EnvProvider;
//! use minio_select::select::{
//!     DeclaredSchema, Field, FilterBuilder, Relation, SemanticType, StorageConfig,
//! };
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StorageConfig::builder()
//!         .endpoint("http://localhost:9000".to_string())
//!         .path_style_access(true)
//!         .build();
//!     let client = S3Client::new(&config, Some(Box::new(EnvProvider)))?;
//!
//!     let schema = DeclaredSchema::new(vec![
//!         Field::new("id", SemanticType::Integer, false),
//!         Field::new("name", SemanticType::String, true),
//!     ])?;
//!
//!     let relation = Relation::try_new(
//!         Arc::new(client),
//!         "s3://my-bucket/people/*",
//!         &HashMap::new(),
//!         Some(schema),
//!         config,
//!     )?;
//!
//!     let filters = [FilterBuilder::column("id").gt(10)];
//!     let rows = relation.scan(Some(&["name"]), Some(&filters)).await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//! - [`select`] holds the pushdown pipeline; it only talks to storage through the
//!   [`select::StorageClient`] trait
//! - [`s3`] provides [`s3::S3Client`], the `reqwest` based implementation of that trait
//! - `datafusion_ext` (feature `datafusion`) exposes a relation as a DataFusion `TableProvider`

#![allow(clippy::result_large_err)]
#![allow(clippy::too_many_arguments)]

#[cfg(feature = "datafusion")]
pub mod datafusion_ext;
pub mod s3;
pub mod select;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;
