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

//! DataFusion integration for select pushdown
//!
//! This module is only available when the `datafusion` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! minio-select = { version = "0.1", features = ["datafusion"] }
//! ```
//!
//! # Architecture
//!
//! 1. DataFusion asks [`SelectTableProvider`] which filters it can push down
//! 2. Supported expressions are translated to [`Filter`](crate::select::Filter)s by
//!    [`expr_to_filter`]
//! 3. The scan runs [`Relation::scan`](crate::select::Relation::scan) with the projected
//!    columns and the translated filters
//! 4. Typed rows are converted to an Arrow `RecordBatch`

pub mod filter_translator;
pub mod record_batch;
pub mod table_provider;

pub use filter_translator::expr_to_filter;
pub use record_batch::{rows_to_record_batch, to_arrow_schema};
pub use table_provider::SelectTableProvider;
