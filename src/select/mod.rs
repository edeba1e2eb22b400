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

//! Select pushdown pipeline.
//!
//! # Architecture
//!
//! ```text
//! Relation::scan(columns, filters)
//!     │
//!     ├─► DeclaredSchema::prune          (effective schema)
//!     ├─► QueryBuilder                   (SELECT ... FROM S3Object s WHERE ...)
//!     ├─► list_objects                   (ListObjectsV2 pages of 1000 keys)
//!     └─► per object:
//!           stream_records               (SelectObjectContent, one line per record)
//!           RawRecord::into_typed        (cast per field)
//! ```
//!
//! Storage is reached only through [`StorageClient`].

pub mod cast;
pub mod config;
pub mod error;
pub mod filter;
pub mod lister;
pub mod location;
pub mod params;
pub mod query;
pub mod relation;
pub mod row;
pub mod schema;
pub mod storage;
pub mod streamer;

pub use cast::{CastError, TypedValue, cast};
pub use config::StorageConfig;
pub use error::SelectError;
pub use filter::{ComparisonOp, Filter, FilterBuilder, Literal, and_all, or_all};
pub use lister::list_objects;
pub use location::LocationPointer;
pub use params::{InputFormat, ScanParams};
pub use query::{QueryBuilder, RemoteQuery};
pub use relation::{Relation, ScanStream};
pub use row::{RawRecord, RowCollection, TypedRow};
pub use schema::{DeclaredSchema, Field, SemanticType};
pub use storage::{ByteStream, LIST_PAGE_SIZE, ListPage, ListPageRequest, StorageClient};
pub use streamer::stream_records;
