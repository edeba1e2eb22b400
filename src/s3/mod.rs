// MinIO Rust Library for Amazon S3 Compatible Cloud Storage
// Copyright 2022 MinIO, Inc.
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

//! Simple Storage Service (aka S3) transport: request signing, ListObjectsV2 and
//! SelectObjectContent.

pub mod client;
pub mod creds;
pub mod error;
pub mod event_stream;
pub mod http;
pub mod list_objects;
pub mod select_request;
pub mod signer;
pub mod utils;

pub use client::S3Client;
