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

use clap::Parser;
use log::info;
use minio_select::s3::S3Client;
use minio_select::s3::creds::EnvProvider;
use minio_select::select::{DeclaredSchema, Field, Relation, SemanticType, StorageConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Scan CSV objects under an S3 prefix with S3 Select and print the rows.
///
/// Credentials are read from AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and AWS_SESSION_TOKEN.
#[derive(Parser)]
struct Cli {
    /// Location such as `s3://bucket/prefix/*`
    location: String,
    /// Columns as `name:type[?]`, comma separated; `?` marks a nullable column
    #[arg(long, default_value = "id:int,name:string?")]
    schema: String,
    /// Columns to fetch; all columns when omitted
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
    #[arg(long, default_value = "http://localhost:9000")]
    endpoint: String,
    #[arg(long, default_value = "us-east-1")]
    region: String,
    /// Use `endpoint/bucket` addressing
    #[arg(long)]
    path_style: bool,
    /// Objects have no header line
    #[arg(long)]
    no_header: bool,
    /// Number of objects read at the same time
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
}

fn parse_schema(spec: &str) -> Result<DeclaredSchema, Box<dyn std::error::Error + Send + Sync>> {
    let mut fields = Vec::new();
    for column in spec.split(',') {
        let (name, data_type) = column
            .split_once(':')
            .ok_or_else(|| format!("column '{column}' is not of the form name:type"))?;
        let (data_type, nullable) = match data_type.strip_suffix('?') {
            Some(t) => (t, true),
            None => (data_type, false),
        };
        fields.push(Field::new(
            name.trim(),
            data_type.parse::<SemanticType>()?,
            nullable,
        ));
    }
    Ok(DeclaredSchema::new(fields)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init(); // Note: set environment variable RUST_LOG="INFO" to log info and higher
    let args = Cli::parse();

    let config = StorageConfig::builder()
        .endpoint(args.endpoint)
        .region(args.region)
        .path_style_access(args.path_style)
        .build();
    let client = S3Client::new(&config, Some(Box::new(EnvProvider)))?;

    let params = HashMap::from([("header".to_string(), (!args.no_header).to_string())]);
    let relation = Relation::try_new(
        Arc::new(client),
        &args.location,
        &params,
        Some(parse_schema(&args.schema)?),
        config,
    )?
    .with_concurrency(args.concurrency);

    let columns: Vec<&str> = args.columns.iter().map(String::as_str).collect();
    let rows = relation
        .scan((!columns.is_empty()).then_some(columns.as_slice()), None)
        .await?;

    println!("{}", rows.schema);
    for row in rows.iter() {
        println!("{}", row.to_line());
    }
    info!("scanned {} rows from {}", rows.len(), args.location);
    Ok(())
}
