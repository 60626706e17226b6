//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! SeaTable Rust SDK
//!
//! This is a Rust client for a single [SeaTable](https://seatable.io) base. It
//! exchanges the base's long-lived API token for a short-lived access token,
//! caches the base schema, and reads and updates rows with column values
//! translated into readable form.
//!
//! This SDK supplies and uses Rust `async` methods throughout, using the [tokio](https://crates.io/crates/tokio) runtime. There is currently no blocking support.
//!
//! The general flow for an application is:
//! - Create a [`HandleBuilder`] with all needed parameters
//! - Create a [`Handle`] from the [`HandleBuilder`] that will be used throughout the application, across all tasks
//! - Read and write rows using the [`Handle`] and Request structs such as [`ListRowsRequest`], [`QueryRowsRequest`] and [`UpdateRowRequest`]
//!
//! ## Simple Example
//! The following code creates a [`Handle`] from values in the current environment and then reads the rows of a table whose `Status` column is `Active`.
//! ```no_run
//! use seatable_rust_sdk::{Handle, QueryRowsRequest};
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let handle = Handle::builder()
//!         .from_environment()?
//!         .build().await?;
//!     let rows = QueryRowsRequest::new("Mentors", "Status", "Active")
//!         .execute(&handle)
//!         .await?;
//!     for row in &rows {
//!         println!("{:?}", row.get("Name"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Rows
//!
//! The service keys rows by internal column keys and stores select options as
//! option ids. This SDK returns [`DisplayRow`]s instead: rows keyed by column
//! display name, with single- and multiple-select values resolved to option
//! names and collaborators resolved to names or emails. The system fields
//! (`_id`, `_ctime`, `_mtime`, `_creator`, `_last_modifier`, `_locked`,
//! `_locked_by`, `_archived`) are copied through unchanged. See [`row_mapper`].
//!
//! Filters and patches are always expressed with display names and display
//! values.
//!
//! ## Configuring the SDK
//!
//! The only required setting is the API token of the base. It can be given
//! in code, in the environment, or in a config file:
//!
//! ```no_run
//! # use seatable_rust_sdk::Handle;
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = Handle::builder()
//!         .api_token("<your-api-token>")?
//!         .cache_file("~/.seatable/cache.json")?
//!         .build().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The config file, by default `~/.seatable/config`, is a properties file:
//!
//! ```ini
//! [DEFAULT]
//! api_token=<your-api-token>
//! endpoint=<optional-service-url>
//! cache_file=<optional-path-to-cache-file>
//! timeout_secs=<optional-timeout>
//! ```
//!
//! See [`HandleBuilder::from_environment()`] for the environment variables used.
//!
//! ### Credential caching
//!
//! Access tokens are valid for three days. The current token, the base uuid,
//! the base server url and the expiry are saved in a [`CacheStore`] so that a
//! new process can reuse them. The default store keeps them in memory only;
//! [`HandleBuilder::cache_file()`] keeps them in a JSON file. A copy of the
//! base schema is saved in the same store for inspection.
//!
//! ## Errors
//!
//! All operations return [`SeaTableError`], whose [`SeaTableErrorCode`]
//! tells apart a rejected API token, an unreachable service, a malformed
//! response, an unknown table or column, and so on. Two operations are
//! deliberately lenient:
//! - A failed server-side query in [`QueryRowsRequest`] falls back to fetching
//!   every row and filtering locally. If that fails too, the result is empty.
//! - [`UpdateRowRequest`] reports a rejected update as
//!   [`UpdateOutcome::Failed`], not as an error. Only a missing target row
//!   ([`SeaTableErrorCode::NotFound`]) or a failure to locate it is an error.
//!
//! ## Logging
//!
//! The SDK logs with [tracing](https://crates.io/crates/tracing). It does not
//! install a subscriber; the demos use `tracing_subscriber` with `RUST_LOG`.
//!
//! ## Demos
//!
//! Demo programs can be found in the `demos` directory. Run them with
//! `cargo run --example quickstart` after setting `SEATABLE_API_TOKEN`.
//!
//! ## License
//!
//! Copyright (C) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//!
//! This SDK is licensed under the Universal Permissive License 1.0.
//!

pub(crate) mod handle_builder;
pub use crate::handle_builder::HandleBuilder;

pub(crate) mod handle;
pub use crate::handle::{ConnectionReport, Handle, TokenInfo};

pub(crate) mod auth_common;

pub mod cache_store;
pub use crate::cache_store::{CacheStore, FileCacheStore, MemoryCacheStore};

pub(crate) mod error;
pub use crate::error::{SeaTableError, SeaTableErrorCode};

pub(crate) mod metadata;

pub(crate) mod query_request;
pub use crate::query_request::QueryRowsRequest;

#[cfg(test)]
pub(crate) mod request_tests;

pub mod row_mapper;
#[cfg(test)]
pub(crate) mod row_mapper_tests;

pub(crate) mod rows_request;
pub use crate::rows_request::ListRowsRequest;

pub mod types;
pub use crate::types::{
    Column, ColumnType, DisplayRow, Metadata, RawRow, SelectOption, TableSchema,
};

pub(crate) mod update_request;
pub use crate::update_request::{UpdateOutcome, UpdateRowRequest};
