// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Hive Metastore catalog client.
//!
//! - [`HiveMetastore`]: client facade over a [`MetastoreClient`] RPC boundary
//! - [`type_mapping`]: Hive type descriptors to Arrow types and schemas
//! - [`namespace`]: catalog-qualified database addressing (`@cat#db`)
//! - [`Connector`]: metastore + [`TableReader`]s, registering tables in DataFusion

pub mod aware_split;
pub mod client;
pub mod config;
pub mod connector;
pub mod memory;
pub mod metastore;
pub mod namespace;
pub mod table_reader;
pub mod type_mapping;

pub use aware_split::{aware_split, unquote, unquote_default, SplitError, SplitOptions};
pub use client::{DropDatabaseOptions, DropTableOptions, HiveMetastore};
pub use config::MetastoreConfig;
pub use connector::Connector;
pub use memory::InMemoryMetastore;
pub use metastore::{
    Catalog, DataSourceFormat, Database, EnvironmentContext, FieldSchema, MetastoreClient,
    MetastoreError, MetastoreResult, Partition, StorageDescriptor, Table, TableType,
};
pub use namespace::{parse_qualified_database, prepend_catalog_to_database, QualifiedDatabase};
pub use table_reader::{HiveTableSource, TableReader};
pub use type_mapping::{columns_to_arrow_schema, convert_schema, parse_dtype, parse_type};
