// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Query Hive Metastore tables with DataFusion.
//!
//! Pairs the [`hive_metastore::Connector`] with object-store backed table
//! readers so metastore tables can be registered and queried with SQL.

pub mod error;
pub mod sql_catalog;
pub mod sql_query;
pub mod storage;
pub mod table_readers;

pub use error::{Result, SqlError};
pub use sql_catalog::{build_context_from_connector, table_to_record_batch};
pub use sql_query::SqlQuery;
pub use storage::StorageConfig;
pub use table_readers::{default_table_readers, HiveParquetTableReader};
