// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Table reader trait for format-specific data reading.
//!
//! A reader turns a resolved [`HiveTableSource`] into a DataFusion table. It
//! knows nothing about the metastore; the [`crate::Connector`] resolves
//! schemas and locations before handing them over.

use arrow_schema::{DataType, SchemaRef};
use async_trait::async_trait;
use datafusion::execution::context::SessionContext;

use crate::metastore::{DataSourceFormat, MetastoreResult, Table};
use crate::namespace::{qualified_table_name, DEFAULT_CATALOG_NAME};

/// Everything a reader needs to expose one metastore table.
#[derive(Debug, Clone)]
pub struct HiveTableSource {
    pub table: Table,
    /// Data columns followed by partition columns.
    pub schema: SchemaRef,
    /// Data columns only, as stored in the files.
    pub file_schema: SchemaRef,
    /// Partition keys in declaration order.
    pub partition_columns: Vec<(String, DataType)>,
    /// Table storage root.
    pub root_location: String,
    /// Where the data lives: the table root for unpartitioned tables,
    /// otherwise one entry per registered partition.
    pub locations: Vec<String>,
    /// Values of each registered partition, aligned with `locations`.
    /// Empty for unpartitioned tables.
    pub partition_values: Vec<Vec<String>>,
    /// URL scheme shared by every location (e.g. `s3a`, `file`).
    pub scheme: String,
    pub format: DataSourceFormat,
}

impl HiveTableSource {
    pub fn is_partitioned(&self) -> bool {
        !self.partition_columns.is_empty()
    }

    /// `catalog.database.table` for log and error messages.
    pub fn qualified_name(&self) -> String {
        qualified_table_name(
            self.table.cat_name.as_deref().unwrap_or(DEFAULT_CATALOG_NAME),
            &self.table.db_name,
            &self.table.table_name,
        )
    }
}

/// Reads table data in a specific format and registers it into a DataFusion
/// `SessionContext`.
///
/// Implement this trait to add support for new formats; readers are matched
/// against [`HiveTableSource::format`] by [`crate::Connector::reader_for`].
#[async_trait]
pub trait TableReader: Send + Sync {
    /// Human-readable name of this reader (e.g., "parquet").
    fn name(&self) -> &str;

    /// The data format(s) this reader can handle.
    fn supported_formats(&self) -> &[DataSourceFormat];

    /// Register `source` in `ctx` under `table_name` (already lowercased).
    async fn register_table(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        source: &HiveTableSource,
    ) -> MetastoreResult<()>;
}
