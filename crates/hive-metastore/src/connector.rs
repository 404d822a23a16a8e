// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Connector facade that bundles a [`HiveMetastore`] with [`TableReader`]s.
//!
//! The connector resolves everything a reader needs from the metastore
//! (schema, partition locations, storage scheme, format) and hands the
//! result to the first reader that supports the table's format.

use std::sync::Arc;

use arrow_schema::{Schema, SchemaRef};
use datafusion::datasource::MemTable;
use datafusion::execution::context::SessionContext;
use url::Url;

use crate::client::HiveMetastore;
use crate::metastore::{DataSourceFormat, MetastoreError, MetastoreResult, Table, TableType};
use crate::table_reader::{HiveTableSource, TableReader};
use crate::type_mapping::columns_to_arrow_schema;

/// Bundles a [`HiveMetastore`] session with [`TableReader`]s.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use datafusion::prelude::SessionContext;
/// # use hive_metastore::{Connector, HiveMetastore, InMemoryMetastore, MetastoreConfig};
/// # async fn example() -> hive_metastore::MetastoreResult<()> {
/// let client = Arc::new(InMemoryMetastore::new());
/// let metastore = HiveMetastore::open(MetastoreConfig::default(), client).await?;
/// let connector = Connector::new(metastore, vec![]);
/// let ctx = SessionContext::new();
/// let registered = connector.register_database(&ctx, "default", None).await?;
/// connector.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Connector {
    metastore: HiveMetastore,
    readers: Vec<Arc<dyn TableReader>>,
}

impl Connector {
    pub fn new(metastore: HiveMetastore, readers: Vec<Arc<dyn TableReader>>) -> Self {
        Self { metastore, readers }
    }

    pub fn metastore(&self) -> &HiveMetastore {
        &self.metastore
    }

    /// Find a table reader that supports the given data format.
    pub fn reader_for(&self, format: &DataSourceFormat) -> Option<&dyn TableReader> {
        self.readers
            .iter()
            .find(|r| r.supported_formats().contains(format))
            .map(|r| r.as_ref())
    }

    pub fn readers(&self) -> &[Arc<dyn TableReader>] {
        &self.readers
    }

    /// End the metastore session.
    pub async fn close(self) -> MetastoreResult<()> {
        self.metastore.close().await
    }

    /// Resolve schema, data locations and format of `table`.
    ///
    /// Partitioned tables read only from the locations of partitions
    /// registered in the metastore, so one without partitions has no
    /// locations. All locations must share the root's URL scheme.
    pub async fn table_source(&self, table: &Table) -> MetastoreResult<HiveTableSource> {
        if matches!(
            table.table_type,
            TableType::VirtualView | TableType::MaterializedView
        ) {
            return Err(MetastoreError::InvalidOperation(format!(
                "{}.{} is a view and has no data location",
                table.db_name, table.table_name
            )));
        }

        let schema = columns_to_arrow_schema(&table.sd.cols, &table.partition_keys);
        let data_column_count = table.sd.cols.len();
        let file_schema: SchemaRef = Arc::new(Schema::new(
            schema
                .fields()
                .iter()
                .take(data_column_count)
                .cloned()
                .collect::<Vec<_>>(),
        ));
        let partition_columns = schema
            .fields()
            .iter()
            .skip(data_column_count)
            .map(|f| (f.name().clone(), f.data_type().clone()))
            .collect::<Vec<_>>();

        let root_location = normalize_location(table.sd.location.as_deref().ok_or_else(|| {
            MetastoreError::InvalidLocation {
                location: String::new(),
                message: format!("table {}.{} has no location", table.db_name, table.table_name),
            }
        })?);

        let mut locations = Vec::new();
        let mut partition_values = Vec::new();
        if table.is_partitioned() {
            let partitions = self
                .metastore
                .get_partitions(&table.table_name, &table.db_name, table.cat_name.as_deref())
                .await?;
            for partition in &partitions {
                let location = partition.sd.location.as_deref().ok_or_else(|| {
                    MetastoreError::InvalidLocation {
                        location: String::new(),
                        message: format!(
                            "partition {:?} of {}.{} has no location",
                            partition.values, table.db_name, table.table_name
                        ),
                    }
                })?;
                locations.push(normalize_location(location));
                partition_values.push(partition.values.clone());
            }
        } else {
            locations.push(root_location.clone());
        }

        let scheme = location_scheme(&root_location)?;
        for location in &locations {
            let other = location_scheme(location)?;
            if other != scheme {
                return Err(MetastoreError::SchemeMismatch {
                    location: location.clone(),
                    expected: scheme,
                });
            }
        }

        Ok(HiveTableSource {
            table: table.clone(),
            schema,
            file_schema,
            partition_columns,
            root_location,
            locations,
            partition_values,
            scheme,
            format: table.sd.format(),
        })
    }

    /// Register one table in `ctx` under its lowercased name.
    ///
    /// If no reader matches the table's format, an empty `MemTable` with the
    /// table's schema is registered instead so queries can still be planned.
    pub async fn register_table(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<(String, SchemaRef)> {
        let table = self
            .metastore
            .get_table(table_name, database_name, catalog_name)
            .await?;
        let source = self.table_source(&table).await?;
        let normalized_name = table.table_name.to_lowercase();

        match self.reader_for(&source.format) {
            Some(reader) => {
                tracing::debug!(
                    table = %source.qualified_name(),
                    reader = reader.name(),
                    "registering table"
                );
                reader.register_table(ctx, &normalized_name, &source).await?;
            }
            None => {
                tracing::warn!(
                    table = %source.qualified_name(),
                    format = ?source.format,
                    "no reader for format, registering schema only"
                );
                let mem_table = MemTable::try_new(source.schema.clone(), vec![])?;
                ctx.register_table(normalized_name.as_str(), Arc::new(mem_table))?;
            }
        }

        tracing::info!(table = %source.qualified_name(), "registered table");
        Ok((normalized_name, source.schema))
    }

    /// Register every table of a database.
    ///
    /// Individual table failures are logged as warnings and do not abort the
    /// remaining registrations. Returns `(table_name, schema)` for each table
    /// that was registered.
    pub async fn register_database(
        &self,
        ctx: &SessionContext,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<Vec<(String, SchemaRef)>> {
        let tables = self
            .metastore
            .list_tables(database_name, catalog_name, None, None)
            .await?;
        let mut registered = Vec::new();

        for table_name in &tables {
            match self
                .register_table(ctx, table_name, database_name, catalog_name)
                .await
            {
                Ok(entry) => registered.push(entry),
                Err(e) => {
                    tracing::warn!(
                        database = database_name,
                        table = %table_name,
                        error = %e,
                        "failed to register table"
                    );
                }
            }
        }

        Ok(registered)
    }
}

/// Bare absolute paths are local files.
fn normalize_location(location: &str) -> String {
    if location.starts_with('/') {
        format!("file://{}", location)
    } else {
        location.to_string()
    }
}

fn location_scheme(location: &str) -> MetastoreResult<String> {
    let url = Url::parse(location).map_err(|e| MetastoreError::InvalidLocation {
        location: location.to_string(),
        message: e.to_string(),
    })?;
    Ok(url.scheme().to_string())
}
