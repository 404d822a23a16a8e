// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Hive Metastore client facade.
//!
//! [`HiveMetastore`] wraps a [`MetastoreClient`] with the conveniences callers
//! expect: a default catalog, catalog-qualified database addressing, and
//! probe-then-drop semantics for destructive calls.

use std::sync::Arc;

use crate::config::MetastoreConfig;
use crate::metastore::*;
use crate::namespace;

/// Options for [`HiveMetastore::drop_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropDatabaseOptions {
    pub delete_data: bool,
    /// Return `Ok(())` when the database does not exist.
    pub ignore_unknown: bool,
    pub cascade: bool,
}

impl Default for DropDatabaseOptions {
    fn default() -> Self {
        Self {
            delete_data: true,
            ignore_unknown: false,
            cascade: false,
        }
    }
}

/// Options for [`HiveMetastore::drop_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTableOptions {
    pub delete_data: bool,
    /// Return `Ok(())` when the table does not exist.
    pub ignore_unknown: bool,
    /// Skip the trash when deleting data.
    pub if_purge: bool,
}

impl Default for DropTableOptions {
    fn default() -> Self {
        Self {
            delete_data: true,
            ignore_unknown: false,
            if_purge: false,
        }
    }
}

/// An open session against a Hive Metastore.
///
/// Created with [`HiveMetastore::open`]; [`HiveMetastore::close`] consumes the
/// session so the transport is closed at most once.
pub struct HiveMetastore {
    config: MetastoreConfig,
    client: Arc<dyn MetastoreClient>,
    open: bool,
}

impl HiveMetastore {
    /// Open the client's transport and start a session.
    ///
    /// The configured URI is validated first; an invalid or non-`thrift` URI
    /// fails without touching the transport.
    pub async fn open(
        config: MetastoreConfig,
        client: Arc<dyn MetastoreClient>,
    ) -> MetastoreResult<Self> {
        let (host, port) = config.endpoint()?;
        client.open().await?;
        tracing::debug!(
            host = %host,
            port,
            timeout = ?config.timeout(),
            "opened metastore session"
        );
        Ok(Self {
            config,
            client,
            open: true,
        })
    }

    /// Close the transport and end the session.
    pub async fn close(mut self) -> MetastoreResult<()> {
        self.open = false;
        tracing::debug!(uri = %self.config.uri, "closing metastore session");
        self.client.close().await
    }

    pub fn config(&self) -> &MetastoreConfig {
        &self.config
    }

    pub fn default_catalog(&self) -> &str {
        &self.config.default_catalog
    }

    /// Encode a database (or pattern) with its catalog, see [`namespace`].
    pub fn prepend_catalog_to_database(
        &self,
        database_name: Option<&str>,
        catalog_name: Option<&str>,
    ) -> String {
        let catalog = catalog_name.unwrap_or(self.default_catalog());
        namespace::prepend_catalog_to_database(database_name, Some(catalog))
    }

    fn qualify(&self, database_name: &str, catalog_name: Option<&str>) -> String {
        let address = self.prepend_catalog_to_database(Some(database_name), catalog_name);
        tracing::debug!(address = %address, "qualified database name");
        address
    }

    pub async fn get_meta_conf(&self, key: &str) -> MetastoreResult<String> {
        self.client.get_meta_conf(key).await
    }

    pub async fn set_meta_conf(&self, key: &str, value: &str) -> MetastoreResult<()> {
        self.client.set_meta_conf(key, value).await
    }

    // ---- Catalogs ----

    pub async fn get_catalog(&self, catalog_name: &str) -> MetastoreResult<Catalog> {
        self.client.get_catalog(catalog_name).await
    }

    pub async fn list_catalogs(&self) -> MetastoreResult<Vec<String>> {
        self.client.get_catalogs().await
    }

    // ---- Databases ----

    pub async fn get_database(
        &self,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<Database> {
        let address = self.qualify(database_name, catalog_name);
        self.client.get_database(&address).await
    }

    /// List databases of a catalog, optionally filtered by a metastore pattern
    /// (`*` wildcard, `|` alternatives).
    pub async fn list_databases(
        &self,
        catalog_name: Option<&str>,
        pattern: Option<&str>,
    ) -> MetastoreResult<Vec<String>> {
        let address = self.prepend_catalog_to_database(pattern, catalog_name);
        tracing::debug!(address = %address, "listing databases");
        self.client.get_databases(&address).await
    }

    pub async fn drop_database(
        &self,
        database_name: &str,
        catalog_name: Option<&str>,
        options: DropDatabaseOptions,
    ) -> MetastoreResult<()> {
        match self.get_database(database_name, catalog_name).await {
            Ok(_) => {}
            Err(MetastoreError::NoSuchObject(_)) if options.ignore_unknown => {
                tracing::debug!(database = database_name, "database not found, nothing to drop");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let address = self.qualify(database_name, catalog_name);
        self.client
            .drop_database(&address, options.delete_data, options.cascade)
            .await
    }

    // ---- Tables ----

    pub async fn get_table(
        &self,
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<Table> {
        let address = self.qualify(database_name, catalog_name);
        self.client.get_table(&address, table_name).await
    }

    /// List table names, optionally filtered by pattern and table type.
    pub async fn list_tables(
        &self,
        database_name: &str,
        catalog_name: Option<&str>,
        table_pattern: Option<&str>,
        table_type: Option<TableType>,
    ) -> MetastoreResult<Vec<String>> {
        let address = self.qualify(database_name, catalog_name);
        match table_type {
            Some(table_type) => {
                self.client
                    .get_tables_by_type(&address, table_pattern, table_type.as_str())
                    .await
            }
            None => self.client.get_tables(&address, table_pattern).await,
        }
    }

    pub async fn drop_table(
        &self,
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
        options: DropTableOptions,
    ) -> MetastoreResult<()> {
        match self.get_table(table_name, database_name, catalog_name).await {
            Ok(_) => {}
            Err(MetastoreError::NoSuchObject(_)) if options.ignore_unknown => {
                tracing::debug!(
                    database = database_name,
                    table = table_name,
                    "table not found, nothing to drop"
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let address = self.qualify(database_name, catalog_name);
        let environment_context = options
            .if_purge
            .then(|| EnvironmentContext::default().with_property("ifPurge", "TRUE"));
        self.client
            .drop_table_with_environment_context(
                &address,
                table_name,
                options.delete_data,
                environment_context,
            )
            .await
    }

    pub async fn truncate_table(
        &self,
        partition_names: &[String],
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<()> {
        let address = self.qualify(database_name, catalog_name);
        self.client
            .truncate_table(&address, table_name, partition_names)
            .await
    }

    /// All partitions of a table.
    pub async fn get_partitions(
        &self,
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<Vec<Partition>> {
        let address = self.qualify(database_name, catalog_name);
        self.client.get_partitions(&address, table_name, -1).await
    }

    pub async fn get_fields(
        &self,
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<Vec<FieldSchema>> {
        let address = self.qualify(database_name, catalog_name);
        self.client.get_fields(&address, table_name).await
    }

    pub async fn get_schema(
        &self,
        table_name: &str,
        database_name: &str,
        catalog_name: Option<&str>,
    ) -> MetastoreResult<Vec<FieldSchema>> {
        let address = self.qualify(database_name, catalog_name);
        self.client.get_schema(&address, table_name).await
    }
}

impl Drop for HiveMetastore {
    fn drop(&mut self) {
        if self.open {
            tracing::warn!(uri = %self.config.uri, "metastore session dropped without close()");
        }
    }
}

impl std::fmt::Debug for HiveMetastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HiveMetastore")
            .field("config", &self.config)
            .field("open", &self.open)
            .finish()
    }
}
