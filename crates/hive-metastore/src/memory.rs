// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! In-process metastore.
//!
//! [`InMemoryMetastore`] implements [`MetastoreClient`] over plain maps so the
//! facade and connector can run without a metastore service. Names are
//! matched case-insensitively, as the metastore does.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use regex::RegexBuilder;

use crate::metastore::*;
use crate::namespace::{parse_qualified_database, QualifiedDatabase, DEFAULT_CATALOG_NAME};

#[derive(Debug)]
struct TableEntry {
    table: Table,
    partitions: Vec<Partition>,
}

#[derive(Debug)]
struct DatabaseEntry {
    database: Database,
    tables: BTreeMap<String, TableEntry>,
}

#[derive(Debug)]
struct CatalogEntry {
    catalog: Catalog,
    databases: BTreeMap<String, DatabaseEntry>,
}

#[derive(Debug, Default)]
struct State {
    catalogs: BTreeMap<String, CatalogEntry>,
    conf: HashMap<String, String>,
}

impl State {
    fn catalog_entry(&mut self, name: &str) -> &mut CatalogEntry {
        self.catalogs
            .entry(name.to_lowercase())
            .or_insert_with(|| CatalogEntry {
                catalog: Catalog::new(name),
                databases: BTreeMap::new(),
            })
    }

    fn database_entry(&mut self, catalog: &str, database: &str) -> &mut DatabaseEntry {
        self.catalog_entry(catalog)
            .databases
            .entry(database.to_lowercase())
            .or_insert_with(|| DatabaseEntry {
                database: Database::new(database).with_catalog(catalog),
                tables: BTreeMap::new(),
            })
    }

    fn database(&self, address: &QualifiedDatabase) -> MetastoreResult<&DatabaseEntry> {
        let name = database_name(address)?;
        self.catalogs
            .get(&address.catalog.to_lowercase())
            .and_then(|c| c.databases.get(&name.to_lowercase()))
            .ok_or_else(|| {
                MetastoreError::NoSuchObject(format!("database {}.{}", address.catalog, name))
            })
    }

    fn database_mut(&mut self, address: &QualifiedDatabase) -> MetastoreResult<&mut DatabaseEntry> {
        let name = database_name(address)?;
        self.catalogs
            .get_mut(&address.catalog.to_lowercase())
            .and_then(|c| c.databases.get_mut(&name.to_lowercase()))
            .ok_or_else(|| {
                MetastoreError::NoSuchObject(format!("database {}.{}", address.catalog, name))
            })
    }

    fn table(&self, address: &QualifiedDatabase, table_name: &str) -> MetastoreResult<&TableEntry> {
        self.database(address)?
            .tables
            .get(&table_name.to_lowercase())
            .ok_or_else(|| no_such_table(address, table_name))
    }
}

fn database_name(address: &QualifiedDatabase) -> MetastoreResult<&str> {
    address.database.as_deref().ok_or_else(|| {
        MetastoreError::InvalidArgument(format!("no database given in '{}'", address))
    })
}

fn no_such_table(address: &QualifiedDatabase, table_name: &str) -> MetastoreError {
    MetastoreError::NoSuchObject(format!(
        "table {}.{}.{}",
        address.catalog,
        address.database.as_deref().unwrap_or_default(),
        table_name
    ))
}

/// Partition name in metastore form, e.g. `ds=2024-01-01/region=eu`.
fn partition_name(partition_keys: &[FieldSchema], partition: &Partition) -> String {
    partition_keys
        .iter()
        .zip(&partition.values)
        .map(|(key, value)| format!("{}={}", key.name, value))
        .collect::<Vec<_>>()
        .join("/")
}

/// Match names against a metastore pattern: `*` matches any run of
/// characters, `|` separates alternatives, case is ignored.
fn pattern_matcher(pattern: Option<&str>) -> MetastoreResult<impl Fn(&str) -> bool> {
    let regex = match pattern {
        Some(pattern) => {
            let alternatives = pattern
                .split('|')
                .map(|alt| regex::escape(alt.trim()).replace(r"\*", ".*"))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&format!("^(?:{alternatives})$"))
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    MetastoreError::InvalidArgument(format!("invalid pattern '{}': {}", pattern, e))
                })?;
            Some(regex)
        }
        None => None,
    };
    Ok(move |name: &str| regex.as_ref().map_or(true, |r| r.is_match(name)))
}

/// A [`MetastoreClient`] backed by in-process maps.
#[derive(Debug)]
pub struct InMemoryMetastore {
    default_catalog: String,
    state: RwLock<State>,
    open_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl Default for InMemoryMetastore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMetastore {
    /// An empty metastore holding only the default `hive` catalog.
    pub fn new() -> Self {
        let mut state = State::default();
        state.catalog_entry(DEFAULT_CATALOG_NAME);
        Self {
            default_catalog: DEFAULT_CATALOG_NAME.to_string(),
            state: RwLock::new(state),
            open_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> MetastoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| MetastoreError::Other("in-memory metastore lock poisoned".to_string()))
    }

    fn write(&self) -> MetastoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| MetastoreError::Other("in-memory metastore lock poisoned".to_string()))
    }

    fn resolve(&self, name: &str) -> MetastoreResult<QualifiedDatabase> {
        Ok(parse_qualified_database(name, &self.default_catalog)?)
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        let name = catalog.name.clone();
        self.state_mut().catalog_entry(&name).catalog = catalog;
        self
    }

    /// Add a database to its `catalog_name` (or the default catalog),
    /// creating the catalog if needed.
    pub fn with_database(mut self, mut database: Database) -> Self {
        let catalog = database
            .catalog_name
            .get_or_insert_with(|| self.default_catalog.clone())
            .clone();
        let name = database.name.clone();
        self.state_mut().database_entry(&catalog, &name).database = database;
        self
    }

    /// Add a table, creating its catalog and database if needed.
    pub fn with_table(mut self, mut table: Table) -> Self {
        let catalog = table
            .cat_name
            .get_or_insert_with(|| self.default_catalog.clone())
            .clone();
        let db_name = table.db_name.clone();
        let key = table.table_name.to_lowercase();
        self.state_mut()
            .database_entry(&catalog, &db_name)
            .tables
            .insert(
                key,
                TableEntry {
                    table,
                    partitions: Vec::new(),
                },
            );
        self
    }

    /// Attach a partition to an existing table. Partitions of unknown tables
    /// are dropped with a warning.
    pub fn with_partition(mut self, partition: Partition) -> Self {
        let catalog = partition
            .cat_name
            .clone()
            .unwrap_or_else(|| self.default_catalog.clone());
        let entry = self
            .state_mut()
            .database_entry(&catalog, &partition.db_name)
            .tables
            .get_mut(&partition.table_name.to_lowercase());
        match entry {
            Some(entry) => entry.partitions.push(partition),
            None => tracing::warn!(
                catalog = %catalog,
                database = %partition.db_name,
                table = %partition.table_name,
                "ignoring partition of unknown table"
            ),
        }
        self
    }

    pub fn open_count(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetastoreClient for InMemoryMetastore {
    async fn open(&self) -> MetastoreResult<()> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> MetastoreResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_meta_conf(&self, key: &str) -> MetastoreResult<String> {
        self.read()?
            .conf
            .get(key)
            .cloned()
            .ok_or_else(|| MetastoreError::InvalidArgument(format!("unknown config key '{}'", key)))
    }

    async fn set_meta_conf(&self, key: &str, value: &str) -> MetastoreResult<()> {
        self.write()?.conf.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_catalogs(&self) -> MetastoreResult<Vec<String>> {
        Ok(self
            .read()?
            .catalogs
            .values()
            .map(|c| c.catalog.name.clone())
            .collect())
    }

    async fn get_catalog(&self, name: &str) -> MetastoreResult<Catalog> {
        self.read()?
            .catalogs
            .get(&name.to_lowercase())
            .map(|c| c.catalog.clone())
            .ok_or_else(|| MetastoreError::NoSuchObject(format!("catalog {}", name)))
    }

    async fn get_databases(&self, pattern: &str) -> MetastoreResult<Vec<String>> {
        let address = self.resolve(pattern)?;
        let matches = pattern_matcher(address.database.as_deref())?;
        let state = self.read()?;
        let catalog = state
            .catalogs
            .get(&address.catalog.to_lowercase())
            .ok_or_else(|| MetastoreError::NoSuchObject(format!("catalog {}", address.catalog)))?;
        Ok(catalog
            .databases
            .values()
            .map(|d| d.database.name.clone())
            .filter(|name| matches(name))
            .collect())
    }

    async fn get_database(&self, database_name: &str) -> MetastoreResult<Database> {
        let address = self.resolve(database_name)?;
        Ok(self.read()?.database(&address)?.database.clone())
    }

    async fn drop_database(
        &self,
        name: &str,
        _delete_data: bool,
        cascade: bool,
    ) -> MetastoreResult<()> {
        let address = self.resolve(name)?;
        let mut state = self.write()?;
        let entry = state.database(&address)?;
        if !cascade && !entry.tables.is_empty() {
            return Err(MetastoreError::InvalidOperation(format!(
                "database {} is not empty",
                entry.database.name
            )));
        }
        let name = database_name(&address)?.to_lowercase();
        if let Some(catalog) = state.catalogs.get_mut(&address.catalog.to_lowercase()) {
            catalog.databases.remove(&name);
        }
        Ok(())
    }

    async fn get_tables(
        &self,
        database_name: &str,
        pattern: Option<&str>,
    ) -> MetastoreResult<Vec<String>> {
        let address = self.resolve(database_name)?;
        let matches = pattern_matcher(pattern)?;
        let state = self.read()?;
        Ok(state
            .database(&address)?
            .tables
            .values()
            .map(|t| t.table.table_name.clone())
            .filter(|name| matches(name))
            .collect())
    }

    async fn get_tables_by_type(
        &self,
        database_name: &str,
        pattern: Option<&str>,
        table_type: &str,
    ) -> MetastoreResult<Vec<String>> {
        let address = self.resolve(database_name)?;
        let table_type: TableType = table_type.parse()?;
        let matches = pattern_matcher(pattern)?;
        let state = self.read()?;
        Ok(state
            .database(&address)?
            .tables
            .values()
            .filter(|t| t.table.table_type == table_type)
            .map(|t| t.table.table_name.clone())
            .filter(|name| matches(name))
            .collect())
    }

    async fn get_table(&self, database_name: &str, table_name: &str) -> MetastoreResult<Table> {
        let address = self.resolve(database_name)?;
        Ok(self.read()?.table(&address, table_name)?.table.clone())
    }

    async fn drop_table_with_environment_context(
        &self,
        database_name: &str,
        table_name: &str,
        _delete_data: bool,
        _environment_context: Option<EnvironmentContext>,
    ) -> MetastoreResult<()> {
        let address = self.resolve(database_name)?;
        let mut state = self.write()?;
        state
            .database_mut(&address)?
            .tables
            .remove(&table_name.to_lowercase())
            .map(|_| ())
            .ok_or_else(|| no_such_table(&address, table_name))
    }

    async fn truncate_table(
        &self,
        database_name: &str,
        table_name: &str,
        partition_names: &[String],
    ) -> MetastoreResult<()> {
        // No data is held, so truncation only validates its arguments.
        let address = self.resolve(database_name)?;
        let state = self.read()?;
        let entry = state.table(&address, table_name)?;
        let known: Vec<String> = entry
            .partitions
            .iter()
            .map(|p| partition_name(&entry.table.partition_keys, p))
            .collect();
        match partition_names.iter().find(|name| !known.contains(name)) {
            Some(missing) => Err(MetastoreError::NoSuchObject(format!(
                "partition {} of table {}",
                missing, table_name
            ))),
            None => Ok(()),
        }
    }

    async fn get_partitions(
        &self,
        database_name: &str,
        table_name: &str,
        max_parts: i16,
    ) -> MetastoreResult<Vec<Partition>> {
        let address = self.resolve(database_name)?;
        let state = self.read()?;
        let partitions = &state.table(&address, table_name)?.partitions;
        let limit = usize::try_from(max_parts).unwrap_or(partitions.len());
        Ok(partitions.iter().take(limit).cloned().collect())
    }

    async fn get_fields(
        &self,
        database_name: &str,
        table_name: &str,
    ) -> MetastoreResult<Vec<FieldSchema>> {
        let address = self.resolve(database_name)?;
        Ok(self.read()?.table(&address, table_name)?.table.sd.cols.clone())
    }

    async fn get_schema(
        &self,
        database_name: &str,
        table_name: &str,
    ) -> MetastoreResult<Vec<FieldSchema>> {
        let address = self.resolve(database_name)?;
        let state = self.read()?;
        let table = &state.table(&address, table_name)?.table;
        Ok(table
            .sd
            .cols
            .iter()
            .chain(&table.partition_keys)
            .cloned()
            .collect())
    }
}
