// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Metastore data types and the RPC client boundary.
//!
//! [`MetastoreClient`] is the shape of the generated Thrift stub as seen by
//! this crate. Transport and wire encoding live behind it. Every
//! `database_name` argument it receives is already catalog-qualified (see
//! [`crate::namespace`]).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use crate::namespace::NamespaceError;

/// A catalog (top-level namespace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub name: String,
    pub description: Option<String>,
    pub location_uri: Option<String>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            location_uri: None,
        }
    }
}

/// A database (second-level namespace within a catalog).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
    pub catalog_name: Option<String>,
    pub description: Option<String>,
    pub location_uri: Option<String>,
    pub parameters: HashMap<String, String>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_name: None,
            description: None,
            location_uri: None,
            parameters: HashMap::new(),
        }
    }

    pub fn with_catalog(mut self, catalog_name: impl Into<String>) -> Self {
        self.catalog_name = Some(catalog_name.into());
        self
    }

    pub fn with_location(mut self, location_uri: impl Into<String>) -> Self {
        self.location_uri = Some(location_uri.into());
        self
    }
}

/// A column as stored by the metastore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    /// Hive type descriptor, e.g. `array<string>`.
    pub type_name: String,
    pub comment: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Input/output format classes and SerDe of a storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiveSerDe {
    pub input_format: &'static str,
    pub output_format: &'static str,
    pub serde: &'static str,
}

pub const PARQUET_SERDE: HiveSerDe = HiveSerDe {
    input_format: "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat",
    output_format: "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat",
    serde: "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe",
};

pub const ORC_SERDE: HiveSerDe = HiveSerDe {
    input_format: "org.apache.hadoop.hive.ql.io.orc.OrcInputFormat",
    output_format: "org.apache.hadoop.hive.ql.io.orc.OrcOutputFormat",
    serde: "org.apache.hadoop.hive.ql.io.orc.OrcSerde",
};

/// Data format of the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceFormat {
    Parquet,
    Orc,
    Other(String),
}

impl DataSourceFormat {
    /// Detect the format from a storage descriptor's input format class.
    pub fn from_input_format(input_format: Option<&str>) -> Self {
        match input_format {
            Some(f) if f == PARQUET_SERDE.input_format => Self::Parquet,
            Some(f) if f == ORC_SERDE.input_format => Self::Orc,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other("UNKNOWN".to_string()),
        }
    }

    pub fn serde(&self) -> Option<HiveSerDe> {
        match self {
            Self::Parquet => Some(PARQUET_SERDE),
            Self::Orc => Some(ORC_SERDE),
            Self::Other(_) => None,
        }
    }
}

/// Physical storage of a table or partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageDescriptor {
    pub cols: Vec<FieldSchema>,
    pub location: Option<String>,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub serde_lib: Option<String>,
}

impl StorageDescriptor {
    pub fn new(location: impl Into<String>, cols: Vec<FieldSchema>, serde: HiveSerDe) -> Self {
        Self {
            cols,
            location: Some(location.into()),
            input_format: Some(serde.input_format.to_string()),
            output_format: Some(serde.output_format.to_string()),
            serde_lib: Some(serde.serde.to_string()),
        }
    }

    pub fn parquet(location: impl Into<String>, cols: Vec<FieldSchema>) -> Self {
        Self::new(location, cols, PARQUET_SERDE)
    }

    pub fn orc(location: impl Into<String>, cols: Vec<FieldSchema>) -> Self {
        Self::new(location, cols, ORC_SERDE)
    }

    pub fn format(&self) -> DataSourceFormat {
        DataSourceFormat::from_input_format(self.input_format.as_deref())
    }
}

/// Kind of table as recorded in the metastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    ManagedTable,
    ExternalTable,
    VirtualView,
    MaterializedView,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagedTable => "MANAGED_TABLE",
            Self::ExternalTable => "EXTERNAL_TABLE",
            Self::VirtualView => "VIRTUAL_VIEW",
            Self::MaterializedView => "MATERIALIZED_VIEW",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableType {
    type Err = MetastoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANAGED_TABLE" => Ok(Self::ManagedTable),
            "EXTERNAL_TABLE" => Ok(Self::ExternalTable),
            "VIRTUAL_VIEW" => Ok(Self::VirtualView),
            "MATERIALIZED_VIEW" => Ok(Self::MaterializedView),
            other => Err(MetastoreError::InvalidArgument(format!(
                "unknown table type '{}'",
                other
            ))),
        }
    }
}

/// Full table metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub table_name: String,
    pub db_name: String,
    pub cat_name: Option<String>,
    pub owner: Option<String>,
    pub table_type: TableType,
    pub sd: StorageDescriptor,
    pub partition_keys: Vec<FieldSchema>,
    pub parameters: HashMap<String, String>,
}

impl Table {
    pub fn new(
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        sd: StorageDescriptor,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            db_name: db_name.into(),
            cat_name: None,
            owner: None,
            table_type: TableType::ManagedTable,
            sd,
            partition_keys: Vec::new(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_catalog(mut self, cat_name: impl Into<String>) -> Self {
        self.cat_name = Some(cat_name.into());
        self
    }

    pub fn with_table_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn with_partition_keys(mut self, partition_keys: Vec<FieldSchema>) -> Self {
        self.partition_keys = partition_keys;
        self
    }

    pub fn is_partitioned(&self) -> bool {
        !self.partition_keys.is_empty()
    }
}

/// One partition of a partitioned table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Values in partition-key order.
    pub values: Vec<String>,
    pub db_name: String,
    pub table_name: String,
    pub cat_name: Option<String>,
    pub sd: StorageDescriptor,
}

impl Partition {
    pub fn new(table: &Table, values: Vec<String>, location: impl Into<String>) -> Self {
        let mut sd = table.sd.clone();
        sd.location = Some(location.into());
        Self {
            values,
            db_name: table.db_name.clone(),
            table_name: table.table_name.clone(),
            cat_name: table.cat_name.clone(),
            sd,
        }
    }
}

/// Extra key/value context passed alongside some mutating calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentContext {
    pub properties: HashMap<String, String>,
}

impl EnvironmentContext {
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Errors that can occur during metastore and dataset operations.
#[derive(Debug, Error)]
pub enum MetastoreError {
    /// Catalog, database, table or partition does not exist.
    #[error("No such object: {0}")]
    NoSuchObject(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// The metastore refused the operation (e.g. dropping a non-empty database).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Connection or protocol failure below the client boundary.
    #[error("Metastore transport error: {0}")]
    Transport(String),
    #[error("Unsupported input format '{0}'")]
    UnsupportedFormat(String),
    #[error("Unsupported storage scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("Location '{location}' does not match scheme '{expected}'")]
    SchemeMismatch { location: String, expected: String },
    #[error("Invalid storage location '{location}': {message}")]
    InvalidLocation { location: String, message: String },
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),
    #[error("Metastore error: {0}")]
    Other(String),
}

pub type MetastoreResult<T> = std::result::Result<T, MetastoreError>;

/// RPC surface of a Hive Metastore.
///
/// Mirrors the subset of `ThriftHiveMetastore` used by [`crate::HiveMetastore`].
/// Implementations wrap a transport; [`crate::memory::InMemoryMetastore`] is an
/// in-process implementation.
#[async_trait]
pub trait MetastoreClient: Send + Sync {
    /// Open the underlying transport.
    async fn open(&self) -> MetastoreResult<()>;

    /// Close the underlying transport.
    async fn close(&self) -> MetastoreResult<()>;

    async fn get_meta_conf(&self, key: &str) -> MetastoreResult<String>;

    async fn set_meta_conf(&self, key: &str, value: &str) -> MetastoreResult<()>;

    async fn get_catalogs(&self) -> MetastoreResult<Vec<String>>;

    async fn get_catalog(&self, name: &str) -> MetastoreResult<Catalog>;

    /// `pattern` is a qualified address whose database part may be a pattern.
    async fn get_databases(&self, pattern: &str) -> MetastoreResult<Vec<String>>;

    async fn get_database(&self, database_name: &str) -> MetastoreResult<Database>;

    async fn drop_database(
        &self,
        database_name: &str,
        delete_data: bool,
        cascade: bool,
    ) -> MetastoreResult<()>;

    async fn get_tables(
        &self,
        database_name: &str,
        pattern: Option<&str>,
    ) -> MetastoreResult<Vec<String>>;

    async fn get_tables_by_type(
        &self,
        database_name: &str,
        pattern: Option<&str>,
        table_type: &str,
    ) -> MetastoreResult<Vec<String>>;

    async fn get_table(&self, database_name: &str, table_name: &str) -> MetastoreResult<Table>;

    async fn drop_table_with_environment_context(
        &self,
        database_name: &str,
        table_name: &str,
        delete_data: bool,
        environment_context: Option<EnvironmentContext>,
    ) -> MetastoreResult<()>;

    async fn truncate_table(
        &self,
        database_name: &str,
        table_name: &str,
        partition_names: &[String],
    ) -> MetastoreResult<()>;

    /// `max_parts < 0` returns all partitions.
    async fn get_partitions(
        &self,
        database_name: &str,
        table_name: &str,
        max_parts: i16,
    ) -> MetastoreResult<Vec<Partition>>;

    /// Data columns of a table.
    async fn get_fields(
        &self,
        database_name: &str,
        table_name: &str,
    ) -> MetastoreResult<Vec<FieldSchema>>;

    /// Data columns followed by partition columns.
    async fn get_schema(
        &self,
        database_name: &str,
        table_name: &str,
    ) -> MetastoreResult<Vec<FieldSchema>>;
}
