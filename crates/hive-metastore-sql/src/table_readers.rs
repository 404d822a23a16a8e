// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Built-in [`TableReader`] implementations.
//!
//! - [`HiveParquetTableReader`]: reads Parquet tables, including Hive-style
//!   `key=value` partition directories, through a DataFusion `ListingTable`.

use std::sync::Arc;

use async_trait::async_trait;
use arrow_schema::DataType;
use datafusion::common::{Column, ScalarValue};
use datafusion::datasource::file_format::parquet::ParquetFormat;
use datafusion::datasource::listing::{
    ListingOptions, ListingTable, ListingTableConfig, ListingTableUrl,
};
use datafusion::datasource::{MemTable, TableProvider};
use datafusion::execution::context::SessionContext;
use datafusion::logical_expr::utils::{conjunction, disjunction};
use datafusion::logical_expr::{lit, Expr};
use url::Url;

use hive_metastore::{
    DataSourceFormat, HiveTableSource, MetastoreError, MetastoreResult, TableReader,
};

use crate::storage::StorageConfig;

/// Reads Parquet tables rooted at the table location.
///
/// Partition values are taken from the directory names under the root, so
/// every partition must live below it. Only partitions registered in the
/// metastore are read; other `key=value` directories under the root are
/// filtered out.
#[derive(Debug, Clone, Default)]
pub struct HiveParquetTableReader {
    storage: StorageConfig,
    file_extension: String,
}

impl HiveParquetTableReader {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            file_extension: String::new(),
        }
    }

    /// Only read files with this extension. Hive writers often omit one, so
    /// by default every file under the root is read.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }
}

#[async_trait]
impl TableReader for HiveParquetTableReader {
    fn name(&self) -> &str {
        "parquet"
    }

    fn supported_formats(&self) -> &[DataSourceFormat] {
        &[DataSourceFormat::Parquet]
    }

    async fn register_table(
        &self,
        ctx: &SessionContext,
        table_name: &str,
        source: &HiveTableSource,
    ) -> MetastoreResult<()> {
        let root = directory_url(&source.root_location)?;
        if source.is_partitioned() {
            for location in &source.locations {
                let partition = directory_url(location)?;
                if !partition.as_str().starts_with(root.as_str()) {
                    return Err(MetastoreError::InvalidLocation {
                        location: location.clone(),
                        message: format!("partition is outside table root '{}'", root),
                    });
                }
            }
        }

        if source.is_partitioned() && source.partition_values.is_empty() {
            tracing::debug!(
                table = %source.qualified_name(),
                "no registered partitions, registering empty table"
            );
            let table = MemTable::try_new(source.schema.clone(), vec![])?;
            ctx.register_table(table_name, Arc::new(table))?;
            return Ok(());
        }

        self.storage.register_object_store(ctx, &root)?;

        let options = ListingOptions::new(Arc::new(ParquetFormat::default()))
            .with_file_extension(&self.file_extension)
            .with_table_partition_cols(source.partition_columns.clone());
        let config = ListingTableConfig::new(ListingTableUrl::parse(root.as_str())?)
            .with_listing_options(options)
            .with_schema(source.file_schema.clone());
        let table: Arc<dyn TableProvider> = Arc::new(ListingTable::try_new(config)?);
        let table = match registered_partitions_filter(source) {
            Some(predicate) => ctx.read_table(table)?.filter(predicate)?.into_view(),
            None => table,
        };

        tracing::debug!(
            table = %source.qualified_name(),
            root = %root,
            partitions = source.partition_values.len(),
            "registering parquet listing table"
        );
        ctx.register_table(table_name, table)?;
        Ok(())
    }
}

/// Predicate matching the partitions registered in the metastore, or `None`
/// for unpartitioned tables.
fn registered_partitions_filter(source: &HiveTableSource) -> Option<Expr> {
    if let [(name, data_type)] = source.partition_columns.as_slice() {
        let values = source
            .partition_values
            .iter()
            .filter_map(|values| values.first())
            .map(|value| lit(partition_value(value, data_type)))
            .collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        return Some(partition_column(name).in_list(values, false));
    }

    let partitions = source.partition_values.iter().filter_map(|values| {
        conjunction(
            source
                .partition_columns
                .iter()
                .zip(values)
                .map(|((name, data_type), value)| {
                    partition_column(name).eq(lit(partition_value(value, data_type)))
                }),
        )
    });
    disjunction(partitions)
}

fn partition_column(name: &str) -> Expr {
    Expr::Column(Column::new_unqualified(name))
}

/// Typed literal for a partition value, falling back to the raw string when
/// it does not parse as the column type.
fn partition_value(value: &str, data_type: &DataType) -> ScalarValue {
    ScalarValue::try_from_string(value.to_string(), data_type)
        .unwrap_or_else(|_| ScalarValue::Utf8(Some(value.to_string())))
}

/// Parse `location` as a directory URL (with a trailing `/`).
fn directory_url(location: &str) -> MetastoreResult<Url> {
    let location = if location.ends_with('/') {
        location.to_string()
    } else {
        format!("{}/", location)
    };
    Url::parse(&location).map_err(|e| MetastoreError::InvalidLocation {
        location,
        message: e.to_string(),
    })
}

/// Returns the default set of table readers.
pub fn default_table_readers(storage: StorageConfig) -> Vec<Arc<dyn TableReader>> {
    vec![Arc::new(HiveParquetTableReader::new(storage))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::logical_expr::Operator;
    use hive_metastore::{StorageDescriptor, Table};

    #[test]
    fn test_directory_url() {
        assert_eq!(
            directory_url("s3a://bucket/warehouse/t").unwrap().as_str(),
            "s3a://bucket/warehouse/t/"
        );
        assert_eq!(
            directory_url("file:///tmp/t/").unwrap().as_str(),
            "file:///tmp/t/"
        );
        assert!(directory_url("not a url").is_err());
    }

    fn source(partition_columns: &[(&str, DataType)], values: &[&[&str]]) -> HiveTableSource {
        let schema = Arc::new(arrow_schema::Schema::empty());
        HiveTableSource {
            table: Table::new("sales", "orders", StorageDescriptor::default()),
            schema: schema.clone(),
            file_schema: schema,
            partition_columns: partition_columns
                .iter()
                .map(|(name, data_type)| (name.to_string(), data_type.clone()))
                .collect(),
            root_location: "file:///warehouse/orders".to_string(),
            locations: vec![],
            partition_values: values
                .iter()
                .map(|v| v.iter().map(|s| s.to_string()).collect())
                .collect(),
            scheme: "file".to_string(),
            format: DataSourceFormat::Parquet,
        }
    }

    #[test]
    fn test_registered_partitions_filter() {
        assert!(registered_partitions_filter(&source(&[], &[])).is_none());

        let single = source(&[("ds", DataType::Utf8)], &[&["a"], &["b"]]);
        match registered_partitions_filter(&single) {
            Some(Expr::InList(in_list)) => {
                assert_eq!(in_list.list.len(), 2);
                assert!(!in_list.negated);
            }
            other => panic!("expected IN list, got {:?}", other),
        }

        let multi = source(
            &[("ds", DataType::Utf8), ("hr", DataType::Int32)],
            &[&["a", "1"], &["b", "2"]],
        );
        match registered_partitions_filter(&multi) {
            Some(Expr::BinaryExpr(binary)) => assert_eq!(binary.op, Operator::Or),
            other => panic!("expected OR of partitions, got {:?}", other),
        }
    }

    #[test]
    fn test_partition_value() {
        assert_eq!(partition_value("7", &DataType::Int32), ScalarValue::Int32(Some(7)));
        assert_eq!(
            partition_value("2024-01-01", &DataType::Utf8),
            ScalarValue::Utf8(Some("2024-01-01".to_string()))
        );
        assert_eq!(
            partition_value("x", &DataType::Int32),
            ScalarValue::Utf8(Some("x".to_string()))
        );
    }

    #[test]
    fn test_default_readers() {
        let readers = default_table_readers(StorageConfig::default());
        assert_eq!(readers.len(), 1);
        assert_eq!(readers[0].name(), "parquet");
        assert_eq!(readers[0].supported_formats(), &[DataSourceFormat::Parquet]);
    }
}
