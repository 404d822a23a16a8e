// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Bridge between the metastore connector and the SQL query engine.
//!
//! Builds DataFusion `SessionContext`s from a [`Connector`] so metastore
//! tables can be queried via [`crate::SqlQuery`].

use std::sync::Arc;

use arrow_array::RecordBatch;
use datafusion::execution::context::SessionContext;
use hive_metastore::Connector;

use crate::error::{Result, SqlError};

/// Build a DataFusion `SessionContext` with all tables of a database
/// registered.
///
/// Tables that cannot be registered are skipped (see
/// [`Connector::register_database`]).
///
/// # Example
///
/// ```no_run
/// # use hive_metastore_sql::sql_catalog::build_context_from_connector;
/// # use hive_metastore::Connector;
/// # async fn example(connector: &Connector) {
/// let ctx = build_context_from_connector(connector, "default", None)
///     .await
///     .unwrap();
/// // ctx now has all tables from hive.default registered
/// # }
/// ```
pub async fn build_context_from_connector(
    connector: &Connector,
    database_name: &str,
    catalog_name: Option<&str>,
) -> Result<SessionContext> {
    let ctx = SessionContext::new();
    let registered = connector
        .register_database(&ctx, database_name, catalog_name)
        .await?;
    tracing::info!(
        database = database_name,
        tables = registered.len(),
        "built session context from metastore"
    );
    Ok(ctx)
}

/// Read a whole metastore table into one `RecordBatch`.
///
/// Partition columns come after the data columns.
pub async fn table_to_record_batch(
    connector: &Connector,
    table_name: &str,
    database_name: &str,
    catalog_name: Option<&str>,
) -> Result<RecordBatch> {
    let ctx = SessionContext::new();
    let (name, _) = connector
        .register_table(&ctx, table_name, database_name, catalog_name)
        .await?;

    let df = ctx.table(name.as_str()).await.map_err(|e| SqlError::PlanError {
        message: format!("Failed to scan table '{}': {}", name, e),
        location: snafu::Location::new(file!(), line!(), column!()),
    })?;
    let schema = Arc::new(arrow_schema::Schema::from(df.schema()));
    let batches = df.collect().await.map_err(|e| SqlError::ExecutionError {
        message: format!("Failed to read table '{}': {}", name, e),
        location: snafu::Location::new(file!(), line!(), column!()),
    })?;

    arrow::compute::concat_batches(&schema, &batches).map_err(|e| SqlError::ExecutionError {
        message: format!("Failed to concatenate batches of '{}': {}", name, e),
        location: snafu::Location::new(file!(), line!(), column!()),
    })
}
