// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Direct SQL query interface for metastore tables
//!
//! Executes standard SQL against a DataFusion `SessionContext` prepared by
//! [`crate::sql_catalog::build_context_from_connector`] or by hand.

use std::sync::Arc;

use arrow_array::RecordBatch;
use datafusion::execution::context::SessionContext;

use crate::error::{Result, SqlError};

/// A SQL query that can be executed against a DataFusion SessionContext.
///
/// # Example
///
/// ```no_run
/// use hive_metastore_sql::SqlQuery;
/// use datafusion::prelude::SessionContext;
///
/// # async fn example(ctx: SessionContext) -> hive_metastore_sql::Result<()> {
/// let query = SqlQuery::new("SELECT id, ds FROM orders WHERE ds = '2024-01-01'");
/// let result = query.execute_with_context(&ctx).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqlQuery {
    sql: String,
}

impl SqlQuery {
    /// Create a new SQL query from a SQL string.
    ///
    /// No parsing is done at construction time; the SQL is validated when executed.
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
        }
    }

    /// Get the SQL query text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute the SQL query and return all result rows in one `RecordBatch`.
    pub async fn execute_with_context(&self, ctx: &SessionContext) -> Result<RecordBatch> {
        let df = ctx.sql(&self.sql).await.map_err(|e| SqlError::PlanError {
            message: format!("SQL execution error: {}", e),
            location: snafu::Location::new(file!(), line!(), column!()),
        })?;
        let schema = Arc::new(arrow_schema::Schema::from(df.schema()));

        let batches = df.collect().await.map_err(|e| SqlError::ExecutionError {
            message: format!("Failed to collect SQL results: {}", e),
            location: snafu::Location::new(file!(), line!(), column!()),
        })?;

        if batches.is_empty() {
            return Ok(RecordBatch::new_empty(schema));
        }

        let schema = batches[0].schema();
        arrow::compute::concat_batches(&schema, &batches).map_err(|e| SqlError::ExecutionError {
            message: format!("Failed to concatenate result batches: {}", e),
            location: snafu::Location::new(file!(), line!(), column!()),
        })
    }

    /// Return the logical and physical plans as a formatted string.
    pub async fn explain_with_context(&self, ctx: &SessionContext) -> Result<String> {
        let df = ctx.sql(&self.sql).await.map_err(|e| SqlError::PlanError {
            message: format!("SQL explain error: {}", e),
            location: snafu::Location::new(file!(), line!(), column!()),
        })?;

        let logical_plan = df.logical_plan();

        let physical_plan = ctx
            .state()
            .create_physical_plan(logical_plan)
            .await
            .map_err(|e| SqlError::PlanError {
                message: format!("Failed to create physical plan: {}", e),
                location: snafu::Location::new(file!(), line!(), column!()),
            })?;

        let physical_plan_str = datafusion::physical_plan::displayable(physical_plan.as_ref())
            .indent(true)
            .to_string();

        Ok(format!(
            "== Logical Plan ==\n{}\n\n== Physical Plan ==\n{}",
            logical_plan.display_indent(),
            physical_plan_str,
        ))
    }
}
