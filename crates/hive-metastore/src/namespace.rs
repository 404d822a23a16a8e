// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Catalog-qualified database names.
//!
//! The metastore RPC interface predates catalogs and only accepts a single
//! database name. A catalog is smuggled through that argument as
//! `@<catalog>#<database>`:
//!
//! | call                                   | encoded         |
//! |----------------------------------------|-----------------|
//! | `(Some("sales"), Some("spark"))`       | `@spark#sales`  |
//! | `(Some(""), Some("spark"))`            | `@spark#!`      |
//! | `(None, Some("spark"))`                | `@spark#`       |
//! | `(Some("sales"), None)`                | `@hive#sales`   |
//!
//! The marker and separator characters must not appear in catalog or database
//! names; no escaping is performed.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_CATALOG_NAME: &str = "hive";
pub const DEFAULT_DATABASE_NAME: &str = "default";

pub const CATALOG_DB_THRIFT_NAME_MARKER: char = '@';
pub const CATALOG_DB_SEPARATOR: char = '#';
pub const DB_EMPTY_MARKER: char = '!';
pub const CAT_DB_TABLE_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    #[error("qualified database name '{0}' is missing the '#' separator")]
    MissingSeparator(String),
    #[error("qualified database name '{0}' has an empty catalog")]
    EmptyCatalog(String),
}

/// Encode a catalog and optional database (or pattern) into one address.
///
/// `catalog` defaults to [`DEFAULT_CATALOG_NAME`]. `database = None` addresses
/// the catalog alone, while `Some("")` is encoded as [`DB_EMPTY_MARKER`].
pub fn prepend_catalog_to_database(database: Option<&str>, catalog: Option<&str>) -> String {
    let catalog = catalog.unwrap_or(DEFAULT_CATALOG_NAME);
    QualifiedDatabase::new(catalog, database).to_string()
}

/// A decoded catalog-qualified database address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedDatabase {
    pub catalog: String,
    /// `None` when only the catalog is addressed; `Some("")` for an
    /// explicitly empty database name.
    pub database: Option<String>,
}

impl QualifiedDatabase {
    pub fn new(catalog: impl Into<String>, database: Option<&str>) -> Self {
        Self {
            catalog: catalog.into(),
            database: database.map(str::to_string),
        }
    }
}

impl fmt::Display for QualifiedDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CATALOG_DB_THRIFT_NAME_MARKER}{}{CATALOG_DB_SEPARATOR}",
            self.catalog
        )?;
        match self.database.as_deref() {
            Some("") => write!(f, "{DB_EMPTY_MARKER}"),
            Some(database) => f.write_str(database),
            None => Ok(()),
        }
    }
}

/// Decode an address produced by [`prepend_catalog_to_database`].
///
/// Names without the leading marker are plain database names and resolve to
/// `default_catalog`.
pub fn parse_qualified_database(
    name: &str,
    default_catalog: &str,
) -> Result<QualifiedDatabase, NamespaceError> {
    let Some(rest) = name.strip_prefix(CATALOG_DB_THRIFT_NAME_MARKER) else {
        return Ok(QualifiedDatabase::new(default_catalog, Some(name)));
    };
    let Some((catalog, database)) = rest.split_once(CATALOG_DB_SEPARATOR) else {
        return Err(NamespaceError::MissingSeparator(name.to_string()));
    };
    if catalog.is_empty() {
        return Err(NamespaceError::EmptyCatalog(name.to_string()));
    }

    let database = if database.is_empty() {
        None
    } else if database.chars().eq([DB_EMPTY_MARKER]) {
        Some("")
    } else {
        Some(database)
    };
    Ok(QualifiedDatabase::new(catalog, database))
}

/// Render `catalog.database.table`.
pub fn qualified_table_name(catalog: &str, database: &str, table: &str) -> String {
    format!("{catalog}{CAT_DB_TABLE_SEPARATOR}{database}{CAT_DB_TABLE_SEPARATOR}{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_catalog() {
        assert_eq!(
            prepend_catalog_to_database(Some("default"), Some("hive")),
            "@hive#default"
        );
        assert_eq!(
            prepend_catalog_to_database(Some("sales"), Some("spark")),
            "@spark#sales"
        );
    }

    #[test]
    fn test_prepend_catalog_defaults_catalog() {
        assert_eq!(prepend_catalog_to_database(Some("db"), None), "@hive#db");
        assert_eq!(prepend_catalog_to_database(None, None), "@hive#");
    }

    #[test]
    fn test_prepend_catalog_empty_database_uses_marker() {
        assert_eq!(prepend_catalog_to_database(Some(""), Some("hive")), "@hive#!");
        assert_eq!(prepend_catalog_to_database(None, Some("hive")), "@hive#");
    }

    #[test]
    fn test_prepend_catalog_passes_patterns_through() {
        assert_eq!(
            prepend_catalog_to_database(Some("sales_*|ops"), Some("hive")),
            "@hive#sales_*|ops"
        );
    }

    #[test]
    fn test_parse_qualified_database() {
        assert_eq!(
            parse_qualified_database("@spark#sales", "hive").unwrap(),
            QualifiedDatabase::new("spark", Some("sales"))
        );
        assert_eq!(
            parse_qualified_database("@spark#", "hive").unwrap(),
            QualifiedDatabase::new("spark", None)
        );
        assert_eq!(
            parse_qualified_database("@spark#!", "hive").unwrap(),
            QualifiedDatabase::new("spark", Some(""))
        );
        assert_eq!(
            parse_qualified_database("sales", "hive").unwrap(),
            QualifiedDatabase::new("hive", Some("sales"))
        );
    }

    #[test]
    fn test_parse_qualified_database_errors() {
        assert_eq!(
            parse_qualified_database("@spark", "hive").unwrap_err(),
            NamespaceError::MissingSeparator("@spark".into())
        );
        assert_eq!(
            parse_qualified_database("@#db", "hive").unwrap_err(),
            NamespaceError::EmptyCatalog("@#db".into())
        );
    }

    #[test]
    fn test_round_trip() {
        for (database, catalog) in [
            (Some("default"), Some("hive")),
            (Some(""), Some("hive")),
            (None, Some("spark")),
            (Some("db_1"), None),
        ] {
            let encoded = prepend_catalog_to_database(database, catalog);
            let decoded = parse_qualified_database(&encoded, "unused").unwrap();
            assert_eq!(decoded.catalog, catalog.unwrap_or(DEFAULT_CATALOG_NAME));
            assert_eq!(decoded.database.as_deref(), database);
            assert_eq!(decoded.to_string(), encoded);
        }
    }

    #[test]
    fn test_qualified_table_name() {
        assert_eq!(qualified_table_name("hive", "default", "t"), "hive.default.t");
    }
}
