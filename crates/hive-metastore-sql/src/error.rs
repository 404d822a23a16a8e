// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

use hive_metastore::MetastoreError;
use snafu::{Location, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SqlError {
    #[snafu(display("Metastore error: {source}, {location}"))]
    Metastore {
        source: MetastoreError,
        location: Location,
    },

    #[snafu(display("Plan error: {message}, {location}"))]
    PlanError { message: String, location: Location },

    #[snafu(display("Execution error: {message}, {location}"))]
    ExecutionError { message: String, location: Location },
}

pub type Result<T> = std::result::Result<T, SqlError>;

impl From<MetastoreError> for SqlError {
    #[track_caller]
    fn from(source: MetastoreError) -> Self {
        let caller = std::panic::Location::caller();
        Self::Metastore {
            source,
            location: Location::new(caller.file(), caller.line(), caller.column()),
        }
    }
}
