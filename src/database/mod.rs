//! SQLite persistence for source tables and report jobs.
//!
//! ## Architecture
//!
//! The `Database` struct directly implements the operation traits:
//! - `SourceOperations` - observations, business hours, timezones, snapshots
//! - `ReportOperations` - report job records and their status transitions

pub mod helpers;
mod reports;
pub mod schema;
mod sources;
pub mod traits;

pub use helpers::*;
pub use schema::setup_schema;
pub use traits::*;

use crate::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// The main database interface.
///
/// Holds a single SQLite connection; all operations come through trait
/// implementations.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Open (or create) a database and initialise the schema.
    ///
    /// Parent directories are created for file-backed paths.
    pub fn new(database_path: &str) -> AppResult<Self> {
        if database_path != ":memory:" {
            if let Some(parent) = Path::new(database_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let connection = Connection::open(database_path)?;
        setup_schema(&connection)?;

        info!("Database initialised at: {}", database_path);
        Ok(Self { connection })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Execute a function within a database transaction
    pub fn execute_transaction<F, R>(&mut self, f: F) -> AppResult<R>
    where
        F: FnOnce(&rusqlite::Transaction) -> AppResult<R>,
    {
        let tx = self.connection.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

impl DatabaseConnection for Database {
    fn connection(&self) -> &Connection {
        &self.connection
    }
}
