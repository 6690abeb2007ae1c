use crate::common::error::{BackendError, Result};
use libsql::{Builder, Connection, Database};
use std::env;
use std::path::Path;
use tracing::info;

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Create a database manager from environment settings.
    ///
    /// Connects to a Turso remote when `LIBSQL_URL` is set; otherwise opens
    /// a local SQLite file at `DATABASE_PATH` (default `data/onboard.db`).
    pub async fn from_env() -> Result<Self> {
        match env::var("LIBSQL_URL") {
            Ok(url) => {
                let auth_token =
                    env::var("LIBSQL_AUTH_TOKEN").map_err(|_| BackendError::Database {
                        message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
                    })?;

                info!("Connecting to Turso database at {}", url);

                let db = Builder::new_remote(url, auth_token)
                    .build()
                    .await
                    .map_err(|e| BackendError::Database {
                        message: format!("Failed to connect to database: {e}"),
                    })?;

                Ok(Self { db })
            }
            Err(_) => {
                let path =
                    env::var("DATABASE_PATH").unwrap_or_else(|_| "data/onboard.db".to_string());
                Self::open_local(&path).await
            }
        }
    }

    /// Open a local database file, creating parent directories as needed.
    pub async fn open_local(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening local database at {}", path);

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| BackendError::Database {
                message: format!("Failed to open database: {e}"),
            })?;

        Ok(Self { db })
    }

    /// Get a connection to the database
    pub async fn get_connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| BackendError::Database {
            message: format!("Failed to get database connection: {e}"),
        })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;

        let migration_sql = include_str!("../migrations/001_init.sql");

        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| BackendError::Database {
                message: format!("Failed to run migrations: {e}"),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

/// Read a nullable text column without guessing at the driver's coercions.
pub(crate) fn opt_text(row: &libsql::Row, idx: i32) -> Result<Option<String>> {
    match row.get_value(idx)? {
        libsql::Value::Null => Ok(None),
        libsql::Value::Text(s) => Ok(Some(s)),
        other => Err(BackendError::Database {
            message: format!("Unexpected value in text column {idx}: {other:?}"),
        }),
    }
}

/// Read a nullable integer column.
pub(crate) fn opt_i64(row: &libsql::Row, idx: i32) -> Result<Option<i64>> {
    match row.get_value(idx)? {
        libsql::Value::Null => Ok(None),
        libsql::Value::Integer(n) => Ok(Some(n)),
        other => Err(BackendError::Database {
            message: format!("Unexpected value in integer column {idx}: {other:?}"),
        }),
    }
}
