//! Database module providing connection management, migrations, and queries.

pub mod api_keys;
pub mod backup;
pub mod catalog;
pub mod client_versions;
pub mod reports;
pub mod templates;
pub mod version;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// MySQL error code for a missing table.
const ER_NO_SUCH_TABLE: &str = "1146";

/// Shared SeaORM connection pool.
///
/// Cloning is cheap; every clone uses the same underlying pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        info!(
            "Connected to database (pool {}..{})",
            config.database.min_connections, config.database.max_connections
        );

        Ok(DbPool { conn })
    }

    /// Wrap an existing connection, e.g. a mock connection in tests.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply pending schema migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Whether a database error reports a missing table.
pub fn is_missing_table(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains(ER_NO_SUCH_TABLE) || message.contains("doesn't exist")
}
