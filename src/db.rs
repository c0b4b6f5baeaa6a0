use migration::Migrator;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, SqlxSqliteConnector, Statement,
    sqlx::{
        ConnectOptions as _,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    },
};
use sea_orm_migration::MigratorTrait;

use crate::error::{AppError, AppResult};

const PRAGMAS: [&str; 3] =
    ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"];

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = if database_url.contains(":memory:") {
        connect_in_memory(database_url).await?
    } else {
        let mut options = ConnectOptions::new(database_url);
        options.sqlx_logging(false);
        Database::connect(options).await?
    };

    for pragma in PRAGMAS {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    Migrator::up(&db, None).await?;
    tracing::debug!("database migrated");
    Ok(db)
}

/// An in-memory database lives and dies with its connection, so the pool holds
/// exactly one and never recycles it.
async fn connect_in_memory(database_url: &str) -> AppResult<DatabaseConnection> {
    let options = database_url
        .parse::<SqliteConnectOptions>()
        .map_err(|err| AppError::Internal(err.into()))?
        .disable_statement_logging();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_keeps_its_only_connection() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        let pool = db.get_sqlite_connection_pool().options();

        assert_eq!(pool.get_max_connections(), 1);
        assert_eq!(pool.get_min_connections(), 1);
        assert_eq!(pool.get_idle_timeout(), None);
        assert_eq!(pool.get_max_lifetime(), None);
    }
}
