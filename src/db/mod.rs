mod models;
mod seeders;

pub use models::*;
pub use seeders::ensure_super_admin;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub type DbPool = SqlitePool;

/// Split a migration into statements. Comment lines are dropped before
/// splitting, so a `;` inside a comment never ends a statement.
fn split_statements(sql: &str) -> Vec<String> {
    let without_comments = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Execute a SQL migration file statement by statement
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in split_statements(sql) {
        sqlx::query(&statement).execute(pool).await?;
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("folio.db");

    info!("Initializing database at {}", db_path.display());

    // Pragmas go on the connect options so every pooled connection gets them
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Single-connection in-memory database with the full schema.
///
/// The connection never expires, otherwise the database would vanish with it.
pub async fn init_in_memory() -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: users and portfolio content
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TABLES: [&str; 8] = [
        "articles",
        "experiences",
        "messages",
        "profiles",
        "projects",
        "skills",
        "socials",
        "users",
    ];

    async fn table_names(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_as::<_, (String,)>(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|(name,)| name)
        .collect()
    }

    #[test]
    fn test_split_statements_ignores_comments() {
        let sql = "-- header; with a semicolon\nCREATE TABLE a (id TEXT);\n\n  -- trailing; note\nCREATE TABLE b (id TEXT);\n";
        assert_eq!(
            split_statements(sql),
            vec!["CREATE TABLE a (id TEXT)", "CREATE TABLE b (id TEXT)"]
        );
    }

    #[test]
    fn test_migration_statements_are_whole() {
        let statements = split_statements(include_str!("../../migrations/001_initial.sql"));
        assert!(!statements.is_empty());
        for statement in &statements {
            assert!(
                statement.starts_with("CREATE") || statement.starts_with("PRAGMA"),
                "unexpected statement start: {}",
                statement
            );
        }
    }

    #[tokio::test]
    async fn test_init_creates_schema_on_disk() {
        let dir = TempDir::new().unwrap();
        let pool = init(dir.path()).await.unwrap();

        let names = table_names(&pool).await;
        for table in TABLES {
            assert!(names.iter().any(|n| n == table), "missing table {}", table);
        }
        assert!(dir.path().join("folio.db").exists());

        // Re-running the migration on an existing database is harmless
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_schema_matches() {
        let pool = init_in_memory().await.unwrap();
        let names = table_names(&pool).await;
        for table in TABLES {
            assert!(names.iter().any(|n| n == table), "missing table {}", table);
        }
    }
}
