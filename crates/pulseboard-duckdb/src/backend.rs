use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::schema::{init_sql, MIGRATIONS, MIGRATIONS_TABLE_SQL};

/// DuckDB storage for the dashboard's three record collections.
///
/// DuckDB is single-writer, so the connection sits behind `Arc<Mutex<_>>`:
/// every handler serialises through the lock while the struct stays cheap to
/// share across Axum handlers.
///
/// The memory limit is applied by [`init_sql`] at open time and is
/// configurable via `PULSEBOARD_DUCKDB_MEMORY` (default `"1GB"`).
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a database file at `path`.
    ///
    /// Creates the tables if missing, then applies pending [`MIGRATIONS`].
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::prepare(&conn, memory_limit)?;
        info!(path, memory_limit, "DuckDB opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Data is discarded on drop.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(&conn, "1GB")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn prepare(conn: &Connection, memory_limit: &str) -> Result<()> {
        conn.execute_batch(MIGRATIONS_TABLE_SQL)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        Self::apply_migrations_sync(conn)
    }

    fn apply_migrations_sync(conn: &Connection) -> Result<()> {
        for (id, sql) in MIGRATIONS {
            let applied: i64 = conn
                .prepare("SELECT COUNT(*) FROM _migrations WHERE id = ?1")?
                .query_row(duckdb::params![id], |row| row.get(0))?;
            if applied > 0 {
                continue;
            }
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO _migrations (id) VALUES (?1)",
                duckdb::params![id],
            )?;
            info!(migration = id, "migration applied");
        }
        Ok(())
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    ///
    /// Called by the `/health` endpoint.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Acquire the connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
