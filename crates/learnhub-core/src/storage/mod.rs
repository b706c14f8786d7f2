use rusqlite::{Connection, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

mod request_logs;
mod users;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub division: Option<String>,
    pub role: Option<String>,
    pub status: String,
    pub user_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct RequestLog {
    pub request_path: String,
    pub method: String,
    pub upstream_url: Option<String>,
    pub status_code: Option<i64>,
    pub error: Option<String>,
    pub created_at: i64,
}

#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        // 中文注释：并发写入时给 SQLite 一点等待时间，避免瞬时 lock 导致请求直接失败。
        conn.busy_timeout(Duration::from_millis(3000))?;
        Ok(Self { conn })
    }

    /// Opens the database with the privileged SQLCipher key applied. The
    /// direct write path is only available through this entry point.
    pub fn open_encrypted(path: impl AsRef<Path>, key: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "key", key)?;
        conn.busy_timeout(Duration::from_millis(3000))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_millis(3000))?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.ensure_migrations_table()?;
        self.apply_sql_migration("001_users", include_str!("../../migrations/001_users.sql"))?;
        self.apply_sql_migration(
            "002_request_logs",
            include_str!("../../migrations/002_request_logs.sql"),
        )
    }

    fn ensure_migrations_table(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (name TEXT PRIMARY KEY, applied_at INTEGER NOT NULL)",
            [],
        )?;
        Ok(())
    }

    fn apply_sql_migration(&self, name: &str, sql: &str) -> Result<()> {
        let applied: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM schema_migrations WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        if applied > 0 {
            return Ok(());
        }
        self.conn.execute_batch(sql)?;
        self.conn.execute(
            "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, ?2)",
            (name, now_ts()),
        )?;
        Ok(())
    }
}

pub fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|v| v.as_secs() as i64)
        .unwrap_or(0)
}
