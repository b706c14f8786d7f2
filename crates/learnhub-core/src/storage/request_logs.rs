use rusqlite::Result;

use super::{RequestLog, Storage};

impl Storage {
    pub fn insert_request_log(&self, log: &RequestLog) -> Result<()> {
        self.conn.execute(
            "INSERT INTO request_logs (request_path, method, upstream_url, status_code, error, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &log.request_path,
                &log.method,
                &log.upstream_url,
                log.status_code,
                &log.error,
                log.created_at,
            ),
        )?;
        Ok(())
    }

    pub fn request_log_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(1) FROM request_logs", [], |row| row.get(0))
    }

    pub fn list_request_logs(&self, limit: i64) -> Result<Vec<RequestLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT request_path, method, upstream_url, status_code, error, created_at FROM request_logs ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(RequestLog {
                request_path: row.get(0)?,
                method: row.get(1)?,
                upstream_url: row.get(2)?,
                status_code: row.get(3)?,
                error: row.get(4)?,
                created_at: row.get(5)?,
            });
        }
        Ok(out)
    }
}
