use rusqlite::{Result, Row};

use super::{now_ts, Storage, User};

impl Storage {
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (id, email, username, full_name, division, role, status, user_status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            (
                &user.id,
                &user.email,
                &user.username,
                &user.full_name,
                &user.division,
                &user.role,
                &user.status,
                &user.user_status,
                user.created_at,
                user.updated_at,
            ),
        )?;
        Ok(())
    }

    pub fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, username, full_name, division, role, status, user_status, created_at, updated_at FROM users WHERE id = ?1",
        )?;
        let mut rows = stmt.query([user_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_user_row(row)?)),
            None => Ok(None),
        }
    }

    /// Writes the status to both status columns. Older schema revisions read
    /// `user_status` while newer ones read `status`; keeping them in lockstep
    /// serves both.
    pub fn update_user_status(&self, user_id: &str, status: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET status = ?1, user_status = ?1, updated_at = ?2 WHERE id = ?3",
            (status, now_ts(), user_id),
        )?;
        Ok(())
    }

    pub fn update_user_role(&self, user_id: &str, role: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
            (role, now_ts(), user_id),
        )?;
        Ok(())
    }

    pub fn delete_user(&self, user_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", [user_id])?;
        Ok(())
    }

    pub fn user_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(1) FROM users", [], |row| row.get(0))
    }
}

fn map_user_row(row: &Row<'_>) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        full_name: row.get(3)?,
        division: row.get(4)?,
        role: row.get(5)?,
        status: row.get(6)?,
        user_status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
