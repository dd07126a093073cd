//! User account repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `users.email` is UNIQUE; a duplicate insert surfaces as
//!   `RepoError::ConstraintViolation`.
//! - Write paths call `User::validate()` before SQL mutations.

use crate::model::user::User;
use crate::repo::ensure_tables;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::pagination::{PageResult, Pagination};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password,
    memo,
    created_at,
    updated_at
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    fn save_user(&self, user: &User) -> RepoResult<()>;
    fn find_user_by_id(&self, id: &str) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Overwrites name, password, memo and `updated_at`.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn list_users(&self, page: Pagination) -> RepoResult<PageResult<User>>;
    fn delete_user(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }

    fn find_one(&self, column: &str, value: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn save_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (id, name, email, password, memo, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                user.id,
                user.name,
                user.email,
                user.password,
                user.memo,
                user.created_at,
                user.updated_at,
            ],
        )?;
        Ok(())
    }

    fn find_user_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        self.find_one("id", id)
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("email", email)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET name = ?2, password = ?3, memo = ?4, updated_at = ?5
             WHERE id = ?1;",
            params![
                user.id,
                user.name,
                user.password,
                user.memo,
                user.updated_at
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::user_not_found(&user.id));
        }
        Ok(())
    }

    fn list_users(&self, page: Pagination) -> RepoResult<PageResult<User>> {
        let total_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} ORDER BY created_at ASC, id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![page.limit(), page.offset()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_user_row(row)?);
        }

        Ok(PageResult {
            total_count: total_count as u64,
            items,
        })
    }

    fn delete_user(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::user_not_found(id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password: row.get("password")?,
        memo: row.get("memo")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
