/// Administrator accounts
///
/// Admins register themselves and log in with a username and password.
/// Accounts are never modified or removed once created.
use crate::{
    auth::password::{hash_password, verify_dummy, verify_password},
    db::{format_timestamp, parse_timestamp},
    error::{AppError, AppResult},
    validation::AdminRegistration,
};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Admin account record (the password hash stays in the store)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Admin account manager
#[derive(Clone)]
pub struct AdminManager {
    db: SqlitePool,
}

impl AdminManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an admin account from validated registration input.
    ///
    /// A taken username is reported as `Conflict` and nothing is written.
    pub async fn register(&self, registration: &AdminRegistration) -> AppResult<Admin> {
        let password_hash = hash_password(&registration.password)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO admins (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(&registration.username)
        .bind(&password_hash)
        .bind(format_timestamp(&now))
        .execute(&self.db)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                info!(username = %registration.username, "admin username already taken");
                return Err(AppError::Conflict(
                    "This admin username already exists.".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let admin = Admin {
            id: result.last_insert_rowid(),
            username: registration.username.clone(),
            created_at: now,
        };
        info!(admin_id = admin.id, username = %admin.username, "admin registered");
        Ok(admin)
    }

    /// Check credentials. Returns `None` for an unknown username or a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<Admin>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM admins WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            verify_dummy(password);
            return Ok(None);
        };

        let password_hash: String = row.get("password_hash");
        if !verify_password(password, &password_hash) {
            return Ok(None);
        }

        Ok(Some(parse_admin(&row)?))
    }

    /// Get admin by ID
    pub async fn get_admin(&self, id: i64) -> AppResult<Option<Admin>> {
        let row = sqlx::query("SELECT id, username, created_at FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(parse_admin).transpose()
    }
}

fn parse_admin(row: &sqlx::sqlite::SqliteRow) -> AppResult<Admin> {
    let created_at: String = row.get("created_at");
    Ok(Admin {
        id: row.get("id"),
        username: row.get("username"),
        created_at: parse_timestamp(&created_at)?,
    })
}
