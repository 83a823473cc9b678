/// Versioned schema migrations
///
/// Migrations run in order at startup. Each step is guarded by a check of
/// the live schema (table, column or index existence), so databases created
/// by older releases are upgraded in place and a rerun is a no-op. Applied
/// versions are recorded in `schema_migrations`.
use crate::error::{AppError, AppResult};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// What a migration changes, and how to tell whether it is already there
#[derive(Debug, Clone, Copy)]
pub enum Step {
    CreateTable {
        table: &'static str,
        sql: &'static str,
    },
    AddColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
    CreateIndex {
        index: &'static str,
        sql: &'static str,
    },
    /// Data fix that is idempotent by construction
    Backfill { sql: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: &'static str,
    pub step: Step,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "m20240101_000001_create_admins",
        step: Step::CreateTable {
            table: "admins",
            sql: r#"
            CREATE TABLE admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        },
    },
    Migration {
        version: "m20240101_000002_create_complaints",
        step: Step::CreateTable {
            table: "complaints",
            sql: r#"
            CREATE TABLE complaints (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                roll_number TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending',
                staff_assigned TEXT,
                remarks TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        },
    },
    Migration {
        version: "m20240215_000001_add_complaint_hostel_block",
        step: Step::AddColumn {
            table: "complaints",
            column: "hostel_block",
            definition: "TEXT NOT NULL DEFAULT ''",
        },
    },
    Migration {
        version: "m20240215_000002_add_complaint_room_number",
        step: Step::AddColumn {
            table: "complaints",
            column: "room_number",
            definition: "TEXT NOT NULL DEFAULT ''",
        },
    },
    Migration {
        version: "m20240301_000001_add_complaint_priority",
        step: Step::AddColumn {
            table: "complaints",
            column: "priority",
            definition: "TEXT NOT NULL DEFAULT 'Medium'",
        },
    },
    Migration {
        version: "m20240301_000002_add_complaint_updated_at",
        step: Step::AddColumn {
            table: "complaints",
            column: "updated_at",
            definition: "TEXT",
        },
    },
    Migration {
        version: "m20240301_000003_backfill_complaint_updated_at",
        step: Step::Backfill {
            sql: "UPDATE complaints SET updated_at = created_at WHERE updated_at IS NULL",
        },
    },
    Migration {
        version: "m20240410_000001_index_complaints_owner_status",
        step: Step::CreateIndex {
            index: "idx_complaints_roll_number_status",
            sql: "CREATE INDEX idx_complaints_roll_number_status ON complaints (roll_number, status)",
        },
    },
];

/// Apply every pending migration
pub async fn run_migrations(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for migration in MIGRATIONS {
        apply(pool, migration).await.map_err(|e| AppError::Migration {
            version: migration.version,
            message: e.to_string(),
        })?;
    }

    Ok(())
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> AppResult<()> {
    let already_present = match migration.step {
        Step::CreateTable { table, .. } => schema_object_exists(pool, "table", table).await?,
        Step::AddColumn { table, column, .. } => column_exists(pool, table, column).await?,
        Step::CreateIndex { index, .. } => schema_object_exists(pool, "index", index).await?,
        Step::Backfill { .. } => false,
    };

    if already_present {
        debug!(version = migration.version, "schema already up to date");
    } else {
        let sql = match migration.step {
            Step::CreateTable { sql, .. }
            | Step::CreateIndex { sql, .. }
            | Step::Backfill { sql } => sql.to_string(),
            Step::AddColumn {
                table,
                column,
                definition,
            } => format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition),
        };
        let result = sqlx::query(&sql).execute(pool).await?;
        info!(
            version = migration.version,
            rows_affected = result.rows_affected(),
            "applied migration"
        );
    }

    sqlx::query("INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?, ?)")
        .bind(migration.version)
        .bind(crate::db::format_timestamp(&chrono::Utc::now()))
        .execute(pool)
        .await?;

    Ok(())
}

async fn schema_object_exists(pool: &SqlitePool, kind: &str, name: &str) -> AppResult<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM sqlite_master WHERE type = ? AND name = ?")
        .bind(kind)
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>("total") > 0)
}

async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> AppResult<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM pragma_table_info(?) WHERE name = ?")
        .bind(table)
        .bind(column)
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>("total") > 0)
}

/// Versions recorded as applied, in application order
pub async fn applied_versions(pool: &SqlitePool) -> AppResult<Vec<String>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(|row| row.get("version")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn empty_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_database_gets_full_schema() {
        let pool = empty_pool().await;
        run_migrations(&pool).await.unwrap();

        for column in [
            "hostel_block",
            "room_number",
            "priority",
            "updated_at",
            "staff_assigned",
        ] {
            assert!(column_exists(&pool, "complaints", column).await.unwrap());
        }
        assert!(schema_object_exists(&pool, "index", "idx_complaints_roll_number_status")
            .await
            .unwrap());
        assert_eq!(applied_versions(&pool).await.unwrap().len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_rerun_is_a_no_op() {
        let pool = empty_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
        assert_eq!(applied_versions(&pool).await.unwrap().len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_legacy_database_is_upgraded_without_data_loss() {
        let pool = empty_pool().await;

        // Shape of the earliest deployed schema, before location and priority existed
        sqlx::query(
            r#"
            CREATE TABLE complaints (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                roll_number TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending',
                staff_assigned TEXT,
                remarks TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO complaints (roll_number, category, description, status, created_at)
             VALUES ('41270001', 'Water', 'No water on the second floor', 'Pending', '2024-01-05 10:00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();

        let row = sqlx::query(
            "SELECT hostel_block, room_number, priority, updated_at, created_at FROM complaints",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(row.get::<String, _>("hostel_block"), "");
        assert_eq!(row.get::<String, _>("room_number"), "");
        assert_eq!(row.get::<String, _>("priority"), "Medium");
        assert_eq!(
            row.get::<Option<String>, _>("updated_at").as_deref(),
            Some("2024-01-05 10:00:00")
        );
    }
}
