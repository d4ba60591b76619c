//! Schema versions for the libSQL store.
//!
//! Applied versions are recorded in `_migrations`. Each pending step runs in
//! its own transaction together with its ledger row, so a failed step leaves
//! the schema at the last good version.

use libsql::{Connection, params};
use tracing::{debug, info};

use crate::error::StoreError;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const LEDGER: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// Ordered by version. Append only.
static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "records",
    sql: r#"
        CREATE TABLE IF NOT EXISTS records (
            profile_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (profile_id, key)
        );
    "#,
}];

fn failed(context: String) -> impl FnOnce(libsql::Error) -> StoreError {
    move |e| StoreError::Migration(format!("{context}: {e}"))
}

/// Bring the schema up to the latest version.
pub async fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(LEDGER, ())
        .await
        .map_err(failed("Creating migration ledger".into()))?;

    let applied = applied_version(conn).await?;
    let mut pending = MIGRATIONS.iter().filter(|m| m.version > applied).peekable();
    if pending.peek().is_none() {
        debug!(version = applied, "Schema up to date");
        return Ok(());
    }
    for migration in pending {
        apply(conn, migration).await?;
    }
    Ok(())
}

async fn apply(conn: &Connection, migration: &Migration) -> Result<(), StoreError> {
    let label = format!("V{} ({})", migration.version, migration.name);
    let tx = conn
        .transaction()
        .await
        .map_err(failed(format!("Opening transaction for {label}")))?;
    tx.execute_batch(migration.sql)
        .await
        .map_err(failed(format!("Migration {label}")))?;
    tx.execute(
        "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
        params![migration.version, migration.name],
    )
    .await
    .map_err(failed(format!("Recording {label}")))?;
    tx.commit()
        .await
        .map_err(failed(format!("Committing {label}")))?;

    info!(version = migration.version, name = migration.name, "Migration applied");
    Ok(())
}

/// Highest recorded version, 0 on a fresh database.
async fn applied_version(conn: &Connection) -> Result<i64, StoreError> {
    let mut rows = conn
        .query(
            "SELECT version FROM _migrations ORDER BY version DESC LIMIT 1",
            (),
        )
        .await
        .map_err(failed("Reading schema version".into()))?;
    let Some(row) = rows
        .next()
        .await
        .map_err(failed("Reading schema version".into()))?
    else {
        return Ok(0);
    };
    row.get::<i64>(0)
        .map_err(failed("Decoding schema version".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_conn() -> Connection {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap();
        db.connect().unwrap()
    }

    #[tokio::test]
    async fn fresh_database_is_version_zero() {
        let conn = test_conn().await;
        conn.execute(LEDGER, ()).await.unwrap();
        assert_eq!(applied_version(&conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn creates_records_table_and_ledger_row() {
        let conn = test_conn().await;
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='records'",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);

        let mut rows = conn
            .query("SELECT version, name FROM _migrations", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
        assert_eq!(row.get::<String>(1).unwrap(), "records");
        assert!(rows.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rerun_applies_nothing() {
        let conn = test_conn().await;
        run_migrations(&conn).await.unwrap();
        run_migrations(&conn).await.unwrap();

        let mut rows = conn
            .query("SELECT COUNT(*) FROM _migrations", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), MIGRATIONS.len() as i64);
    }
}
